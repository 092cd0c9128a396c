//! Staged writes into the store.
//!
//! Engine output for a new entity lands in a dot-prefixed scratch directory
//! next to its final location and is moved into place only once every
//! artifact exists. Dropping an uncommitted [`StagedDir`] removes it.

use crate::error::{PqPkiError, Result};
use crate::storage::layout::{CertStore, STAGING_PREFIX};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};
use tracing::{debug, warn};

/// A scratch directory inside the store.
#[derive(Debug)]
pub struct StagedDir {
    dir: TempDir,
    relative: PathBuf,
}

impl StagedDir {
    /// Create a staging directory under the store-relative `parent`.
    pub fn create(store: &CertStore, parent: impl AsRef<Path>) -> Result<Self> {
        let parent = parent.as_ref();
        let absolute_parent = store.resolve(parent);
        fs::create_dir_all(&absolute_parent)?;

        let dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&absolute_parent)?;
        let name = dir
            .path()
            .file_name()
            .ok_or_else(|| PqPkiError::InvalidInput("staging directory has no name".to_string()))?;
        let relative = parent.join(name);

        debug!(staging = %relative.display(), "created staging directory");
        Ok(Self { dir, relative })
    }

    /// Store-relative path of the staging directory.
    pub fn relative(&self) -> &Path {
        &self.relative
    }

    /// Absolute path of the staging directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Store-relative path of a file inside the staging directory.
    pub fn file(&self, name: &str) -> PathBuf {
        self.relative.join(name)
    }

    /// Absolute path of a file inside the staging directory.
    pub fn absolute(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Rename the whole directory to the store-relative `destination`.
    ///
    /// The destination must not exist yet.
    pub fn commit_dir(self, store: &CertStore, destination: impl AsRef<Path>) -> Result<()> {
        let destination = store.resolve(destination);
        if destination.exists() {
            return Err(PqPkiError::InvalidInput(format!(
                "refusing to replace existing directory {}",
                destination.display()
            )));
        }

        let staged = self.dir.keep();
        if let Err(e) = fs::rename(&staged, &destination) {
            let _ = fs::remove_dir_all(&staged);
            return Err(e.into());
        }

        debug!(destination = %destination.display(), "committed staged directory");
        Ok(())
    }

    /// Move individual files out of staging, overwriting their targets.
    ///
    /// Each `(name, destination)` pair moves `name` from the staging directory
    /// to the store-relative `destination`. Replaced files are parked in the
    /// staging directory; if any move fails, every destination already
    /// committed gets its previous content back. The staging directory is
    /// removed afterwards.
    pub fn commit_files(self, store: &CertStore, moves: &[(&str, PathBuf)]) -> Result<()> {
        for (name, _) in moves {
            let source = self.absolute(name);
            if !source.is_file() {
                return Err(PqPkiError::MissingComponent(self.file(name)));
            }
        }

        let mut committed: Vec<(PathBuf, Option<PathBuf>)> = Vec::new();
        for (name, destination) in moves {
            let destination = store.resolve(destination);
            match self.replace(name, &destination) {
                Ok(previous) => committed.push((destination, previous)),
                Err(e) => {
                    warn!(
                        destination = %destination.display(),
                        error = %e,
                        "commit failed, restoring previous files"
                    );
                    restore(&committed);
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    /// Move staged `name` onto `destination`, parking any existing file.
    fn replace(&self, name: &str, destination: &Path) -> Result<Option<PathBuf>> {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }

        let previous = if destination.is_file() {
            let parked = self.absolute(&format!("{}.previous", name));
            fs::rename(destination, &parked)?;
            Some(parked)
        } else {
            None
        };

        if let Err(e) = fs::rename(self.absolute(name), destination) {
            if let Some(parked) = &previous {
                let _ = fs::rename(parked, destination);
            }
            return Err(e.into());
        }

        debug!(destination = %destination.display(), "committed staged file");
        Ok(previous)
    }
}

/// Undo committed moves, newest first.
fn restore(committed: &[(PathBuf, Option<PathBuf>)]) {
    for (destination, previous) in committed.iter().rev() {
        let restored = match previous {
            Some(parked) => fs::rename(parked, destination),
            None => fs::remove_file(destination),
        };
        if let Err(e) = restored {
            warn!(destination = %destination.display(), error = %e, "could not restore file");
        }
    }
}

/// Write `contents` to `destination` via a temporary sibling file.
///
/// Readers never observe a half-written file; on error the destination is
/// left as it was.
pub fn write_atomic(destination: &Path, contents: &[u8]) -> Result<()> {
    let parent = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    temp.persist(destination).map_err(|e| PqPkiError::Storage(e.error))?;
    Ok(())
}
