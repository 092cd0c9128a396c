//! Filesystem layout of the certificate store.
//!
//! ```text
//! root/root_ca.{key,crt}
//! intermediates/<label>_<timestamp>/intermediate.{key,csr,crt}
//! intermediates/<label>_<timestamp>/intermediate_chain.crt
//! clients/<label>_<timestamp>/client.{key,csr,crt}
//! clients/<label>_<timestamp>/client_chain.crt
//! ```
//!
//! All paths handed out by this module are relative to the store base
//! directory, which is also the working directory of the signing engine.

use crate::error::Result;
use crate::storage::naming::derive_identifier;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory holding the singleton root CA.
pub const ROOT_DIR: &str = "root";

/// Root CA private key file name.
pub const ROOT_KEY_FILE: &str = "root_ca.key";

/// Root CA certificate file name.
pub const ROOT_CERT_FILE: &str = "root_ca.crt";

/// Prefix of in-progress directories; never listed.
pub const STAGING_PREFIX: &str = ".staging-";

/// The two kinds of non-root entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Intermediate CA, signed by the root.
    Intermediate,
    /// Leaf client certificate, signed by an intermediate.
    Client,
}

impl EntityKind {
    /// Top-level store directory for this kind.
    pub fn dir_name(self) -> &'static str {
        match self {
            EntityKind::Intermediate => "intermediates",
            EntityKind::Client => "clients",
        }
    }

    /// Common stem of the artifact files inside an entity directory.
    pub fn file_stem(self) -> &'static str {
        match self {
            EntityKind::Intermediate => "intermediate",
            EntityKind::Client => "client",
        }
    }

    /// Private key file name.
    pub fn key_file(self) -> String {
        format!("{}.key", self.file_stem())
    }

    /// CSR file name.
    pub fn csr_file(self) -> String {
        format!("{}.csr", self.file_stem())
    }

    /// Certificate file name.
    pub fn cert_file(self) -> String {
        format!("{}.crt", self.file_stem())
    }

    /// Chain file name.
    pub fn chain_file(self) -> String {
        format!("{}_chain.crt", self.file_stem())
    }

    /// Serial number file OpenSSL keeps next to a CA certificate it signs
    /// with.
    pub fn serial_file(self) -> String {
        format!("{}.srl", self.file_stem())
    }

    /// All artifact names an entity directory owns.
    pub fn artifact_files(self) -> [String; 5] {
        [
            self.key_file(),
            self.csr_file(),
            self.cert_file(),
            self.chain_file(),
            self.serial_file(),
        ]
    }

    /// Plural used in messages ("intermediates", "clients").
    pub fn plural(self) -> &'static str {
        self.dir_name()
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// A concrete stored intermediate or client.
///
/// Returned by listings and by the selector; passed explicitly into the
/// workflow that needs it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EntityHandle {
    /// Entity kind.
    pub kind: EntityKind,
    /// Directory identifier, also the display name.
    pub id: String,
}

impl EntityHandle {
    /// Create a handle for an identifier of the given kind.
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// Name shown to the operator.
    pub fn display_name(&self) -> &str {
        &self.id
    }

    /// Entity directory, relative to the store base.
    pub fn dir(&self) -> PathBuf {
        Path::new(self.kind.dir_name()).join(&self.id)
    }

    /// Private key, relative to the store base.
    pub fn key_path(&self) -> PathBuf {
        self.dir().join(self.kind.key_file())
    }

    /// CSR, relative to the store base.
    pub fn csr_path(&self) -> PathBuf {
        self.dir().join(self.kind.csr_file())
    }

    /// Certificate, relative to the store base.
    pub fn cert_path(&self) -> PathBuf {
        self.dir().join(self.kind.cert_file())
    }

    /// Chain file, relative to the store base.
    pub fn chain_path(&self) -> PathBuf {
        self.dir().join(self.kind.chain_file())
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Which stored objects to enumerate for inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    /// Certificate signing requests (`*.csr`).
    Csr,
    /// Certificates, chain files included (`*.crt`).
    Certificate,
}

impl ObjectType {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ObjectType::Csr => "csr",
            ObjectType::Certificate => "crt",
        }
    }
}

/// Handle on a store directory.
///
/// Constructing a store touches nothing; only [`CertStore::ensure_layout`]
/// creates directories.
#[derive(Debug, Clone)]
pub struct CertStore {
    base: PathBuf,
}

impl CertStore {
    /// Open a store rooted at `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// The store base directory.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Turn a store-relative path into a path usable from this process.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.base.join(relative)
    }

    /// Create the three top-level directories if missing.
    pub fn ensure_layout(&self) -> Result<()> {
        for dir in [
            ROOT_DIR,
            EntityKind::Intermediate.dir_name(),
            EntityKind::Client.dir_name(),
        ] {
            fs::create_dir_all(self.base.join(dir))?;
        }
        Ok(())
    }

    /// Root CA key, relative to the store base.
    pub fn root_key_path(&self) -> PathBuf {
        Path::new(ROOT_DIR).join(ROOT_KEY_FILE)
    }

    /// Root CA certificate, relative to the store base.
    pub fn root_cert_path(&self) -> PathBuf {
        Path::new(ROOT_DIR).join(ROOT_CERT_FILE)
    }

    /// True iff both the root key and the root certificate exist.
    pub fn has_root(&self) -> bool {
        self.resolve(self.root_key_path()).is_file() && self.resolve(self.root_cert_path()).is_file()
    }

    /// True iff at least one complete intermediate is stored.
    pub fn has_any_intermediate(&self) -> Result<bool> {
        Ok(!self.list_intermediates()?.is_empty())
    }

    /// All complete intermediates, sorted by identifier.
    pub fn list_intermediates(&self) -> Result<Vec<EntityHandle>> {
        self.list(EntityKind::Intermediate)
    }

    /// All complete clients, sorted by identifier.
    pub fn list_clients(&self) -> Result<Vec<EntityHandle>> {
        self.list(EntityKind::Client)
    }

    /// All complete entities of `kind`, sorted lexicographically by identifier.
    ///
    /// Staging directories are skipped silently; directories missing the
    /// key, CSR or certificate are skipped with a warning.
    pub fn list(&self, kind: EntityKind) -> Result<Vec<EntityHandle>> {
        let dir = self.base.join(kind.dir_name());
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut handles = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let Some(id) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if id.starts_with('.') {
                continue;
            }

            let handle = EntityHandle::new(kind, id);
            if self.is_complete(&handle) {
                handles.push(handle);
            } else {
                warn!(kind = %kind, id = %handle.id, "skipping incomplete entity directory");
            }
        }

        handles.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(handles)
    }

    /// Whether the entity's key, CSR and certificate all exist.
    pub fn is_complete(&self, handle: &EntityHandle) -> bool {
        [handle.key_path(), handle.csr_path(), handle.cert_path()]
            .iter()
            .all(|p| self.resolve(p).is_file())
    }

    /// Pick a fresh directory identifier for a new entity.
    ///
    /// Starts from [`derive_identifier`]; if that directory already exists
    /// (same label within the same second) a numeric suffix is appended.
    pub fn allocate_identifier(
        &self,
        kind: EntityKind,
        label: &str,
        at: NaiveDateTime,
    ) -> Result<String> {
        let base_id = derive_identifier(label, at)?;
        let parent = self.base.join(kind.dir_name());

        let mut candidate = base_id.clone();
        let mut attempt = 1u32;
        while parent.join(&candidate).exists() {
            attempt += 1;
            candidate = format!("{}_{}", base_id, attempt);
        }

        if attempt > 1 {
            debug!(%base_id, %candidate, "identifier collision resolved with suffix");
        }
        Ok(candidate)
    }

    /// Every stored object of the given type across root, intermediates and
    /// clients, as store-relative paths.
    ///
    /// Order: root first, then intermediates, then clients, each entity's
    /// files sorted by name.
    pub fn list_objects(&self, object: ObjectType) -> Result<Vec<PathBuf>> {
        let mut dirs = vec![PathBuf::from(ROOT_DIR)];
        for kind in [EntityKind::Intermediate, EntityKind::Client] {
            dirs.extend(self.list(kind)?.iter().map(EntityHandle::dir));
        }

        let mut objects = Vec::new();
        for dir in dirs {
            let absolute = self.resolve(&dir);
            if !absolute.is_dir() {
                continue;
            }

            let mut names = Vec::new();
            for entry in fs::read_dir(&absolute)? {
                let entry = entry?;
                if !entry.file_type()?.is_file() {
                    continue;
                }
                let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                    continue;
                };
                if Path::new(&name).extension().and_then(|e| e.to_str()) == Some(object.extension()) {
                    names.push(name);
                }
            }
            names.sort();

            objects.extend(names.into_iter().map(|name| dir.join(name)));
        }

        Ok(objects)
    }
}
