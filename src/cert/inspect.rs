//! Read-only inspection of stored CSRs and certificates.

use crate::engine::SigningEngine;
use crate::error::{PqPkiError, Result};
use crate::storage::layout::{CertStore, ObjectType};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Every stored object of `object` type, in selection order.
pub fn inspect_candidates(store: &CertStore, object: ObjectType) -> Result<Vec<PathBuf>> {
    store.list_objects(object)
}

/// Decode a stored object through the engine. Never modifies the store.
#[instrument(skip(store, engine))]
pub fn inspect_object(
    store: &CertStore,
    engine: &dyn SigningEngine,
    object: ObjectType,
    path: &Path,
) -> Result<String> {
    if !store.resolve(path).is_file() {
        return Err(PqPkiError::MissingComponent(path.to_path_buf()));
    }
    engine.decode(object, path)
}
