//! Entity metadata.
//!
//! Each intermediate and client directory carries an `entity.json` recording
//! the subject, the algorithm, and which entity issued it. The issuer record
//! is what lets a client's chain be rebuilt later without asking which
//! intermediate signed it.

use crate::cert::subject::Subject;
use crate::error::Result;
use crate::storage::layout::{CertStore, EntityHandle, EntityKind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File name of the metadata record inside an entity directory.
pub const METADATA_FILE: &str = "entity.json";

/// Metadata for a stored intermediate or client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityMetadata {
    /// Directory identifier.
    pub id: String,

    /// Entity kind.
    pub kind: EntityKind,

    /// Subject common name.
    pub common_name: String,

    /// Subject organization, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,

    /// Signature algorithm identifier.
    pub algorithm: String,

    /// Requested validity in days.
    pub validity_days: u32,

    /// Identifier of the issuing intermediate; `None` when issued by the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    /// Creation time (Unix timestamp).
    pub created_at: u64,
}

impl EntityMetadata {
    /// Create the record for a freshly issued entity, stamped with the
    /// current time.
    pub fn new(
        handle: &EntityHandle,
        subject: &Subject,
        algorithm: impl Into<String>,
        validity_days: u32,
        issuer: Option<&EntityHandle>,
    ) -> Self {
        Self {
            id: handle.id.clone(),
            kind: handle.kind,
            common_name: subject.common_name.clone(),
            organization: subject.organization.clone(),
            algorithm: algorithm.into(),
            validity_days,
            issuer: issuer.map(|i| i.id.clone()),
            created_at: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
        }
    }

    /// Handle of the issuing intermediate, for clients that recorded one.
    pub fn issuer_handle(&self) -> Option<EntityHandle> {
        self.issuer
            .as_ref()
            .map(|id| EntityHandle::new(EntityKind::Intermediate, id.clone()))
    }
}

/// Write `metadata` as pretty JSON into `dir` (an absolute directory path).
pub fn write_metadata(dir: &Path, metadata: &EntityMetadata) -> Result<()> {
    let json = serde_json::to_string_pretty(metadata)?;
    fs::write(dir.join(METADATA_FILE), json)?;
    Ok(())
}

/// Load an entity's metadata, or `None` if it has no record.
pub fn read_metadata(store: &CertStore, handle: &EntityHandle) -> Result<Option<EntityMetadata>> {
    let path = store.resolve(handle.dir().join(METADATA_FILE));
    if !path.is_file() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&path)?;
    Ok(Some(serde_json::from_str(&contents)?))
}
