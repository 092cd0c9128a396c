//! Non-interactive summary of a store.
//!
//! Backs the `list` subcommand. Entities appear in the same order the
//! selector numbers them.

use crate::error::Result;
use crate::storage::layout::{CertStore, EntityHandle, EntityKind};
use crate::storage::metadata::{read_metadata, EntityMetadata};
use serde::Serialize;
use std::fmt::Write;
use std::path::PathBuf;

/// Everything the store holds.
#[derive(Debug, Serialize)]
pub struct StoreListing {
    /// Store base directory.
    pub store: PathBuf,
    /// Root certificate path, if a root exists.
    pub root_cert: Option<PathBuf>,
    /// Complete intermediates, sorted.
    pub intermediates: Vec<ListedEntity>,
    /// Complete clients, sorted.
    pub clients: Vec<ListedEntity>,
}

/// One listed entity and its metadata record, if it has one.
#[derive(Debug, Serialize)]
pub struct ListedEntity {
    #[serde(flatten)]
    pub handle: EntityHandle,
    pub metadata: Option<EntityMetadata>,
}

impl StoreListing {
    /// Read the listing from disk.
    pub fn collect(store: &CertStore) -> Result<Self> {
        let listed = |kind: EntityKind| -> Result<Vec<ListedEntity>> {
            store
                .list(kind)?
                .into_iter()
                .map(|handle| {
                    let metadata = read_metadata(store, &handle)?;
                    Ok(ListedEntity { handle, metadata })
                })
                .collect()
        };

        Ok(Self {
            store: store.base().to_path_buf(),
            root_cert: store.has_root().then(|| store.root_cert_path()),
            intermediates: listed(EntityKind::Intermediate)?,
            clients: listed(EntityKind::Client)?,
        })
    }

    /// Pretty JSON document.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Human-readable tables.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let root = self
            .root_cert
            .as_ref()
            .map_or_else(|| "not created".to_string(), |p| p.display().to_string());
        let _ = writeln!(out, "Root CA: {}", root);

        write_entities(&mut out, "Intermediate CAs", &self.intermediates);
        write_entities(&mut out, "Client certificates", &self.clients);
        out
    }
}

fn write_entities(out: &mut String, title: &str, entities: &[ListedEntity]) {
    let _ = writeln!(out);
    if entities.is_empty() {
        let _ = writeln!(out, "{}: none", title);
        return;
    }

    let _ = writeln!(out, "{}:", title);
    let _ = writeln!(out, "{:<40} {:<24} Issuer", "Identifier", "Common Name");
    let _ = writeln!(out, "{}", "-".repeat(90));
    for entity in entities {
        let (cn, issuer) = match &entity.metadata {
            Some(m) => (m.common_name.as_str(), m.issuer.as_deref().unwrap_or("root")),
            None => ("-", "-"),
        };
        let _ = writeln!(out, "{:<40} {:<24} {}", entity.handle.id, cn, issuer);
    }
}
