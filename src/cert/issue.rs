//! Issuing a CA-signed entity into the store.
//!
//! Shared by intermediate and client creation: key + CSR, signature by the
//! issuer, chain, metadata, all inside a staging directory that is renamed
//! into place only when every step succeeded.

use crate::cert::chain::{upstream_chain, write_chain};
use crate::cert::subject::Subject;
use crate::engine::{CertProfile, CsrRequest, SignRequest, SigningEngine};
use crate::error::Result;
use crate::storage::layout::{CertStore, EntityHandle, EntityKind};
use crate::storage::metadata::{write_metadata, EntityMetadata};
use crate::storage::naming;
use crate::storage::staging::StagedDir;
use tracing::info;

/// Subject and validity for a new entity.
#[derive(Debug, Clone)]
pub struct IssueRequest {
    /// Subject; its common name is also the directory label.
    pub subject: Subject,
    /// Validity in days.
    pub validity_days: u32,
}

/// Issue a new entity of `kind`, signed by `issuer` (or by the root when
/// `issuer` is `None`).
///
/// Preconditions are the caller's responsibility. On failure the staging
/// directory is discarded and the store is left as it was.
pub(crate) fn issue_signed(
    store: &CertStore,
    engine: &dyn SigningEngine,
    kind: EntityKind,
    issuer: Option<&EntityHandle>,
    request: &IssueRequest,
) -> Result<EntityHandle> {
    store.ensure_layout()?;

    // Rejects a client without an intermediate issuer.
    let upstream = upstream_chain(store, kind, issuer)?;
    let (profile, issuer_cert, issuer_key) = match (kind, issuer) {
        (EntityKind::Client, Some(issuer)) => {
            (CertProfile::Client, issuer.cert_path(), issuer.key_path())
        }
        _ => (
            CertProfile::IntermediateCa,
            store.root_cert_path(),
            store.root_key_path(),
        ),
    };

    let id = store.allocate_identifier(kind, &request.subject.common_name, naming::now())?;
    let handle = EntityHandle::new(kind, id);

    let staged = StagedDir::create(store, kind.dir_name())?;
    let cert = staged.file(&kind.cert_file());

    engine.generate_csr(&CsrRequest {
        subject: request.subject.clone(),
        profile,
        key_out: staged.file(&kind.key_file()),
        csr_out: staged.file(&kind.csr_file()),
    })?;

    engine.sign_csr(&SignRequest {
        csr_in: staged.file(&kind.csr_file()),
        issuer_cert,
        issuer_key,
        validity_days: request.validity_days,
        cert_out: cert.clone(),
    })?;

    write_chain(store, &[cert, upstream], &staged.file(&kind.chain_file()))?;

    let metadata = EntityMetadata::new(
        &handle,
        &request.subject,
        engine.algorithm(),
        request.validity_days,
        issuer,
    );
    write_metadata(staged.path(), &metadata)?;

    staged.commit_dir(store, handle.dir())?;

    info!(
        kind = %kind,
        id = %handle.id,
        issuer = issuer.map(|i| i.id.as_str()).unwrap_or("root"),
        "issued entity"
    );
    Ok(handle)
}
