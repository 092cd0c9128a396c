//! Client (leaf) certificate operations.

use crate::cert::issue::{issue_signed, IssueRequest};
use crate::engine::SigningEngine;
use crate::error::{PqPkiError, Result};
use crate::storage::layout::{CertStore, EntityHandle, EntityKind};
use crate::storage::metadata::read_metadata;
use tracing::instrument;

/// Fail unless at least one complete intermediate exists.
pub fn ensure_prerequisites(store: &CertStore) -> Result<()> {
    if !store.has_any_intermediate()? {
        return Err(PqPkiError::PrerequisiteMissing(
            "no intermediate CA exists; create an intermediate CA first".to_string(),
        ));
    }
    Ok(())
}

/// Create a client certificate signed by `issuer`.
///
/// The client's chain is its certificate followed by the issuer's existing
/// `intermediate_chain.crt`; if that file is missing the client is not
/// created.
#[instrument(skip_all, fields(cn = %request.subject.common_name, issuer = %issuer.id))]
pub fn create_client_cert(
    store: &CertStore,
    engine: &dyn SigningEngine,
    issuer: &EntityHandle,
    request: &IssueRequest,
) -> Result<EntityHandle> {
    ensure_prerequisites(store)?;
    if issuer.kind != EntityKind::Intermediate || !store.is_complete(issuer) {
        return Err(PqPkiError::PrerequisiteMissing(format!(
            "'{}' is not a usable intermediate CA",
            issuer.id
        )));
    }

    issue_signed(store, engine, EntityKind::Client, Some(issuer), request)
}

/// The intermediate recorded as a client's issuer, if the record exists and
/// the intermediate is still stored.
pub fn recorded_issuer(store: &CertStore, client: &EntityHandle) -> Result<Option<EntityHandle>> {
    let issuer = read_metadata(store, client)?.and_then(|m| m.issuer_handle());
    Ok(issuer.filter(|i| store.is_complete(i)))
}
