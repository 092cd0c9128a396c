//! Root CA operations.
//!
//! There is exactly one root, at a fixed location. Creating a root while one
//! exists replaces it; intermediates signed by the old root stay on disk but
//! no longer chain to the new one.

use crate::cert::issue::IssueRequest;
use crate::engine::{SelfSignedRequest, SigningEngine};
use crate::error::Result;
use crate::storage::layout::{CertStore, ROOT_CERT_FILE, ROOT_DIR, ROOT_KEY_FILE};
use crate::storage::staging::StagedDir;
use tracing::{info, instrument, warn};

/// Create (or overwrite) the self-signed root CA.
///
/// The engine writes into a staging directory; the key and certificate
/// replace the current root only after it succeeds.
///
/// # Example
///
/// ```rust,no_run
/// use pqpki::cert::ca::create_root_ca;
/// use pqpki::cert::issue::IssueRequest;
/// use pqpki::cert::subject::Subject;
/// use pqpki::config::EngineConfig;
/// use pqpki::engine::OpensslEngine;
/// use pqpki::storage::CertStore;
/// use std::path::Path;
///
/// # fn example() -> pqpki::error::Result<()> {
/// let store = CertStore::new(".");
/// let engine = OpensslEngine::new(EngineConfig::default(), Path::new("."))?;
/// let request = IssueRequest {
///     subject: Subject::new("Acme Root CA", "Acme")?,
///     validity_days: 3650,
/// };
/// create_root_ca(&store, &engine, &request)?;
/// # Ok(())
/// # }
/// ```
#[instrument(skip_all, fields(cn = %request.subject.common_name))]
pub fn create_root_ca(
    store: &CertStore,
    engine: &dyn SigningEngine,
    request: &IssueRequest,
) -> Result<()> {
    store.ensure_layout()?;
    let replacing = store.has_root();

    let staged = StagedDir::create(store, ROOT_DIR)?;
    engine.issue_self_signed(&SelfSignedRequest {
        subject: request.subject.clone(),
        validity_days: request.validity_days,
        key_out: staged.file(ROOT_KEY_FILE),
        cert_out: staged.file(ROOT_CERT_FILE),
    })?;

    staged.commit_files(
        store,
        &[
            (ROOT_KEY_FILE, store.root_key_path()),
            (ROOT_CERT_FILE, store.root_cert_path()),
        ],
    )?;

    if replacing {
        warn!("previous root CA overwritten; existing intermediates no longer chain to it");
    }
    info!(validity_days = request.validity_days, "root CA created");
    Ok(())
}
