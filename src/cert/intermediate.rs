//! Intermediate CA operations.
//!
//! Intermediates are signed by the root and may only sign client
//! certificates (path length 0).

use crate::cert::issue::{issue_signed, IssueRequest};
use crate::engine::SigningEngine;
use crate::error::{PqPkiError, Result};
use crate::storage::layout::{CertStore, EntityHandle, EntityKind};
use tracing::instrument;

/// Fail unless a root CA exists.
pub fn ensure_prerequisites(store: &CertStore) -> Result<()> {
    if !store.has_root() {
        return Err(PqPkiError::PrerequisiteMissing(
            "no root CA exists; create the root CA first".to_string(),
        ));
    }
    Ok(())
}

/// Create an Intermediate CA signed by the current root.
///
/// On success the new directory holds `intermediate.{key,csr,crt}`,
/// `intermediate_chain.crt` (certificate followed by the root certificate)
/// and `entity.json`.
#[instrument(skip_all, fields(cn = %request.subject.common_name))]
pub fn create_intermediate_ca(
    store: &CertStore,
    engine: &dyn SigningEngine,
    request: &IssueRequest,
) -> Result<EntityHandle> {
    ensure_prerequisites(store)?;
    issue_signed(store, engine, EntityKind::Intermediate, None, request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::ca::create_root_ca;
    use crate::cert::subject::Subject;
    use crate::engine::testing::FakeEngine;
    use crate::storage::metadata::read_metadata;
    use std::fs;
    use tempfile::TempDir;

    fn request(cn: &str) -> IssueRequest {
        IssueRequest {
            subject: Subject::new(cn, "Acme").unwrap(),
            validity_days: 1825,
        }
    }

    #[test]
    fn test_create_intermediate_requires_root() {
        let temp_dir = TempDir::new().unwrap();
        let store = CertStore::new(temp_dir.path());
        let engine = FakeEngine::new(temp_dir.path());

        let result = create_intermediate_ca(&store, &engine, &request("Issuing CA"));

        assert!(matches!(result, Err(PqPkiError::PrerequisiteMissing(_))));
        assert!(!temp_dir.path().join("intermediates").exists());
        assert!(engine.calls.borrow().is_empty());
    }

    #[test]
    fn test_create_intermediate_success() {
        let temp_dir = TempDir::new().unwrap();
        let store = CertStore::new(temp_dir.path());
        let engine = FakeEngine::new(temp_dir.path());
        create_root_ca(&store, &engine, &request("Root")).unwrap();

        let handle = create_intermediate_ca(&store, &engine, &request("Issuing CA")).unwrap();

        assert!(handle.id.starts_with("Issuing_CA_"));
        assert_eq!(store.list_intermediates().unwrap(), vec![handle.clone()]);

        let cert = fs::read(store.resolve(handle.cert_path())).unwrap();
        let root = fs::read(store.resolve(store.root_cert_path())).unwrap();
        let chain = fs::read(store.resolve(handle.chain_path())).unwrap();
        assert_eq!(chain, [cert, root].concat());

        let metadata = read_metadata(&store, &handle).unwrap().unwrap();
        assert_eq!(metadata.kind, EntityKind::Intermediate);
        assert_eq!(metadata.issuer, None);
        assert_eq!(metadata.algorithm, "fake-dsa");
    }

    #[test]
    fn test_same_second_creations_get_distinct_directories() {
        let temp_dir = TempDir::new().unwrap();
        let store = CertStore::new(temp_dir.path());
        let engine = FakeEngine::new(temp_dir.path());
        create_root_ca(&store, &engine, &request("Root")).unwrap();

        let a = create_intermediate_ca(&store, &engine, &request("dup")).unwrap();
        let b = create_intermediate_ca(&store, &engine, &request("dup")).unwrap();

        assert_ne!(a, b);
        assert_eq!(store.list_intermediates().unwrap().len(), 2);
    }

    #[test]
    fn test_engine_failure_leaves_no_directory() {
        let temp_dir = TempDir::new().unwrap();
        let store = CertStore::new(temp_dir.path());
        create_root_ca(&store, &FakeEngine::new(temp_dir.path()), &request("Root")).unwrap();

        let failing = FakeEngine::failing(temp_dir.path(), "sign");
        let result = create_intermediate_ca(&store, &failing, &request("Issuing CA"));

        assert!(matches!(result, Err(PqPkiError::EngineExecution(_))));
        assert_eq!(
            fs::read_dir(temp_dir.path().join("intermediates")).unwrap().count(),
            0
        );
    }
}
