//! Trust chain assembly.
//!
//! A chain file is the entity's own certificate followed by everything above
//! it up to the root:
//!
//! ```text
//! intermediate_chain.crt = intermediate.crt ++ root_ca.crt
//! client_chain.crt       = client.crt ++ <issuer>/intermediate_chain.crt
//! ```
//!
//! Assembly is plain byte concatenation, so rebuilding from unchanged inputs
//! is byte-identical.

use crate::error::{PqPkiError, Result};
use crate::storage::layout::{CertStore, EntityHandle, EntityKind};
use crate::storage::staging::write_atomic;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// The file that follows an entity's own certificate in its chain.
///
/// For an intermediate this is the root certificate; for a client it is the
/// issuing intermediate's chain file, which already reaches the root.
pub fn upstream_chain(
    store: &CertStore,
    kind: EntityKind,
    issuer: Option<&EntityHandle>,
) -> Result<PathBuf> {
    match kind {
        EntityKind::Intermediate => Ok(store.root_cert_path()),
        EntityKind::Client => {
            let issuer = issuer.ok_or_else(|| {
                PqPkiError::InvalidInput(
                    "a client chain needs its issuing intermediate".to_string(),
                )
            })?;
            if issuer.kind != EntityKind::Intermediate {
                return Err(PqPkiError::InvalidInput(format!(
                    "'{}' is not an intermediate",
                    issuer.id
                )));
            }
            Ok(issuer.chain_path())
        }
    }
}

/// Input files for an entity's chain, in concatenation order.
///
/// Clients need their issuing intermediate; intermediates ignore `issuer`.
///
/// # Example
///
/// ```
/// use pqpki::cert::chain::chain_parts;
/// use pqpki::storage::{CertStore, EntityHandle, EntityKind};
/// use std::path::PathBuf;
///
/// let store = CertStore::new("/srv/pki");
/// let inter = EntityHandle::new(EntityKind::Intermediate, "ca_20260101_000000");
/// let parts = chain_parts(&store, &inter, None).unwrap();
/// assert_eq!(parts[1], PathBuf::from("root/root_ca.crt"));
/// ```
pub fn chain_parts(
    store: &CertStore,
    entity: &EntityHandle,
    issuer: Option<&EntityHandle>,
) -> Result<Vec<PathBuf>> {
    Ok(vec![
        entity.cert_path(),
        upstream_chain(store, entity.kind, issuer)?,
    ])
}

/// Concatenate store-relative files.
///
/// Every part is read before anything is returned; the first absent part
/// fails with `MissingComponent`.
pub fn assemble(store: &CertStore, parts: &[PathBuf]) -> Result<Vec<u8>> {
    let mut chain = Vec::new();
    for part in parts {
        let path = store.resolve(part);
        if !path.is_file() {
            return Err(PqPkiError::MissingComponent(part.clone()));
        }
        chain.extend_from_slice(&fs::read(&path)?);
    }
    Ok(chain)
}

/// Assemble `parts` and write the result to the store-relative `destination`.
///
/// Nothing is written when an input is missing. Returns the chain bytes.
pub fn write_chain(store: &CertStore, parts: &[PathBuf], destination: &Path) -> Result<Vec<u8>> {
    let chain = assemble(store, parts)?;
    write_atomic(&store.resolve(destination), &chain)?;
    debug!(
        destination = %destination.display(),
        bytes = chain.len(),
        certificates = count_certificates(&chain),
        "wrote chain file"
    );
    Ok(chain)
}

/// Compute an entity's chain without writing it.
pub fn build_chain(
    store: &CertStore,
    entity: &EntityHandle,
    issuer: Option<&EntityHandle>,
) -> Result<Vec<u8>> {
    assemble(store, &chain_parts(store, entity, issuer)?)
}

/// Number of PEM certificate blocks in `bytes`; zero if it is not PEM.
pub fn count_certificates(bytes: &[u8]) -> usize {
    pem::parse_many(bytes)
        .map(|blocks| blocks.iter().filter(|b| b.tag() == "CERTIFICATE").count())
        .unwrap_or(0)
}

/// Check an operator-supplied chain output name.
///
/// It must be a plain file name and must not shadow one of the entity's own
/// artifacts.
pub fn validate_output_name(entity: &EntityHandle, name: &str) -> Result<()> {
    let name = name.trim();
    let invalid = |reason: &str| -> Result<()> {
        Err(PqPkiError::InvalidInput(format!(
            "output name '{}' {}",
            name, reason
        )))
    };

    if name.is_empty() {
        return invalid("is empty");
    }
    if name.starts_with('.') {
        return invalid("must not start with '.'");
    }
    if name.contains(['/', '\\']) || Path::new(name).components().count() != 1 {
        return invalid("must be a plain file name");
    }
    if entity.kind.artifact_files().iter().any(|f| f == name)
        || name == crate::storage::metadata::METADATA_FILE
    {
        return invalid("would overwrite an entity file");
    }
    Ok(())
}

/// Rebuild an entity's chain into a new file inside its directory.
///
/// The output must not exist yet, so the entity's own chain file and every
/// other file in the directory are left untouched. Returns the
/// store-relative path written.
#[instrument(skip(store, issuer), fields(entity = %entity.id))]
pub fn regenerate_chain(
    store: &CertStore,
    entity: &EntityHandle,
    issuer: Option<&EntityHandle>,
    output_name: &str,
) -> Result<PathBuf> {
    validate_output_name(entity, output_name)?;
    let destination = entity.dir().join(output_name.trim());
    if store.resolve(&destination).exists() {
        return Err(PqPkiError::InvalidInput(format!(
            "{} already exists",
            destination.display()
        )));
    }

    let parts = chain_parts(store, entity, issuer)?;
    let chain = write_chain(store, &parts, &destination)?;

    info!(
        destination = %destination.display(),
        certificates = count_certificates(&chain),
        "regenerated chain"
    );
    Ok(destination)
}
