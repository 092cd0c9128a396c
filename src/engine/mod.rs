//! External signing engine interface.
//!
//! All cryptographic work (key generation, CSR construction, signing,
//! decoding) is delegated to an engine behind [`SigningEngine`]. Paths in
//! requests are relative to the store base; the engine decides how that maps
//! onto its own filesystem view.
//!
//! The shipped implementation is [`runner::OpensslEngine`], which drives an
//! OQS-enabled OpenSSL either in a container or on the host.

pub mod openssl;
pub mod runner;

#[cfg(test)]
pub(crate) mod testing;

use crate::cert::subject::Subject;
use crate::error::Result;
use crate::storage::ObjectType;
use std::path::{Path, PathBuf};

pub use runner::OpensslEngine;

/// Certificate profile, which decides the extensions requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertProfile {
    /// Self-signed trust anchor, unconstrained path length.
    RootCa,
    /// CA signed by the root, may only sign leaf certificates.
    IntermediateCa,
    /// Leaf certificate for client and server authentication.
    Client,
}

/// Generate a key and a self-signed certificate.
#[derive(Debug, Clone)]
pub struct SelfSignedRequest {
    /// Subject (and issuer) of the certificate.
    pub subject: Subject,
    /// Validity in days.
    pub validity_days: u32,
    /// Where the private key goes.
    pub key_out: PathBuf,
    /// Where the certificate goes.
    pub cert_out: PathBuf,
}

/// Generate a key and a certificate signing request.
#[derive(Debug, Clone)]
pub struct CsrRequest {
    /// Requested subject.
    pub subject: Subject,
    /// Extensions to request.
    pub profile: CertProfile,
    /// Where the private key goes.
    pub key_out: PathBuf,
    /// Where the CSR goes.
    pub csr_out: PathBuf,
}

/// Sign a CSR with an issuer key and certificate.
#[derive(Debug, Clone)]
pub struct SignRequest {
    /// The CSR to sign.
    pub csr_in: PathBuf,
    /// Issuer certificate.
    pub issuer_cert: PathBuf,
    /// Issuer private key.
    pub issuer_key: PathBuf,
    /// Validity in days.
    pub validity_days: u32,
    /// Where the signed certificate goes.
    pub cert_out: PathBuf,
}

/// Capabilities the hierarchy needs from a signing backend.
pub trait SigningEngine {
    /// Signature algorithm identifier used for every operation.
    fn algorithm(&self) -> &str;

    /// Fail with `EngineUnavailable` if the engine cannot run at all.
    fn ensure_available(&self) -> Result<()>;

    /// Generate a key pair and a self-signed CA certificate.
    fn issue_self_signed(&self, request: &SelfSignedRequest) -> Result<()>;

    /// Generate a key pair and a CSR.
    fn generate_csr(&self, request: &CsrRequest) -> Result<()>;

    /// Sign a CSR, producing a certificate.
    fn sign_csr(&self, request: &SignRequest) -> Result<()>;

    /// Human-readable dump of a stored CSR or certificate. Read-only.
    fn decode(&self, object: ObjectType, path: &Path) -> Result<String>;
}
