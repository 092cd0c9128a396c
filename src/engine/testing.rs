//! In-process engine for unit tests.

use crate::engine::{CsrRequest, SelfSignedRequest, SignRequest, SigningEngine};
use crate::error::{PqPkiError, Result};
use crate::storage::ObjectType;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes deterministic PEM blocks instead of running OpenSSL.
pub struct FakeEngine {
    base: PathBuf,
    fail_on: Option<&'static str>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeEngine {
    pub fn new(base: &Path) -> Self {
        Self {
            base: base.to_path_buf(),
            fail_on: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Fail the named step ("self-signed", "csr", "sign", "decode") after
    /// writing its first output, like a fail-fast subprocess would.
    pub fn failing(base: &Path, step: &'static str) -> Self {
        Self {
            fail_on: Some(step),
            ..Self::new(base)
        }
    }

    fn put(&self, relative: &Path, tag: &str, body: String) -> Result<()> {
        let path = self.base.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, pem::encode(&pem::Pem::new(tag, body.into_bytes())))?;
        Ok(())
    }

    fn step(&self, name: &'static str) -> Result<()> {
        self.calls.borrow_mut().push(name.to_string());
        if self.fail_on == Some(name) {
            return Err(PqPkiError::EngineExecution(format!("{} failed", name)));
        }
        Ok(())
    }
}

impl SigningEngine for FakeEngine {
    fn algorithm(&self) -> &str {
        "fake-dsa"
    }

    fn ensure_available(&self) -> Result<()> {
        Ok(())
    }

    fn issue_self_signed(&self, request: &SelfSignedRequest) -> Result<()> {
        let cn = &request.subject.common_name;
        self.put(&request.key_out, "PRIVATE KEY", format!("key {}", cn))?;
        self.step("self-signed")?;
        self.put(&request.cert_out, "CERTIFICATE", format!("root {}", cn))
    }

    fn generate_csr(&self, request: &CsrRequest) -> Result<()> {
        let cn = &request.subject.common_name;
        self.put(&request.key_out, "PRIVATE KEY", format!("key {}", cn))?;
        self.step("csr")?;
        self.put(&request.csr_out, "CERTIFICATE REQUEST", format!("csr {}", cn))
    }

    fn sign_csr(&self, request: &SignRequest) -> Result<()> {
        for input in [&request.csr_in, &request.issuer_cert, &request.issuer_key] {
            if !self.base.join(input).is_file() {
                return Err(PqPkiError::EngineExecution(format!(
                    "cannot open {}",
                    input.display()
                )));
            }
        }
        self.step("sign")?;
        self.put(
            &request.cert_out,
            "CERTIFICATE",
            format!(
                "{} signed by {}",
                request.csr_in.display(),
                request.issuer_cert.display()
            ),
        )
    }

    fn decode(&self, _object: ObjectType, path: &Path) -> Result<String> {
        self.step("decode")?;
        let contents = fs::read_to_string(self.base.join(path))?;
        Ok(format!("decoded {}\n{}", path.display(), contents))
    }
}
