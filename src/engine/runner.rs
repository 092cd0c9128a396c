//! Subprocess execution of the OpenSSL engine.
//!
//! In container mode every call is a fresh `<runtime> run --rm` with the
//! store bind-mounted at [`CONTAINER_WORKDIR`]; in local mode OpenSSL runs on
//! the host with the store as its working directory. Either way the
//! store-relative paths in requests resolve to the same files.

use crate::config::{EngineConfig, EngineKind};
use crate::engine::openssl::{csr_args, decode_args, self_signed_args, sign_args};
use crate::engine::{CsrRequest, SelfSignedRequest, SignRequest, SigningEngine};
use crate::error::{PqPkiError, Result};
use crate::storage::ObjectType;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tracing::{debug, instrument, warn};

/// Mount point of the store inside the container.
pub const CONTAINER_WORKDIR: &str = "/work";

/// Signing engine backed by an OpenSSL binary with the OQS provider.
#[derive(Debug, Clone)]
pub struct OpensslEngine {
    config: EngineConfig,
    store_base: PathBuf,
}

impl OpensslEngine {
    /// Create an engine operating on the store at `store_base`.
    ///
    /// In container mode the base is canonicalized so the bind mount gets an
    /// absolute path.
    pub fn new(config: EngineConfig, store_base: &Path) -> Result<Self> {
        let store_base = match config.kind {
            EngineKind::Container => store_base.canonicalize()?,
            EngineKind::Local => store_base.to_path_buf(),
        };
        Ok(Self { config, store_base })
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Program and full argument vector for an OpenSSL invocation.
    pub fn command_line(&self, openssl_args: &[String]) -> (String, Vec<String>) {
        match self.config.kind {
            EngineKind::Container => {
                let mut args = vec![
                    "run".to_string(),
                    "--rm".to_string(),
                    "-v".to_string(),
                    format!("{}:{}", self.store_base.display(), CONTAINER_WORKDIR),
                    "-w".to_string(),
                    CONTAINER_WORKDIR.to_string(),
                    self.config.image.clone(),
                    self.config.openssl.clone(),
                ];
                args.extend_from_slice(openssl_args);
                (self.config.runtime.clone(), args)
            }
            EngineKind::Local => (self.config.openssl.clone(), openssl_args.to_vec()),
        }
    }

    /// Program and arguments of the availability check.
    ///
    /// In container mode the image is inspected, which needs a running
    /// daemon and the image present locally.
    pub fn availability_command(&self) -> (String, Vec<String>) {
        match self.config.kind {
            EngineKind::Container => (
                self.config.runtime.clone(),
                vec![
                    "image".to_string(),
                    "inspect".to_string(),
                    self.config.image.clone(),
                ],
            ),
            EngineKind::Local => (self.config.openssl.clone(), vec!["version".to_string()]),
        }
    }

    fn run(&self, mode: &str, openssl_args: Vec<String>) -> Result<String> {
        let (program, args) = self.command_line(&openssl_args);
        debug!(mode, %program, ?args, "invoking signing engine");

        let output = Command::new(&program)
            .args(&args)
            .current_dir(&self.store_base)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                PqPkiError::EngineUnavailable(format!("failed to spawn `{}`: {}", program, e))
            })?;

        check_status(mode, &output)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn check_status(mode: &str, output: &Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let code = output
        .status
        .code()
        .map_or_else(|| "signal".to_string(), |code| code.to_string());
    warn!(mode, %code, %stderr, "signing engine failed");

    Err(PqPkiError::EngineExecution(if stderr.is_empty() {
        format!("{} exited with status {}", mode, code)
    } else {
        format!("{} exited with status {}: {}", mode, code, stderr)
    }))
}

impl SigningEngine for OpensslEngine {
    fn algorithm(&self) -> &str {
        &self.config.algorithm
    }

    #[instrument(skip(self), fields(kind = ?self.config.kind))]
    fn ensure_available(&self) -> Result<()> {
        let (program, args) = self.availability_command();
        let shown = format!("{} {}", program, args.join(" "));

        let output = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| PqPkiError::EngineUnavailable(format!("`{}`: {}", shown, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(PqPkiError::EngineUnavailable(format!(
                "`{}` exited with {}: {}",
                shown, output.status, stderr
            )));
        }

        debug!(check = %shown, "signing engine available");
        Ok(())
    }

    #[instrument(skip(self, request), fields(cn = %request.subject.common_name))]
    fn issue_self_signed(&self, request: &SelfSignedRequest) -> Result<()> {
        self.run(
            "self-signed issue",
            self_signed_args(&self.config.algorithm, request),
        )
        .map(|_| ())
    }

    #[instrument(skip(self, request), fields(cn = %request.subject.common_name))]
    fn generate_csr(&self, request: &CsrRequest) -> Result<()> {
        self.run("CSR generation", csr_args(&self.config.algorithm, request))
            .map(|_| ())
    }

    #[instrument(skip(self, request), fields(csr = %request.csr_in.display()))]
    fn sign_csr(&self, request: &SignRequest) -> Result<()> {
        self.run("CSR signing", sign_args(request)).map(|_| ())
    }

    #[instrument(skip(self))]
    fn decode(&self, object: ObjectType, path: &Path) -> Result<String> {
        self.run("decode", decode_args(object, path))
    }
}
