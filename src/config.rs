//! Process-wide settings.
//!
//! Everything here is fixed when the process starts; the store itself is
//! the only persisted state.

use serde::{Deserialize, Serialize};

/// Default validity of a root CA, in days.
pub const DEFAULT_ROOT_VALIDITY_DAYS: u32 = 3650;

/// Default validity of an intermediate CA, in days.
pub const DEFAULT_INTERMEDIATE_VALIDITY_DAYS: u32 = 1825;

/// Default validity of a client certificate, in days.
pub const DEFAULT_CLIENT_VALIDITY_DAYS: u32 = 365;

/// Default signature algorithm identifier (ML-DSA-65 in the OQS provider).
pub const DEFAULT_ALGORITHM: &str = "mldsa65";

/// Default container image carrying an OQS-enabled OpenSSL.
pub const DEFAULT_IMAGE: &str = "openquantumsafe/oqs-ossl3:latest";

/// How the OpenSSL engine is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Inside a throwaway container with the store mounted at `/work`.
    Container,
    /// Directly on the host, with the store as working directory.
    Local,
}

/// Signing engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Execution mode.
    pub kind: EngineKind,
    /// Container runtime program (`docker`, `podman`).
    pub runtime: String,
    /// Container image reference.
    pub image: String,
    /// OpenSSL program name, inside the container or on the host.
    pub openssl: String,
    /// Signature algorithm used for every key and signature.
    pub algorithm: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kind: EngineKind::Container,
            runtime: "docker".to_string(),
            image: DEFAULT_IMAGE.to_string(),
            openssl: "openssl".to_string(),
            algorithm: DEFAULT_ALGORITHM.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.kind, EngineKind::Container);
        assert_eq!(config.runtime, "docker");
        assert_eq!(config.algorithm, "mldsa65");
    }

    #[test]
    fn test_config_serialization() {
        let config = EngineConfig {
            kind: EngineKind::Local,
            ..EngineConfig::default()
        };

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"kind\":\"local\""));

        let deserialized: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
