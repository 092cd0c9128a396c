//! pqpki: a three-tier post-quantum certificate hierarchy manager.
//!
//! This library manages a root CA, intermediate CAs signed by the root, and
//! client certificates signed by an intermediate, all stored in a plain
//! directory tree. It never performs cryptography itself: keys, CSRs,
//! signatures and decoding are delegated to an external OpenSSL build with
//! post-quantum algorithms (run in a container or on the host).
//!
//! # Architecture
//!
//! - [`storage`] owns the directory layout, entity naming and staged writes.
//! - [`engine`] wraps the external signing engine behind a trait.
//! - [`cert`] composes the two into the hierarchy workflows.
//! - [`ui`] drives the workflows from an interactive menu.
//!
//! All operations return `Result` types; a failed workflow leaves the store
//! as it was.
//!
//! # Example
//!
//! ```rust,no_run
//! use pqpki::config::EngineConfig;
//! use pqpki::engine::{OpensslEngine, SigningEngine};
//! use pqpki::error::Result;
//! use pqpki::storage::CertStore;
//!
//! fn example() -> Result<()> {
//!     let store = CertStore::new("pki");
//!     store.ensure_layout()?;
//!
//!     let engine = OpensslEngine::new(EngineConfig::default(), store.base())?;
//!     engine.ensure_available()?;
//!
//!     for handle in store.list_intermediates()? {
//!         println!("{}", handle);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cert;
pub mod config;
pub mod engine;
pub mod error;
pub mod storage;
pub mod ui;

// Re-export commonly used types
pub use error::{PqPkiError, Result};
