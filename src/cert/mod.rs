//! Certificate hierarchy operations.
//!
//! This module provides the workflows of the three-tier hierarchy: root CA,
//! intermediate CAs signed by the root, and client certificates signed by an
//! intermediate, plus chain assembly and read-only inspection.

pub mod ca;
pub mod chain;
pub mod client;
pub mod inspect;
pub mod intermediate;
pub mod issue;
pub mod subject;
