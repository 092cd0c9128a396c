//! Certificate store module.
//!
//! This module owns the on-disk layout of the hierarchy, the naming of new
//! entity directories, per-entity metadata, and staged writes into the store.

pub mod layout;
pub mod listing;
pub mod metadata;
pub mod naming;
pub mod staging;

pub use layout::{CertStore, EntityHandle, EntityKind, ObjectType};
