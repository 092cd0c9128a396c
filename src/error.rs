//! Error types for the pqpki library.
//!
//! This module defines all error types used throughout the library.
//! Every workflow failure is surfaced to the operator as one of these
//! variants; none are silently swallowed.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for pqpki operations.
///
/// Workflow errors (missing prerequisites, bad selections, engine failures,
/// missing chain inputs) abort the current operation and return control to
/// the menu. [`PqPkiError::EngineUnavailable`] is the only fatal variant.
#[derive(Error, Debug)]
pub enum PqPkiError {
    /// A hierarchy precondition does not hold (no root, no intermediate)
    #[error("Prerequisite missing: {0}")]
    PrerequisiteMissing(String),

    /// The operator's numeric choice was not a valid index
    #[error("Invalid selection: {0}")]
    Selection(String),

    /// There was nothing to choose from
    #[error("Nothing to select: no {0} found")]
    EmptyCandidateSet(String),

    /// The external signing engine failed
    #[error("Signing engine failed: {0}")]
    EngineExecution(String),

    /// The signing engine cannot be reached at all (at start-up or mid-session)
    #[error("Signing engine unavailable: {0}")]
    EngineUnavailable(String),

    /// A file needed to assemble a chain does not exist
    #[error("Missing chain component: {}", .0.display())]
    MissingComponent(PathBuf),

    /// Operator input could not be used (label, subject, validity, file name)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage I/O error
    #[error("Storage I/O error: {0}")]
    Storage(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PqPkiError {
    /// Whether the process should terminate instead of returning to the menu.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PqPkiError::EngineUnavailable(_))
    }
}

/// A specialized Result type for pqpki operations.
pub type Result<T> = std::result::Result<T, PqPkiError>;
