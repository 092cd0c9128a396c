//! Subject and validity input.
//!
//! Operator answers are turned into a validated [`Subject`] and a validity
//! period before any engine call is made.

use crate::error::{PqPkiError, Result};
use serde::Serialize;

/// Distinguished name fields collected for every entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subject {
    /// Common name (CN); also the label used for directory naming.
    pub common_name: String,
    /// Organization (O); omitted from the DN when `None`.
    pub organization: Option<String>,
}

impl Subject {
    /// Build a subject from raw answers.
    ///
    /// The common name is required. An empty organization is treated as
    /// absent.
    ///
    /// # Example
    ///
    /// ```
    /// use pqpki::cert::subject::Subject;
    ///
    /// let subject = Subject::new(" svc1 ", "Acme").unwrap();
    /// assert_eq!(subject.common_name, "svc1");
    /// assert_eq!(subject.organization.as_deref(), Some("Acme"));
    /// ```
    pub fn new(common_name: &str, organization: &str) -> Result<Self> {
        let common_name = common_name.trim();
        if common_name.is_empty() {
            return Err(PqPkiError::InvalidInput(
                "common name cannot be empty".to_string(),
            ));
        }
        if common_name.chars().any(char::is_control) {
            return Err(PqPkiError::InvalidInput(
                "common name contains control characters".to_string(),
            ));
        }

        let organization = organization.trim();
        if organization.chars().any(char::is_control) {
            return Err(PqPkiError::InvalidInput(
                "organization contains control characters".to_string(),
            ));
        }

        Ok(Self {
            common_name: common_name.to_string(),
            organization: (!organization.is_empty()).then(|| organization.to_string()),
        })
    }
}

/// Parse a validity answer in days, falling back to `default` when blank.
pub fn parse_validity_days(input: &str, default: u32) -> Result<u32> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(default);
    }

    match input.parse::<u32>() {
        Ok(0) => Err(PqPkiError::InvalidInput(
            "validity must be at least one day".to_string(),
        )),
        Ok(days) => Ok(days),
        Err(_) => Err(PqPkiError::InvalidInput(format!(
            "validity '{}' is not a number of days",
            input
        ))),
    }
}
