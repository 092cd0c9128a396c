//! Directory naming for intermediates and clients.
//!
//! An identifier is the sanitized label followed by the creation time at
//! one-second granularity, e.g. `Issuing_CA_20261019_142501`.

use crate::error::{PqPkiError, Result};
use chrono::NaiveDateTime;

/// Timestamp suffix format.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Make a free-text label safe for use as a directory name.
///
/// Whitespace becomes `_`, then everything that is not ASCII alphanumeric or
/// `_` is dropped.
///
/// # Example
///
/// ```
/// use pqpki::storage::naming::sanitize_label;
///
/// assert_eq!(sanitize_label("Acme Issuing CA #2"), "Acme_Issuing_CA_2");
/// ```
pub fn sanitize_label(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Derive the directory identifier for a new entity.
///
/// Pure function of the label and the instant: two calls in the same second
/// with the same label yield the same identifier. Callers that need
/// uniqueness go through `CertStore::allocate_identifier`.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use pqpki::storage::naming::derive_identifier;
///
/// let at = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap().and_hms_opt(14, 25, 1).unwrap();
/// assert_eq!(derive_identifier("svc 1", at).unwrap(), "svc_1_20261019_142501");
/// ```
pub fn derive_identifier(label: &str, at: NaiveDateTime) -> Result<String> {
    let sanitized = sanitize_label(label.trim());
    if sanitized.is_empty() {
        return Err(PqPkiError::InvalidInput(format!(
            "label '{}' has no usable characters",
            label
        )));
    }

    Ok(format!("{}_{}", sanitized, at.format(TIMESTAMP_FORMAT)))
}

/// The current local wall-clock instant, the clock used for identifiers.
pub fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn instant() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap()
    }

    #[test]
    fn test_sanitize_replaces_whitespace() {
        assert_eq!(sanitize_label("my root\tca\nx"), "my_root_ca_x");
    }

    #[test]
    fn test_sanitize_strips_punctuation() {
        assert_eq!(sanitize_label("a/b\\c.d-e*f"), "abcdef");
        assert_eq!(sanitize_label("../../etc"), "etc");
    }

    #[test]
    fn test_sanitize_drops_non_ascii() {
        assert_eq!(sanitize_label("Zürich CA"), "Zrich_CA");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for input in ["", "plain", "with space", "we!rd  na/me", "  lead", "ünï cødé"] {
            let once = sanitize_label(input);
            assert_eq!(sanitize_label(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_derive_identifier_format() {
        let id = derive_identifier("svc1", instant()).unwrap();
        assert_eq!(id, "svc1_20260102_030405");
    }

    #[test]
    fn test_same_second_collides() {
        let a = derive_identifier("svc1", instant()).unwrap();
        let b = derive_identifier("svc1", instant()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_one_second_apart_differs() {
        let a = derive_identifier("svc1", instant()).unwrap();
        let b = derive_identifier("svc1", instant() + Duration::seconds(1)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_label_rejected() {
        let result = derive_identifier(" !!! ", instant());
        assert!(matches!(result, Err(PqPkiError::InvalidInput(_))));
    }

    #[test]
    fn test_label_is_trimmed() {
        let id = derive_identifier("  edge  ", instant()).unwrap();
        assert_eq!(id, "edge_20260102_030405");
    }
}
