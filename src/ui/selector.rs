//! Numbered selection of stored entities.
//!
//! Candidates are shown as a 1-based list in the order given (the store's
//! lexicographic listing order), and the operator's answer is validated
//! before anything else happens. A failed selection never touches the store.

use crate::error::{PqPkiError, Result};
use crate::storage::layout::{CertStore, EntityHandle, EntityKind};
use crate::ui::prompt::Prompt;
use tracing::debug;

/// Validate a 1-based answer against `count` candidates, returning the
/// 0-based index.
///
/// # Example
///
/// ```
/// use pqpki::ui::selector::parse_choice;
///
/// assert_eq!(parse_choice(" 2 ", 3).unwrap(), 1);
/// assert!(parse_choice("0", 3).is_err());
/// assert!(parse_choice("4", 3).is_err());
/// ```
pub fn parse_choice(input: &str, count: usize) -> Result<usize> {
    let input = input.trim();
    let choice: i64 = input
        .parse()
        .map_err(|_| PqPkiError::Selection(format!("'{}' is not a number", input)))?;

    if choice < 1 || choice as u64 > count as u64 {
        return Err(PqPkiError::Selection(format!(
            "{} is out of range 1-{}",
            choice, count
        )));
    }

    Ok((choice - 1) as usize)
}

/// Show `labels` as a numbered list and read one valid choice.
///
/// `what` names the candidates in messages ("intermediates"). An empty list
/// fails with `EmptyCandidateSet` without prompting.
pub fn select_index(prompt: &mut dyn Prompt, what: &str, labels: &[String]) -> Result<usize> {
    if labels.is_empty() {
        return Err(PqPkiError::EmptyCandidateSet(what.to_string()));
    }

    prompt.say(&format!("Available {}:", what))?;
    for (i, label) in labels.iter().enumerate() {
        prompt.say(&format!("  {}) {}", i + 1, label))?;
    }

    let answer = prompt.ask(&format!("Select [1-{}]: ", labels.len()))?;
    let index = parse_choice(&answer, labels.len())?;
    debug!(what, choice = %labels[index], "selected");
    Ok(index)
}

/// Let the operator pick one stored entity of `kind`.
pub fn choose(prompt: &mut dyn Prompt, store: &CertStore, kind: EntityKind) -> Result<EntityHandle> {
    let mut candidates = store.list(kind)?;
    let labels: Vec<String> = candidates
        .iter()
        .map(|h| h.display_name().to_string())
        .collect();

    let index = select_index(prompt, kind.plural(), &labels)?;
    Ok(candidates.swap_remove(index))
}
