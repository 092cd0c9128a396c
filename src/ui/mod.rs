//! Operator-facing interaction: prompts, numbered selection, and the menu.

pub mod menu;
pub mod prompt;
pub mod selector;
