//! Parse errors for the todo.txt dialect

use thiserror::Error;

/// A line, token or clause that does not follow the task format.
///
/// Parsing stops at the first error; no partial task is produced.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("Invalid date: expected 'YYYY-MM-DD', got '{0}'")]
    Date(String),

    #[error("Invalid priority: expected '(A)' through '(Z)', got '{0}'")]
    Priority(String),

    #[error("Invalid recurrence clause '{clause}': {reason}")]
    Recurrence { clause: String, reason: String },

    #[error("Invalid value for tag '{key}:{value}': {reason}")]
    Tag {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Task text may not contain line breaks")]
    Newline,
}

impl FormatError {
    pub(crate) fn recurrence(clause: &str, reason: impl Into<String>) -> Self {
        FormatError::Recurrence {
            clause: clause.to_string(),
            reason: reason.into(),
        }
    }
}
