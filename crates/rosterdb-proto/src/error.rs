//! Protocol error types.

use thiserror::Error;

/// Errors raised while converting IR values and projected rows.
#[derive(Debug, Error)]
pub enum Error {
    /// A value did not have the expected type.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// A projected row lacks a column the caller asked for.
    #[error("missing column: {0}")]
    MissingColumn(String),
}
