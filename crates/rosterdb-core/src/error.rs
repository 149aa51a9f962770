//! Core error types.

use thiserror::Error;

/// Core errors.
///
/// The search layer never wraps or rewrites these: whatever a
/// [`QuerySource`](crate::query::QuerySource) returns reaches the caller as is.
#[derive(Debug, Error)]
pub enum Error {
    /// Storage layer error.
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    /// Protocol error.
    #[error("protocol error: {0}")]
    Protocol(#[from] rosterdb_proto::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Key decoding error.
    #[error("invalid key format")]
    InvalidKey,

    /// Record not found.
    #[error("record not found")]
    NotFound,

    /// Invalid data format.
    #[error("invalid data: {0}")]
    InvalidData(String),
}
