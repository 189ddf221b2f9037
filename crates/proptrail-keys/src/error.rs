//! Error types for composite key operations.

use thiserror::Error;

/// Errors that can occur while encoding or splitting composite keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// An attribute cannot be placed in a composite key.
    #[error("invalid key attribute {attribute:?}: {reason}")]
    InvalidArgument { attribute: String, reason: String },

    /// A stored key does not follow the composite key layout.
    #[error("malformed composite key {key:?}: {reason}")]
    MalformedKey { key: String, reason: String },
}

/// Convenience type alias for key operations.
pub type KeyResult<T> = std::result::Result<T, KeyError>;
