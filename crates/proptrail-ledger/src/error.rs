use proptrail_keys::KeyError;
use proptrail_store::StoreError;

/// Errors produced by ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] KeyError),

    #[error("entity {entity_id:?} does not exist")]
    NotFound { entity_id: String },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            LedgerError::NotFound { .. } => ErrorKind::NotFound,
            LedgerError::Store(_) => ErrorKind::Store,
        }
    }
}

/// Coarse classification of a [`LedgerError`], stable across versions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    Store,
}

impl ErrorKind {
    /// Error code reported to callers of the ledger operations.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Store => "STORE_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_and_codes() {
        let not_found = LedgerError::NotFound {
            entity_id: "P1".into(),
        };
        assert_eq!(not_found.kind(), ErrorKind::NotFound);
        assert_eq!(not_found.kind().code(), "NOT_FOUND");
        assert_eq!(not_found.to_string(), "entity \"P1\" does not exist");

        let store = LedgerError::from(StoreError::Unavailable("down".into()));
        assert_eq!(store.kind().to_string(), "STORE_ERROR");

        let invalid = LedgerError::from(KeyError::InvalidArgument {
            attribute: String::new(),
            reason: "attribute must not be empty".into(),
        });
        assert_eq!(invalid.kind(), ErrorKind::InvalidArgument);
    }
}
