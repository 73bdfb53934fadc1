//! Error types for document store operations.

use std::fmt;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Canonical status codes reported by the document store client.
///
/// The code attached to a client fault is never rewritten by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The operation was cancelled.
    Cancelled,
    /// Unknown error.
    Unknown,
    /// The caller supplied an invalid argument, such as a malformed query.
    InvalidArgument,
    /// The deadline expired before the operation could complete.
    DeadlineExceeded,
    /// A requested document was not found.
    NotFound,
    /// The document the caller tried to create already exists.
    AlreadyExists,
    /// The caller lacks permission for the operation.
    PermissionDenied,
    /// A quota or resource limit was exhausted.
    ResourceExhausted,
    /// The system is not in a state required for the operation.
    FailedPrecondition,
    /// The operation was aborted, typically by a transaction conflict.
    Aborted,
    /// The operation was attempted past the valid range.
    OutOfRange,
    /// The operation is not implemented by the client.
    Unimplemented,
    /// Internal client error.
    Internal,
    /// The service is currently unavailable.
    Unavailable,
    /// Unrecoverable data loss or corruption.
    DataLoss,
    /// The request lacks valid authentication credentials.
    Unauthenticated,
}

impl ErrorCode {
    /// Returns the wire name of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Cancelled => "cancelled",
            ErrorCode::Unknown => "unknown",
            ErrorCode::InvalidArgument => "invalid-argument",
            ErrorCode::DeadlineExceeded => "deadline-exceeded",
            ErrorCode::NotFound => "not-found",
            ErrorCode::AlreadyExists => "already-exists",
            ErrorCode::PermissionDenied => "permission-denied",
            ErrorCode::ResourceExhausted => "resource-exhausted",
            ErrorCode::FailedPrecondition => "failed-precondition",
            ErrorCode::Aborted => "aborted",
            ErrorCode::OutOfRange => "out-of-range",
            ErrorCode::Unimplemented => "unimplemented",
            ErrorCode::Internal => "internal",
            ErrorCode::Unavailable => "unavailable",
            ErrorCode::DataLoss => "data-loss",
            ErrorCode::Unauthenticated => "unauthenticated",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can be carried by an [`Outcome::Error`](crate::Outcome::Error).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Fault raised by the document store client.
    #[error("{code}: {message}")]
    Client {
        /// Status code reported by the client.
        code: ErrorCode,
        /// Error message.
        message: String,
    },

    /// A typed fetch found no document.
    #[error("document not found: {path}")]
    DocumentNotFound {
        /// Path of the missing document.
        path: String,
    },

    /// The retry driver ran out of attempts without recording a cause.
    #[error("transaction failed after {attempts} attempts")]
    TransactionExhausted {
        /// Number of attempts configured.
        attempts: u32,
    },

    /// A document could not be converted to or from its typed form.
    #[error("mapping error: {message}")]
    Mapping {
        /// Error message.
        message: String,
    },
}

impl StoreError {
    /// Creates a client fault with the given code.
    pub fn client(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Client {
            code,
            message: message.into(),
        }
    }

    /// Creates an aborted client fault.
    pub fn aborted(message: impl Into<String>) -> Self {
        Self::client(ErrorCode::Aborted, message)
    }

    /// Creates a not-found client fault.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::client(ErrorCode::NotFound, message)
    }

    /// Creates an invalid-argument client fault.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::client(ErrorCode::InvalidArgument, message)
    }

    /// Creates an unavailable client fault.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::client(ErrorCode::Unavailable, message)
    }

    /// Creates a mapping error.
    pub fn mapping(message: impl Into<String>) -> Self {
        Self::Mapping {
            message: message.into(),
        }
    }

    /// Returns the client status code, if this is a client fault.
    ///
    /// Synthetic errors map onto the closest code: a missing typed document
    /// reports `NotFound`, an exhausted transaction reports `Aborted`.
    pub fn code(&self) -> ErrorCode {
        match self {
            StoreError::Client { code, .. } => *code,
            StoreError::DocumentNotFound { .. } => ErrorCode::NotFound,
            StoreError::TransactionExhausted { .. } => ErrorCode::Aborted,
            StoreError::Mapping { .. } => ErrorCode::InvalidArgument,
        }
    }

    /// Returns true if the fault is transient and the operation may succeed
    /// when repeated.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Client { code, .. } => matches!(
                code,
                ErrorCode::Aborted
                    | ErrorCode::Unavailable
                    | ErrorCode::DeadlineExceeded
                    | ErrorCode::ResourceExhausted
            ),
            StoreError::TransactionExhausted { .. } => true,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::mapping(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(StoreError::aborted("contention").is_retryable());
        assert!(StoreError::unavailable("offline").is_retryable());
        assert!(!StoreError::not_found("missing").is_retryable());
        assert!(!StoreError::mapping("bad field").is_retryable());
        assert!(!StoreError::DocumentNotFound {
            path: "users/alice".into()
        }
        .is_retryable());
    }

    #[test]
    fn error_display() {
        let err = StoreError::client(ErrorCode::PermissionDenied, "rules rejected write");
        assert_eq!(err.to_string(), "permission-denied: rules rejected write");

        let err = StoreError::TransactionExhausted { attempts: 5 };
        assert_eq!(err.to_string(), "transaction failed after 5 attempts");
    }

    #[test]
    fn synthetic_codes() {
        let missing = StoreError::DocumentNotFound {
            path: "users/bob".into(),
        };
        assert_eq!(missing.code(), ErrorCode::NotFound);
        assert_eq!(
            StoreError::TransactionExhausted { attempts: 1 }.code(),
            ErrorCode::Aborted
        );
    }

    #[test]
    fn serde_errors_become_mapping_errors() {
        let err: StoreError = serde_json::from_str::<u32>("\"nope\"").unwrap_err().into();
        assert!(matches!(err, StoreError::Mapping { .. }));
    }
}
