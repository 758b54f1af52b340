//! Error types for Riak operations.

use std::fmt;
use std::io;
use std::sync::Arc;
use thiserror::Error;

/// The main error type for Riak operations.
///
/// This enum covers both client-side errors (validation, connection,
/// protocol) and server-side errors returned via an error response frame.
/// Every façade operation returns `Result<T>`; there are no alternative
/// failure channels.
#[derive(Debug, Error, Clone)]
pub enum RiakError {
    /// Caller-supplied input failed pre-flight checks. Never hits the wire.
    #[error("validation error: {0}")]
    Validation(String),

    /// Socket-level failure, frame decode failure, or an unexpected
    /// disconnect. The connection that produced it is discarded.
    #[error("communication error: {0}")]
    Communication(String),

    /// I/O errors from the standard library (wrapped in `Arc` for `Clone`).
    #[error("I/O error: {0}")]
    Io(Arc<io::Error>),

    /// The cluster has no eligible node: all nodes are cooling down,
    /// drained, or their pools are exhausted.
    #[error("no eligible cluster nodes available")]
    NoConnections,

    /// The cluster dispatcher has been disposed.
    #[error("client is shutting down")]
    ShuttingDown,

    /// The server reported no such object, or a get response arrived
    /// without a causal vector.
    #[error("Unable to find value in Riak")]
    NotFound,

    /// HTTP status mismatch or a semantic protocol violation (wrong
    /// message code, missing required field).
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The server replied with an error response frame. The carried
    /// message is the server's own text.
    #[error("server error ({code}): {message}")]
    Remote {
        /// The numeric error code from the error response.
        code: u32,
        /// The error message from the server.
        message: String,
    },
}

impl From<io::Error> for RiakError {
    fn from(err: io::Error) -> Self {
        RiakError::Io(Arc::new(err))
    }
}

impl From<prost::DecodeError> for RiakError {
    fn from(err: prost::DecodeError) -> Self {
        RiakError::Communication(format!("failed to decode message body: {}", err))
    }
}

impl RiakError {
    /// Returns `true` if this error is retryable.
    ///
    /// Retryable errors are transient failures where repeating the
    /// operation on another node may succeed. Server errors, validation
    /// failures, and not-found results are never retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Communication(_) | Self::Io(_) | Self::NoConnections
        )
    }

    /// Returns `true` if this error permits the dispatcher to mark the
    /// node that produced it as offline for the cool-down window.
    pub fn marks_node_offline(&self) -> bool {
        matches!(self, Self::Communication(_) | Self::Io(_))
    }

    /// Returns the error kind for structured handling.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Communication(_) | Self::Io(_) => ErrorKind::Communication,
            Self::NoConnections => ErrorKind::NoConnections,
            Self::ShuttingDown => ErrorKind::ShuttingDown,
            Self::NotFound => ErrorKind::NotFound,
            Self::InvalidResponse(_) => ErrorKind::InvalidResponse,
            Self::Remote { .. } => ErrorKind::Remote,
        }
    }

    /// Returns the server error code if this is a remote error.
    pub fn remote_code(&self) -> Option<u32> {
        match self {
            Self::Remote { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Classification of error kinds, uniform across all operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller input rejected before touching the wire.
    Validation,
    /// Socket or frame-level failure.
    Communication,
    /// No eligible node in the cluster.
    NoConnections,
    /// The client is disposed.
    ShuttingDown,
    /// The object does not exist.
    NotFound,
    /// Protocol or HTTP status violation.
    InvalidResponse,
    /// Server-reported error.
    Remote,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "VALIDATION"),
            Self::Communication => write!(f, "COMMUNICATION"),
            Self::NoConnections => write!(f, "NO_CONNECTIONS"),
            Self::ShuttingDown => write!(f, "SHUTTING_DOWN"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::InvalidResponse => write!(f, "INVALID_RESPONSE"),
            Self::Remote => write!(f, "REMOTE"),
        }
    }
}

/// A specialized `Result` type for Riak operations.
pub type Result<T> = std::result::Result<T, RiakError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = RiakError::Validation("bucket cannot be empty".to_string());
        assert_eq!(err.to_string(), "validation error: bucket cannot be empty");
    }

    #[test]
    fn test_communication_error_display() {
        let err = RiakError::Communication("connection reset".to_string());
        assert_eq!(err.to_string(), "communication error: connection reset");
    }

    #[test]
    fn test_not_found_display() {
        assert_eq!(RiakError::NotFound.to_string(), "Unable to find value in Riak");
    }

    #[test]
    fn test_remote_error_display() {
        let err = RiakError::Remote {
            code: 1,
            message: "overload".to_string(),
        };
        assert_eq!(err.to_string(), "server error (1): overload");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused");
        let err: RiakError = io_err.into();
        assert!(matches!(err, RiakError::Io(_)));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_retryable_errors() {
        assert!(RiakError::Communication("test".into()).is_retryable());
        assert!(RiakError::NoConnections.is_retryable());
        assert!(RiakError::from(io::Error::new(io::ErrorKind::BrokenPipe, "pipe")).is_retryable());

        assert!(!RiakError::Validation("test".into()).is_retryable());
        assert!(!RiakError::NotFound.is_retryable());
        assert!(!RiakError::ShuttingDown.is_retryable());
        assert!(!RiakError::InvalidResponse("test".into()).is_retryable());
        assert!(!RiakError::Remote { code: 0, message: "server".into() }.is_retryable());
    }

    #[test]
    fn test_marks_node_offline() {
        assert!(RiakError::Communication("test".into()).marks_node_offline());
        assert!(RiakError::from(io::Error::new(io::ErrorKind::TimedOut, "t")).marks_node_offline());

        assert!(!RiakError::NoConnections.marks_node_offline());
        assert!(!RiakError::NotFound.marks_node_offline());
        assert!(!RiakError::Remote { code: 0, message: "server".into() }.marks_node_offline());
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(RiakError::Validation("v".into()).kind(), ErrorKind::Validation);
        assert_eq!(RiakError::Communication("c".into()).kind(), ErrorKind::Communication);
        assert_eq!(
            RiakError::from(io::Error::new(io::ErrorKind::Other, "io")).kind(),
            ErrorKind::Communication
        );
        assert_eq!(RiakError::NoConnections.kind(), ErrorKind::NoConnections);
        assert_eq!(RiakError::ShuttingDown.kind(), ErrorKind::ShuttingDown);
        assert_eq!(RiakError::NotFound.kind(), ErrorKind::NotFound);
        assert_eq!(RiakError::InvalidResponse("i".into()).kind(), ErrorKind::InvalidResponse);
        assert_eq!(
            RiakError::Remote { code: 1, message: "r".into() }.kind(),
            ErrorKind::Remote
        );
    }

    #[test]
    fn test_remote_code() {
        let err = RiakError::Remote { code: 7, message: "x".into() };
        assert_eq!(err.remote_code(), Some(7));
        assert_eq!(RiakError::NotFound.remote_code(), None);
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RiakError>();
    }

    #[test]
    fn test_error_is_clone() {
        let err = RiakError::Io(Arc::new(io::Error::new(io::ErrorKind::NotFound, "gone")));
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<u8> {
            Ok(1)
        }
        assert!(returns_ok().is_ok());
    }
}
