use serde::Serialize;
use thiserror::Error;

use tether_api::Error as ApiError;

/// Boundary error for session operations.
///
/// `tether_api::Error` is flattened into plain data here so a failure
/// can live inside a [`SessionSnapshot`](crate::SessionSnapshot):
/// cloneable, comparable, serializable, with the transport cause
/// reduced to its message. Nothing escapes a controller operation as
/// any other type.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ErrorKind {
    /// No bearer token could be obtained; no request was made.
    #[error("auth token unavailable: {reason}")]
    TokenUnavailable { reason: String },

    /// Transport-level failure (connection refused, DNS, timeout).
    #[error("network error: {cause}")]
    Network { cause: String },

    /// The companion answered with a non-2xx status.
    #[error("companion returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("unexpected response: {message}")]
    Parse { message: String },

    /// The companion reported the operation itself failed.
    #[error("operation failed: {message}")]
    OperationFailed { message: String },
}

impl ErrorKind {
    /// Returns `true` if the companion rejected our bearer token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Http { status: 401, .. })
    }

    /// Returns `true` if this is a "not found" response.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Http { status: 404, .. })
    }

    /// Returns `true` if a bearer token could not be obtained at all.
    pub fn is_token_unavailable(&self) -> bool {
        matches!(self, Self::TokenUnavailable { .. })
    }
}

impl From<ApiError> for ErrorKind {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::TokenUnavailable { reason } => Self::TokenUnavailable { reason },
            ApiError::Network(e) => Self::Network {
                cause: e.to_string(),
            },
            ApiError::Http { status, body } => Self::Http { status, body },
            ApiError::Parse { message, .. } => Self::Parse { message },
            ApiError::OperationFailed { message } => Self::OperationFailed { message },
        }
    }
}
