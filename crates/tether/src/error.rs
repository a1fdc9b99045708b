//! CLI error types with miette diagnostics.
//!
//! Maps `ErrorKind` variants into user-facing errors with actionable
//! help text.

use miette::Diagnostic;
use thiserror::Error;

use tether_config::ConfigError;
use tether_core::ErrorKind;

/// Process exit codes.
#[allow(dead_code)]
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Token / auth ─────────────────────────────────────────────────

    #[error("No auth token available: {reason}")]
    #[diagnostic(
        code(tether::token_unavailable),
        help(
            "The companion helper writes the token on login.\n\
             Check that the tether service is running, or point --token-file\n\
             at the token cache."
        )
    )]
    TokenUnavailable { reason: String },

    #[error("The companion rejected the auth token")]
    #[diagnostic(
        code(tether::auth_rejected),
        help(
            "The cached token is stale or was issued by another service\n\
             instance. Restart the tether service to re-issue it."
        )
    )]
    AuthRejected,

    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the companion service: {cause}")]
    #[diagnostic(
        code(tether::connection_failed),
        help(
            "Check that the tether service is running on 127.0.0.1:8009.\n\
             Try: tether health"
        )
    )]
    ConnectionFailed { cause: String },

    #[error("The companion timed out handling the request")]
    #[diagnostic(
        code(tether::timeout),
        help("Increase the timeout with --timeout or check the service logs.")
    )]
    Timeout,

    // ── API ──────────────────────────────────────────────────────────

    #[error("Not found: {what}")]
    #[diagnostic(
        code(tether::not_found),
        help("Run: tether profiles to see what the companion knows about.")
    )]
    NotFound { what: String },

    #[error("Companion returned HTTP {status}: {body}")]
    #[diagnostic(code(tether::api_error))]
    Api { status: u16, body: String },

    #[error("Unexpected response from the companion: {message}")]
    #[diagnostic(
        code(tether::bad_response),
        help("The service may be a different version than this CLI expects.")
    )]
    BadResponse { message: String },

    #[error("{message}")]
    #[diagnostic(code(tether::operation_failed))]
    OperationFailed { message: String },

    // ── Validation / configuration ───────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(tether::validation))]
    Validation { field: String, reason: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(tether::config))]
    Config { message: String },

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::TokenUnavailable { .. } | Self::AuthRejected => exit_code::AUTH,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ErrorKind → CliError mapping ─────────────────────────────────────

impl From<ErrorKind> for CliError {
    fn from(err: ErrorKind) -> Self {
        match err {
            ErrorKind::TokenUnavailable { reason } => Self::TokenUnavailable { reason },

            ErrorKind::Network { cause } => Self::ConnectionFailed { cause },

            ErrorKind::Http { status: 401, .. } => Self::AuthRejected,

            ErrorKind::Http { status: 404, body } => Self::NotFound { what: body },

            ErrorKind::Http {
                status: 408 | 504, ..
            } => Self::Timeout,

            ErrorKind::Http { status, body } => Self::Api { status, body },

            ErrorKind::Parse { message } => Self::BadResponse { message },

            ErrorKind::OperationFailed { message } => Self::OperationFailed { message },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        let message = err.to_string();
        if let ConfigError::Validation { field, reason } = err {
            Self::Validation { field, reason }
        } else {
            Self::Config { message }
        }
    }
}
