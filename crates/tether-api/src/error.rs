use thiserror::Error;

/// Top-level error type for the `tether-api` crate.
///
/// Covers every failure mode of a companion-service call: token
/// acquisition, transport, HTTP status, body parsing, and failures the
/// companion reports inside an otherwise-valid response. `tether-core`
/// maps these into its own boundary error kind.
#[derive(Debug, Error)]
pub enum Error {
    // ── Token ───────────────────────────────────────────────────────
    /// The bearer token could not be obtained. No network call was made.
    #[error("auth token unavailable: {reason}")]
    TokenUnavailable { reason: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    // ── Protocol ────────────────────────────────────────────────────
    /// The companion answered with a non-2xx status.
    #[error("companion returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body did not parse as expected (bad JSON, or an
    /// empty body where a text scalar was required).
    #[error("unexpected response: {message}")]
    Parse { message: String, body: String },

    // ── Companion-reported ──────────────────────────────────────────
    /// The companion accepted the request but reported the operation
    /// itself failed (`success: false`, or the legacy `Failed` sentinel).
    #[error("operation failed: {message}")]
    OperationFailed { message: String },
}

impl Error {
    /// Returns `true` if this is a transient transport error worth
    /// letting the next poll cycle retry.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Returns `true` if the companion rejected our bearer token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Http { status: 401, .. })
    }

    /// Returns `true` if this is a "not found" response.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Http { status: 404, .. })
    }

    /// The HTTP status code, if this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
