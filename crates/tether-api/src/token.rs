// ── Bearer token acquisition ──
//
// The companion's helper caches a bearer token on disk; this module
// owns the contract of reading it. No caching happens here: every call
// performs a fresh read, so a rotated token is picked up on the next
// request without any refresh protocol.

use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// An opaque bearer token for the companion service.
///
/// Wraps [`SecretString`] so `Debug` output is redacted. The raw value
/// is only reachable through [`expose`](Self::expose), which the client
/// uses to build the `Authorization` header and nothing else.
#[derive(Debug, Clone)]
pub struct AuthToken(SecretString);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The raw token value. Never log or persist this.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

/// Where the bearer token comes from.
///
/// Each variant carries what its acquisition path needs. Reads are
/// cheap and idempotent, so concurrent callers may each perform one --
/// request-level deduplication is the coalescer's job, not this one's.
#[derive(Debug, Clone)]
pub enum TokenSource {
    /// Token cached on disk by the companion's privileged helper
    /// (default `~/.cache/tether/auth_token`). Trailing whitespace is
    /// trimmed; a missing, unreadable, or empty file is
    /// [`Error::TokenUnavailable`].
    File { path: PathBuf },

    /// A fixed token, for tests and scripting.
    Static { token: SecretString },
}

impl TokenSource {
    /// Source reading the companion's default token cache location.
    pub fn cache_file() -> Self {
        Self::File {
            path: default_token_path(),
        }
    }

    /// Fixed-token source.
    pub fn fixed(token: impl Into<String>) -> Self {
        Self::Static {
            token: SecretString::from(token.into()),
        }
    }

    /// Obtain the current bearer token.
    ///
    /// Fails with [`Error::TokenUnavailable`] when the source cannot
    /// produce one. No side effects beyond the read.
    pub async fn get_token(&self) -> Result<AuthToken, Error> {
        match self {
            Self::File { path } => {
                let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
                    Error::TokenUnavailable {
                        reason: format!("{}: {e}", path.display()),
                    }
                })?;

                let token = raw.trim();
                if token.is_empty() {
                    return Err(Error::TokenUnavailable {
                        reason: format!("{}: token file is empty", path.display()),
                    });
                }

                Ok(AuthToken::new(token))
            }
            Self::Static { token } => Ok(AuthToken(token.clone())),
        }
    }
}

/// Default token cache path: `$XDG_CACHE_HOME/tether/auth_token`,
/// falling back to `~/.cache/tether/auth_token`.
pub fn default_token_path() -> PathBuf {
    let base = std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("tether").join("auth_token")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_source_trims_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth_token");
        std::fs::write(&path, "sekrit-token\n").unwrap();

        let token = TokenSource::File { path }.get_token().await.unwrap();
        assert_eq!(token.expose(), "sekrit-token");
    }

    #[tokio::test]
    async fn missing_file_is_token_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist");

        let err = TokenSource::File { path }.get_token().await.unwrap_err();
        assert!(matches!(err, Error::TokenUnavailable { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn empty_file_is_token_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth_token");
        std::fs::write(&path, "  \n").unwrap();

        let err = TokenSource::File { path }.get_token().await.unwrap_err();
        assert!(matches!(err, Error::TokenUnavailable { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn static_source_returns_fixed_token() {
        let token = TokenSource::fixed("abc").get_token().await.unwrap();
        assert_eq!(token.expose(), "abc");
    }

    #[test]
    fn debug_output_is_redacted() {
        let token = AuthToken::new("super-secret");
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("super-secret"), "leaked: {rendered}");
    }
}
