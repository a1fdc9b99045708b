use std::time::Duration;

use url::Url;

use tether_api::TokenSource;

/// Runtime settings for a [`SessionController`](crate::SessionController).
///
/// Defaults match the companion's own: loopback service on port 8009,
/// token cached by the privileged helper, 30s poll cadence, 2s settle
/// delay after mutating calls.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Companion service base URL.
    pub base_url: Url,
    /// Where bearer tokens come from.
    pub token_source: TokenSource,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Cadence of the background status poll.
    pub poll_interval: Duration,
    /// Wait between a connect/disconnect POST and the follow-up status
    /// refresh, because the companion applies changes asynchronously.
    pub settle_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token_source: TokenSource::cache_file(),
            request_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(30),
            settle_delay: Duration::from_millis(2000),
        }
    }
}

/// Default companion endpoint. The service only binds loopback.
pub fn default_base_url() -> Url {
    Url::parse("http://127.0.0.1:8009/").expect("default base URL should parse")
}
