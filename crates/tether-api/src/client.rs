// Hand-crafted async HTTP client for the tether companion service.
//
// Base URL: http://127.0.0.1:8009/ by default (the service only binds
// loopback). Auth: `Authorization: Bearer <token>`, resolved fresh from
// the TokenSource on every request.

use std::time::Duration;

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::token::TokenSource;
use crate::types::{
    Credentials, DisconnectResponse, ErrorBody, HealthInfo, SetDefaultResponse, VpnActionResponse,
    VpnDefaultInfo, VpnProfile, VpnStatus,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ── Raw response ─────────────────────────────────────────────────────

/// A successful (2xx) response before any body interpretation.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the companion service's REST API.
///
/// Every call resolves a bearer token first and fails with
/// [`Error::TokenUnavailable`] before touching the network when it
/// cannot. No endpoint is ever called unauthenticated.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: TokenSource,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client with the default request timeout.
    pub fn new(base_url: Url, tokens: TokenSource) -> Result<Self, Error> {
        Self::with_timeout(base_url, tokens, DEFAULT_TIMEOUT)
    }

    /// Build a client with an explicit request timeout.
    pub fn with_timeout(
        base_url: Url,
        tokens: TokenSource,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tether/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: normalize_base_url(base_url),
            tokens,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"vpn/status"`) onto the base URL.
    fn url(&self, path: &str) -> Url {
        // base_url always ends with `/`, so joining `vpn/…` works.
        self.base_url
            .join(path)
            .expect("path should be valid relative URL")
    }

    // ── Request core ─────────────────────────────────────────────────

    /// Issue an authenticated request and return the raw 2xx response.
    ///
    /// Non-2xx becomes [`Error::Http`], transport failure becomes
    /// [`Error::Network`]. Body interpretation is the caller's problem.
    pub async fn request<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<RawResponse, Error> {
        self.send(method, self.url(path), body).await
    }

    async fn send<B: Serialize + Sync>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<RawResponse, Error> {
        let token = self.tokens.get_token().await?;

        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token.expose())).map_err(
            |e| Error::TokenUnavailable {
                reason: format!("token is not a valid header value: {e}"),
            },
        )?;
        bearer.set_sensitive(true);

        debug!("{method} {url}");

        let mut req = self.http.request(method, url).header(AUTHORIZATION, bearer);
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if status.is_success() {
            Ok(RawResponse {
                status: status.as_u16(),
                body,
            })
        } else {
            Err(error_from_status(status, body))
        }
    }

    // ── Typed helpers ────────────────────────────────────────────────

    /// GET a scalar text response, normalized via [`normalize_scalar`].
    ///
    /// An empty body after normalization is [`Error::Parse`]: every text
    /// endpoint the companion exposes always answers with a value.
    pub async fn get_text(&self, path: &str) -> Result<String, Error> {
        let resp = self.request::<()>(Method::GET, path, None).await?;
        require_scalar(resp.body)
    }

    /// GET a scalar text response with query parameters.
    pub async fn get_text_with_params(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<String, Error> {
        let mut url = self.url(path);
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));

        let resp = self.send::<()>(Method::GET, url, None).await?;
        require_scalar(resp.body)
    }

    /// GET a JSON response, parsed as-is (no normalization).
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let resp = self.request::<()>(Method::GET, path, None).await?;
        parse_json(&resp.body)
    }

    /// POST a JSON body and parse the JSON response.
    pub async fn post_json<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let resp = self.request(Method::POST, path, Some(body)).await?;
        parse_json(&resp.body)
    }

    async fn post_bare<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let resp = self.request::<()>(Method::POST, path, None).await?;
        parse_json(&resp.body)
    }

    // ── Credentials ──────────────────────────────────────────────────

    /// Fetch short-lived login credentials for `context`.
    ///
    /// The companion answers `"Failed"` (a literal sentinel, not an
    /// HTTP error) when the privileged helper could not produce a pair;
    /// that becomes [`Error::OperationFailed`].
    pub async fn credentials(&self, context: &str, headless: bool) -> Result<Credentials, Error> {
        let params = [
            ("context", context.to_owned()),
            ("headless", headless.to_string()),
        ];
        let text = self.get_text_with_params("get_creds", &params).await?;

        if text == "Failed" {
            return Err(Error::OperationFailed {
                message: format!("companion could not produce credentials for {context:?}"),
            });
        }

        Credentials::parse(&text)
    }

    /// Fetch the associate email tied to the logged-in user.
    pub async fn associate_email(&self) -> Result<String, Error> {
        self.get_text("get_associate_email").await
    }

    // ── VPN ──────────────────────────────────────────────────────────

    pub async fn vpn_status(&self) -> Result<VpnStatus, Error> {
        self.get_json("vpn/status").await
    }

    pub async fn vpn_profiles(&self) -> Result<Vec<VpnProfile>, Error> {
        self.get_json("vpn/profiles").await
    }

    /// The configured default profile. Answers 404 ([`Error::Http`])
    /// when none is configured.
    pub async fn vpn_default(&self) -> Result<VpnDefaultInfo, Error> {
        self.get_json("vpn/default").await
    }

    pub async fn set_vpn_default(&self, profile_id: &str) -> Result<SetDefaultResponse, Error> {
        let body = serde_json::json!({ "profile_id": profile_id });
        let resp: SetDefaultResponse = self.post_json("vpn/default", &body).await?;
        ensure_success(resp.success, resp.message.as_deref(), "set default profile")?;
        Ok(resp)
    }

    pub async fn vpn_connect(&self, profile_id: &str) -> Result<VpnActionResponse, Error> {
        let resp: VpnActionResponse = self.post_bare(&format!("vpn/connect/{profile_id}")).await?;
        ensure_success(resp.success, resp.message.as_deref(), "vpn connect")?;
        Ok(resp)
    }

    /// Connect using the companion's configured default profile.
    pub async fn vpn_connect_default(&self) -> Result<VpnActionResponse, Error> {
        let resp: VpnActionResponse = self.post_bare("vpn/connect/default").await?;
        ensure_success(resp.success, resp.message.as_deref(), "vpn connect")?;
        Ok(resp)
    }

    /// Disconnect. Succeeds even when nothing was connected; check
    /// `was_connected` to tell the cases apart.
    pub async fn vpn_disconnect(&self) -> Result<DisconnectResponse, Error> {
        let resp: DisconnectResponse = self.post_bare("vpn/disconnect").await?;
        ensure_success(resp.success, resp.message.as_deref(), "vpn disconnect")?;
        Ok(resp)
    }

    // ── Service ──────────────────────────────────────────────────────

    pub async fn health(&self) -> Result<HealthInfo, Error> {
        self.get_json("health").await
    }
}

// ── Response handling ────────────────────────────────────────────────

fn normalize_base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Parse {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.to_owned(),
        }
    })
}

fn require_scalar(body: String) -> Result<String, Error> {
    let text = normalize_scalar(&body);
    if text.is_empty() {
        return Err(Error::Parse {
            message: "empty response body where text was required".to_owned(),
            body,
        });
    }
    Ok(text)
}

fn error_from_status(status: reqwest::StatusCode, raw: String) -> Error {
    // The companion wraps errors as `{"detail": "..."}`; fall back to
    // the raw body, then the canonical reason phrase.
    let body = match serde_json::from_str::<ErrorBody>(&raw) {
        Ok(err) => err.detail,
        Err(_) if raw.trim().is_empty() => status.to_string(),
        Err(_) => raw,
    };

    Error::Http {
        status: status.as_u16(),
        body,
    }
}

fn ensure_success(success: bool, message: Option<&str>, what: &str) -> Result<(), Error> {
    if success {
        return Ok(());
    }

    Err(Error::OperationFailed {
        message: message.map_or_else(|| format!("{what} failed"), ToOwned::to_owned),
    })
}

/// Strip the quote-and-whitespace wrapping the companion puts around
/// scalar text responses.
///
/// Runs to a fixpoint, so normalizing an already-normalized string is a
/// no-op and nested wrapping (`"\"value\"\n"`) still unwraps fully.
pub fn normalize_scalar(s: &str) -> String {
    let mut cur = s;
    loop {
        let next = cur.trim().trim_matches(['"', '\'']);
        if next == cur {
            return cur.to_owned();
        }
        cur = next;
    }
}
