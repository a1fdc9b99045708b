//! Wire types for the companion service's REST API.
//!
//! Field shapes follow the companion's JSON responses. Everything the
//! service may omit is an `Option`; unknown fields are ignored so the
//! client keeps working when the service grows new ones.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::Error;

// ── VPN ──

/// Current VPN connection state as reported by `GET /vpn/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VpnStatus {
    pub connected: bool,
    #[serde(default)]
    pub profile_name: Option<String>,
    #[serde(default)]
    pub profile_id: Option<String>,
    /// Backend-specific detail blob; passed through untouched.
    #[serde(default)]
    pub connection_details: Option<serde_json::Value>,
}

/// One configured VPN profile from `GET /vpn/profiles`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VpnProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub remote: Option<String>,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

/// The configured default profile from `GET /vpn/default`.
///
/// The endpoint answers 404 when no default is configured, so this type
/// only ever describes an existing selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VpnDefaultInfo {
    pub uuid: String,
    #[serde(default)]
    pub profile_id: Option<String>,
    #[serde(default)]
    pub profile_name: Option<String>,
    /// Where the selection came from, e.g. `"gui_config"` or `"env"`.
    #[serde(default)]
    pub source: Option<String>,
}

/// Response to `POST /vpn/default`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetDefaultResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub profile_name: Option<String>,
}

/// Response to `POST /vpn/connect/{id}` and `POST /vpn/connect/default`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VpnActionResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub profile_id: Option<String>,
    #[serde(default)]
    pub profile_name: Option<String>,
    #[serde(default)]
    pub uuid: Option<String>,
}

/// Response to `POST /vpn/disconnect`.
///
/// The companion treats disconnecting while already disconnected as
/// success; `was_connected` says which case it was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisconnectResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub was_connected: Option<bool>,
}

// ── Credentials ──

/// A username/password pair from `GET /get_creds`.
///
/// The password is held as a [`SecretString`] and never appears in
/// `Debug` output. Parse failures deliberately omit the offending text
/// from the error, since it may contain the secret itself.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    /// Parse the companion's `username,password` plain-text form.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let (username, password) = text.split_once(',').ok_or_else(|| Error::Parse {
            message: "credentials were not in username,password form".to_owned(),
            body: String::new(),
        })?;

        Ok(Self {
            username: username.to_owned(),
            password: SecretString::from(password.to_owned()),
        })
    }

    /// The raw `username,password` form. Never log or persist this.
    pub fn expose_pair(&self) -> String {
        format!("{},{}", self.username, self.password.expose_secret())
    }
}

// ── Service ──

/// Response to `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthInfo {
    pub status: String,
    pub service: String,
    pub version: String,
}

// ── Errors ──

/// The companion's structured error body, `{"detail": "..."}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}
