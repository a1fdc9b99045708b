//! Configuration for the tether CLI.
//!
//! TOML file + `TETHER_`-prefixed environment variables, merged over
//! built-in defaults, and translation to `tether_core::SessionConfig`.
//! The companion service owns all credentials; nothing secret lives in
//! this file beyond the optional token cache path.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tether_core::{SessionConfig, TokenSource, default_base_url};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config struct ──────────────────────────────────────────────

/// Top-level TOML configuration (`~/.config/tether/config.toml`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Companion service base URL.
    #[serde(default = "default_base_url_string")]
    pub base_url: String,

    /// Token cache file. `None` uses the companion helper's default
    /// location.
    pub token_file: Option<PathBuf>,

    /// Background status poll cadence, in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Settle delay after connect/disconnect, in milliseconds.
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,

    /// Per-request timeout, in seconds.
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Presentation defaults.
    #[serde(default)]
    pub defaults: Defaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url_string(),
            token_file: None,
            poll_interval_secs: default_poll_interval(),
            settle_delay_ms: default_settle_delay(),
            request_timeout_secs: default_timeout(),
            defaults: Defaults::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_base_url_string() -> String {
    default_base_url().to_string()
}
fn default_poll_interval() -> u64 {
    30
}
fn default_settle_delay() -> u64 {
    2000
}
fn default_timeout() -> u64 {
    30
}
fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "tether", "tether").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("tether");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path();

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("TETHER_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning built-in defaults if anything goes wrong.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Translation to core ─────────────────────────────────────────────

/// Build a `SessionConfig` from the loaded file config.
pub fn session_config(cfg: &Config) -> Result<SessionConfig, ConfigError> {
    let base_url: url::Url = cfg.base_url.parse().map_err(|_| ConfigError::Validation {
        field: "base_url".into(),
        reason: format!("invalid URL: {}", cfg.base_url),
    })?;

    if cfg.poll_interval_secs == 0 {
        return Err(ConfigError::Validation {
            field: "poll_interval_secs".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    let token_source = match &cfg.token_file {
        Some(path) => TokenSource::File { path: path.clone() },
        None => TokenSource::cache_file(),
    };

    Ok(SessionConfig {
        base_url,
        token_source,
        request_timeout: Duration::from_secs(cfg.request_timeout_secs),
        poll_interval: Duration::from_secs(cfg.poll_interval_secs),
        settle_delay: Duration::from_millis(cfg.settle_delay_ms),
    })
}
