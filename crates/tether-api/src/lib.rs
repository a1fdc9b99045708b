//! Async HTTP client for the tether companion service.
//!
//! The companion exposes a small REST surface on loopback; every request
//! carries a bearer token freshly read from a [`TokenSource`]. This crate
//! owns the wire layer only:
//!
//! - [`ApiClient`] — thin `reqwest` wrapper with token injection, typed
//!   endpoint methods, and uniform error mapping.
//! - [`TokenSource`] / [`AuthToken`] — where the bearer token comes from
//!   and how it is kept out of logs.
//! - [`types`] — serde representations of the companion's JSON bodies.
//!
//! State reconciliation, coalescing, and polling live upstream in
//! `tether-core`.

pub mod client;
pub mod error;
pub mod token;
pub mod types;

pub use client::{ApiClient, RawResponse, normalize_scalar};
pub use error::Error;
pub use token::{AuthToken, TokenSource, default_token_path};
