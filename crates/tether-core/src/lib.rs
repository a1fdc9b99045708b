//! Session state engine between `tether-api` and UI consumers.
//!
//! This crate owns the domain model and the reactive plumbing around the
//! companion service:
//!
//! - [`SessionController`] — central facade. Drives `tether-api` through
//!   the [`RequestCoalescer`], reconciles responses into one
//!   [`SessionSnapshot`], and publishes every completed mutation through
//!   a `tokio::sync::watch` channel.
//! - [`RequestCoalescer`] — single-flight deduplication keyed by request
//!   identity, so concurrent callers share one in-flight future.
//! - [`PollScheduler`] — cancellable periodic task that feeds the
//!   controller status refreshes.
//!
//! Downstream crates depend on this crate only; the wire types they need
//! are re-exported.

pub mod coalesce;
pub mod config;
pub mod error;
pub mod model;
pub mod poll;
pub mod session;

pub use coalesce::RequestCoalescer;
pub use config::{SessionConfig, default_base_url};
pub use error::ErrorKind;
pub use model::{ConnectionState, DefaultProfile, SessionSnapshot, VpnProfile};
pub use poll::PollScheduler;
pub use session::SessionController;

// Downstream-facing re-exports from the API layer.
pub use tether_api::types::{Credentials, DisconnectResponse, HealthInfo, VpnActionResponse};
pub use tether_api::{TokenSource, default_token_path};
