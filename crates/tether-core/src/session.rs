// Session controller: owns the observable snapshot and reconciles it
// against what the companion actually reports.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, warn};

use tether_api::ApiClient;
use tether_api::types::{Credentials, DisconnectResponse, HealthInfo, VpnActionResponse};

use crate::coalesce::RequestCoalescer;
use crate::config::SessionConfig;
use crate::error::ErrorKind;
use crate::model::{ConnectionState, DefaultProfile, SessionSnapshot, VpnProfile};
use crate::poll::PollScheduler;

// ── Coalescer keys ───────────────────────────────────────────────────

mod keys {
    pub const STATUS: &str = "status";
    pub const PROFILES: &str = "profiles";
    pub const DEFAULT: &str = "default";
    pub const DISCONNECT: &str = "disconnect";

    pub fn connect(target: &str) -> String {
        format!("connect:{target}")
    }

    pub fn set_default(profile_id: &str) -> String {
        format!("set-default:{profile_id}")
    }
}

// ── Controller ───────────────────────────────────────────────────────

/// Client-side VPN session engine.
///
/// Owns the [`SessionSnapshot`] and is the only thing that mutates it.
/// Operations route through the coalescer, so a manual refresh and a
/// poll tick landing together still issue one request. Cheap to clone;
/// clones share the snapshot, coalescer, and poll task.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    client: ApiClient,
    config: SessionConfig,
    snapshot: watch::Sender<SessionSnapshot>,
    coalescer: RequestCoalescer,
    poller: PollScheduler,
}

impl SessionController {
    pub fn new(config: SessionConfig) -> Result<Self, ErrorKind> {
        let client = ApiClient::with_timeout(
            config.base_url.clone(),
            config.token_source.clone(),
            config.request_timeout,
        )?;
        let (snapshot, _) = watch::channel(SessionSnapshot::default());

        Ok(Self {
            inner: Arc::new(ControllerInner {
                client,
                config,
                snapshot,
                coalescer: RequestCoalescer::new(),
                poller: PollScheduler::new(),
            }),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    // ── Observation ──────────────────────────────────────────────────

    /// A copy of the current snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    /// Watch for snapshot changes.
    ///
    /// Every completed operation publishes the full new snapshot,
    /// success or failure. One final notification may arrive after
    /// [`stop_polling`](Self::stop_polling) if a tick was in flight.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.snapshot.subscribe()
    }

    // ── Session lifecycle ────────────────────────────────────────────

    /// Prime the snapshot: default profile, then profiles, then status.
    ///
    /// A failed default lookup leaves the marker empty but never blocks
    /// the profile list from loading. Profile or status failure fails
    /// the load.
    pub async fn load_session(&self) -> Result<SessionSnapshot, ErrorKind> {
        let _ = self.fetch_default_profile().await;
        self.fetch_profiles().await?;
        self.refresh_status().await?;
        Ok(self.snapshot())
    }

    /// Start the background status poll at the configured interval.
    /// A zero interval leaves polling disabled.
    pub async fn start_polling(&self) {
        let this = self.clone();
        self.inner
            .poller
            .start(self.inner.config.poll_interval, move || {
                let this = this.clone();
                async move {
                    // The outcome lands in the snapshot either way; the
                    // poll loop itself never fails.
                    let _ = this.refresh_status().await;
                }
            })
            .await;
    }

    /// Stop the background poll. Idempotent; once this returns no
    /// further scheduled refresh can begin.
    pub async fn stop_polling(&self) {
        self.inner.poller.stop().await;
    }

    // ── VPN operations ───────────────────────────────────────────────

    /// Refresh the live connection state from the companion.
    ///
    /// On failure the last-known state is preserved and only
    /// `last_error` moves; a transient failure must never present as
    /// "disconnected".
    pub async fn refresh_status(&self) -> Result<ConnectionState, ErrorKind> {
        let inner = Arc::clone(&self.inner);
        self.inner
            .coalescer
            .run(keys::STATUS, move || async move {
                inner.do_refresh_status().await
            })
            .await
    }

    /// Fetch the profile list, replacing the snapshot's set wholesale.
    /// An empty list is a valid, non-error result.
    pub async fn fetch_profiles(&self) -> Result<Vec<VpnProfile>, ErrorKind> {
        let inner = Arc::clone(&self.inner);
        self.inner
            .coalescer
            .run(keys::PROFILES, move || async move {
                inner.do_fetch_profiles().await
            })
            .await
    }

    /// Fetch the companion's configured default profile.
    ///
    /// `Ok(None)` when none is configured. On any real failure the
    /// local marker is cleared and the error recorded.
    pub async fn fetch_default_profile(&self) -> Result<Option<DefaultProfile>, ErrorKind> {
        let inner = Arc::clone(&self.inner);
        self.inner
            .coalescer
            .run(keys::DEFAULT, move || async move {
                inner.do_fetch_default().await
            })
            .await
    }

    /// Connect the given profile, then refresh status after the settle
    /// delay. The returned result reflects the connect call itself; the
    /// connection state only moves once the follow-up refresh confirms
    /// it.
    pub async fn connect(&self, profile_id: &str) -> Result<VpnActionResponse, ErrorKind> {
        self.connect_inner(Some(profile_id)).await
    }

    /// Connect using the companion's configured default profile.
    pub async fn connect_default(&self) -> Result<VpnActionResponse, ErrorKind> {
        self.connect_inner(None).await
    }

    async fn connect_inner(
        &self,
        profile_id: Option<&str>,
    ) -> Result<VpnActionResponse, ErrorKind> {
        let key = keys::connect(profile_id.unwrap_or("default"));
        let inner = Arc::clone(&self.inner);
        let this = self.clone();
        let id = profile_id.map(ToOwned::to_owned);

        self.inner
            .coalescer
            .run(&key, move || async move {
                let resp = inner.do_connect(id.as_deref()).await?;
                this.settle_then_refresh().await;
                Ok(resp)
            })
            .await
    }

    /// Disconnect, then refresh status after the settle delay.
    ///
    /// The companion reports success even when nothing was connected;
    /// `was_connected` in the response tells the cases apart.
    pub async fn disconnect(&self) -> Result<DisconnectResponse, ErrorKind> {
        let inner = Arc::clone(&self.inner);
        let this = self.clone();

        self.inner
            .coalescer
            .run(keys::DISCONNECT, move || async move {
                let resp = inner.do_disconnect().await?;
                this.settle_then_refresh().await;
                Ok(resp)
            })
            .await
    }

    /// Make `profile_id` the default. On success the local marker is
    /// updated from the response and the profile list refreshed so
    /// derived default indicators match; on failure the marker is left
    /// unchanged.
    pub async fn set_default(&self, profile_id: &str) -> Result<DefaultProfile, ErrorKind> {
        let key = keys::set_default(profile_id);
        let inner = Arc::clone(&self.inner);
        let this = self.clone();
        let id = profile_id.to_owned();

        self.inner
            .coalescer
            .run(&key, move || async move {
                let default = inner.do_set_default(&id).await?;
                let _ = this.fetch_profiles().await;
                Ok(default)
            })
            .await
    }

    // ── Pass-through endpoints ───────────────────────────────────────

    /// Short-lived login credentials for an automated login flow.
    /// Never stored in the snapshot, never logged.
    pub async fn fetch_credentials(
        &self,
        context: &str,
        headless: bool,
    ) -> Result<Credentials, ErrorKind> {
        self.inner
            .client
            .credentials(context, headless)
            .await
            .map_err(ErrorKind::from)
    }

    /// The associate email tied to the logged-in user.
    pub async fn associate_email(&self) -> Result<String, ErrorKind> {
        self.inner
            .client
            .associate_email()
            .await
            .map_err(ErrorKind::from)
    }

    /// Companion service health probe.
    pub async fn health(&self) -> Result<HealthInfo, ErrorKind> {
        self.inner.client.health().await.map_err(ErrorKind::from)
    }

    // ── Internals ────────────────────────────────────────────────────

    /// The companion applies connection changes asynchronously: wait a
    /// beat, then trust only the status endpoint for the new state. The
    /// refresh outcome lands in the snapshot on its own.
    async fn settle_then_refresh(&self) {
        tokio::time::sleep(self.inner.config.settle_delay).await;
        let _ = self.refresh_status().await;
    }
}

impl ControllerInner {
    fn publish<F: FnOnce(&mut SessionSnapshot)>(&self, mutate: F) {
        self.snapshot.send_modify(mutate);
    }

    /// Convert, log, and publish an operation failure.
    fn record_failure(&self, context: &str, err: tether_api::Error) -> ErrorKind {
        let kind = ErrorKind::from(err);
        warn!(error = %kind, "{context}");
        let failure = kind.clone();
        self.publish(move |snap| snap.last_error = Some(failure));
        kind
    }

    async fn do_refresh_status(&self) -> Result<ConnectionState, ErrorKind> {
        match self.client.vpn_status().await {
            Ok(status) => {
                let state = ConnectionState::from(status);
                debug!("status: {state}");
                let published = state.clone();
                self.publish(move |snap| {
                    snap.connection = published;
                    snap.last_error = None;
                    snap.last_refresh = Some(Utc::now());
                });
                Ok(state)
            }
            Err(err) => Err(self.record_failure("status refresh failed", err)),
        }
    }

    async fn do_fetch_profiles(&self) -> Result<Vec<VpnProfile>, ErrorKind> {
        match self.client.vpn_profiles().await {
            Ok(wire) => {
                let profiles: Vec<VpnProfile> = wire.into_iter().map(VpnProfile::from).collect();
                debug!("loaded {} profiles", profiles.len());
                let stored = profiles.clone();
                self.publish(move |snap| {
                    snap.profiles = stored;
                    snap.last_error = None;
                });
                Ok(profiles)
            }
            Err(err) => Err(self.record_failure("profile fetch failed", err)),
        }
    }

    async fn do_fetch_default(&self) -> Result<Option<DefaultProfile>, ErrorKind> {
        match self.client.vpn_default().await {
            Ok(info) => {
                let default = DefaultProfile::from(info);
                let stored = default.clone();
                self.publish(move |snap| {
                    snap.default_profile = Some(stored);
                    snap.last_error = None;
                });
                Ok(Some(default))
            }
            Err(err) if err.is_not_found() => {
                // No default configured is a valid state, not an error.
                self.publish(|snap| {
                    snap.default_profile = None;
                    snap.last_error = None;
                });
                Ok(None)
            }
            Err(err) => {
                let kind = ErrorKind::from(err);
                warn!(error = %kind, "default profile fetch failed");
                let failure = kind.clone();
                self.publish(move |snap| {
                    snap.default_profile = None;
                    snap.last_error = Some(failure);
                });
                Err(kind)
            }
        }
    }

    async fn do_connect(&self, profile_id: Option<&str>) -> Result<VpnActionResponse, ErrorKind> {
        let result = match profile_id {
            Some(id) => self.client.vpn_connect(id).await,
            None => self.client.vpn_connect_default().await,
        };

        match result {
            Ok(resp) => {
                debug!("connect accepted: {:?}", resp.profile_name.as_deref());
                self.publish(|snap| snap.last_error = None);
                Ok(resp)
            }
            Err(err) => Err(self.record_failure("vpn connect failed", err)),
        }
    }

    async fn do_disconnect(&self) -> Result<DisconnectResponse, ErrorKind> {
        match self.client.vpn_disconnect().await {
            Ok(resp) => {
                debug!("disconnect accepted, was_connected={:?}", resp.was_connected);
                self.publish(|snap| snap.last_error = None);
                Ok(resp)
            }
            Err(err) => Err(self.record_failure("vpn disconnect failed", err)),
        }
    }

    async fn do_set_default(&self, profile_id: &str) -> Result<DefaultProfile, ErrorKind> {
        match self.client.set_vpn_default(profile_id).await {
            Ok(resp) => {
                let default = DefaultProfile {
                    profile_id: Some(profile_id.to_owned()),
                    uuid: resp.uuid,
                    profile_name: resp.profile_name,
                    source: None,
                };
                let stored = default.clone();
                self.publish(move |snap| {
                    snap.default_profile = Some(stored);
                    snap.last_error = None;
                });
                Ok(default)
            }
            Err(err) => Err(self.record_failure("set default failed", err)),
        }
    }
}
