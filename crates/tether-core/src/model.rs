// Domain model for the VPN session.
//
// These are the shapes observers see. Wire types from `tether-api`
// convert in at the controller boundary and never leak past it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use tether_api::types;

use crate::ErrorKind;

// ── Profiles ─────────────────────────────────────────────────────────

/// One VPN profile the companion can connect.
///
/// Immutable once fetched; a profile fetch replaces the whole set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VpnProfile {
    pub id: String,
    pub name: String,
    pub remote: Option<String>,
    pub uuid: Option<String>,
    pub port: Option<u16>,
}

impl From<types::VpnProfile> for VpnProfile {
    fn from(wire: types::VpnProfile) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            remote: wire.remote,
            uuid: wire.uuid,
            port: wire.port,
        }
    }
}

/// The companion's configured default profile selection.
///
/// Only ever mutated by a successful `set_default` or a successful
/// fetch of the server-side default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefaultProfile {
    pub profile_id: Option<String>,
    pub uuid: Option<String>,
    pub profile_name: Option<String>,
    /// Where the selection came from (`"gui_config"`, `"env"`, ...).
    pub source: Option<String>,
}

impl From<types::VpnDefaultInfo> for DefaultProfile {
    fn from(wire: types::VpnDefaultInfo) -> Self {
        Self {
            profile_id: wire.profile_id,
            uuid: Some(wire.uuid),
            profile_name: wire.profile_name,
            source: wire.source,
        }
    }
}

// ── Connection state ─────────────────────────────────────────────────

/// Live VPN connection state.
///
/// `Unknown` until the first successful status fetch. Only a status
/// fetch moves this; a connect or disconnect POST on its own never
/// does, so the indicator can't go optimistically wrong.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Unknown,
    Connected { profile_name: Option<String> },
    Disconnected,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }

    /// Name of the connected profile, when the companion reported one.
    pub fn profile_name(&self) -> Option<&str> {
        match self {
            Self::Connected { profile_name } => profile_name.as_deref(),
            Self::Unknown | Self::Disconnected => None,
        }
    }
}

impl From<types::VpnStatus> for ConnectionState {
    fn from(wire: types::VpnStatus) -> Self {
        if wire.connected {
            Self::Connected {
                profile_name: wire.profile_name,
            }
        } else {
            Self::Disconnected
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            Self::Disconnected => f.write_str("disconnected"),
            Self::Connected {
                profile_name: Some(name),
            } => write!(f, "connected ({name})"),
            Self::Connected { profile_name: None } => f.write_str("connected"),
        }
    }
}

// ── Snapshot ─────────────────────────────────────────────────────────

/// The full observable session state.
///
/// Observers always receive a complete copy after every completed
/// operation, success or failure. Never a diff, never a partial update.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionSnapshot {
    pub profiles: Vec<VpnProfile>,
    pub default_profile: Option<DefaultProfile>,
    pub connection: ConnectionState,
    /// Outcome of the most recently completed operation; `None` after a
    /// success.
    pub last_error: Option<ErrorKind>,
    /// When the connection state was last confirmed by the companion.
    pub last_refresh: Option<DateTime<Utc>>,
}

impl SessionSnapshot {
    /// Whether `profile` is the currently configured default.
    pub fn is_default(&self, profile: &VpnProfile) -> bool {
        let Some(default) = &self.default_profile else {
            return false;
        };

        if let Some(id) = &default.profile_id {
            return *id == profile.id;
        }
        match (&default.uuid, &profile.uuid) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn profile(id: &str, uuid: Option<&str>) -> VpnProfile {
        VpnProfile {
            id: id.to_owned(),
            name: id.to_uppercase(),
            remote: None,
            uuid: uuid.map(ToOwned::to_owned),
            port: None,
        }
    }

    #[test]
    fn status_maps_to_connection_state() {
        let connected = types::VpnStatus {
            connected: true,
            profile_name: Some("IAD2".to_owned()),
            profile_id: Some("iad2".to_owned()),
            connection_details: None,
        };
        assert_eq!(
            ConnectionState::from(connected),
            ConnectionState::Connected {
                profile_name: Some("IAD2".to_owned())
            }
        );

        let disconnected = types::VpnStatus {
            connected: false,
            profile_name: None,
            profile_id: None,
            connection_details: None,
        };
        assert_eq!(ConnectionState::from(disconnected), ConnectionState::Disconnected);
    }

    #[test]
    fn display_includes_profile_when_known() {
        let state = ConnectionState::Connected {
            profile_name: Some("IAD2".to_owned()),
        };
        assert_eq!(state.to_string(), "connected (IAD2)");
        assert_eq!(ConnectionState::Unknown.to_string(), "unknown");
    }

    #[test]
    fn default_matching_prefers_profile_id() {
        let snapshot = SessionSnapshot {
            profiles: vec![profile("iad2", Some("u-1")), profile("ams2", Some("u-2"))],
            default_profile: Some(DefaultProfile {
                profile_id: Some("ams2".to_owned()),
                uuid: Some("u-1".to_owned()),
                profile_name: None,
                source: None,
            }),
            ..SessionSnapshot::default()
        };

        // profile_id wins even when the uuid points elsewhere.
        assert!(snapshot.is_default(&snapshot.profiles[1]));
        assert!(!snapshot.is_default(&snapshot.profiles[0]));
    }

    #[test]
    fn default_matching_falls_back_to_uuid() {
        let snapshot = SessionSnapshot {
            profiles: vec![profile("iad2", Some("u-1"))],
            default_profile: Some(DefaultProfile {
                profile_id: None,
                uuid: Some("u-1".to_owned()),
                profile_name: None,
                source: None,
            }),
            ..SessionSnapshot::default()
        };

        assert!(snapshot.is_default(&snapshot.profiles[0]));
    }

    #[test]
    fn no_default_matches_nothing() {
        let snapshot = SessionSnapshot {
            profiles: vec![profile("iad2", None)],
            ..SessionSnapshot::default()
        };
        assert!(!snapshot.is_default(&snapshot.profiles[0]));
    }
}
