//! VPN command handlers: status, profiles, connect, disconnect, and
//! the default profile selection.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::Tabled;

use tether_core::{
    ConnectionState, DefaultProfile, DisconnectResponse, SessionController, SessionSnapshot,
    VpnActionResponse, VpnProfile,
};

use crate::cli::{ConnectArgs, DefaultArgs, ViewOpts};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "Default")]
    default: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Remote")]
    remote: String,
    #[tabled(rename = "Port")]
    port: String,
}

fn profile_row(profile: &VpnProfile, snapshot: &SessionSnapshot) -> ProfileRow {
    ProfileRow {
        default: if snapshot.is_default(profile) {
            "*".into()
        } else {
            String::new()
        },
        id: profile.id.clone(),
        name: profile.name.clone(),
        remote: profile.remote.clone().unwrap_or_else(|| "-".into()),
        port: profile.port.map_or_else(|| "-".into(), |p| p.to_string()),
    }
}

// ── Single-item views ───────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct StatusView {
    connection: ConnectionState,
    last_refresh: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct ConnectView {
    response: VpnActionResponse,
    connection: ConnectionState,
}

#[derive(Debug, Serialize)]
struct DisconnectView {
    response: DisconnectResponse,
    connection: ConnectionState,
}

#[derive(Debug, Serialize)]
struct DefaultView {
    default: Option<DefaultProfile>,
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn status(controller: &SessionController, view: &ViewOpts) -> Result<(), CliError> {
    controller.refresh_status().await?;
    let snapshot = controller.snapshot();
    let colored = output::should_color(&view.color);

    let data = StatusView {
        connection: snapshot.connection,
        last_refresh: snapshot.last_refresh,
    };
    let out = output::render_single(
        &view.output,
        &data,
        |v| {
            let state = output::paint_state(&v.connection, colored);
            format!("State: {state}")
        },
        |v| v.connection.to_string(),
    );
    output::print_output(&out, view.quiet);
    Ok(())
}

pub async fn profiles(controller: &SessionController, view: &ViewOpts) -> Result<(), CliError> {
    // The default marker is decoration; a missing or failed default
    // lookup must not block the listing.
    let _ = controller.fetch_default_profile().await;
    let profiles = controller.fetch_profiles().await?;
    let snapshot = controller.snapshot();

    let out = output::render_list(
        &view.output,
        &profiles,
        |p| profile_row(p, &snapshot),
        |p| p.id.clone(),
    );
    output::print_output(&out, view.quiet);
    Ok(())
}

pub async fn connect(
    controller: &SessionController,
    args: ConnectArgs,
    view: &ViewOpts,
) -> Result<(), CliError> {
    let response = match args.profile.as_deref() {
        Some(id) => controller.connect(id).await?,
        None => controller.connect_default().await?,
    };
    let connection = controller.snapshot().connection;
    let colored = output::should_color(&view.color);

    let data = ConnectView {
        response,
        connection,
    };
    let out = output::render_single(
        &view.output,
        &data,
        |v| connect_detail(v, colored),
        |v| v.connection.to_string(),
    );
    output::print_output(&out, view.quiet);
    Ok(())
}

pub async fn disconnect(controller: &SessionController, view: &ViewOpts) -> Result<(), CliError> {
    let response = controller.disconnect().await?;
    let connection = controller.snapshot().connection;
    let colored = output::should_color(&view.color);

    let data = DisconnectView {
        response,
        connection,
    };
    let out = output::render_single(
        &view.output,
        &data,
        |v| disconnect_detail(v, colored),
        |v| v.connection.to_string(),
    );
    output::print_output(&out, view.quiet);
    Ok(())
}

pub async fn default_profile(
    controller: &SessionController,
    args: DefaultArgs,
    view: &ViewOpts,
) -> Result<(), CliError> {
    let default = match args.profile.as_deref() {
        Some(id) => Some(controller.set_default(id).await?),
        None => controller.fetch_default_profile().await?,
    };

    let data = DefaultView { default };
    let out = output::render_single(&view.output, &data, default_detail, default_id);
    output::print_output(&out, view.quiet);
    Ok(())
}

// ── Detail formatters ───────────────────────────────────────────────

fn connect_detail(v: &ConnectView, colored: bool) -> String {
    let state = output::paint_state(&v.connection, colored);
    let mut lines = vec![format!("State: {state}")];
    if let Some(message) = &v.response.message {
        lines.push(format!("Note:  {message}"));
    }
    lines.join("\n")
}

fn disconnect_detail(v: &DisconnectView, colored: bool) -> String {
    let state = output::paint_state(&v.connection, colored);
    let mut lines = vec![format!("State: {state}")];
    if v.response.was_connected == Some(false) {
        lines.push("Nothing was connected.".into());
    }
    lines.join("\n")
}

fn default_detail(v: &DefaultView) -> String {
    let Some(default) = &v.default else {
        return "No default profile configured.".into();
    };

    let mut lines = Vec::new();
    if let Some(id) = &default.profile_id {
        lines.push(format!("Profile: {id}"));
    }
    if let Some(name) = &default.profile_name {
        lines.push(format!("Name:    {name}"));
    }
    if let Some(uuid) = &default.uuid {
        lines.push(format!("UUID:    {uuid}"));
    }
    if let Some(source) = &default.source {
        lines.push(format!("Source:  {source}"));
    }
    lines.join("\n")
}

fn default_id(v: &DefaultView) -> String {
    v.default.as_ref().map_or_else(String::new, |d| {
        d.profile_id
            .clone()
            .or_else(|| d.uuid.clone())
            .unwrap_or_default()
    })
}
