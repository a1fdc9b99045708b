//! Credential passthrough commands.
//!
//! Credentials transit straight from the companion to stdout; nothing
//! here logs them or stores them anywhere.

use secrecy::ExposeSecret;
use serde::Serialize;

use tether_core::SessionController;

use crate::cli::{CredsArgs, ViewOpts};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct CredsView {
    username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<String>,
}

#[derive(Serialize)]
struct EmailView {
    email: String,
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle(
    controller: &SessionController,
    args: CredsArgs,
    view: &ViewOpts,
) -> Result<(), CliError> {
    let creds = controller
        .fetch_credentials(&args.context, args.headless)
        .await?;

    let password = args
        .show_secret
        .then(|| creds.password.expose_secret().to_owned());
    let data = CredsView {
        username: creds.username,
        password,
    };

    let out = output::render_single(&view.output, &data, creds_detail, creds_id);
    output::print_output(&out, view.quiet);
    Ok(())
}

pub async fn email(controller: &SessionController, view: &ViewOpts) -> Result<(), CliError> {
    let email = controller.associate_email().await?;
    let data = EmailView { email };

    let out = output::render_single(&view.output, &data, email_detail, email_id);
    output::print_output(&out, view.quiet);
    Ok(())
}

// ── Detail formatters ───────────────────────────────────────────────

fn creds_detail(v: &CredsView) -> String {
    let username = &v.username;
    let password = v.password.as_deref().unwrap_or("********");
    format!("Username: {username}\nPassword: {password}")
}

/// Plain form: the raw `username,password` pair when the secret was
/// requested, otherwise the username alone.
fn creds_id(v: &CredsView) -> String {
    match &v.password {
        Some(password) => format!("{},{password}", v.username),
        None => v.username.clone(),
    }
}

fn email_detail(v: &EmailView) -> String {
    format!("Email: {}", v.email)
}

fn email_id(v: &EmailView) -> String {
    v.email.clone()
}
