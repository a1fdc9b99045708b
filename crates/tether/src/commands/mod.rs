//! Command dispatch: bridges CLI args -> session operations -> output
//! formatting.

pub mod config_cmd;
pub mod creds;
pub mod health;
pub mod vpn;
pub mod watch;

use tether_core::SessionController;

use crate::cli::{Command, ViewOpts};
use crate::error::CliError;

/// Dispatch a companion-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &SessionController,
    view: &ViewOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status => vpn::status(controller, view).await,
        Command::Profiles => vpn::profiles(controller, view).await,
        Command::Connect(args) => vpn::connect(controller, args, view).await,
        Command::Disconnect => vpn::disconnect(controller, view).await,
        Command::Default(args) => vpn::default_profile(controller, args, view).await,
        Command::Creds(args) => creds::handle(controller, args, view).await,
        Command::Email => creds::email(controller, view).await,
        Command::Health => health::handle(controller, view).await,
        Command::Watch => watch::handle(controller, view).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
