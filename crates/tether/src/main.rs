mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tether_core::SessionController;

use crate::cli::{Cli, Command, ViewOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // Logs go to stderr so structured stdout output stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let cfg = tether_config::load_config_or_default();
    let view = ViewOpts::resolve(&cli.global, &cfg);

    match cli.command {
        // Config commands only touch the local file
        Command::Config(args) => commands::config_cmd::handle(args, &view),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "tether", &mut std::io::stdout());
            Ok(())
        }

        // Everything else talks to the companion service
        cmd => {
            let session_config = build_session_config(&cli.global, cfg)?;
            let controller = SessionController::new(session_config)?;

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &controller, &view).await
        }
    }
}

/// Apply CLI flag overrides on top of the file + environment config.
fn build_session_config(
    global: &cli::GlobalOpts,
    mut cfg: tether_config::Config,
) -> Result<tether_core::SessionConfig, CliError> {
    if let Some(url) = &global.base_url {
        cfg.base_url.clone_from(url);
    }
    if let Some(path) = &global.token_file {
        cfg.token_file = Some(path.clone());
    }
    if let Some(secs) = global.timeout {
        cfg.request_timeout_secs = secs;
    }
    if let Some(secs) = global.poll_interval {
        cfg.poll_interval_secs = secs;
    }

    Ok(tether_config::session_config(&cfg)?)
}
