//! Config subcommand handlers.

use clap::ValueEnum;

use tether_config::{Config, config_path, load_config_or_default, save_config};

use crate::cli::{ColorMode, ConfigArgs, ConfigCommand, OutputFormat, ViewOpts};
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, view: &ViewOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),
        ConfigCommand::Show => show(view),
        ConfigCommand::Path => {
            let path = config_path();
            output::print_output(&path.display().to_string(), view.quiet);
            Ok(())
        }
        ConfigCommand::Set { key, value } => set(&key, value),
    }
}

// ── Subcommands ─────────────────────────────────────────────────────

fn init() -> Result<(), CliError> {
    let path = config_path();
    if path.exists() {
        return Err(CliError::Validation {
            field: "config".into(),
            reason: format!("already exists at {}", path.display()),
        });
    }

    save_config(&Config::default())?;
    eprintln!("✓ Wrote default config to {}", path.display());
    Ok(())
}

fn show(view: &ViewOpts) -> Result<(), CliError> {
    let cfg = load_config_or_default();
    let out = output::render_single(&view.output, &cfg, |c| format!("{c:#?}"), |_| "config".into());
    output::print_output(&out, view.quiet);
    Ok(())
}

fn set(key: &str, value: String) -> Result<(), CliError> {
    let mut cfg = load_config_or_default();

    match key {
        "base_url" | "base-url" => cfg.base_url = value,
        "token_file" | "token-file" => cfg.token_file = Some(value.into()),
        "poll_interval" | "poll_interval_secs" => {
            let secs = parse_u64(key, &value)?;
            if secs == 0 {
                return Err(CliError::Validation {
                    field: key.into(),
                    reason: "must be at least 1 second".into(),
                });
            }
            cfg.poll_interval_secs = secs;
        }
        "settle_delay" | "settle_delay_ms" => {
            cfg.settle_delay_ms = parse_u64(key, &value)?;
        }
        "timeout" | "request_timeout_secs" => {
            cfg.request_timeout_secs = parse_u64(key, &value)?;
        }
        "output" => {
            OutputFormat::from_str(&value, true).map_err(|_| CliError::Validation {
                field: "output".into(),
                reason: "must be one of: table, json, json-compact, yaml, plain".into(),
            })?;
            cfg.defaults.output = value;
        }
        "color" => {
            ColorMode::from_str(&value, true).map_err(|_| CliError::Validation {
                field: "color".into(),
                reason: "must be one of: auto, always, never".into(),
            })?;
            cfg.defaults.color = value;
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: base_url, token_file, \
                     poll_interval_secs, settle_delay_ms, request_timeout_secs, output, color"
                ),
            });
        }
    }

    save_config(&cfg)?;
    eprintln!("✓ Set {key}");
    Ok(())
}

fn parse_u64(field: &str, value: &str) -> Result<u64, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: "must be a number".into(),
    })
}
