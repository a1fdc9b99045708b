//! Companion service health check.

use tether_core::{HealthInfo, SessionController};

use crate::cli::ViewOpts;
use crate::error::CliError;
use crate::output;

pub async fn handle(controller: &SessionController, view: &ViewOpts) -> Result<(), CliError> {
    let info = controller.health().await?;

    let out = output::render_single(&view.output, &info, health_detail, health_id);
    output::print_output(&out, view.quiet);
    Ok(())
}

fn health_detail(info: &HealthInfo) -> String {
    format!(
        "Status:  {}\nService: {}\nVersion: {}",
        info.status, info.service, info.version
    )
}

fn health_id(info: &HealthInfo) -> String {
    info.status.clone()
}
