//! Live status watch: stream connection-state transitions until
//! interrupted.

use tether_core::{SessionController, SessionSnapshot};

use crate::cli::{OutputFormat, ViewOpts};
use crate::error::CliError;
use crate::output;

pub async fn handle(controller: &SessionController, view: &ViewOpts) -> Result<(), CliError> {
    let snapshot = controller.load_session().await?;
    let colored = output::should_color(&view.color);
    print_transition(&snapshot, view, colored);

    // Subscribe after the initial print so only new publishes stream.
    let mut rx = controller.subscribe();
    controller.start_polling().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut last = (snapshot.connection.clone(), snapshot.last_error.clone());
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snap = rx.borrow_and_update().clone();
                let key = (snap.connection.clone(), snap.last_error.clone());
                // Every poll tick publishes; only transitions are worth
                // a line.
                if key != last {
                    print_transition(&snap, view, colored);
                    last = key;
                }
            }
        }
    }

    controller.stop_polling().await;
    Ok(())
}

fn print_transition(snapshot: &SessionSnapshot, view: &ViewOpts, colored: bool) {
    let line = match view.output {
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_json_compact(snapshot),
        OutputFormat::Table | OutputFormat::Yaml | OutputFormat::Plain => {
            let stamp = chrono::Local::now().format("%H:%M:%S");
            let state = output::paint_state(&snapshot.connection, colored);
            match &snapshot.last_error {
                Some(err) => format!("{stamp}  {state}  [{err}]"),
                None => format!("{stamp}  {state}"),
            }
        }
    };
    output::print_output(&line, view.quiet);
}
