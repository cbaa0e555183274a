use std::process::ExitCode;

use engine::run_app;
use tracing::{error, info};

use super::bootstrap::AppWiring;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    info!(level = %app.level_name, "session_started");
    if let Err(err) = run_app(app.config, app.scene) {
        error!(error = %err, "run_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
