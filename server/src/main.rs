use std::process::ExitCode;

use intake_ledger_server::{init_tracing, start_server};
use intake_ledger_store::{IntakeConfig, credential_from_env};
use tracing::error;

const CONFIG_ENV: &str = "INTAKE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "intake.yml";

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = match IntakeConfig::load(&path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load {path}: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = config.apply_env_overrides() {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    match start_server(&config, credential_from_env()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
