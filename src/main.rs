use std::process::ExitCode;

use log::{error, info, warn};

use karting_lap_sync::errors::CustomResult;
use karting_lap_sync::modules::config::SyncConfig;
use karting_lap_sync::modules::helpers::logging::setup_logging;
use karting_lap_sync::modules::store::PgStore;
use karting_lap_sync::modules::sync::{SyncJob, SyncReport};

/// exit code of a run where some tracks could not be synced
const PARTIAL_FAILURE: u8 = 2;

fn main() -> ExitCode {
    let config = match SyncConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{}", error);
            return ExitCode::FAILURE;
        }
    };

    if let Err(error) = setup_logging(config.logging_level, config.log_file.as_deref()) {
        eprintln!("failed to setup logging: {}", error);
        return ExitCode::FAILURE;
    }

    info!(target: "main", "start time: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    match sync(&config) {
        Ok(report) if report.is_complete() => {
            info!(target: "main", "{}", report);
            ExitCode::SUCCESS
        }
        Ok(report) => {
            warn!(target: "main", "{}", report);
            ExitCode::from(PARTIAL_FAILURE)
        }
        Err(error) => {
            error!(target: "main", "sync failed: {}", error);
            ExitCode::FAILURE
        }
    }
}

fn sync(config: &SyncConfig) -> CustomResult<SyncReport> {
    let tracks = config.load_tracks()?;
    let mut store = PgStore::connect(&config.database_url)?;

    SyncJob::new(tracks).run(&mut store)
}
