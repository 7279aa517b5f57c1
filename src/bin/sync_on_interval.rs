use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{error, info, warn};
use tokio_cron_scheduler::{Job, JobScheduler};

use karting_lap_sync::errors::CustomResult;
use karting_lap_sync::modules::config::{SyncConfig, TrackSource};
use karting_lap_sync::modules::helpers::logging::setup_logging;
use karting_lap_sync::modules::store::PgStore;
use karting_lap_sync::modules::sync::{SyncJob, SyncReport};

fn sync(database_url: &str, tracks: Vec<TrackSource>) -> CustomResult<SyncReport> {
    let mut store = PgStore::connect(database_url)?;
    SyncJob::new(tracks).run(&mut store)
}

/// run a sync on a blocking thread, unless the previous one is still going
async fn sync_once(config: Arc<SyncConfig>, running: Arc<AtomicBool>) {
    if running.swap(true, Ordering::SeqCst) {
        warn!(target: "sync_on_interval", "previous sync is still running, skipping this one");
        return;
    }

    let tracks = match config.load_tracks() {
        Ok(tracks) => tracks,
        Err(error) => {
            error!(target: "sync_on_interval", "failed loading tracks: {}", error);
            running.store(false, Ordering::SeqCst);
            return;
        }
    };

    let database_url = config.database_url.clone();
    match tokio::task::spawn_blocking(move || sync(&database_url, tracks)).await {
        Ok(Ok(report)) if report.is_complete() => info!(target: "sync_on_interval", "{}", report),
        Ok(Ok(report)) => warn!(target: "sync_on_interval", "{}", report),
        Ok(Err(error)) => error!(target: "sync_on_interval", "sync failed: {}", error),
        Err(error) => error!(target: "sync_on_interval", "sync task panicked: {}", error),
    }

    running.store(false, Ordering::SeqCst);
}

#[tokio::main]
async fn main() {
    let config = match SyncConfig::from_env() {
        Ok(config) => Arc::new(config),
        Err(error) => {
            eprintln!("{}", error);
            std::process::exit(1);
        }
    };

    if let Err(error) = setup_logging(config.logging_level, config.log_file.as_deref()) {
        eprintln!("failed to setup logging: {}", error);
        std::process::exit(1);
    }

    let running = Arc::new(AtomicBool::new(false));

    // first run right away, then on every interval
    sync_once(config.clone(), running.clone()).await;

    let mut scheduler = match JobScheduler::new().await {
        Ok(scheduler) => scheduler,
        Err(error) => {
            error!(target: "sync_on_interval", "failed creating scheduler: {}", error);
            std::process::exit(1);
        }
    };

    let job_config = config.clone();
    let job = Job::new_repeated_async(config.sync_interval, move |_uuid, _l| {
        let config = job_config.clone();
        let running = running.clone();
        Box::pin(async move {
            sync_once(config, running).await;
        })
    });

    let registered = match job {
        Ok(job) => scheduler.add(job).await.map(|_| ()),
        Err(error) => Err(error),
    };
    if let Err(error) = registered {
        error!(target: "sync_on_interval", "failed registering sync job: {}", error);
        std::process::exit(1);
    }

    if let Err(error) = scheduler.start().await {
        error!(target: "sync_on_interval", "failed starting scheduler: {}", error);
        std::process::exit(1);
    }
    info!(target: "sync_on_interval", "syncing every {} seconds", config.sync_interval.as_secs());

    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(target: "sync_on_interval", "failed waiting for ctrl-c: {}", error);
    }

    info!(target: "sync_on_interval", "shutting down");
    if let Err(error) = scheduler.shutdown().await {
        error!(target: "sync_on_interval", "failed stopping scheduler: {}", error);
    }
}
