use std::collections::{HashMap, HashSet};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dotenvy::dotenv;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use snafu::{ensure, OptionExt};

use crate::errors::{ConfigSnafu, CustomResult, Error};
use crate::modules::helpers::logging::parse_level;
use crate::modules::helpers::slug::create_slug;

const DEFAULT_TRACKS_FILE: &str = "tracks.json";
const DEFAULT_LOG_FILE: &str = "program.log";
const DEFAULT_SYNC_INTERVAL_SECS: u64 = 7200;

/// a track and the csv export its lap times are read from
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackSource {
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub description: Option<String>,
    pub csv_path: PathBuf,
}

impl TrackSource {
    pub fn slug(&self) -> String {
        create_slug(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    pub database_url: String,
    pub tracks_file: PathBuf,
    pub data_dir: PathBuf,
    pub logging_level: LevelFilter,
    pub log_file: Option<PathBuf>,
    pub sync_interval: Duration,
}

impl SyncConfig {
    /// read the configuration from the environment, `.env` included
    pub fn from_env() -> CustomResult<SyncConfig> {
        dotenv().ok();
        SyncConfig::from_vars(&env::vars().collect())
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> CustomResult<SyncConfig> {
        let database_url = vars
            .get("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .context(ConfigSnafu {
                reason: "DATABASE_URL must be set",
            })?
            .to_string();

        let sync_interval = match vars.get("SYNC_INTERVAL_SECS") {
            Some(secs) => secs.trim().parse::<u64>().ok().filter(|secs| *secs > 0).context(ConfigSnafu {
                reason: format!("SYNC_INTERVAL_SECS must be a positive number, got {secs:?}"),
            })?,
            None => DEFAULT_SYNC_INTERVAL_SECS,
        };

        // an empty LOG_FILE disables the file logger
        let log_file = match vars.get("LOG_FILE") {
            Some(path) if path.trim().is_empty() => None,
            Some(path) => Some(PathBuf::from(path)),
            None => Some(PathBuf::from(DEFAULT_LOG_FILE)),
        };

        Ok(SyncConfig {
            database_url,
            tracks_file: PathBuf::from(vars.get("TRACKS_FILE").map(String::as_str).unwrap_or(DEFAULT_TRACKS_FILE)),
            data_dir: PathBuf::from(vars.get("DATA_DIR").map(String::as_str).unwrap_or(".")),
            logging_level: parse_level(vars.get("LOGGING_LEVEL").map(String::as_str).unwrap_or("INFO")),
            log_file,
            sync_interval: Duration::from_secs(sync_interval),
        })
    }

    /// load the configured tracks, with csv paths resolved against the data directory
    pub fn load_tracks(&self) -> CustomResult<Vec<TrackSource>> {
        let contents = std::fs::read_to_string(&self.tracks_file).map_err(|error| Error::ConfigError {
            reason: format!("could not read {}: {}", self.tracks_file.display(), error),
        })?;

        let tracks: Vec<TrackSource> = serde_json::from_str(&contents).map_err(|error| Error::ConfigError {
            reason: format!("could not parse {}: {}", self.tracks_file.display(), error),
        })?;

        validate_tracks(&tracks)?;

        Ok(tracks
            .into_iter()
            .map(|track| resolve_csv_path(track, &self.data_dir))
            .collect())
    }
}

fn validate_tracks(tracks: &[TrackSource]) -> CustomResult<()> {
    let mut slugs = HashSet::new();
    for track in tracks {
        let slug = track.slug();
        ensure!(
            !slug.is_empty(),
            ConfigSnafu {
                reason: format!("track name {:?} does not produce a slug", track.name),
            }
        );
        ensure!(
            slugs.insert(slug.clone()),
            ConfigSnafu {
                reason: format!("more than one track uses the slug {slug:?}"),
            }
        );
    }

    Ok(())
}

fn resolve_csv_path(mut track: TrackSource, data_dir: &Path) -> TrackSource {
    if track.csv_path.is_relative() {
        track.csv_path = data_dir.join(&track.csv_path);
    }
    track
}
