use std::collections::BTreeMap;
use std::fmt;

use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::errors::{CustomResult, Error};
use crate::modules::config::TrackSource;
use crate::modules::helpers::lap_time::LapTime;
use crate::modules::helpers::slug::SlugRegistry;
use crate::modules::helpers::tier::Tier;
use crate::modules::lap_csv::{LapCsv, SkippedRow};
use crate::modules::models::driver::{Driver, DriverTrackEntry};
use crate::modules::models::lap_record::TieredLapRecord;
use crate::modules::models::track::Track;
use crate::modules::store::DocumentStore;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrackSummary {
    pub name: String,
    pub slug: String,
    pub drivers: usize,
    pub records: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrackFailure {
    pub track: String,
    pub reason: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SyncReport {
    pub tracks: Vec<TrackSummary>,
    pub drivers_processed: usize,
    pub records_processed: usize,
    pub skipped_rows: Vec<SkippedRow>,
    pub track_failures: Vec<TrackFailure>,
}

impl SyncReport {
    pub fn tracks_processed(&self) -> usize {
        self.tracks.len()
    }

    /// true when every track was synced. skipped rows do not count as a failure
    pub fn is_complete(&self) -> bool {
        self.track_failures.is_empty()
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "sync complete")?;
        for track in &self.tracks {
            writeln!(f, "  {} ({}): {} drivers, {} records", track.name, track.slug, track.drivers, track.records)?;
        }
        writeln!(
            f,
            "total: {} tracks, {} drivers, {} lap records",
            self.tracks_processed(),
            self.drivers_processed,
            self.records_processed
        )?;

        if !self.skipped_rows.is_empty() {
            writeln!(f, "skipped rows: {}", self.skipped_rows.len())?;
            for row in &self.skipped_rows {
                writeln!(f, "  {} line {}: {}", row.track, row.line, row.reason)?;
            }
        }

        if !self.track_failures.is_empty() {
            writeln!(f, "failed tracks: {}", self.track_failures.len())?;
            for failure in &self.track_failures {
                writeln!(f, "  {}: {}", failure.track, failure.reason)?;
            }
        }

        Ok(())
    }
}

/// loads the csv export of every configured track and upserts the derived
/// tracks, lap records and drivers into a store
pub struct SyncJob {
    tracks: Vec<TrackSource>,
}

impl SyncJob {
    pub fn new(tracks: Vec<TrackSource>) -> SyncJob {
        SyncJob { tracks }
    }

    /// # run the sync
    /// sync every configured track. a track that can not be read is reported
    /// and skipped, store failures abort the run.
    ///
    /// ## Arguments
    /// * `store` - the store to upsert the documents into
    ///
    /// ## Returns
    /// * `SyncReport` - what was processed and what was skipped
    pub fn run<S: DocumentStore>(&self, store: &mut S) -> CustomResult<SyncReport> {
        let mut report = SyncReport::default();
        let mut slugs = SlugRegistry::seeded(&store.stored_slugs()?);
        let mut drivers: BTreeMap<String, Driver> = BTreeMap::new();

        for source in &self.tracks {
            info!(target: "sync:run", "processing {}", source.name);
            match self.sync_track(source, store, &mut slugs, &mut drivers, &mut report) {
                Ok(summary) => {
                    info!(
                        target: "sync:run",
                        "synced {}: {} drivers, {} records",
                        summary.name, summary.drivers, summary.records
                    );
                    report.records_processed += summary.records;
                    report.tracks.push(summary);
                }
                Err(error) if error.is_fatal() => {
                    error!(target: "sync:run", "aborting sync at {}: {}", source.name, error);
                    return Err(error);
                }
                Err(error) => {
                    warn!(target: "sync:run", "skipping track {}: {}", source.name, error);
                    report.track_failures.push(TrackFailure {
                        track: source.name.clone(),
                        reason: error.to_string(),
                    });
                }
            }
        }

        for driver in drivers.values() {
            store.upsert_driver(driver)?;
        }
        report.drivers_processed = drivers.len();

        info!(
            target: "sync:run",
            "done: {} tracks, {} drivers, {} records, {} skipped rows, {} failed tracks",
            report.tracks_processed(),
            report.drivers_processed,
            report.records_processed,
            report.skipped_rows.len(),
            report.track_failures.len()
        );

        Ok(report)
    }

    fn sync_track<S: DocumentStore>(
        &self,
        source: &TrackSource,
        store: &mut S,
        slugs: &mut SlugRegistry,
        drivers: &mut BTreeMap<String, Driver>,
        report: &mut SyncReport,
    ) -> CustomResult<TrackSummary> {
        let lap_csv = LapCsv::read(&source.name, &source.csv_path)?;
        info!(
            target: "sync:sync_track",
            "loaded {} records from {}",
            lap_csv.records.len(),
            source.csv_path.display()
        );
        report.skipped_rows.extend(lap_csv.skipped);

        if lap_csv.records.is_empty() {
            return Err(Error::DomainError {
                reason: format!("{} has no valid lap records", source.csv_path.display()),
            });
        }

        let mut keyed = Vec::with_capacity(lap_csv.records.len());
        for record in lap_csv.records {
            match slugs.assign(&record.driver_name, &record.profile_url) {
                Some(driver_slug) => keyed.push((driver_slug, record)),
                None => {
                    warn!(target: "sync:sync_track", "driver name {:?} has no slug, skipping", record.driver_name);
                    report.skipped_rows.push(SkippedRow {
                        track: source.name.clone(),
                        line: record.line,
                        reason: format!("driver name {:?} does not produce a slug", record.driver_name),
                    });
                }
            }
        }

        let mut track = Track::new(&source.slug(), &source.name, &source.location, source.description.as_deref());
        if !keyed.is_empty() {
            track.insert_records(keyed)?;
        }

        let document = track.document()?;
        let tiered = track.tiered_records()?;
        log_track_stats(&track, &tiered);

        store.upsert_track(&document)?;
        for record in &tiered {
            store.upsert_lap_record(record)?;

            let driver = drivers
                .entry(record.driver_slug.clone())
                .or_insert_with(|| Driver::new(&record.driver_slug, &record.driver_name, &record.profile_url));
            driver.upsert_record(DriverTrackEntry::from(record));
        }

        Ok(TrackSummary {
            name: source.name.clone(),
            slug: document.slug,
            drivers: track.records().len(),
            records: tiered.len(),
        })
    }
}

fn log_track_stats(track: &Track, tiered: &[TieredLapRecord]) {
    let stats = match track.stats() {
        Some(stats) => stats,
        None => return,
    };

    let format = |seconds: f64| LapTime::format(seconds).unwrap_or_else(|_| format!("{seconds:.3}s"));
    info!(
        target: "sync:sync_track",
        "{}: world record {} by {}, mean {}, median {}, std dev {:.3}s",
        track.name,
        stats.world_record_str,
        stats.record_holder,
        format(stats.mean_seconds),
        format(stats.median_seconds),
        stats.std_dev_seconds
    );

    for tier in Tier::ALL {
        let count = tiered.iter().filter(|r| r.tier == tier).count();
        let share = 100.0 * count as f64 / tiered.len().max(1) as f64;
        info!(target: "sync:sync_track", "  {:>2} ({}): {:4} drivers ({:5.2}%)", tier.as_str(), tier.label(), count, share);
    }
}
