use std::collections::BTreeMap;

use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use snafu::OptionExt;

use crate::errors::{CustomResult, DomainSnafu};
use crate::models::NewTrack;
use crate::modules::helpers::lap_time::LapTime;
use crate::modules::helpers::math::Math;
use crate::modules::helpers::tier::Tier;
use crate::modules::lap_csv::LapRecord;
use crate::modules::models::lap_record::TieredLapRecord;
use crate::schema::tracks;

/// amount of equal width bins used to find the meta time
const META_TIME_BINS: usize = 20;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PercentileBoundaries {
    pub top1_percent: f64,
    pub top5_percent: f64,
    pub top10_percent: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackStats {
    pub sample_count: usize,
    pub world_record_seconds: f64,
    pub world_record_str: String,
    pub record_holder: String,
    pub record_holder_slug: String,
    pub median_seconds: f64,
    pub mean_seconds: f64,
    pub std_dev_seconds: f64,
    pub slowest_seconds: f64,
    pub meta_time_seconds: f64,
    pub percentile_boundaries: PercentileBoundaries,
}

/// the track as it is written to the store
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackDocument {
    pub slug: String,
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    pub stats: TrackStats,
}

/// a track with the best lap of every driver on it.
///
/// the stats are recomputed every time a record is added, so the world record
/// is always the fastest lap of the current records.
#[derive(Debug, Clone)]
pub struct Track {
    pub slug: String,
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    records: BTreeMap<String, LapRecord>,
    stats: Option<TrackStats>,
}

impl Track {
    pub fn new(slug: &str, name: &str, location: &str, description: Option<&str>) -> Track {
        Track {
            slug: slug.to_string(),
            name: name.to_string(),
            location: location.to_string(),
            description: description.map(str::to_string),
            records: BTreeMap::new(),
            stats: None,
        }
    }

    /// add the record of a driver, replacing their previous one
    pub fn insert_record(&mut self, driver_slug: &str, record: LapRecord) -> CustomResult<()> {
        self.insert_records(vec![(driver_slug.to_string(), record)])
    }

    /// bulk version of insert_record, the stats are only computed once
    pub fn insert_records(&mut self, records: Vec<(String, LapRecord)>) -> CustomResult<()> {
        self.records.extend(records);
        self.stats = Some(TrackStats::from_records(&self.records)?);
        Ok(())
    }

    pub fn records(&self) -> &BTreeMap<String, LapRecord> {
        &self.records
    }

    pub fn stats(&self) -> Option<&TrackStats> {
        self.stats.as_ref()
    }

    pub fn lap_times(&self) -> Vec<f64> {
        self.records.values().map(|r| r.best_time_seconds).collect()
    }

    pub fn document(&self) -> CustomResult<TrackDocument> {
        let stats = self.stats.clone().context(DomainSnafu {
            reason: format!("track {} has no lap records", self.name),
        })?;

        Ok(TrackDocument {
            slug: self.slug.clone(),
            name: self.name.clone(),
            location: self.location.clone(),
            description: self.description.clone(),
            stats,
        })
    }

    /// # tier the records
    /// compute the z-score, tier, percentile, gap to the leader and interval
    /// of every record. the records are returned in position order.
    ///
    /// ## Returns
    /// * `Vec<TieredLapRecord>` - one tiered record per driver
    pub fn tiered_records(&self) -> CustomResult<Vec<TieredLapRecord>> {
        let stats = self.stats.as_ref().context(DomainSnafu {
            reason: format!("track {} has no lap records", self.name),
        })?;
        let lap_times = self.lap_times();

        let mut ordered: Vec<(&String, &LapRecord)> = self.records.iter().collect();
        ordered.sort_by(|(_, a), (_, b)| {
            a.position
                .cmp(&b.position)
                .then(a.best_time_seconds.total_cmp(&b.best_time_seconds))
        });

        let mut tiered = Vec::with_capacity(ordered.len());
        let mut previous: Option<f64> = None;
        for (driver_slug, record) in ordered {
            let seconds = record.best_time_seconds;
            let z_score = Math::z_score(seconds, stats.mean_seconds, stats.std_dev_seconds);
            let percentile = Math::percentile(seconds, &lap_times)?;

            tiered.push(TieredLapRecord {
                track_slug: self.slug.clone(),
                driver_slug: driver_slug.clone(),
                track_name: self.name.clone(),
                driver_name: record.driver_name.clone(),
                profile_url: record.profile_url.clone(),
                position: record.position,
                time_seconds: seconds,
                best_time_str: record.best_time.clone(),
                tier: Tier::from_z_score(z_score),
                percentile: Math::round_float_to_n_decimals(percentile, 2),
                gap_to_leader_seconds: Math::round_float_to_n_decimals(seconds - stats.world_record_seconds, 3),
                interval_seconds: Math::round_float_to_n_decimals(seconds - previous.unwrap_or(seconds), 3),
                z_score,
                date: record.date,
                max_kmh: record.max_speed_kph,
                max_g: record.max_g,
            });
            previous = Some(seconds);
        }

        Ok(tiered)
    }

    /// # upsert a track
    /// insert the track document or replace the one stored under the same slug
    ///
    /// ## Arguments
    /// * `conn` - the database connection to use
    /// * `document` - the track document
    ///
    /// ## Returns
    /// * `usize` - the amount of affected rows
    pub fn upsert(conn: &mut PgConnection, document: &TrackDocument) -> QueryResult<usize> {
        let new_track = NewTrack {
            slug: document.slug.clone(),
            name: document.name.clone(),
            location: document.location.clone(),
            description: document.description.clone(),
            stats: serde_json::to_value(&document.stats)
                .map_err(|error| diesel::result::Error::SerializationError(Box::new(error)))?,
        };

        diesel::insert_into(tracks::table)
            .values(&new_track)
            .on_conflict(tracks::slug)
            .do_update()
            .set(&new_track)
            .execute(conn)
    }
}

impl TrackStats {
    pub fn from_records(records: &BTreeMap<String, LapRecord>) -> CustomResult<TrackStats> {
        // fastest lap, the earliest driver slug wins a tie
        let (holder_slug, holder) = records
            .iter()
            .min_by(|(_, a), (_, b)| a.best_time_seconds.total_cmp(&b.best_time_seconds))
            .context(DomainSnafu {
                reason: "track statistics of an empty record set",
            })?;

        let lap_times: Vec<f64> = records.values().map(|r| r.best_time_seconds).collect();
        let world_record = holder.best_time_seconds;

        Ok(TrackStats {
            sample_count: lap_times.len(),
            world_record_seconds: world_record,
            world_record_str: LapTime::format(world_record)?,
            record_holder: holder.driver_name.clone(),
            record_holder_slug: holder_slug.clone(),
            median_seconds: Math::median(&lap_times),
            mean_seconds: Math::mean(&lap_times),
            std_dev_seconds: Math::standard_deviation(&lap_times),
            slowest_seconds: lap_times.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            meta_time_seconds: Math::histogram_mode(&lap_times, META_TIME_BINS),
            percentile_boundaries: PercentileBoundaries {
                top1_percent: Math::quantile(&lap_times, 0.01),
                top5_percent: Math::quantile(&lap_times, 0.05),
                top10_percent: Math::quantile(&lap_times, 0.10),
            },
        })
    }
}
