use chrono::NaiveDate;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::NewLapRecord;
use crate::modules::helpers::tier::Tier;
use crate::schema::lap_records;

/// a lap time together with its standing on the track
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TieredLapRecord {
    pub track_slug: String,
    pub driver_slug: String,
    pub track_name: String,
    pub driver_name: String,
    pub profile_url: String,
    pub position: u32,
    pub time_seconds: f64,
    pub best_time_str: String,
    pub tier: Tier,
    pub percentile: f64,
    pub gap_to_leader_seconds: f64,
    pub interval_seconds: f64,
    pub z_score: f64,
    pub date: NaiveDate,
    pub max_kmh: Option<f64>,
    pub max_g: Option<f64>,
}

impl TieredLapRecord {
    pub fn key(&self) -> (String, String) {
        (self.track_slug.clone(), self.driver_slug.clone())
    }

    pub fn to_new(&self) -> NewLapRecord {
        NewLapRecord {
            track_slug: self.track_slug.clone(),
            driver_slug: self.driver_slug.clone(),
            track_name: self.track_name.clone(),
            driver_name: self.driver_name.clone(),
            profile_url: self.profile_url.clone(),
            position: self.position as i32,
            time_seconds: self.time_seconds,
            best_time_str: self.best_time_str.clone(),
            tier: self.tier.to_string(),
            percentile: self.percentile,
            gap_seconds: self.gap_to_leader_seconds,
            interval_seconds: self.interval_seconds,
            z_score: self.z_score,
            date: self.date,
            max_kmh: self.max_kmh,
            max_g: self.max_g,
        }
    }

    /// # upsert a lap record
    /// insert the lap record or replace the one stored for the same track and driver
    ///
    /// ## Arguments
    /// * `conn` - the database connection to use
    ///
    /// ## Returns
    /// * `usize` - the amount of affected rows
    pub fn upsert(&self, conn: &mut PgConnection) -> QueryResult<usize> {
        let new_record = self.to_new();

        diesel::insert_into(lap_records::table)
            .values(&new_record)
            .on_conflict((lap_records::track_slug, lap_records::driver_slug))
            .do_update()
            .set(&new_record)
            .execute(conn)
    }
}
