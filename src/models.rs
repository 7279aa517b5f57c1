use chrono::NaiveDate;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use crate::schema::*;


#[derive(Insertable, AsChangeset, Serialize, Debug, Clone, Deserialize)]
#[diesel(table_name = tracks)]
#[diesel(treat_none_as_null = true)]
pub struct NewTrack {
    pub slug: String,
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    pub stats: serde_json::Value,
}

#[derive(Insertable, AsChangeset, Serialize, Debug, Clone, Deserialize)]
#[diesel(table_name = drivers)]
pub struct NewDriver {
    pub slug: String,
    pub name: String,
    pub profile_url: String,
    pub records: serde_json::Value,
}

#[derive(Insertable, AsChangeset, Serialize, Debug, Clone, Deserialize)]
#[diesel(table_name = lap_records)]
#[diesel(treat_none_as_null = true)]
pub struct NewLapRecord {
    pub track_slug: String,
    pub driver_slug: String,
    pub track_name: String,
    pub driver_name: String,
    pub profile_url: String,
    pub position: i32,
    pub time_seconds: f64,
    pub best_time_str: String,
    pub tier: String,
    pub percentile: f64,
    pub gap_seconds: f64,
    pub interval_seconds: f64,
    pub z_score: f64,
    pub date: NaiveDate,
    pub max_kmh: Option<f64>,
    pub max_g: Option<f64>,
}
