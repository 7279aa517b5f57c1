use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_query;
use log::{error, info};

use crate::errors::{CustomResult, Error};

const CREATE_TABLES: [&str; 7] = [
    "CREATE TABLE IF NOT EXISTS tracks (
        slug VARCHAR PRIMARY KEY,
        name VARCHAR NOT NULL,
        location VARCHAR NOT NULL,
        description VARCHAR,
        stats JSONB NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS drivers (
        slug VARCHAR PRIMARY KEY,
        name VARCHAR NOT NULL,
        profile_url VARCHAR NOT NULL,
        records JSONB NOT NULL DEFAULT '[]'::jsonb
    )",
    "CREATE TABLE IF NOT EXISTS lap_records (
        track_slug VARCHAR NOT NULL,
        driver_slug VARCHAR NOT NULL,
        track_name VARCHAR NOT NULL,
        driver_name VARCHAR NOT NULL,
        profile_url VARCHAR NOT NULL,
        position INT4 NOT NULL,
        time_seconds FLOAT8 NOT NULL,
        best_time_str VARCHAR NOT NULL,
        tier VARCHAR NOT NULL,
        percentile FLOAT8 NOT NULL,
        gap_seconds FLOAT8 NOT NULL,
        interval_seconds FLOAT8 NOT NULL,
        z_score FLOAT8 NOT NULL,
        date DATE NOT NULL,
        max_kmh FLOAT8,
        max_g FLOAT8,
        PRIMARY KEY (track_slug, driver_slug)
    )",
    "CREATE INDEX IF NOT EXISTS drivers_profile_url_idx ON drivers (profile_url)",
    "CREATE INDEX IF NOT EXISTS lap_records_track_position_idx ON lap_records (track_slug, position)",
    "CREATE INDEX IF NOT EXISTS lap_records_driver_idx ON lap_records (driver_slug)",
    "CREATE INDEX IF NOT EXISTS lap_records_tier_idx ON lap_records (tier, track_slug)",
];

pub fn establish_connection(database_url: &str) -> CustomResult<PgConnection> {
    PgConnection::establish(database_url).map_err(|error| {
        error!(target: "models/general:establish_connection", "Error connecting to the database: {}", error);
        Error::ConnectivityError {
            message: error.to_string(),
        }
    })
}

/// # create the tables
/// create the tables and indexes the sync writes to when they do not exist yet
///
/// ## Arguments
/// * `conn` - the database connection to use
pub fn create_tables(conn: &mut PgConnection) -> QueryResult<()> {
    for statement in CREATE_TABLES {
        sql_query(statement).execute(conn)?;
    }

    info!(target: "models/general:create_tables", "tables and indexes are in place");
    Ok(())
}
