use std::collections::BTreeMap;

use diesel::pg::PgConnection;
use log::{debug, error};

use crate::errors::CustomResult;
use crate::macros::database_error_handler::db_handle_write_error;
use crate::modules::helpers::slug::StoredSlug;
use crate::modules::models::driver::Driver;
use crate::modules::models::general::{create_tables, establish_connection};
use crate::modules::models::lap_record::TieredLapRecord;
use crate::modules::models::track::{Track, TrackDocument};

/// the three collections a sync writes to. every write is an upsert on the
/// key of the document.
pub trait DocumentStore {
    /// the driver slugs that are already stored, ordered by slug
    fn stored_slugs(&mut self) -> CustomResult<Vec<StoredSlug>>;

    /// insert or replace the track stored under the same slug
    fn upsert_track(&mut self, track: &TrackDocument) -> CustomResult<()>;

    /// insert or replace the record stored under the same track and driver slug
    fn upsert_lap_record(&mut self, record: &TieredLapRecord) -> CustomResult<()>;

    /// insert or update the driver stored under the same slug. stored entries
    /// of tracks the driver has no entry for are kept.
    fn upsert_driver(&mut self, driver: &Driver) -> CustomResult<()>;
}

pub struct PgStore {
    conn: PgConnection,
}

impl PgStore {
    /// connect to the database and make sure the tables exist
    pub fn connect(database_url: &str) -> CustomResult<PgStore> {
        let mut conn = establish_connection(database_url)?;
        db_handle_write_error!(create_tables(&mut conn), "store:connect", "tables");

        Ok(PgStore { conn })
    }
}

impl DocumentStore for PgStore {
    fn stored_slugs(&mut self) -> CustomResult<Vec<StoredSlug>> {
        let stored = db_handle_write_error!(Driver::stored_slugs(&mut self.conn), "store:stored_slugs", "driver slugs");
        debug!(target: "store:stored_slugs", "{} driver slugs are stored", stored.len());
        Ok(stored)
    }

    fn upsert_track(&mut self, track: &TrackDocument) -> CustomResult<()> {
        db_handle_write_error!(Track::upsert(&mut self.conn, track), "store:upsert_track", "track");
        debug!(target: "store:upsert_track", "upserted track {}", track.slug);
        Ok(())
    }

    fn upsert_lap_record(&mut self, record: &TieredLapRecord) -> CustomResult<()> {
        db_handle_write_error!(record.upsert(&mut self.conn), "store:upsert_lap_record", "lap record");
        Ok(())
    }

    fn upsert_driver(&mut self, driver: &Driver) -> CustomResult<()> {
        db_handle_write_error!(driver.upsert(&mut self.conn), "store:upsert_driver", "driver");
        Ok(())
    }
}

/// store that keeps every collection in memory, keyed the same way as the database
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MemoryStore {
    pub tracks: BTreeMap<String, TrackDocument>,
    pub drivers: BTreeMap<String, Driver>,
    pub lap_records: BTreeMap<(String, String), TieredLapRecord>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn lap_record(&self, track_slug: &str, driver_slug: &str) -> Option<&TieredLapRecord> {
        self.lap_records.get(&(track_slug.to_string(), driver_slug.to_string()))
    }
}

impl DocumentStore for MemoryStore {
    fn stored_slugs(&mut self) -> CustomResult<Vec<StoredSlug>> {
        Ok(self
            .drivers
            .values()
            .map(|driver| StoredSlug {
                slug: driver.slug.clone(),
                name: driver.name.clone(),
                profile_url: driver.profile_url.clone(),
            })
            .collect())
    }

    fn upsert_track(&mut self, track: &TrackDocument) -> CustomResult<()> {
        self.tracks.insert(track.slug.clone(), track.clone());
        Ok(())
    }

    fn upsert_lap_record(&mut self, record: &TieredLapRecord) -> CustomResult<()> {
        self.lap_records.insert(record.key(), record.clone());
        Ok(())
    }

    fn upsert_driver(&mut self, driver: &Driver) -> CustomResult<()> {
        let mut merged = driver.clone();
        if let Some(stored) = self.drivers.get(&driver.slug) {
            merged.merge_stored(&stored.records);
        }
        self.drivers.insert(merged.slug.clone(), merged);
        Ok(())
    }
}
