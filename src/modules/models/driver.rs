use chrono::NaiveDate;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::NewDriver;
use crate::modules::helpers::slug::StoredSlug;
use crate::modules::helpers::tier::Tier;
use crate::modules::models::lap_record::TieredLapRecord;
use crate::schema::drivers;

/// the best lap of a driver on a single track
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DriverTrackEntry {
    pub track_slug: String,
    pub track_name: String,
    pub position: u32,
    pub time_seconds: f64,
    pub best_time_str: String,
    pub tier: Tier,
    pub percentile: f64,
    pub gap_seconds: f64,
    pub date: NaiveDate,
    pub max_kmh: Option<f64>,
    pub max_g: Option<f64>,
}

impl From<&TieredLapRecord> for DriverTrackEntry {
    fn from(record: &TieredLapRecord) -> Self {
        DriverTrackEntry {
            track_slug: record.track_slug.clone(),
            track_name: record.track_name.clone(),
            position: record.position,
            time_seconds: record.time_seconds,
            best_time_str: record.best_time_str.clone(),
            tier: record.tier,
            percentile: record.percentile,
            gap_seconds: record.gap_to_leader_seconds,
            date: record.date,
            max_kmh: record.max_kmh,
            max_g: record.max_g,
        }
    }
}

/// a driver with one entry per track they have a time on.
/// the entries are kept sorted on track slug.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub slug: String,
    pub name: String,
    pub profile_url: String,
    pub records: Vec<DriverTrackEntry>,
}

impl Driver {
    pub fn new(slug: &str, name: &str, profile_url: &str) -> Driver {
        Driver {
            slug: slug.to_string(),
            name: name.to_string(),
            profile_url: profile_url.to_string(),
            records: Vec::new(),
        }
    }

    /// # upsert a track entry
    /// add the entry, replacing the entry of the same track when there is one
    pub fn upsert_record(&mut self, entry: DriverTrackEntry) {
        match self.records.iter_mut().find(|e| e.track_slug == entry.track_slug) {
            Some(existing) => *existing = entry,
            None => {
                self.records.push(entry);
                self.records.sort_by(|a, b| a.track_slug.cmp(&b.track_slug));
            }
        }
    }

    /// # merge with the stored entries
    /// keep the stored entries of tracks this driver has no fresh entry for.
    /// fresh entries always win.
    pub fn merge_stored(&mut self, stored: &[DriverTrackEntry]) {
        for entry in stored {
            if !self.records.iter().any(|e| e.track_slug == entry.track_slug) {
                self.upsert_record(entry.clone());
            }
        }
    }

    pub fn to_new(&self) -> Result<NewDriver, serde_json::Error> {
        Ok(NewDriver {
            slug: self.slug.clone(),
            name: self.name.clone(),
            profile_url: self.profile_url.clone(),
            records: serde_json::to_value(&self.records)?,
        })
    }

    /// # get the stored entries of a driver
    ///
    /// ## Arguments
    /// * `conn` - the database connection to use
    /// * `slug_in` - the slug of the driver
    ///
    /// ## Returns
    /// * `Vec<DriverTrackEntry>` - the stored entries, empty when the driver is new
    pub fn stored_records(conn: &mut PgConnection, slug_in: &str) -> QueryResult<Vec<DriverTrackEntry>> {
        use crate::schema::drivers::dsl::*;

        let stored: Option<serde_json::Value> = drivers
            .filter(slug.eq(slug_in))
            .select(records)
            .first::<serde_json::Value>(conn)
            .optional()?;

        match stored {
            Some(value) => serde_json::from_value(value)
                .map_err(|error| diesel::result::Error::DeserializationError(Box::new(error))),
            None => Ok(Vec::new()),
        }
    }

    /// # get the stored slugs
    /// the slug of every stored driver with the name and profile url it belongs to
    ///
    /// ## Arguments
    /// * `conn` - the database connection to use
    pub fn stored_slugs(conn: &mut PgConnection) -> QueryResult<Vec<StoredSlug>> {
        use crate::schema::drivers::dsl::*;

        let rows = drivers
            .select((slug, name, profile_url))
            .order(slug.asc())
            .load::<(String, String, String)>(conn)?;

        Ok(rows
            .into_iter()
            .map(|(slug_out, name_out, profile_url_out)| StoredSlug {
                slug: slug_out,
                name: name_out,
                profile_url: profile_url_out,
            })
            .collect())
    }

    /// # upsert a driver
    /// insert the driver or update the stored one. stored entries of tracks
    /// that are not part of this driver are kept.
    ///
    /// ## Arguments
    /// * `conn` - the database connection to use
    ///
    /// ## Returns
    /// * `Driver` - the driver as it is stored now
    pub fn upsert(&self, conn: &mut PgConnection) -> QueryResult<Driver> {
        conn.transaction(|conn| {
            let mut merged = self.clone();
            merged.merge_stored(&Driver::stored_records(conn, &self.slug)?);

            let new_driver = merged
                .to_new()
                .map_err(|error| diesel::result::Error::SerializationError(Box::new(error)))?;

            diesel::insert_into(drivers::table)
                .values(&new_driver)
                .on_conflict(drivers::slug)
                .do_update()
                .set(&new_driver)
                .execute(conn)?;

            Ok(merged)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(track_slug: &str, seconds: f64) -> DriverTrackEntry {
        DriverTrackEntry {
            track_slug: track_slug.to_string(),
            track_name: track_slug.to_string(),
            position: 1,
            time_seconds: seconds,
            best_time_str: String::new(),
            tier: Tier::C,
            percentile: 50.0,
            gap_seconds: 0.0,
            date: NaiveDate::from_ymd_opt(2025, 12, 27).unwrap(),
            max_kmh: None,
            max_g: None,
        }
    }

    #[test]
    fn one_entry_per_track() {
        let mut driver = Driver::new("ammar-hassan", "Ammar Hassan", "");
        driver.upsert_record(entry("sportzilla", 61.0));
        driver.upsert_record(entry("apex", 25.0));
        driver.upsert_record(entry("sportzilla", 60.5));

        assert_eq!(driver.records.len(), 2);
        assert_eq!(driver.records[0].track_slug, "apex");
        assert_eq!(driver.records[1].time_seconds, 60.5);
    }

    #[test]
    fn merge_keeps_stored_tracks_and_prefers_fresh() {
        let mut driver = Driver::new("ammar-hassan", "Ammar Hassan", "");
        driver.upsert_record(entry("sportzilla", 60.5));

        driver.merge_stored(&[entry("sportzilla", 70.0), entry("apex", 25.0)]);

        assert_eq!(driver.records.len(), 2);
        assert_eq!(driver.records[0].track_slug, "apex");
        assert_eq!(driver.records[1].time_seconds, 60.5);
    }

    #[test]
    fn records_serialize_in_camel_case() {
        let mut driver = Driver::new("ammar-hassan", "Ammar Hassan", "https://racefacer.com/p/1");
        driver.upsert_record(entry("apex", 25.0));

        let new_driver = driver.to_new().unwrap();
        assert_eq!(new_driver.records[0]["trackSlug"], "apex");
        assert_eq!(new_driver.records[0]["tier"], "C");
    }
}
