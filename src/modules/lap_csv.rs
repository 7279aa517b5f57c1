use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use snafu::{ensure, ResultExt};

use crate::errors::{CsvSnafu, CustomResult, DomainSnafu, Error, FormatSnafu, MissingFileSnafu, ReadSnafu};
use crate::modules::helpers::lap_time::LapTime;

pub const REQUIRED_COLUMNS: [&str; 7] = [
    "Position",
    "Name",
    "Date",
    "Max km/h",
    "Max G",
    "Best Time",
    "Profile URL",
];

/// a row of the leaderboard export exactly as it is read from the file
#[derive(Debug, Deserialize)]
pub struct CsvLapRow {
    #[serde(rename = "Position")]
    pub position: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Max km/h")]
    pub max_kmh: String,
    #[serde(rename = "Max G")]
    pub max_g: String,
    #[serde(rename = "Best Time")]
    pub best_time: String,
    #[serde(rename = "Profile URL")]
    pub profile_url: String,
}

/// a validated leaderboard row
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LapRecord {
    pub line: u64,
    pub position: u32,
    pub driver_name: String,
    pub date: NaiveDate,
    pub max_speed_kph: Option<f64>,
    pub max_g: Option<f64>,
    pub best_time: String,
    pub best_time_seconds: f64,
    pub profile_url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SkippedRow {
    pub track: String,
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct LapCsv {
    pub records: Vec<LapRecord>,
    pub skipped: Vec<SkippedRow>,
}

impl LapCsv {
    /// # read a leaderboard export
    /// read all rows of the csv file of a track. rows that can not be parsed
    /// are skipped and returned in `skipped`, they never fail the whole file.
    ///
    /// ## Arguments
    /// * `track` - the name of the track, used when reporting skipped rows
    /// * `path` - the path of the csv file
    ///
    /// ## Returns
    /// * `LapCsv` - the parsed and the skipped rows
    pub fn read(track: &str, path: &Path) -> CustomResult<LapCsv> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                return MissingFileSnafu { path }.fail();
            }
            Err(error) => return Err(error).context(ReadSnafu { path }),
        };

        debug!(target: "lap_csv:read", "reading {}", path.display());
        LapCsv::from_reader(track, path, file)
    }

    /// parse csv data from any reader, `origin` only names the data in errors
    pub fn from_reader<R: std::io::Read>(track: &str, origin: &Path, reader: R) -> CustomResult<LapCsv> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers().context(CsvSnafu { path: origin })?.clone();
        for column in REQUIRED_COLUMNS {
            ensure!(
                headers.iter().any(|header| header == column),
                FormatSnafu {
                    value: headers.iter().collect::<Vec<&str>>().join(","),
                    reason: format!("missing column {column:?}"),
                }
            );
        }

        let mut lap_csv = LapCsv::default();
        for (index, row) in reader.records().enumerate() {
            // the header is line 1
            let fallback_line = index as u64 + 2;

            let parsed = row
                .map_err(|error| {
                    let line = error.position().map(|p| p.line()).unwrap_or(fallback_line);
                    (line, error.to_string())
                })
                .and_then(|record| {
                    let line = record.position().map(|p| p.line()).unwrap_or(fallback_line);
                    record
                        .deserialize::<CsvLapRow>(Some(&headers))
                        .map_err(|error| (line, error.to_string()))
                        .and_then(|row| LapRecord::from_row(line, row).map_err(|error| (line, error.to_string())))
                });

            match parsed {
                Ok(record) => lap_csv.records.push(record),
                Err((line, reason)) => {
                    warn!(target: "lap_csv:read", "skipping row {} of {}: {}", line, track, reason);
                    lap_csv.skipped.push(SkippedRow {
                        track: track.to_string(),
                        line,
                        reason,
                    });
                }
            }
        }

        Ok(lap_csv)
    }
}

impl LapRecord {
    pub fn from_row(line: u64, row: CsvLapRow) -> CustomResult<LapRecord> {
        ensure!(
            !row.name.is_empty(),
            FormatSnafu {
                value: row.name.clone(),
                reason: "driver name is empty",
            }
        );

        let position = row.position.parse::<u32>().ok().filter(|position| *position > 0);
        let position = match position {
            Some(position) => position,
            None => {
                return FormatSnafu {
                    value: row.position,
                    reason: "position must be a positive integer",
                }
                .fail()
            }
        };

        // a zero lap is a glitch in the export, not a world record
        let best_time_seconds = LapTime::parse(&row.best_time)?;
        ensure!(
            best_time_seconds > 0.0,
            DomainSnafu {
                reason: format!("best time {:?} is not above zero", row.best_time),
            }
        );

        Ok(LapRecord {
            line,
            position,
            date: parse_date(&row.date)?,
            max_speed_kph: parse_measurement(&row.max_kmh, "Max km/h")?,
            max_g: parse_measurement(&row.max_g, "Max G")?,
            best_time_seconds,
            best_time: row.best_time,
            driver_name: row.name,
            profile_url: row.profile_url,
        })
    }
}

/// parse a date formatted as `DD.MM.YYYY`, `YYYY-MM-DD` is accepted as well
pub fn parse_date(text: &str) -> CustomResult<NaiveDate> {
    NaiveDate::parse_from_str(text, "%d.%m.%Y")
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y-%m-%d"))
        .map_err(|error| Error::FormatError {
            value: text.to_string(),
            reason: format!("expected a date like DD.MM.YYYY ({error})"),
        })
}

/// parse an optional, non-negative measurement. empty cells are `None`
fn parse_measurement(text: &str, column: &str) -> CustomResult<Option<f64>> {
    if text.is_empty() {
        return Ok(None);
    }

    let value = text.parse::<f64>().map_err(|_| Error::FormatError {
        value: text.to_string(),
        reason: format!("{column} is not a number"),
    })?;

    ensure!(
        value.is_finite() && value >= 0.0,
        DomainSnafu {
            reason: format!("{column} must be a non-negative number, got {value}"),
        }
    );

    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Position,Name,Date,Max km/h,Max G,Best Time,Profile URL\n";

    fn read(body: &str) -> CustomResult<LapCsv> {
        LapCsv::from_reader("Apex Autodrome", Path::new("apex.csv"), format!("{HEADER}{body}").as_bytes())
    }

    #[test]
    fn parses_rows() {
        let csv = read(
            "1,Ammar Hassan,27.12.2025,62,1.4,00:25.026,https://www.racefacer.com/en/profile/ammar-hassan\n\
             2, Sara Ali ,2025-12-28,,,00:25.500,\n",
        )
        .unwrap();

        assert!(csv.skipped.is_empty());
        assert_eq!(csv.records.len(), 2);

        let first = &csv.records[0];
        assert_eq!(first.line, 2);
        assert_eq!(first.position, 1);
        assert_eq!(first.driver_name, "Ammar Hassan");
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2025, 12, 27).unwrap());
        assert_eq!(first.max_speed_kph, Some(62.0));
        assert_eq!(first.max_g, Some(1.4));
        assert_eq!(first.best_time_seconds, 25.026);

        let second = &csv.records[1];
        assert_eq!(second.driver_name, "Sara Ali");
        assert_eq!(second.date, NaiveDate::from_ymd_opt(2025, 12, 28).unwrap());
        assert_eq!(second.max_speed_kph, None);
        assert_eq!(second.profile_url, "");
    }

    #[test]
    fn skips_bad_rows_and_keeps_the_rest() {
        let csv = read(
            "1,Ammar Hassan,27.12.2025,62,1.4,00:25.026,\n\
             2,Sara Ali,27.12.2025,61,1.3,fast,\n\
             3,Bilal,27.12.2025,60,1.2,00:26.100,\n\
             0,Zero,27.12.2025,60,1.2,00:27.100,\n\
             5,Short,27.12.2025\n\
             6,Negative,27.12.2025,-3,1.2,00:28.000,\n\
             7,,27.12.2025,60,1.2,00:28.000,\n\
             8,Late,31.02.2025,60,1.2,00:29.000,\n",
        )
        .unwrap();

        let names: Vec<&str> = csv.records.iter().map(|r| r.driver_name.as_str()).collect();
        assert_eq!(names, vec!["Ammar Hassan", "Bilal"]);

        let lines: Vec<u64> = csv.skipped.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![3, 5, 6, 7, 8, 9]);
        assert!(csv.skipped.iter().all(|s| s.track == "Apex Autodrome"));
    }

    #[test]
    fn zero_lap_time_is_skipped() {
        let csv = read(
            "1,Glitch,27.12.2025,62,1.4,00:00.000,\n\
             2,Ammar Hassan,27.12.2025,61,1.3,00:25.000,\n",
        )
        .unwrap();

        assert_eq!(csv.records.len(), 1);
        assert_eq!(csv.records[0].driver_name, "Ammar Hassan");
        assert_eq!(csv.skipped.len(), 1);
        assert_eq!(csv.skipped[0].line, 2);
        assert!(csv.skipped[0].reason.contains("not above zero"));
    }

    #[test]
    fn missing_column_fails_the_file() {
        let result = LapCsv::from_reader(
            "Apex Autodrome",
            Path::new("apex.csv"),
            "Position,Name,Date,Best Time\n1,A,27.12.2025,00:25.000\n".as_bytes(),
        );
        assert!(matches!(result, Err(Error::FormatError { .. })));
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = LapCsv::read("Apex Autodrome", &dir.path().join("nope.csv"));
        assert!(matches!(result, Err(Error::MissingFileError { .. })));
    }

    #[test]
    fn parses_dates() {
        assert_eq!(parse_date("01.02.2024").unwrap(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(parse_date("2024-02-01").unwrap(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert!(matches!(parse_date("yesterday"), Err(Error::FormatError { .. })));
    }
}
