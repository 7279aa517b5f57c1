use std::path::PathBuf;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// a time string, csv row or header that does not have the expected shape
    #[snafu(display("malformed value {value:?}: {reason}"))]
    FormatError { value: String, reason: String },

    /// numeric input outside of its domain (negative seconds, empty population, ...)
    #[snafu(display("invalid numeric input: {reason}"))]
    DomainError { reason: String },

    #[snafu(display("store unreachable: {message}"))]
    ConnectivityError { message: String },

    #[snafu(display("csv file not found: {}", path.display()))]
    MissingFileError { path: PathBuf },

    #[snafu(display("failed reading {}: {source}", path.display()))]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed parsing csv {}: {source}", path.display()))]
    CsvError { path: PathBuf, source: csv::Error },

    #[snafu(display("store rejected write of {target}: {source}"))]
    StoreError {
        target: String,
        source: diesel::result::Error,
    },

    #[snafu(display("failed serializing {target}: {source}"))]
    SerializationError {
        target: String,
        source: serde_json::Error,
    },

    #[snafu(display("invalid configuration: {reason}"))]
    ConfigError { reason: String },
}

impl Error {
    /// errors that abort a whole sync run instead of a single track or row
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ConnectivityError { .. }
                | Error::StoreError { .. }
                | Error::SerializationError { .. }
                | Error::ConfigError { .. }
        )
    }
}

pub type CustomResult<T> = Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_failures_are_fatal() {
        let error = Error::ConnectivityError {
            message: "connection refused".to_string(),
        };
        assert!(error.is_fatal());
    }

    #[test]
    fn track_failures_are_not_fatal() {
        let missing = Error::MissingFileError {
            path: PathBuf::from("data/missing.csv"),
        };
        let format = Error::FormatError {
            value: "1:2".to_string(),
            reason: "no fraction".to_string(),
        };

        assert!(!missing.is_fatal());
        assert!(!format.is_fatal());
        assert_eq!(missing.to_string(), "csv file not found: data/missing.csv");
    }
}
