use std::sync::OnceLock;

use regex::Regex;
use snafu::{ensure, OptionExt};

use crate::errors::{CustomResult, DomainSnafu, Error, FormatSnafu};

static LAP_TIME_PATTERN: OnceLock<Regex> = OnceLock::new();

pub struct LapTime {}

impl LapTime {
    /// the compiled lap time pattern, compiled once for all rows
    fn pattern() -> CustomResult<&'static Regex> {
        if let Some(pattern) = LAP_TIME_PATTERN.get() {
            return Ok(pattern);
        }

        let compiled = Regex::new(r"^(\d{1,6}):(\d{2})\.(\d{1,3})$").map_err(|error| Error::FormatError {
            value: "lap time pattern".to_string(),
            reason: error.to_string(),
        })?;
        Ok(LAP_TIME_PATTERN.get_or_init(|| compiled))
    }

    /// # parse a lap time
    /// parse a lap time formatted as `MM:SS.mmm` into seconds.
    /// the fraction may be one to three digits, the seconds must be two digits
    /// below 60.
    ///
    /// ## Arguments
    /// * `text` - the lap time, for example `01:01.518`
    ///
    /// ## Returns
    /// * `f64` - the lap time in seconds, for example `61.518`
    pub fn parse(text: &str) -> CustomResult<f64> {
        let captures = LapTime::pattern()?.captures(text.trim()).context(FormatSnafu {
            value: text,
            reason: "expected a lap time like MM:SS.mmm",
        })?;

        let minutes: u64 = LapTime::number(text, &captures[1])?;
        let seconds: u64 = LapTime::number(text, &captures[2])?;
        ensure!(
            seconds < 60,
            FormatSnafu {
                value: text,
                reason: "seconds must be below 60",
            }
        );

        // pad the fraction so `.5` reads as 500 milliseconds
        let fraction = format!("{:0<3}", &captures[3]);
        let millis: u64 = LapTime::number(text, &fraction)?;

        let total_millis = (minutes * 60 + seconds) * 1000 + millis;
        Ok(total_millis as f64 / 1000.0)
    }

    /// # format a lap time
    /// inverse of `parse`. the time is rounded to whole milliseconds.
    ///
    /// ## Arguments
    /// * `seconds` - the lap time in seconds, must not be negative
    ///
    /// ## Returns
    /// * `String` - the lap time formatted as `MM:SS.mmm`
    pub fn format(seconds: f64) -> CustomResult<String> {
        ensure!(
            seconds.is_finite() && seconds >= 0.0,
            DomainSnafu {
                reason: format!("lap time must be a positive number of seconds, got {seconds}"),
            }
        );

        let total_millis = (seconds * 1000.0).round() as u64;
        let minutes = total_millis / 60_000;
        let whole_seconds = (total_millis % 60_000) / 1000;
        let millis = total_millis % 1000;

        Ok(format!("{:02}:{:02}.{:03}", minutes, whole_seconds, millis))
    }

    fn number(text: &str, digits: &str) -> CustomResult<u64> {
        digits.parse::<u64>().ok().context(FormatSnafu {
            value: text,
            reason: "lap time component is not a number",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minutes_and_seconds() {
        assert_eq!(LapTime::parse("01:01.518").unwrap(), 61.518);
        assert_eq!(LapTime::parse("00:25.026").unwrap(), 25.026);
        assert_eq!(LapTime::parse("00:25.5").unwrap(), 25.5);
        assert_eq!(LapTime::parse("12:00.000").unwrap(), 720.0);
    }

    #[test]
    fn format_is_inverse_of_parse() {
        for text in ["01:01.518", "00:25.026", "00:59.999", "02:00.001", "10:07.090", "00:00.000"] {
            let seconds = LapTime::parse(text).unwrap();
            assert_eq!(LapTime::format(seconds).unwrap(), text);
        }
    }

    #[test]
    fn rejects_malformed_times() {
        for text in ["61.518", "abc", "01-01.518", "01:1.518", "01:61.000", "01:01", "", "aa:bb.ccc", "01:01.5180"] {
            let result = LapTime::parse(text);
            assert!(
                matches!(result, Err(Error::FormatError { .. })),
                "{text:?} should not parse"
            );
        }
    }

    #[test]
    fn format_rejects_negative_seconds() {
        assert!(matches!(LapTime::format(-0.5), Err(Error::DomainError { .. })));
        assert!(matches!(LapTime::format(f64::NAN), Err(Error::DomainError { .. })));
    }

    #[test]
    fn format_rounds_to_milliseconds() {
        assert_eq!(LapTime::format(61.5184).unwrap(), "01:01.518");
        assert_eq!(LapTime::format(59.9996).unwrap(), "01:00.000");
    }
}
