//! Normalization of run labels and timestamps
//!
//! Canonical keys use `r` + three digits for runs and `%Y%m%dT%H%M%SZ` for
//! timestamps. Acquisition systems write `run` + four digits and a two-digit
//! year without the `Z` marker.

use super::WILDCARD;
use crate::error::{KeyflowError, Result};
use chrono::{DateTime, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

pub const CANONICAL_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const LONG_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";
const DAQ_TIMESTAMP_FORMAT: &str = "%y%m%dT%H%M%S";

/// Marker that identifies an acquisition-style run label
pub const DAQ_RUN_MARKER: &str = "run";

static DAQ_RUN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^run(\d+)$").expect("Valid regex pattern"));
static CANONICAL_RUN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^r(\d+)$").expect("Valid regex pattern"));

pub fn is_canonical_timestamp(timestamp: &str) -> bool {
    timestamp.ends_with('Z')
}

/// Bring a timestamp into canonical form
///
/// Wildcards and values already ending in `Z` are returned as they are.
/// Accepted inputs are `20230101T000000`, `230101T000000` and unix seconds.
pub fn to_canonical_timestamp(timestamp: &str) -> Result<String> {
    if timestamp == WILDCARD || is_canonical_timestamp(timestamp) {
        return Ok(timestamp.to_string());
    }

    let invalid = || KeyflowError::InvalidTimestamp {
        value: timestamp.to_string(),
    };

    let parsed = if !timestamp.is_empty() && timestamp.bytes().all(|b| b.is_ascii_digit()) {
        let seconds: i64 = timestamp.parse().map_err(|_| invalid())?;
        DateTime::from_timestamp(seconds, 0)
            .ok_or_else(invalid)?
            .naive_utc()
    } else {
        let format = match timestamp.len() {
            15 => LONG_TIMESTAMP_FORMAT,
            13 => DAQ_TIMESTAMP_FORMAT,
            _ => return Err(invalid()),
        };
        NaiveDateTime::parse_from_str(timestamp, format).map_err(|_| invalid())?
    };

    Ok(parsed.format(CANONICAL_TIMESTAMP_FORMAT).to_string())
}

/// Seconds since the epoch of a canonical timestamp
pub fn unix_time(timestamp: &str) -> Result<i64> {
    NaiveDateTime::parse_from_str(timestamp, CANONICAL_TIMESTAMP_FORMAT)
        .map(|parsed| parsed.and_utc().timestamp())
        .map_err(|_| KeyflowError::InvalidTimestamp {
            value: timestamp.to_string(),
        })
}

/// Whether a run label still carries the acquisition-style marker
pub fn needs_run_conversion(run: &str) -> bool {
    run.contains(DAQ_RUN_MARKER)
}

fn renumber(run: &str, source: &Regex, prefix: &str, width: usize) -> String {
    source
        .captures(run)
        .and_then(|caps| caps[1].parse::<u64>().ok())
        .map(|number| format!("{prefix}{number:0width$}"))
        .unwrap_or_else(|| run.to_string())
}

/// `run0012` -> `r012`; anything else is returned unchanged
pub fn to_canonical_run(run: &str) -> String {
    renumber(run, &DAQ_RUN_REGEX, "r", 3)
}

/// `r012` -> `run0012`; anything else is returned unchanged
pub fn to_daq_run(run: &str) -> String {
    renumber(run, &CANONICAL_RUN_REGEX, DAQ_RUN_MARKER, 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_timestamp_passes_through() {
        assert_eq!(
            to_canonical_timestamp("20230101T000000Z").unwrap(),
            "20230101T000000Z"
        );
        assert_eq!(to_canonical_timestamp("*").unwrap(), "*");
    }

    #[test]
    fn test_daq_timestamp_is_converted() {
        assert_eq!(
            to_canonical_timestamp("220318T125534").unwrap(),
            "20220318T125534Z"
        );
        assert_eq!(
            to_canonical_timestamp("20220318T125534").unwrap(),
            "20220318T125534Z"
        );
    }

    #[test]
    fn test_unix_seconds_are_converted() {
        assert_eq!(to_canonical_timestamp("0").unwrap(), "19700101T000000Z");
        assert_eq!(
            to_canonical_timestamp("1672531200").unwrap(),
            "20230101T000000Z"
        );
    }

    #[test]
    fn test_garbage_timestamp_is_an_error() {
        for bad in ["yesterday", "2023-01-01", "231301T000000", ""] {
            assert!(
                matches!(
                    to_canonical_timestamp(bad),
                    Err(KeyflowError::InvalidTimestamp { .. })
                ),
                "{bad} should not convert"
            );
        }
    }

    #[test]
    fn test_unix_time() {
        assert_eq!(unix_time("20230101T000000Z").unwrap(), 1_672_531_200);
        assert!(unix_time("*").is_err());
    }

    #[test]
    fn test_run_conversions() {
        assert_eq!(to_canonical_run("run0012"), "r012");
        assert_eq!(to_canonical_run("run1"), "r001");
        assert_eq!(to_daq_run("r012"), "run0012");
        assert_eq!(to_daq_run("r000"), "run0000");
    }

    #[test]
    fn test_run_conversions_leave_other_labels() {
        assert_eq!(to_canonical_run("r012"), "r012");
        assert_eq!(to_daq_run("*"), "*");
        assert_eq!(to_daq_run("run0012"), "run0012");
        assert_eq!(to_canonical_run("runX"), "runX");
    }

    #[test]
    fn test_needs_run_conversion() {
        assert!(needs_run_conversion("run0001"));
        assert!(!needs_run_conversion("r001"));
        assert!(!needs_run_conversion("*"));
    }
}
