use std::time::Duration;

use chrono::{DateTime, NaiveDateTime};

use crate::error::{LoanlogError, Result};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S,%3f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parses the timestamp shapes the notification job writes. Offsets are
/// normalised to UTC and dropped.
pub fn parse_log_timestamp(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Some(ts.naive_utc());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
}

pub fn parse_duration_str(input: &str) -> Result<Duration> {
    humantime::parse_duration(input)
        .map_err(|e| LoanlogError::Parse(format!("invalid duration {input}: {e}")))
}

/// Floors `ts` to a multiple of `bucket` counted from the Unix epoch.
pub fn floor_to_bucket(ts: NaiveDateTime, bucket: Duration) -> NaiveDateTime {
    let secs = bucket.as_secs() as i64;
    if secs <= 0 {
        return ts;
    }
    let epoch = ts.and_utc().timestamp();
    let floored = epoch - epoch.rem_euclid(secs);
    DateTime::from_timestamp(floored, 0)
        .map(|dt| dt.naive_utc())
        .unwrap_or(ts)
}
