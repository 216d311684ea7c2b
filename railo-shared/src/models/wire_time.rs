//! Timestamps as the reservation service writes them.
//!
//! The service emits either RFC 3339 strings or zone-less local timestamps
//! (`2025-07-10T14:30:00`). Zone-less values are in the service's local time,
//! which is KST (UTC+9).

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

pub const SERVICE_UTC_OFFSET_HOURS: i64 = 9;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, NAIVE_FORMATS[0])
        .or_else(|_| NaiveDateTime::parse_from_str(raw, NAIVE_FORMATS[1]))
        .map(|naive| (naive - Duration::hours(SERVICE_UTC_OFFSET_HOURS)).and_utc())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(serde::de::Error::custom)
}
