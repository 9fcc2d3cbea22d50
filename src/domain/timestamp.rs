// Timestamp encodings shared by the fetcher and the data endpoint
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use thiserror::Error;

/// `YYYYMMDDHHMMSS`, used in outbound query parameters
const COMPACT_FORMAT: &str = "%Y%m%d%H%M%S";
/// Format of the timestamps in `/data` responses
const RESPONSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimestampError {
    #[error("Invalid timestamp {0} doesn't match compact ISO format")]
    NotCompact(String),
    #[error("Invalid timestamp {0} in response")]
    BadResponseTimestamp(String),
    #[error("Timedelta {0} doesn't adhere to standard format")]
    BadRelative(String),
    #[error("No timestamp found")]
    Empty,
}

/// Encode an instant as a compact timestamp. Sub-second precision is dropped.
pub fn to_compact(ts: DateTime<Utc>) -> String {
    ts.format(COMPACT_FORMAT).to_string()
}

pub fn parse_compact(s: &str) -> Result<DateTime<Utc>, TimestampError> {
    // chrono accepts short fields, the wire format does not
    if s.len() != 14 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimestampError::NotCompact(s.to_string()));
    }
    NaiveDateTime::parse_from_str(s, COMPACT_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| TimestampError::NotCompact(s.to_string()))
}

pub fn to_response(ts: DateTime<Utc>) -> String {
    ts.format(RESPONSE_FORMAT).to_string()
}

/// Parse a timestamp from a `/data` response.
///
/// Accepts `YYYY-MM-DD HH:MM:SS[.ffffff]` with an optional trailing `UTC`,
/// always interpreted as UTC, and falls back to RFC 3339.
pub fn parse_response(s: &str) -> Result<DateTime<Utc>, TimestampError> {
    let trimmed = s.trim();
    let naive_part = trimmed.strip_suffix("UTC").unwrap_or(trimmed).trim_end();

    if let Ok(naive) = NaiveDateTime::parse_from_str(naive_part, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| TimestampError::BadResponseTimestamp(s.to_string()))
}

/// Parse a query bound: either a compact timestamp or an offset into the
/// past relative to `now`, such as `-1h5m` or `-2w3d`.
pub fn parse_query_bound(s: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, TimestampError> {
    if s.is_empty() {
        return Err(TimestampError::Empty);
    }
    match s.strip_prefix('-') {
        Some(offset) => now
            .checked_sub_signed(parse_offset(offset)?)
            .ok_or_else(|| TimestampError::BadRelative(s.to_string())),
        None => parse_compact(s),
    }
}

/// Units in the order they must appear, each at most once. A unit is its
/// letter, optionally followed by the rest of its name and a plural `s`.
const OFFSET_UNITS: [(char, &str, i64); 5] = [
    ('w', "eek", 7 * 86_400),
    ('d', "ay", 86_400),
    ('h', "our", 3_600),
    ('m', "in", 60),
    ('s', "ec", 1),
];

fn parse_offset(s: &str) -> Result<Duration, TimestampError> {
    let bad = || TimestampError::BadRelative(s.to_string());

    let mut rest = s;
    let mut next_unit = 0;
    let mut seconds = 0i64;
    let mut matched = false;

    while !rest.is_empty() {
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return Err(bad());
        }
        let amount: i64 = rest[..digits].parse().map_err(|_| bad())?;
        let unit = rest[digits..]
            .chars()
            .next()
            .map(|c| c.to_ascii_lowercase())
            .ok_or_else(bad)?;
        let position = OFFSET_UNITS[next_unit..]
            .iter()
            .position(|(u, _, _)| *u == unit)
            .ok_or_else(bad)?;
        let (_, long_name, scale) = OFFSET_UNITS[next_unit + position];
        seconds = amount
            .checked_mul(scale)
            .and_then(|v| v.checked_add(seconds))
            .ok_or_else(bad)?;
        next_unit += position + 1;
        matched = true;

        rest = &rest[digits + unit.len_utf8()..];
        if let Some(tail) = strip_prefix_ignore_case(rest, long_name) {
            rest = strip_prefix_ignore_case(tail, "s").unwrap_or(tail);
        }
    }

    if !matched {
        return Err(bad());
    }
    Duration::try_seconds(seconds).ok_or_else(bad)
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}
