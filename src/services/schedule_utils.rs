use chrono::{DateTime, Duration, FixedOffset, NaiveTime, Timelike, Utc};
use serde_json::json;

use crate::error::{AppError, AppResult};

pub fn parse_datetime(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| {
            AppError::validation_with_details(
                "invalid datetime format",
                json!({"value": value, "error": err.to_string()}),
            )
        })
}

/// Saturates at the latest representable instant instead of overflowing.
pub fn add_minutes(dt: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
    Duration::try_minutes(minutes)
        .and_then(|delta| dt.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Whole minutes between `start` and `end`, zero when `end` is not after `start`.
pub fn duration_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    end.signed_duration_since(start).num_minutes().max(0)
}

/// Half-open interval intersection: `[a_start, a_end)` and `[b_start, b_end)`.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

pub fn midnight_minutes_of(dt: DateTime<FixedOffset>) -> i64 {
    let time = dt.time();
    (time.hour() as i64) * 60 + (time.minute() as i64)
}

pub fn at_utc_hour(dt: DateTime<Utc>, hour: u32) -> Option<DateTime<Utc>> {
    let time = NaiveTime::from_hms_opt(hour, 0, 0)?;
    Some(dt.date_naive().and_time(time).and_utc())
}
