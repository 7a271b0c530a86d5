//! Static timezone table and the business-hours oracle built on it.
//!
//! Offsets are fixed: there is no daylight-saving or historical offset
//! awareness. Unknown identifiers resolve to UTC+0 with a 17:00 close.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use once_cell::sync::Lazy;

use crate::services::schedule_utils;

pub const BUSINESS_START_HOUR: u32 = 9;
pub const DEFAULT_END_OF_BUSINESS_HOUR: u32 = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimezoneInfo {
    pub utc_offset_minutes: i32,
    pub end_of_business_hour: u32,
}

impl TimezoneInfo {
    const fn new(utc_offset_minutes: i32) -> Self {
        Self {
            utc_offset_minutes,
            end_of_business_hour: DEFAULT_END_OF_BUSINESS_HOUR,
        }
    }

    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .unwrap_or_else(|| FixedOffset::east_opt(0).expect("UTC offset should exist"))
    }
}

const DEFAULT_ZONE: TimezoneInfo = TimezoneInfo::new(0);

static TIMEZONE_TABLE: Lazy<HashMap<String, TimezoneInfo>> = Lazy::new(|| {
    let mut table = HashMap::new();
    for hours in -12..=14 {
        let key = match hours {
            0 => "GMT".to_string(),
            h if h > 0 => format!("GMT+{h}"),
            h => format!("GMT{h}"),
        };
        table.insert(key, TimezoneInfo::new(hours * 60));
    }
    for (key, minutes) in [
        ("UTC", 0),
        ("WET", 0),
        ("BST", 60),
        ("CET", 60),
        ("EET", 120),
        ("MSK", 180),
        ("GST", 240),
        ("PKT", 300),
        ("IST", 330),
        ("NPT", 345),
        ("ICT", 420),
        ("SGT", 480),
        ("HKT", 480),
        ("AWST", 480),
        ("JST", 540),
        ("KST", 540),
        ("ACST", 570),
        ("AEST", 600),
        ("NZST", 720),
        ("BRT", -180),
        ("NST", -210),
        ("AST", -240),
        ("EST", -300),
        ("CST", -360),
        ("MST", -420),
        ("PST", -480),
        ("AKST", -540),
        ("HST", -600),
    ] {
        table.insert(key.to_string(), TimezoneInfo::new(minutes));
    }
    table
});

/// Resolves a timezone id, falling back to UTC+0 for unknown ids.
pub fn lookup(tz_id: &str) -> TimezoneInfo {
    TIMEZONE_TABLE
        .get(tz_id.trim())
        .copied()
        .unwrap_or(DEFAULT_ZONE)
}

pub fn is_known(tz_id: &str) -> bool {
    TIMEZONE_TABLE.contains_key(tz_id.trim())
}

pub fn to_local(instant: DateTime<Utc>, tz_id: &str) -> DateTime<FixedOffset> {
    instant.with_timezone(&lookup(tz_id).offset())
}

/// Local time-of-day lies in `[09:00, end_of_business)`.
pub fn is_business_hours(instant: DateTime<Utc>, tz_id: &str) -> bool {
    let info = lookup(tz_id);
    let minute = schedule_utils::midnight_minutes_of(to_local(instant, tz_id));
    minute >= (BUSINESS_START_HOUR * 60) as i64 && minute < (info.end_of_business_hour * 60) as i64
}

/// Earliest instant at or after `instant` at which a call of `duration_mins`
/// fits into today's local business window, or `None` when the window has
/// no room left today.
pub fn next_available(
    instant: DateTime<Utc>,
    tz_id: &str,
    duration_mins: i64,
) -> Option<DateTime<Utc>> {
    let info = lookup(tz_id);
    let date = local_date(instant, tz_id);
    let opening = local_instant(date, BUSINESS_START_HOUR, &info)?;
    let close = local_instant(date, info.end_of_business_hour, &info)?;

    let candidate = instant.max(opening);
    (schedule_utils::add_minutes(candidate, duration_mins) <= close).then_some(candidate)
}

/// UTC instant of the zone's local close on `reference_date`.
pub fn end_of_business_utc(tz_id: &str, reference_date: NaiveDate) -> DateTime<Utc> {
    let info = lookup(tz_id);
    local_instant(reference_date, info.end_of_business_hour, &info)
        .unwrap_or_else(|| reference_date.and_time(NaiveTime::MIN).and_utc())
}

/// Whole call `[instant, instant + duration)` sits inside the local business window.
pub fn fits_business_hours(instant: DateTime<Utc>, tz_id: &str, duration_mins: i64) -> bool {
    is_business_hours(instant, tz_id) && next_available(instant, tz_id, duration_mins) == Some(instant)
}

pub fn local_date(instant: DateTime<Utc>, tz_id: &str) -> NaiveDate {
    to_local(instant, tz_id).date_naive()
}

fn local_instant(date: NaiveDate, hour: u32, info: &TimezoneInfo) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(hour, 0, 0)?;
    info.offset()
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(year, month, day)
            .expect("valid date")
            .and_hms_opt(hour, minute, 0)
            .expect("valid time")
            .and_utc()
    }

    #[test]
    fn unknown_zone_falls_back_to_utc() {
        assert_eq!(lookup("Mars/Olympus"), DEFAULT_ZONE);
        assert!(!is_known("Mars/Olympus"));
        assert!(is_business_hours(utc(2025, 3, 4, 10, 0), "Mars/Olympus"));
        assert!(!is_business_hours(utc(2025, 3, 4, 17, 0), "Mars/Olympus"));
    }

    #[test]
    fn to_local_applies_fixed_offset() {
        let local = to_local(utc(2025, 3, 4, 23, 30), "GMT+8");
        assert_eq!(local.date_naive(), NaiveDate::from_ymd_opt(2025, 3, 5).unwrap());
        assert_eq!(schedule_utils::midnight_minutes_of(local), 7 * 60 + 30);

        let local = to_local(utc(2025, 3, 4, 12, 0), "IST");
        assert_eq!(schedule_utils::midnight_minutes_of(local), 17 * 60 + 30);
    }

    #[test]
    fn business_window_is_half_open() {
        // 01:00 UTC is 09:00 in GMT+8
        assert!(is_business_hours(utc(2025, 3, 4, 1, 0), "GMT+8"));
        assert!(is_business_hours(utc(2025, 3, 4, 8, 59), "GMT+8"));
        assert!(!is_business_hours(utc(2025, 3, 4, 9, 0), "GMT+8"));
        assert!(!is_business_hours(utc(2025, 3, 4, 0, 59), "GMT+8"));
    }

    #[test]
    fn next_available_snaps_to_local_opening() {
        // 12:00 UTC is 07:00 EST
        let slot = next_available(utc(2025, 3, 4, 12, 0), "EST", 30);
        assert_eq!(slot, Some(utc(2025, 3, 4, 14, 0)));
    }

    #[test]
    fn next_available_keeps_instant_inside_window() {
        let slot = next_available(utc(2025, 3, 4, 15, 10), "EST", 30);
        assert_eq!(slot, Some(utc(2025, 3, 4, 15, 10)));
    }

    #[test]
    fn next_available_rejects_calls_running_past_close() {
        // 21:45 UTC is 16:45 EST
        assert_eq!(next_available(utc(2025, 3, 4, 21, 45), "EST", 30), None);
        assert_eq!(
            next_available(utc(2025, 3, 4, 21, 30), "EST", 30),
            Some(utc(2025, 3, 4, 21, 30))
        );
        assert_eq!(next_available(utc(2025, 3, 4, 23, 0), "EST", 5), None);
    }

    #[test]
    fn sub_minute_start_cannot_run_past_close() {
        assert_eq!(
            next_available(utc(2025, 3, 4, 16, 30), "GMT", 30),
            Some(utc(2025, 3, 4, 16, 30))
        );
        let late = utc(2025, 3, 4, 16, 30) + chrono::Duration::seconds(30);
        assert_eq!(next_available(late, "GMT", 30), None);
        assert!(!fits_business_hours(late, "GMT", 30));
        assert!(is_business_hours(late, "GMT"));

        let early = utc(2025, 3, 4, 8, 59) + chrono::Duration::seconds(30);
        assert_eq!(next_available(early, "GMT", 30), Some(utc(2025, 3, 4, 9, 0)));
    }

    #[test]
    fn end_of_business_orders_zones_by_closing_time() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        assert_eq!(end_of_business_utc("GMT+8", date), utc(2025, 3, 4, 9, 0));
        assert_eq!(end_of_business_utc("CET", date), utc(2025, 3, 4, 16, 0));
        assert_eq!(end_of_business_utc("PST", date), utc(2025, 3, 5, 1, 0));
        assert!(end_of_business_utc("GMT+8", date) < end_of_business_utc("CET", date));
    }

    #[test]
    fn fits_business_hours_checks_the_whole_call() {
        assert!(fits_business_hours(utc(2025, 3, 4, 16, 30), "GMT", 30));
        assert!(!fits_business_hours(utc(2025, 3, 4, 16, 45), "GMT", 30));
        assert!(!fits_business_hours(utc(2025, 3, 4, 8, 45), "GMT", 30));
    }
}
