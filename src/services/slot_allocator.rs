use chrono::{DateTime, Utc};
use tracing::trace;

use crate::models::schedule::ScheduleEntry;
use crate::services::{schedule_utils, timezone};

/// True when `[candidate, candidate + duration)` intersects any placed entry.
pub fn has_conflict(
    candidate: DateTime<Utc>,
    duration_mins: i64,
    existing: &[ScheduleEntry],
) -> bool {
    first_conflict(candidate, duration_mins, existing).is_some()
}

/// The placed entry with the latest end among those intersecting the candidate interval.
pub fn first_conflict<'a>(
    candidate: DateTime<Utc>,
    duration_mins: i64,
    existing: &'a [ScheduleEntry],
) -> Option<&'a ScheduleEntry> {
    let end = schedule_utils::add_minutes(candidate, duration_mins);
    existing
        .iter()
        .filter(|entry| {
            schedule_utils::overlaps(candidate, end, entry.scheduled_time, entry.end_time())
        })
        .max_by_key(|entry| entry.end_time())
}

/// [`first_conflict`] over entries sorted by start that do not overlap each
/// other. Ends are then sorted too, so the scan starts at a binary search.
pub fn first_conflict_sorted<'a>(
    candidate: DateTime<Utc>,
    duration_mins: i64,
    sorted: &'a [ScheduleEntry],
) -> Option<&'a ScheduleEntry> {
    let end = schedule_utils::add_minutes(candidate, duration_mins);
    let from = sorted.partition_point(|entry| entry.end_time() <= candidate);
    sorted[from..]
        .iter()
        .take_while(|entry| entry.scheduled_time < end)
        .last()
}

/// Inserts `entry` keeping `entries` ordered by scheduled time.
pub fn insert_sorted(entries: &mut Vec<ScheduleEntry>, entry: ScheduleEntry) {
    let pos = entries.partition_point(|placed| placed.scheduled_time <= entry.scheduled_time);
    entries.insert(pos, entry);
}

#[derive(Debug, Clone, Copy)]
pub struct SlotRequest<'a> {
    pub timezone: &'a str,
    pub duration_mins: i64,
    pub deadline: DateTime<Utc>,
    pub gap_mins: i64,
    pub max_attempts: usize,
}

/// Walks forward from `start` to the first business-hours instant in the
/// requested zone that does not collide with `existing` and ends by the
/// deadline. Each collision advances the cursor by one call plus the gap.
pub fn find_next_available_slot(
    start: DateTime<Utc>,
    request: SlotRequest<'_>,
    existing: &[ScheduleEntry],
) -> Option<DateTime<Utc>> {
    let mut cursor = start;
    for attempt in 0..request.max_attempts {
        if cursor >= request.deadline {
            return None;
        }

        let candidate = timezone::next_available(cursor, request.timezone, request.duration_mins)?;
        if schedule_utils::add_minutes(candidate, request.duration_mins) > request.deadline {
            return None;
        }

        if !has_conflict(candidate, request.duration_mins, existing) {
            return Some(candidate);
        }

        trace!(
            target: "app::schedule::slots",
            attempt,
            candidate = %candidate,
            timezone = request.timezone,
            "slot taken, advancing"
        );
        cursor = schedule_utils::add_minutes(candidate, request.duration_mins + request.gap_mins);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::contact::ContactStatus;
    use crate::models::schedule::PriorityLabel;
    use chrono::NaiveDate;

    fn utc(hour: u32, minute: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2025, 5, 1)
            .expect("valid date")
            .and_hms_opt(hour, minute, 0)
            .expect("valid time")
            .and_utc()
    }

    fn entry_at(time: DateTime<Utc>, duration: i64) -> ScheduleEntry {
        ScheduleEntry {
            goal_id: "goal".into(),
            scheduled_time: time,
            contact_id: Some("c".into()),
            contact_name: "Placed".into(),
            priority_label: PriorityLabel::Cold,
            contact_status: ContactStatus::None,
            is_suggested: false,
            completed: false,
            call_duration_mins: duration,
            timezone_label: "GMT".into(),
            notes: None,
            display_order: 0,
            priority_rank: None,
            user_id: "user".into(),
        }
    }

    fn request(deadline: DateTime<Utc>, gap: i64) -> SlotRequest<'static> {
        SlotRequest {
            timezone: "GMT",
            duration_mins: 30,
            deadline,
            gap_mins: gap,
            max_attempts: 100,
        }
    }

    #[test]
    fn conflict_uses_each_entry_duration() {
        let placed = vec![entry_at(utc(10, 0), 45)];
        assert!(has_conflict(utc(10, 30), 30, &placed));
        assert!(!has_conflict(utc(10, 45), 30, &placed));
        assert!(!has_conflict(utc(9, 30), 30, &placed));
        assert!(has_conflict(utc(9, 31), 30, &placed));
    }

    #[test]
    fn sorted_lookup_agrees_with_full_scan() {
        let mut placed = Vec::new();
        for (hour, minute, duration) in [(11, 0, 30), (9, 0, 45), (10, 0, 30), (12, 0, 15)] {
            insert_sorted(&mut placed, entry_at(utc(hour, minute), duration));
        }
        let starts: Vec<_> = placed.iter().map(|e| e.scheduled_time).collect();
        assert_eq!(starts, vec![utc(9, 0), utc(10, 0), utc(11, 0), utc(12, 0)]);

        for minute in (8 * 60..13 * 60).step_by(5) {
            let candidate = utc(0, 0) + chrono::Duration::minutes(minute);
            let full = first_conflict(candidate, 40, &placed).map(|e| e.scheduled_time);
            let sorted = first_conflict_sorted(candidate, 40, &placed).map(|e| e.scheduled_time);
            assert_eq!(full, sorted, "candidate {candidate}");
        }
    }

    #[test]
    fn free_slot_is_returned_unchanged() {
        let slot = find_next_available_slot(utc(10, 0), request(utc(17, 0), 5), &[]);
        assert_eq!(slot, Some(utc(10, 0)));
    }

    #[test]
    fn conflicts_advance_by_duration_plus_gap() {
        let placed = vec![entry_at(utc(10, 0), 30), entry_at(utc(10, 35), 30)];
        let slot = find_next_available_slot(utc(10, 0), request(utc(17, 0), 5), &placed);
        assert_eq!(slot, Some(utc(11, 10)));

        let packed = vec![entry_at(utc(10, 0), 30)];
        let slot = find_next_available_slot(utc(10, 0), request(utc(17, 0), 0), &packed);
        assert_eq!(slot, Some(utc(10, 30)));
    }

    #[test]
    fn early_cursor_snaps_to_opening() {
        let slot = find_next_available_slot(utc(6, 0), request(utc(17, 0), 5), &[]);
        assert_eq!(slot, Some(utc(9, 0)));
    }

    #[test]
    fn deadline_and_closing_time_end_the_search() {
        let placed = vec![entry_at(utc(10, 0), 30)];
        assert_eq!(
            find_next_available_slot(utc(10, 0), request(utc(10, 50), 5), &placed),
            None
        );
        assert_eq!(
            find_next_available_slot(utc(16, 45), request(utc(20, 0), 5), &[]),
            None
        );
    }

    #[test]
    fn attempts_are_bounded() {
        let placed: Vec<_> = (0..4)
            .map(|i| entry_at(utc(9, 0) + chrono::Duration::minutes(35 * i), 30))
            .collect();
        let limited = SlotRequest {
            max_attempts: 3,
            ..request(utc(17, 0), 5)
        };
        assert_eq!(find_next_available_slot(utc(9, 0), limited, &placed), None);
        assert_eq!(
            find_next_available_slot(utc(9, 0), request(utc(17, 0), 5), &placed),
            Some(utc(11, 20))
        );
    }
}
