//! Shared state and named policy steps used by both composers.

use chrono::{DateTime, Utc};

use crate::models::contact::{ContactRecord, ContactStatus};
use crate::models::schedule::{PriorityLabel, ScheduleEntry, ScheduleParams};
use crate::models::settings::SchedulerSettings;
use crate::models::task::TaskRecord;
use crate::services::contact_suggestion::suggestion_reason;
use crate::services::priority::classify_contact;
use crate::services::{roster, schedule_utils, timezone};

pub const UNASSIGNED_SLOT_NAME: &str = "Unassigned slot";
pub const PLACEHOLDER_TIMEZONE_LABEL: &str = "UTC";

/// Start, deadline and call budget for one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleWindow {
    pub start: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub target: usize,
    pub duration_mins: i64,
    pub gap_mins: i64,
}

impl ScheduleWindow {
    pub fn resolve(
        params: &ScheduleParams,
        settings: &SchedulerSettings,
        now: DateTime<Utc>,
    ) -> Self {
        let start = params.start_time.unwrap_or(now);
        let deadline = resolve_deadline(params, settings, start);
        let duration_mins = params.call_duration_mins;
        let capacity =
            (schedule_utils::duration_minutes(start, deadline) / duration_mins.max(1)) as usize;

        let target = if params.fill_rest_of_day {
            capacity
        } else {
            params.total_calls.max(0) as usize
        };

        Self {
            start,
            deadline,
            target,
            duration_mins,
            gap_mins: settings.gap_minutes(params.fill_rest_of_day),
        }
    }

    /// True when not even one call fits between start and deadline.
    pub fn is_empty(&self) -> bool {
        self.target == 0 || !self.fits(self.start)
    }

    pub fn fits(&self, slot: DateTime<Utc>) -> bool {
        slot >= self.start && schedule_utils::add_minutes(slot, self.duration_mins) <= self.deadline
    }
}

/// In fill-rest-of-day mode the deadline is clamped to the configured UTC
/// end-of-day hour of the start day, unless that hour has already passed.
pub fn resolve_deadline(
    params: &ScheduleParams,
    settings: &SchedulerSettings,
    start: DateTime<Utc>,
) -> DateTime<Utc> {
    if !params.fill_rest_of_day {
        return params.deadline;
    }
    match schedule_utils::at_utc_hour(start, settings.fill_day_end_hour_utc) {
        Some(end_of_day) if end_of_day > start => params.deadline.min(end_of_day),
        _ => params.deadline,
    }
}

pub struct CompositionContext<'a> {
    pub params: &'a ScheduleParams,
    pub settings: &'a SchedulerSettings,
    pub window: ScheduleWindow,
    /// Roster after filtering, in caller order.
    pub eligible: Vec<&'a ContactRecord>,
    /// Unfiltered roster, used to resolve task contacts.
    pub roster: &'a [ContactRecord],
    pub tasks: &'a [TaskRecord],
    pub user_id: &'a str,
    pub goal_id: &'a str,
    pub now: DateTime<Utc>,
}

impl<'a> CompositionContext<'a> {
    pub fn classify(&self, contact: &ContactRecord) -> PriorityLabel {
        classify_contact(contact, self.now)
    }

    pub fn contact_entry(
        &self,
        contact: &ContactRecord,
        slot: DateTime<Utc>,
        label: PriorityLabel,
        notes: Option<String>,
    ) -> ScheduleEntry {
        ScheduleEntry {
            goal_id: self.goal_id.to_string(),
            scheduled_time: slot,
            contact_id: Some(contact.id.clone()),
            contact_name: contact.name.clone(),
            priority_label: label,
            contact_status: contact.status(),
            is_suggested: false,
            completed: false,
            call_duration_mins: self.window.duration_mins,
            timezone_label: contact.timezone.clone(),
            notes,
            display_order: 0,
            priority_rank: contact.priority_rank,
            user_id: self.user_id.to_string(),
        }
    }

    /// Unassigned slot: capacity with no resolved contact.
    pub fn placeholder_entry(&self, slot: DateTime<Utc>, notes: Option<&str>) -> ScheduleEntry {
        ScheduleEntry {
            goal_id: self.goal_id.to_string(),
            scheduled_time: slot,
            contact_id: None,
            contact_name: UNASSIGNED_SLOT_NAME.to_string(),
            priority_label: PriorityLabel::Cold,
            contact_status: ContactStatus::None,
            is_suggested: true,
            completed: false,
            call_duration_mins: self.window.duration_mins,
            timezone_label: PLACEHOLDER_TIMEZONE_LABEL.to_string(),
            notes: notes.map(str::to_string),
            display_order: 0,
            priority_rank: None,
            user_id: self.user_id.to_string(),
        }
    }

    /// The mandatory first call, placed at the literal start instant for the
    /// highest-priority eligible contact regardless of business hours. Falls
    /// back to an unassigned slot when the roster is empty.
    pub fn anchor_entry(&self) -> Option<ScheduleEntry> {
        if self.window.is_empty() {
            return None;
        }
        let start = self.window.start;
        let entry = match roster::sort_by_priority(&self.eligible, self.now).first() {
            Some(contact) => {
                let label = self.classify(contact);
                let reason = suggestion_reason(contact, label);
                self.contact_entry(contact, start, label, Some(reason.to_string()))
            }
            None => self.placeholder_entry(start, None),
        };
        Some(entry)
    }

    /// Whether a call for `contact` at `slot` lies fully in the contact's local business hours.
    pub fn in_contact_hours(&self, contact: &ContactRecord, slot: DateTime<Utc>) -> bool {
        timezone::fits_business_hours(slot, &contact.timezone, self.window.duration_mins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2025, 6, 16)
            .expect("valid date")
            .and_hms_opt(hour, minute, 0)
            .expect("valid time")
            .and_utc()
    }

    #[test]
    fn fill_day_clamps_deadline_to_end_of_day() {
        let mut params = ScheduleParams::new(at(23, 0), 30);
        params.fill_rest_of_day = true;
        let settings = SchedulerSettings::default();

        let window = ScheduleWindow::resolve(&params, &settings, at(13, 0));
        assert_eq!(window.deadline, at(17, 0));
        assert_eq!(window.target, 8);
        assert_eq!(window.gap_mins, 0);
    }

    #[test]
    fn fill_day_keeps_deadline_once_end_of_day_has_passed() {
        let mut params = ScheduleParams::new(at(22, 0), 30);
        params.fill_rest_of_day = true;
        let settings = SchedulerSettings::default();

        let window = ScheduleWindow::resolve(&params, &settings, at(18, 0));
        assert_eq!(window.deadline, at(22, 0));
        assert_eq!(window.target, 8);
    }

    #[test]
    fn quota_mode_uses_explicit_count_and_gap() {
        let mut params = ScheduleParams::new(at(12, 0), 30);
        params.total_calls = 5;
        params.start_time = Some(at(10, 0));
        let settings = SchedulerSettings::default();

        let window = ScheduleWindow::resolve(&params, &settings, at(9, 0));
        assert_eq!(window.start, at(10, 0));
        assert_eq!(window.deadline, at(12, 0));
        assert_eq!(window.target, 5);
        assert_eq!(window.gap_mins, 5);
    }

    #[test]
    fn past_deadline_yields_empty_window() {
        let params = ScheduleParams::new(at(9, 0), 30);
        let window = ScheduleWindow::resolve(&params, &SchedulerSettings::default(), at(10, 0));
        assert!(window.is_empty());

        let params = ScheduleParams::new(at(10, 0) + Duration::minutes(20), 30);
        let window = ScheduleWindow::resolve(&params, &SchedulerSettings::default(), at(10, 0));
        assert!(window.is_empty());
    }

    #[test]
    fn anchor_falls_back_to_placeholder_for_empty_roster() {
        let params = ScheduleParams::new(at(12, 0), 30);
        let settings = SchedulerSettings::default();
        let ctx = CompositionContext {
            params: &params,
            settings: &settings,
            window: ScheduleWindow::resolve(&params, &settings, at(3, 0)),
            eligible: Vec::new(),
            roster: &[],
            tasks: &[],
            user_id: "user",
            goal_id: "goal",
            now: at(3, 0),
        };

        let anchor = ctx.anchor_entry().expect("anchor");
        assert_eq!(anchor.scheduled_time, at(3, 0));
        assert!(anchor.is_placeholder());
        assert_eq!(anchor.contact_name, UNASSIGNED_SLOT_NAME);
    }
}
