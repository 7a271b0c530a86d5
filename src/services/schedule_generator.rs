use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::contact::ContactRecord;
use crate::models::schedule::{ScheduleEntry, ScheduleParams};
use crate::models::settings::SchedulerSettings;
use crate::models::task::TaskRecord;
use crate::services::composition::{CompositionContext, ScheduleWindow};
use crate::services::settings_service::validate_settings;
use crate::services::{roster, simple_composer, weighted_composer};

/// Longest single call accepted, one full day.
pub const MAX_CALL_DURATION_MINS: i64 = 24 * 60;

/// Builds call schedules. Holds no state besides its settings, so a single
/// generator can serve any number of concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct ScheduleGenerator {
    settings: SchedulerSettings,
}

impl ScheduleGenerator {
    pub fn new(settings: SchedulerSettings) -> AppResult<Self> {
        validate_settings(&settings)?;
        Ok(Self { settings })
    }

    /// Produces an ordered, non-overlapping list of call slots.
    ///
    /// `now` is the reference instant for classification, deferral and the
    /// default start time; the system clock is never consulted. Only contract
    /// violations in `params` produce an error.
    pub fn generate_schedule(
        &self,
        params: &ScheduleParams,
        contacts: &[ContactRecord],
        user_id: &str,
        goal_id: &str,
        tasks: &[TaskRecord],
        now: DateTime<Utc>,
    ) -> AppResult<Vec<ScheduleEntry>> {
        validate_params(params)?;

        let window = ScheduleWindow::resolve(params, &self.settings, now);
        debug!(
            target: "app::schedule",
            start = %window.start,
            deadline = %window.deadline,
            target = window.target,
            simple_mode = params.simple_mode,
            fill_rest_of_day = params.fill_rest_of_day,
            "schedule window resolved"
        );

        let ctx = CompositionContext {
            params,
            settings: &self.settings,
            window,
            eligible: roster::filter_roster(contacts, params, now.date_naive()),
            roster: contacts,
            tasks,
            user_id,
            goal_id,
            now,
        };

        let entries = if params.simple_mode {
            simple_composer::compose(&ctx)
        } else {
            weighted_composer::compose(&ctx)
        };
        let schedule = finalize(entries);

        info!(
            target: "app::schedule",
            goal_id,
            entries = schedule.len(),
            placeholders = schedule.iter().filter(|entry| entry.is_placeholder()).count(),
            requested = window.target,
            "schedule generated"
        );
        Ok(schedule)
    }
}

/// Convenience wrapper running the default settings.
pub fn generate_schedule(
    params: &ScheduleParams,
    contacts: &[ContactRecord],
    user_id: &str,
    goal_id: &str,
    tasks: &[TaskRecord],
    now: DateTime<Utc>,
) -> AppResult<Vec<ScheduleEntry>> {
    ScheduleGenerator::default().generate_schedule(params, contacts, user_id, goal_id, tasks, now)
}

pub fn validate_params(params: &ScheduleParams) -> AppResult<()> {
    if params.call_duration_mins < 1 {
        return Err(AppError::validation_with_details(
            "callDurationMins must be at least 1",
            json!({ "callDurationMins": params.call_duration_mins }),
        ));
    }
    if params.call_duration_mins > MAX_CALL_DURATION_MINS {
        return Err(AppError::validation_with_details(
            format!("callDurationMins must not exceed {MAX_CALL_DURATION_MINS}"),
            json!({
                "callDurationMins": params.call_duration_mins,
                "max": MAX_CALL_DURATION_MINS,
            }),
        ));
    }
    if !params.fill_rest_of_day && params.total_calls < 1 {
        return Err(AppError::validation_with_details(
            "totalCalls must be at least 1",
            json!({ "totalCalls": params.total_calls }),
        ));
    }
    Ok(())
}

/// Sorts by scheduled time and renumbers `display_order` to match.
pub fn finalize(mut entries: Vec<ScheduleEntry>) -> Vec<ScheduleEntry> {
    entries.sort_by_key(|entry| entry.scheduled_time);
    for (idx, entry) in entries.iter_mut().enumerate() {
        entry.display_order = idx;
    }
    entries
}
