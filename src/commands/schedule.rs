use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppResult;
use crate::models::contact::ContactRecord;
use crate::models::schedule::{ScheduleEntry, ScheduleParams};
use crate::models::settings::SchedulerSettings;
use crate::models::task::TaskRecord;
use crate::services::schedule_generator::ScheduleGenerator;

use super::CommandResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleGenerateRequest {
    pub params: ScheduleParams,
    #[serde(default)]
    pub contacts: Vec<ContactRecord>,
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
    pub user_id: String,
    pub goal_id: String,
    /// Reference instant; the current time is used when absent.
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
}

pub fn load_request(path: &Path) -> AppResult<ScheduleGenerateRequest> {
    let raw = std::fs::read_to_string(path)?;
    let request = serde_json::from_str(&raw)?;
    Ok(request)
}

pub fn schedule_generate(
    request: ScheduleGenerateRequest,
    settings: SchedulerSettings,
) -> CommandResult<Vec<ScheduleEntry>> {
    let now = request.now.unwrap_or_else(Utc::now);
    let generator = ScheduleGenerator::new(settings)?;
    let schedule = generator.generate_schedule(
        &request.params,
        &request.contacts,
        &request.user_id,
        &request.goal_id,
        &request.tasks,
        now,
    )?;

    info!(
        target: "app::command",
        user_id = %request.user_id,
        goal_id = %request.goal_id,
        entries = schedule.len(),
        "schedule_generate completed"
    );
    Ok(schedule)
}
