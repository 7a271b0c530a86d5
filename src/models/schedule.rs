use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::contact::ContactStatus;
use crate::services::schedule_utils;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PriorityLabel {
    Warm,
    #[serde(rename = "Follow-Up")]
    FollowUp,
    #[serde(rename = "High Value")]
    HighValue,
    Cold,
}

impl PriorityLabel {
    /// Placement order, most urgent first.
    pub const ORDERED: [PriorityLabel; 4] = [
        PriorityLabel::Warm,
        PriorityLabel::FollowUp,
        PriorityLabel::HighValue,
        PriorityLabel::Cold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityLabel::Warm => "Warm",
            PriorityLabel::FollowUp => "Follow-Up",
            PriorityLabel::HighValue => "High Value",
            PriorityLabel::Cold => "Cold",
        }
    }

    pub fn rank(&self) -> u8 {
        match self {
            PriorityLabel::Warm => 0,
            PriorityLabel::FollowUp => 1,
            PriorityLabel::HighValue => 2,
            PriorityLabel::Cold => 3,
        }
    }
}

impl fmt::Display for PriorityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleParams {
    #[serde(default = "default_total_calls")]
    pub total_calls: i64,
    #[serde(default, rename = "startTimeUTC", alias = "startTime")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(rename = "deadlineUTC", alias = "deadline")]
    pub deadline: DateTime<Utc>,
    pub call_duration_mins: i64,
    #[serde(default)]
    pub fill_rest_of_day: bool,
    #[serde(default)]
    pub simple_mode: bool,
    /// Allow-list over [`ContactStatus`]; empty means every status except jammed and dead.
    #[serde(default)]
    pub status_filters: Vec<ContactStatus>,
    #[serde(default)]
    pub excluded_countries: Vec<String>,
    #[serde(default)]
    pub included_timezones: Vec<String>,
}

fn default_total_calls() -> i64 {
    1
}

impl ScheduleParams {
    pub fn new(deadline: DateTime<Utc>, call_duration_mins: i64) -> Self {
        Self {
            total_calls: default_total_calls(),
            start_time: None,
            deadline,
            call_duration_mins,
            fill_rest_of_day: false,
            simple_mode: false,
            status_filters: Vec::new(),
            excluded_countries: Vec::new(),
            included_timezones: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub goal_id: String,
    pub scheduled_time: DateTime<Utc>,
    #[serde(default)]
    pub contact_id: Option<String>,
    pub contact_name: String,
    pub priority_label: PriorityLabel,
    pub contact_status: ContactStatus,
    pub is_suggested: bool,
    pub completed: bool,
    pub call_duration_mins: i64,
    pub timezone_label: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub display_order: usize,
    #[serde(default)]
    pub priority_rank: Option<i64>,
    pub user_id: String,
}

impl ScheduleEntry {
    pub fn end_time(&self) -> DateTime<Utc> {
        schedule_utils::add_minutes(self.scheduled_time, self.call_duration_mins)
    }

    pub fn is_placeholder(&self) -> bool {
        self.contact_id.is_none() && self.is_suggested
    }
}
