use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: String,
    pub task_type: TaskType,
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub contact_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    CallBack,
    Email,
    Meeting,
    #[serde(other)]
    Other,
}

impl TaskRecord {
    /// Open call-back task due inside `[start, deadline)`.
    pub fn is_pending_call_back(&self, start: DateTime<Utc>, deadline: DateTime<Utc>) -> bool {
        self.task_type == TaskType::CallBack
            && !self.completed
            && self.due_date >= start
            && self.due_date < deadline
    }
}
