use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One roster entry as supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    pub timezone: String,
    #[serde(default)]
    pub is_jammed: bool,
    #[serde(default)]
    pub is_dead: bool,
    #[serde(default)]
    pub is_client: bool,
    #[serde(default)]
    pub is_traction: bool,
    #[serde(default)]
    pub follow_up_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority_rank: Option<i64>,
    /// Absent for bare roster entries that were never enriched with activity data.
    #[serde(default)]
    pub activity: Option<ContactActivity>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContactActivity {
    #[serde(default)]
    pub last_call_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_email_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_deals: i64,
    #[serde(default)]
    pub pending_tasks: i64,
    #[serde(default)]
    pub is_overdue: bool,
}

impl ContactActivity {
    /// The more recent of the last call and the last email.
    pub fn last_touch(&self) -> Option<DateTime<Utc>> {
        match (self.last_call_date, self.last_email_date) {
            (Some(call), Some(email)) => Some(call.max(email)),
            (call, email) => call.or(email),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    Jammed,
    Dead,
    Client,
    Traction,
    #[default]
    None,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::Jammed => "jammed",
            ContactStatus::Dead => "dead",
            ContactStatus::Client => "client",
            ContactStatus::Traction => "traction",
            ContactStatus::None => "none",
        }
    }
}

impl ContactRecord {
    /// Collapses the status flags with precedence jammed > dead > client > traction.
    pub fn status(&self) -> ContactStatus {
        if self.is_jammed {
            ContactStatus::Jammed
        } else if self.is_dead {
            ContactStatus::Dead
        } else if self.is_client {
            ContactStatus::Client
        } else if self.is_traction {
            ContactStatus::Traction
        } else {
            ContactStatus::None
        }
    }

    pub fn last_touch(&self) -> Option<DateTime<Utc>> {
        self.activity.as_ref().and_then(ContactActivity::last_touch)
    }
}
