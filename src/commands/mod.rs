pub mod schedule;

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::error;

use crate::error::AppError;

pub type CommandResult<T> = Result<T, CommandError>;

/// Error payload handed back to callers of the command surface.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl CommandError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<JsonValue>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details,
        }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl From<AppError> for CommandError {
    fn from(error: AppError) -> Self {
        match error {
            AppError::Validation { message, details } => {
                CommandError::new("VALIDATION_ERROR", message, details)
            }
            AppError::Config { message } => CommandError::new("CONFIG_ERROR", message, None),
            AppError::Serialization(error) => {
                error!(target: "app::command", error = %error, "serialization error in command");
                CommandError::new("INVALID_PAYLOAD", error.to_string(), None)
            }
            AppError::Yaml(error) => {
                error!(target: "app::command", error = %error, "yaml error in command");
                CommandError::new("CONFIG_ERROR", error.to_string(), None)
            }
            AppError::Io(error) => {
                error!(target: "app::command", error = %error, "io error in command");
                CommandError::new("IO_ERROR", error.to_string(), None)
            }
            AppError::Other(message) => {
                error!(target: "app::command", %message, "unexpected error in command");
                CommandError::new("UNKNOWN", message, None)
            }
        }
    }
}
