pub mod commands;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use crate::error::{AppError, AppResult};
pub use crate::services::schedule_generator::{generate_schedule, ScheduleGenerator};
