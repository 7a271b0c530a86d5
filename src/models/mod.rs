pub mod contact;
pub mod schedule;
pub mod settings;
pub mod task;
