pub mod composition;
pub mod contact_suggestion;
pub mod priority;
pub mod roster;
pub mod schedule_generator;
pub mod schedule_utils;
pub mod settings_service;
pub mod simple_composer;
pub mod slot_allocator;
pub mod timezone;
pub mod weighted_composer;
