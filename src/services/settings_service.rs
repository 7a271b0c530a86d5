use std::path::Path;

use serde_json::json;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::settings::SchedulerSettings;

const MAX_GAP_MINUTES: i64 = 24 * 60;

/// Loads scheduler settings from a YAML or JSON file. `None` yields defaults.
pub fn load_settings(path: Option<&Path>) -> AppResult<SchedulerSettings> {
    let Some(path) = path else {
        debug!(target: "app::settings", "no settings file, using defaults");
        return Ok(SchedulerSettings::default());
    };

    let raw = std::fs::read_to_string(path).map_err(|err| {
        AppError::config(format!("cannot read settings file {}: {err}", path.display()))
    })?;
    let settings = parse_settings(&raw, is_yaml(path))?;
    validate_settings(&settings)?;

    info!(target: "app::settings", path = %path.display(), "settings loaded");
    Ok(settings)
}

pub fn parse_settings(raw: &str, yaml: bool) -> AppResult<SchedulerSettings> {
    if raw.trim().is_empty() {
        return Ok(SchedulerSettings::default());
    }
    let settings: SchedulerSettings = if yaml {
        serde_yaml::from_str(raw)?
    } else {
        serde_json::from_str(raw)?
    };
    Ok(settings)
}

pub fn validate_settings(settings: &SchedulerSettings) -> AppResult<()> {
    if settings.max_slot_attempts == 0 {
        return Err(AppError::validation("maxSlotAttempts must be at least 1"));
    }
    if settings.max_consecutive_misses == 0 {
        return Err(AppError::validation("maxConsecutiveMisses must be at least 1"));
    }
    if settings.fill_day_end_hour_utc > 23 {
        return Err(AppError::validation_with_details(
            "fillDayEndHourUtc must be between 0 and 23",
            json!({ "fillDayEndHourUtc": settings.fill_day_end_hour_utc }),
        ));
    }
    let gap_range = 0..=MAX_GAP_MINUTES;
    if !gap_range.contains(&settings.quota_gap_minutes)
        || !gap_range.contains(&settings.fill_day_gap_minutes)
    {
        return Err(AppError::validation_with_details(
            format!("gap minutes must be between 0 and {MAX_GAP_MINUTES}"),
            json!({
                "quotaGapMinutes": settings.quota_gap_minutes,
                "fillDayGapMinutes": settings.fill_day_gap_minutes,
            }),
        ));
    }

    let weights = settings.priority_weights;
    let all = [weights.warm, weights.follow_up, weights.high_value, weights.cold];
    if all.iter().any(|w| !w.is_finite() || *w < 0.0) || weights.total() <= 0.0 {
        return Err(AppError::validation_with_details(
            "priority weights must be non-negative with a positive sum",
            json!({
                "warm": weights.warm,
                "followUp": weights.follow_up,
                "highValue": weights.high_value,
                "cold": weights.cold,
            }),
        ));
    }
    Ok(())
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
        .unwrap_or(false)
}
