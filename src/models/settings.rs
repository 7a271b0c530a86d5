use serde::{Deserialize, Serialize};

use crate::models::schedule::PriorityLabel;

pub const DEFAULT_QUOTA_GAP_MINUTES: i64 = 5;
pub const DEFAULT_FILL_DAY_GAP_MINUTES: i64 = 0;
pub const DEFAULT_MAX_SLOT_ATTEMPTS: usize = 100;
pub const DEFAULT_MAX_CONSECUTIVE_MISSES: usize = 20;
pub const DEFAULT_FILL_DAY_END_HOUR_UTC: u32 = 17;

// Absorbs float noise so an exact share such as 10 * 0.30 does not round up.
const SHARE_EPSILON: f64 = 1e-9;

/// Tunables for schedule composition. Every field falls back to its default
/// when missing from a settings file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulerSettings {
    pub quota_gap_minutes: i64,
    pub fill_day_gap_minutes: i64,
    pub max_slot_attempts: usize,
    pub max_consecutive_misses: usize,
    pub fill_day_end_hour_utc: u32,
    pub priority_weights: PriorityWeights,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            quota_gap_minutes: DEFAULT_QUOTA_GAP_MINUTES,
            fill_day_gap_minutes: DEFAULT_FILL_DAY_GAP_MINUTES,
            max_slot_attempts: DEFAULT_MAX_SLOT_ATTEMPTS,
            max_consecutive_misses: DEFAULT_MAX_CONSECUTIVE_MISSES,
            fill_day_end_hour_utc: DEFAULT_FILL_DAY_END_HOUR_UTC,
            priority_weights: PriorityWeights::default(),
        }
    }
}

impl SchedulerSettings {
    pub fn gap_minutes(&self, fill_rest_of_day: bool) -> i64 {
        if fill_rest_of_day {
            self.fill_day_gap_minutes
        } else {
            self.quota_gap_minutes
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PriorityWeights {
    pub warm: f64,
    pub follow_up: f64,
    pub high_value: f64,
    pub cold: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            warm: 0.30,
            follow_up: 0.25,
            high_value: 0.25,
            cold: 0.20,
        }
    }
}

impl PriorityWeights {
    pub fn weight(&self, label: PriorityLabel) -> f64 {
        match label {
            PriorityLabel::Warm => self.warm,
            PriorityLabel::FollowUp => self.follow_up,
            PriorityLabel::HighValue => self.high_value,
            PriorityLabel::Cold => self.cold,
        }
    }

    pub fn total(&self) -> f64 {
        self.warm + self.follow_up + self.high_value + self.cold
    }

    /// Number of calls a label receives out of `quota`, normalized by the total weight.
    pub fn share(&self, label: PriorityLabel, quota: usize) -> usize {
        let total = self.total();
        if quota == 0 || total <= 0.0 {
            return 0;
        }
        let raw = quota as f64 * self.weight(label) / total;
        (raw - SHARE_EPSILON).ceil().max(0.0) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shares(weights: &PriorityWeights, quota: usize) -> Vec<usize> {
        PriorityLabel::ORDERED
            .iter()
            .map(|label| weights.share(*label, quota))
            .collect()
    }

    #[test]
    fn default_weights_split_quota_with_ceiling() {
        let weights = PriorityWeights::default();
        assert_eq!(shares(&weights, 1), vec![1, 1, 1, 1]);
        // Warm 1.2, Follow-Up 1.0, High Value 1.0, Cold 0.8
        assert_eq!(shares(&weights, 4), vec![2, 1, 1, 1]);
        // Warm 3.0, Follow-Up 2.5, High Value 2.5, Cold 2.0
        assert_eq!(shares(&weights, 10), vec![3, 3, 3, 2]);
        assert_eq!(shares(&weights, 0), vec![0, 0, 0, 0]);
    }

    #[test]
    fn shares_are_normalized_by_total_weight() {
        let doubled = PriorityWeights {
            warm: 0.60,
            follow_up: 0.50,
            high_value: 0.50,
            cold: 0.40,
        };
        assert_eq!(shares(&doubled, 10), shares(&PriorityWeights::default(), 10));

        let warm_only = PriorityWeights {
            warm: 2.0,
            follow_up: 0.0,
            high_value: 0.0,
            cold: 0.0,
        };
        assert_eq!(shares(&warm_only, 5), vec![5, 0, 0, 0]);
    }

    #[test]
    fn gap_depends_on_mode() {
        let settings = SchedulerSettings::default();
        assert_eq!(settings.gap_minutes(false), DEFAULT_QUOTA_GAP_MINUTES);
        assert_eq!(settings.gap_minutes(true), DEFAULT_FILL_DAY_GAP_MINUTES);
    }
}
