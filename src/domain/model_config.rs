// Forecast model parameters and their validation rules
use serde::{Deserialize, Serialize};

pub const MIN_DAYS: u32 = 1;
pub const MAX_DAYS: u32 = 7;
pub const MIN_LOOKBACK_FLOOR: u32 = 7;
pub const LOOKBACK_PER_FORECAST_DAY: u32 = 3;

/// Forecast horizon and training window for one sensor.
///
/// Invariant after normalisation: `1 <= days <= 7` and
/// `lookback_days >= max(7, 3 * days)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelConfig {
    pub days: u32,
    pub lookback_days: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::new(3, 30)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub normalized_days: u32,
    pub normalized_lookback: u32,
}

impl ValidationReport {
    pub fn normalized(&self) -> ModelConfig {
        ModelConfig {
            days: self.normalized_days,
            lookback_days: self.normalized_lookback,
        }
    }
}

pub fn clamp_days(days: u32) -> u32 {
    days.clamp(MIN_DAYS, MAX_DAYS)
}

pub fn min_lookback(days: u32) -> u32 {
    MIN_LOOKBACK_FLOOR.max(LOOKBACK_PER_FORECAST_DAY * clamp_days(days))
}

impl ModelConfig {
    pub fn new(days: u32, lookback_days: u32) -> Self {
        Self { days, lookback_days }
    }

    pub fn validate(&self) -> ValidationReport {
        let normalized_days = clamp_days(self.days);
        let required = min_lookback(normalized_days);
        let mut errors = Vec::new();

        if normalized_days != self.days {
            errors.push(format!(
                "days must be between {MIN_DAYS} and {MAX_DAYS} (got {})",
                self.days
            ));
        }
        if self.lookback_days < required {
            errors.push(format!(
                "lookback_days must be at least {required} for a {normalized_days}-day forecast (got {})",
                self.lookback_days
            ));
        }

        ValidationReport {
            valid: errors.is_empty(),
            errors,
            normalized_days,
            normalized_lookback: self.lookback_days.max(required),
        }
    }

    /// Clamped days and raised lookback, whatever the input.
    pub fn normalized(&self) -> ModelConfig {
        self.validate().normalized()
    }

    /// Input-layer hook for a change of `days`. Raises `lookback_days` to the
    /// new minimum when it falls short and returns a notice describing the
    /// adjustment.
    pub fn on_days_changed(&mut self, days: u32) -> Option<String> {
        self.days = days;
        let required = min_lookback(days);
        if self.lookback_days >= required {
            return None;
        }

        let previous = self.lookback_days;
        self.lookback_days = required;
        Some(format!(
            "lookback_days raised from {previous} to {required} for a {}-day forecast",
            clamp_days(days)
        ))
    }
}
