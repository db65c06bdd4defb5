// Threshold tables and status evaluation
use serde::Serialize;

use super::sensor::SensorType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Normal,
    Warning,
    Critical,
}

impl Tier {
    pub fn color(self) -> &'static str {
        match self {
            Tier::Normal => "#10b981",
            Tier::Warning => "#f59e0b",
            Tier::Critical => "#ef4444",
        }
    }
}

/// Colour for forecast lines of metrics without a threshold table.
pub const NEUTRAL_COLOR: &str = "#8b5cf6";

/// Nested bands: `normal` sits inside `warning`; anything outside `warning`
/// is critical.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdTable {
    pub normal: (f64, f64),
    pub warning: (f64, f64),
}

const PH_THRESHOLDS: ThresholdTable = ThresholdTable {
    normal: (6.5, 8.5),
    warning: (6.0, 9.0),
};

const CONDUCTIVITY_THRESHOLDS: ThresholdTable = ThresholdTable {
    normal: (200.0, 800.0),
    warning: (100.0, 1200.0),
};

impl ThresholdTable {
    pub fn for_sensor(sensor: SensorType) -> Option<&'static ThresholdTable> {
        match sensor {
            SensorType::Ph => Some(&PH_THRESHOLDS),
            SensorType::Conductivity => Some(&CONDUCTIVITY_THRESHOLDS),
            SensorType::Temperature | SensorType::WaterLevel => None,
        }
    }
}

/// Total over every `f64`: values past the outer bands are critical, and so
/// is NaN since it falls in no band.
pub fn evaluate(value: f64, thresholds: &ThresholdTable) -> Tier {
    let within = |(lo, hi): (f64, f64)| value >= lo && value <= hi;

    if within(thresholds.normal) {
        Tier::Normal
    } else if within(thresholds.warning) {
        Tier::Warning
    } else {
        Tier::Critical
    }
}

/// Most severe tier across `values`; `Normal` for an empty slice.
pub fn worst_tier(values: impl IntoIterator<Item = f64>, thresholds: &ThresholdTable) -> Tier {
    values
        .into_iter()
        .map(|v| evaluate(v, thresholds))
        .max()
        .unwrap_or(Tier::Normal)
}
