// Dashboard domain model
use chrono::NaiveDate;

use super::model_config::ModelConfig;
use super::range::RangeSelector;
use super::sensor::SensorType;
use super::telemetry::ChartData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStatus {
    Idle,
    Loading,
    Ready,
    Error,
}

/// What the controller has told every chart to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSelection {
    Fixed { hours: u32 },
    /// Custom mode chosen, dates not picked yet.
    CustomPending,
    Custom { start: NaiveDate, end: NaiveDate },
}

/// Point-in-time view of one chart cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSnapshot {
    pub sensor: SensorType,
    pub status: CellStatus,
    pub awaiting_custom_range: bool,
    pub range: RangeSelector,
    pub chart: ChartData,
    pub error: Option<String>,
    pub prediction_enabled: bool,
    pub prediction_error: Option<String>,
    pub model_config: ModelConfig,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub window: WindowSelection,
    pub charts: Vec<ChartSnapshot>,
}

impl Dashboard {
    pub fn new(window: WindowSelection, charts: Vec<ChartSnapshot>) -> Self {
        Self { window, charts }
    }
}
