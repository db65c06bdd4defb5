// Time window selection shared by the charts
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

/// Span used when formatting labels for custom ranges and for "all time".
pub const WIDE_SPAN_HOURS: u32 = 720;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RangeSelector {
    /// Trailing window in hours; 0 means all time.
    FixedWindow { hours: u32 },
    /// Absolute calendar interval, `start <= end`.
    CustomRange { start: NaiveDate, end: NaiveDate },
}

impl RangeSelector {
    pub fn fixed(hours: u32) -> Self {
        RangeSelector::FixedWindow { hours }
    }

    pub fn custom(start: NaiveDate, end: NaiveDate) -> Result<Self, DashboardError> {
        if start > end {
            return Err(DashboardError::InvalidRange { start, end });
        }
        Ok(RangeSelector::CustomRange { start, end })
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, RangeSelector::CustomRange { .. })
    }

    /// Span handed to the label formatter.
    pub fn label_span_hours(&self) -> u32 {
        match self {
            RangeSelector::FixedWindow { hours: 0 } => WIDE_SPAN_HOURS,
            RangeSelector::FixedWindow { hours } => *hours,
            RangeSelector::CustomRange { .. } => WIDE_SPAN_HOURS,
        }
    }
}
