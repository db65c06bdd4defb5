// Telemetry data domain models
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Ordered `(label, value)` pairs. `None` means nothing is plotted at that
/// position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    pub labels: Vec<String>,
    pub values: Vec<Option<f64>>,
}

impl TimeSeries {
    pub fn new(labels: Vec<String>, values: Vec<Option<f64>>) -> Self {
        Self { labels, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Last plotted value, skipping trailing gaps.
    pub fn last_value(&self) -> Option<f64> {
        self.values.iter().rev().find_map(|v| *v)
    }
}

/// Raw historical payload: a shared `labels` array plus one positional
/// array per metric.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SensorSeriesResponse {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(flatten, deserialize_with = "deserialize_metrics")]
    pub metrics: HashMap<String, Vec<Option<f64>>>,
}

impl SensorSeriesResponse {
    /// Readings for one metric. `None` when the payload has no array for it.
    pub fn metric(&self, key: &str) -> Option<&[Option<f64>]> {
        self.metrics.get(key).map(Vec::as_slice)
    }
}

// Non-array entries (status flags, metadata) are ignored rather than
// failing the whole payload.
fn deserialize_metrics<'de, D>(deserializer: D) -> Result<HashMap<String, Vec<Option<f64>>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: HashMap<String, serde_json::Value> = HashMap::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| match value {
            serde_json::Value::Array(items) => {
                Some((key, items.iter().map(serde_json::Value::as_f64).collect()))
            }
            _ => None,
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub predictions: Vec<ForecastPoint>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ForecastResponse {
    pub fn is_usable(&self) -> bool {
        self.success && !self.predictions.is_empty()
    }
}

/// One plotted line.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub name: String,
    pub color: String,
    pub values: Vec<Option<f64>>,
    pub point_radius: Vec<u8>,
}

impl Dataset {
    pub fn new(name: String, color: String, values: Vec<Option<f64>>, point_radius: Vec<u8>) -> Self {
        Self {
            name,
            color,
            values,
            point_radius,
        }
    }
}

/// Plot-ready bundle: one label axis shared by every dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub historical: Dataset,
    pub prediction: Option<Dataset>,
}

impl ChartData {
    pub fn new(labels: Vec<String>, historical: Dataset, prediction: Option<Dataset>) -> Self {
        Self {
            labels,
            historical,
            prediction,
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
