// Mapper to convert domain models to JSON view models
use crate::domain::dashboard::{CellStatus, ChartSnapshot, Dashboard, WindowSelection};
use crate::domain::model_config::{ModelConfig, ValidationReport};
use crate::domain::range::RangeSelector;
use crate::domain::telemetry::Dataset;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub window: WindowView,
    pub charts: Vec<ChartView>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WindowView {
    Fixed { hours: u32 },
    CustomPending,
    Custom { start: NaiveDate, end: NaiveDate },
}

#[derive(Debug, Serialize)]
pub struct ChartView {
    pub sensor: &'static str,
    pub title: &'static str,
    pub unit: &'static str,
    pub status: &'static str,
    pub awaiting_custom_range: bool,
    pub range: RangeSelector,
    pub labels: Vec<String>,
    pub datasets: Vec<DatasetView>,
    pub error: Option<String>,
    pub prediction_enabled: bool,
    pub prediction_error: Option<String>,
    pub model_config: ModelConfig,
}

#[derive(Debug, Serialize)]
pub struct DatasetView {
    pub name: String,
    pub color: String,
    pub values: Vec<Option<f64>>,
    pub point_radius: Vec<u8>,
}

#[derive(Debug, Serialize)]
pub struct ConfigView {
    pub config: ModelConfig,
    pub validation: ValidationReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

pub fn dashboard_to_json(dashboard: Dashboard) -> DashboardView {
    DashboardView {
        window: window_to_json(dashboard.window),
        charts: dashboard.charts.into_iter().map(chart_to_json).collect(),
    }
}

fn window_to_json(window: WindowSelection) -> WindowView {
    match window {
        WindowSelection::Fixed { hours } => WindowView::Fixed { hours },
        WindowSelection::CustomPending => WindowView::CustomPending,
        WindowSelection::Custom { start, end } => WindowView::Custom { start, end },
    }
}

fn status_name(status: CellStatus) -> &'static str {
    match status {
        CellStatus::Idle => "idle",
        CellStatus::Loading => "loading",
        CellStatus::Ready => "ready",
        CellStatus::Error => "error",
    }
}

pub fn chart_to_json(snapshot: ChartSnapshot) -> ChartView {
    let chart = snapshot.chart;
    let mut datasets = vec![dataset_to_json(chart.historical)];
    datasets.extend(chart.prediction.map(dataset_to_json));

    ChartView {
        sensor: snapshot.sensor.ui_id(),
        title: snapshot.sensor.title(),
        unit: snapshot.sensor.unit(),
        status: status_name(snapshot.status),
        awaiting_custom_range: snapshot.awaiting_custom_range,
        range: snapshot.range,
        labels: chart.labels,
        datasets,
        error: snapshot.error,
        prediction_enabled: snapshot.prediction_enabled,
        prediction_error: snapshot.prediction_error,
        model_config: snapshot.model_config,
    }
}

fn dataset_to_json(dataset: Dataset) -> DatasetView {
    DatasetView {
        name: dataset.name,
        color: dataset.color,
        values: dataset.values,
        point_radius: dataset.point_radius,
    }
}

pub fn config_to_json(config: ModelConfig, notice: Option<String>) -> ConfigView {
    ConfigView {
        config,
        validation: config.validate(),
        notice,
    }
}
