// Test doubles - Scripted in-memory repository for unit tests
use crate::application::sensor_repository::SensorRepository;
use crate::domain::model_config::ModelConfig;
use crate::domain::range::RangeSelector;
use crate::domain::sensor::SensorType;
use crate::domain::telemetry::{ForecastPoint, ForecastResponse, SensorSeriesResponse};
use crate::error::ApiError;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Historical(SensorType, RangeSelector),
    Forecast(SensorType, ModelConfig),
    SaveConfig(SensorType, ModelConfig),
}

/// Historical payloads carry three hourly points whose value encodes the
/// requested range: the window length for fixed windows, -1 for custom
/// ranges.
#[derive(Default)]
pub struct MockRepository {
    calls: Mutex<Vec<Call>>,
    delays: Mutex<HashMap<RangeSelector, Duration>>,
    failing_sensors: Mutex<HashSet<SensorType>>,
    missing_metrics: Mutex<HashSet<SensorType>>,
    forecast: Mutex<Option<ForecastResponse>>,
    forecasts_by_config: Mutex<HashMap<ModelConfig, ForecastResponse>>,
    forecast_delays: Mutex<HashMap<ModelConfig, Duration>>,
    forecast_fails: Mutex<bool>,
    save_fails: Mutex<bool>,
}

impl MockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delay(&self, range: RangeSelector, delay: Duration) {
        self.delays.lock().unwrap().insert(range, delay);
    }

    pub fn fail_historical(&self, sensor: SensorType, fail: bool) {
        let mut failing = self.failing_sensors.lock().unwrap();
        if fail {
            failing.insert(sensor);
        } else {
            failing.remove(&sensor);
        }
    }

    pub fn omit_metric(&self, sensor: SensorType) {
        self.missing_metrics.lock().unwrap().insert(sensor);
    }

    pub fn set_forecast(&self, forecast: ForecastResponse) {
        *self.forecast.lock().unwrap() = Some(forecast);
    }

    /// Answer requests for `config` with `forecast` instead of the default.
    pub fn set_forecast_for(&self, config: ModelConfig, forecast: ForecastResponse) {
        self.forecasts_by_config.lock().unwrap().insert(config, forecast);
    }

    pub fn delay_forecast(&self, config: ModelConfig, delay: Duration) {
        self.forecast_delays.lock().unwrap().insert(config, delay);
    }

    pub fn fail_forecast(&self, fail: bool) {
        *self.forecast_fails.lock().unwrap() = fail;
    }

    pub fn fail_saves(&self, fail: bool) {
        *self.save_fails.lock().unwrap() = fail;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn historical_calls(&self, sensor: SensorType) -> Vec<RangeSelector> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Historical(s, range) if s == sensor => Some(range),
                _ => None,
            })
            .collect()
    }

    pub fn forecast_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Forecast(..)))
            .count()
    }

    pub fn value_for(range: RangeSelector) -> f64 {
        match range {
            RangeSelector::FixedWindow { hours } => hours as f64,
            RangeSelector::CustomRange { .. } => -1.0,
        }
    }
}

pub fn forecast_of(values: &[f64]) -> ForecastResponse {
    ForecastResponse {
        success: true,
        predictions: values
            .iter()
            .enumerate()
            .map(|(i, v)| ForecastPoint {
                timestamp: format!("2024-01-{:02}T00:00:00Z", i + 2),
                value: *v,
            })
            .collect(),
        message: None,
    }
}

#[async_trait]
impl SensorRepository for MockRepository {
    async fn fetch_historical(
        &self,
        sensor: SensorType,
        range: RangeSelector,
    ) -> Result<SensorSeriesResponse, ApiError> {
        self.calls.lock().unwrap().push(Call::Historical(sensor, range));
        let delay = self.delays.lock().unwrap().get(&range).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing_sensors.lock().unwrap().contains(&sensor) {
            return Err(ApiError::Status {
                status: 500,
                body: "boom".to_string(),
            });
        }

        let labels: Vec<String> = (10..13)
            .map(|h| format!("2024-01-01T{h}:00:00Z"))
            .collect();
        let mut metrics = HashMap::new();
        if !self.missing_metrics.lock().unwrap().contains(&sensor) {
            metrics.insert(
                sensor.backend_name().to_string(),
                vec![Some(Self::value_for(range)); labels.len()],
            );
        }

        Ok(SensorSeriesResponse { labels, metrics })
    }

    async fn fetch_forecast(
        &self,
        sensor: SensorType,
        config: ModelConfig,
    ) -> Result<ForecastResponse, ApiError> {
        self.calls.lock().unwrap().push(Call::Forecast(sensor, config));
        let delay = self.forecast_delays.lock().unwrap().get(&config).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if *self.forecast_fails.lock().unwrap() {
            return Err(ApiError::Transport("connection refused".to_string()));
        }
        if let Some(forecast) = self.forecasts_by_config.lock().unwrap().get(&config) {
            return Ok(forecast.clone());
        }
        Ok(self.forecast.lock().unwrap().clone().unwrap_or_default())
    }

    async fn save_prediction_config(
        &self,
        sensor: SensorType,
        config: ModelConfig,
    ) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(Call::SaveConfig(sensor, config));
        if *self.save_fails.lock().unwrap() {
            return Err(ApiError::Status {
                status: 422,
                body: "days must be <= 7".to_string(),
            });
        }
        Ok(())
    }
}
