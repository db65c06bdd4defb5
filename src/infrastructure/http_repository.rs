// Backend API repository implementation
use crate::application::sensor_repository::SensorRepository;
use crate::domain::model_config::ModelConfig;
use crate::domain::range::RangeSelector;
use crate::domain::sensor::SensorType;
use crate::domain::telemetry::{ForecastResponse, SensorSeriesResponse};
use crate::error::ApiError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpSensorRepository {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Serialize)]
struct PredictionConfigBody<'a> {
    sensor_type: &'a str,
    days: u32,
    lookback_days: u32,
}

impl HttpSensorRepository {
    pub fn new(base_url: String, token: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn historical_url(&self, sensor: SensorType, range: RangeSelector) -> String {
        let window = match range {
            RangeSelector::FixedWindow { hours } => format!("hours={hours}"),
            RangeSelector::CustomRange { start, end } => format!(
                "start_date={}&end_date={}",
                urlencoding::encode(&start.format("%Y-%m-%d").to_string()),
                urlencoding::encode(&end.format("%Y-%m-%d").to_string())
            ),
        };
        format!(
            "{}/api/charts/historical-data?sensor_type={}&{}",
            self.base_url,
            urlencoding::encode(sensor.backend_name()),
            window
        )
    }

    fn forecast_url(&self, sensor: SensorType, config: ModelConfig) -> String {
        format!(
            "{}/api/sensors/predict/{}?days={}&lookback_days={}",
            self.base_url,
            sensor.backend_name(),
            config.days,
            config.lookback_days
        )
    }

    fn config_url(&self) -> String {
        format!("{}/api/sensors/prediction-config", self.base_url)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status { status, body })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Self::check_status(response)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl SensorRepository for HttpSensorRepository {
    async fn fetch_historical(
        &self,
        sensor: SensorType,
        range: RangeSelector,
    ) -> Result<SensorSeriesResponse, ApiError> {
        self.get_json(&self.historical_url(sensor, range)).await
    }

    async fn fetch_forecast(
        &self,
        sensor: SensorType,
        config: ModelConfig,
    ) -> Result<ForecastResponse, ApiError> {
        if !sensor.supports_forecast() {
            tracing::debug!(sensor = sensor.ui_id(), "No forecast endpoint for sensor");
            return Ok(ForecastResponse::default());
        }
        self.get_json(&self.forecast_url(sensor, config)).await
    }

    async fn save_prediction_config(
        &self,
        sensor: SensorType,
        config: ModelConfig,
    ) -> Result<(), ApiError> {
        let body = PredictionConfigBody {
            sensor_type: sensor.backend_name(),
            days: config.days,
            lookback_days: config.lookback_days,
        };

        let response = self
            .client
            .post(self.config_url())
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Self::check_status(response).await?;
        Ok(())
    }
}
