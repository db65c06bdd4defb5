// Repository trait for the sensor backend API
use crate::domain::model_config::ModelConfig;
use crate::domain::range::RangeSelector;
use crate::domain::sensor::SensorType;
use crate::domain::telemetry::{ForecastResponse, SensorSeriesResponse};
use crate::error::ApiError;
use async_trait::async_trait;

#[async_trait]
pub trait SensorRepository: Send + Sync {
    /// Historical readings for a fixed window or custom date range
    async fn fetch_historical(
        &self,
        sensor: SensorType,
        range: RangeSelector,
    ) -> Result<SensorSeriesResponse, ApiError>;

    /// Forecast from the external model service
    async fn fetch_forecast(
        &self,
        sensor: SensorType,
        config: ModelConfig,
    ) -> Result<ForecastResponse, ApiError>;

    /// Persist prediction parameters on the server (audit trail)
    async fn save_prediction_config(
        &self,
        sensor: SensorType,
        config: ModelConfig,
    ) -> Result<(), ApiError>;
}
