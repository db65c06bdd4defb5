// Config store - Forecast model parameters per sensor
use crate::application::local_store::{config_key, enabled_key, LocalStore};
use crate::application::sensor_repository::SensorRepository;
use crate::domain::model_config::ModelConfig;
use crate::domain::sensor::SensorType;
use crate::error::{DashboardError, DashboardResult};
use std::sync::Arc;

#[derive(Clone)]
pub struct ConfigStore {
    repository: Arc<dyn SensorRepository>,
    store: Arc<dyn LocalStore>,
}

impl ConfigStore {
    pub fn new(repository: Arc<dyn SensorRepository>, store: Arc<dyn LocalStore>) -> Self {
        Self { repository, store }
    }

    /// Stored config for `sensor`, normalised, or the default when nothing
    /// usable is stored.
    pub fn load_or_default(&self, sensor: SensorType) -> ModelConfig {
        let key = config_key(sensor);
        let Some(raw) = self.store.get(&key) else {
            return ModelConfig::default();
        };

        match serde_json::from_str::<ModelConfig>(&raw) {
            Ok(config) => config.normalized(),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Ignoring unreadable prediction config");
                ModelConfig::default()
            }
        }
    }

    pub fn is_prediction_enabled(&self, sensor: SensorType) -> bool {
        self.store.get(&enabled_key(sensor)).as_deref() == Some("true")
    }

    pub fn set_prediction_enabled(&self, sensor: SensorType, enabled: bool) -> DashboardResult<()> {
        self.store
            .set(&enabled_key(sensor), if enabled { "true" } else { "false" })
    }

    /// Persist remotely, then locally. Always sends the normalised values,
    /// never the raw input. A remote failure aborts before anything is
    /// committed locally.
    pub async fn save(&self, sensor: SensorType, config: ModelConfig) -> DashboardResult<ModelConfig> {
        let normalized = config.normalized();
        if normalized != config {
            tracing::info!(
                sensor = sensor.ui_id(),
                requested_days = config.days,
                requested_lookback = config.lookback_days,
                days = normalized.days,
                lookback_days = normalized.lookback_days,
                "Saving normalized prediction config"
            );
        }

        if let Err(e) = self
            .repository
            .save_prediction_config(sensor, normalized)
            .await
        {
            tracing::error!(sensor = sensor.ui_id(), error = %e, "Failed to save prediction config");
            return Err(DashboardError::Api(e));
        }

        let serialized =
            serde_json::to_string(&normalized).map_err(|e| DashboardError::Storage(e.to_string()))?;
        self.store.set(&config_key(sensor), &serialized)?;

        tracing::info!(
            sensor = sensor.ui_id(),
            days = normalized.days,
            lookback_days = normalized.lookback_days,
            "Prediction config saved"
        );
        Ok(normalized)
    }
}
