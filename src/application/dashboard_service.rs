// Dashboard service - Use cases behind the HTTP surface
use crate::application::chart_cell::{ChartCell, ChartHandle, RefreshOrigin};
use crate::application::config_store::ConfigStore;
use crate::application::local_store::LocalStore;
use crate::application::range_controller::RangeController;
use crate::application::sensor_repository::SensorRepository;
use crate::domain::dashboard::{ChartSnapshot, Dashboard};
use crate::domain::model_config::ModelConfig;
use crate::domain::sensor::SensorType;
use crate::error::{DashboardError, DashboardResult};
use chrono::NaiveDate;
use std::sync::Arc;

/// Result of the days -> lookback auto-adjustment.
#[derive(Debug, Clone)]
pub struct DaysAdjustment {
    pub config: ModelConfig,
    pub notice: Option<String>,
}

#[derive(Clone)]
pub struct DashboardService {
    controller: Arc<RangeController>,
    cells: Vec<ChartCell>,
    config_store: ConfigStore,
}

impl DashboardService {
    pub fn new(
        repository: Arc<dyn SensorRepository>,
        store: Arc<dyn LocalStore>,
        sensors: &[SensorType],
        initial_hours: u32,
    ) -> Self {
        let config_store = ConfigStore::new(repository.clone(), store);
        let mut controller = RangeController::new(initial_hours);

        let cells: Vec<ChartCell> = sensors
            .iter()
            .map(|sensor| ChartCell::new(*sensor, initial_hours, repository.clone(), config_store.clone()))
            .collect();
        for cell in &cells {
            controller.register(Arc::new(cell.clone()));
        }

        Self {
            controller: Arc::new(controller),
            cells,
            config_store,
        }
    }

    pub fn controller(&self) -> Arc<RangeController> {
        self.controller.clone()
    }

    fn cell(&self, sensor: SensorType) -> DashboardResult<&ChartCell> {
        self.cells
            .iter()
            .find(|c| c.sensor() == sensor)
            .ok_or_else(|| DashboardError::UnknownSensor(sensor.ui_id().to_string()))
    }

    fn forecast_cell(&self, sensor: SensorType) -> DashboardResult<&ChartCell> {
        let cell = self.cell(sensor)?;
        if !sensor.supports_forecast() {
            return Err(DashboardError::ForecastUnsupported(sensor));
        }
        Ok(cell)
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::new(self.controller.window(), self.controller.snapshots())
    }

    pub fn chart(&self, sensor: SensorType) -> DashboardResult<ChartSnapshot> {
        Ok(self.cell(sensor)?.snapshot())
    }

    pub fn set_window(&self, hours: u32) {
        // fetches keep running after the handles are dropped
        let _ = self.controller.set_window(hours);
    }

    pub fn select_custom(&self) {
        self.controller.select_custom();
    }

    pub fn set_custom_range(&self, start: NaiveDate, end: NaiveDate) -> DashboardResult<()> {
        self.controller.set_custom_range(start, end)?;
        Ok(())
    }

    /// Retry a single chart in whatever mode it is in, custom ranges
    /// included. Waits for the fetch to settle.
    pub async fn refresh_chart(&self, sensor: SensorType) -> DashboardResult<ChartSnapshot> {
        let cell = self.cell(sensor)?;
        match cell.refresh(RefreshOrigin::User) {
            Some(fetch) => fetch.await,
            None => tracing::debug!(sensor = sensor.ui_id(), "Chart is waiting for custom dates"),
        }
        Ok(cell.snapshot())
    }

    pub async fn refresh_all(&self) -> Dashboard {
        self.controller.refresh_all().await;
        self.dashboard()
    }

    pub async fn set_prediction(&self, sensor: SensorType, enabled: bool) -> DashboardResult<ChartSnapshot> {
        let cell = self.cell(sensor)?;
        cell.set_prediction(enabled).await?;
        Ok(cell.snapshot())
    }

    pub fn prediction_config(&self, sensor: SensorType) -> DashboardResult<ModelConfig> {
        Ok(self.forecast_cell(sensor)?.model_config())
    }

    pub fn adjust_days(&self, sensor: SensorType, mut config: ModelConfig) -> DashboardResult<DaysAdjustment> {
        self.forecast_cell(sensor)?;
        let notice = config.on_days_changed(config.days);
        if let Some(notice) = &notice {
            tracing::info!(sensor = sensor.ui_id(), "{notice}");
        }

        Ok(DaysAdjustment { config, notice })
    }

    /// Validate, persist, and hand the saved config to the chart.
    pub async fn save_prediction_config(
        &self,
        sensor: SensorType,
        config: ModelConfig,
    ) -> DashboardResult<ModelConfig> {
        let cell = self.forecast_cell(sensor)?;
        let report = config.validate();
        if !report.valid {
            return Err(DashboardError::Validation(report.errors));
        }

        let saved = self.config_store.save(sensor, config).await?;
        cell.update_model_config(saved).await;
        Ok(saved)
    }
}
