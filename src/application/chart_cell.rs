// Chart cell - Per-sensor fetch and render state machine
use crate::application::config_store::ConfigStore;
use crate::application::overlay::{compose, historical_chart, strip_overlay};
use crate::application::sensor_repository::SensorRepository;
use crate::domain::dashboard::{CellStatus, ChartSnapshot};
use crate::domain::labels::format_labels;
use crate::domain::model_config::ModelConfig;
use crate::domain::range::RangeSelector;
use crate::domain::sensor::SensorType;
use crate::domain::telemetry::{ChartData, ForecastResponse, SensorSeriesResponse, TimeSeries};
use crate::error::{DashboardError, DashboardResult};
use chrono::NaiveDate;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Placeholder plotted after a failed fetch so the chart never has empty axes.
const FALLBACK_SERIES: [(&str, f64); 5] = [
    ("00:00", 1.0),
    ("06:00", 2.0),
    ("12:00", 1.5),
    ("18:00", 2.5),
    ("24:00", 2.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOrigin {
    /// Explicit refresh of this one chart
    User,
    /// Controller-driven refresh of every chart
    Bulk,
}

/// Controls a range controller holds for each registered chart.
pub trait ChartHandle: Send + Sync {
    fn sensor(&self) -> SensorType;

    /// Switch to a fixed window. Negative hours put the cell in the waiting
    /// state until custom dates arrive. `None` when no fetch is issued.
    fn set_range(&self, hours: i64) -> Option<BoxFuture<'static, ()>>;

    /// Switch to custom mode; always fetches.
    fn set_custom_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DashboardResult<BoxFuture<'static, ()>>;

    /// Enter the waiting state of custom mode: shows loading and issues no
    /// request until dates arrive. No-op when already in custom mode.
    fn await_custom(&self);

    /// Re-issue the current fetch. While a fetch is in flight the returned
    /// future joins it instead of starting another. `None` while waiting for
    /// custom dates, and for bulk refreshes of a settled cell in custom mode.
    fn refresh(&self, origin: RefreshOrigin) -> Option<BoxFuture<'static, ()>>;

    fn snapshot(&self) -> ChartSnapshot;
}

#[derive(Debug, Clone)]
struct CachedForecast {
    config: ModelConfig,
    response: ForecastResponse,
}

struct CellState {
    status: CellStatus,
    range: RangeSelector,
    awaiting_custom: bool,
    generation: u64,
    in_flight: Option<RangeSelector>,
    pending: Option<Shared<BoxFuture<'static, ()>>>,
    historical: TimeSeries,
    chart: ChartData,
    error: Option<String>,
    prediction_enabled: bool,
    forecast: Option<CachedForecast>,
    forecast_generation: u64,
    prediction_error: Option<String>,
    model_config: ModelConfig,
}

struct CellInner {
    sensor: SensorType,
    repository: Arc<dyn SensorRepository>,
    config_store: ConfigStore,
    state: Mutex<CellState>,
}

/// A cell moves `Idle -> Loading -> {Ready, Error}` and back to `Loading` on
/// a range change, refresh or custom range. Controls change state
/// synchronously and hand back the fetch as a future. Fetches carry a
/// generation number; a response whose generation is no longer current is
/// dropped, so the last request wins.
#[derive(Clone)]
pub struct ChartCell {
    inner: Arc<CellInner>,
}

fn fallback_series() -> TimeSeries {
    TimeSeries::new(
        FALLBACK_SERIES.iter().map(|(l, _)| l.to_string()).collect(),
        FALLBACK_SERIES.iter().map(|(_, v)| Some(*v)).collect(),
    )
}

/// Pick this sensor's array out of the payload and format its labels.
fn map_payload(sensor: SensorType, payload: &SensorSeriesResponse, span_hours: u32) -> TimeSeries {
    let Some(readings) = payload.metric(sensor.backend_name()) else {
        tracing::debug!(sensor = sensor.ui_id(), "No readings for metric in payload");
        return TimeSeries::default();
    };

    if readings.len() != payload.labels.len() {
        tracing::warn!(
            sensor = sensor.ui_id(),
            readings = readings.len(),
            labels = payload.labels.len(),
            "Metric and label arrays differ in length, aligning to labels"
        );
    }

    let mut values = readings.to_vec();
    values.resize(payload.labels.len(), None);
    TimeSeries::new(format_labels(&payload.labels, span_hours), values)
}

impl CellState {
    fn rebuild_chart(&mut self, sensor: SensorType) {
        self.chart = match (&self.forecast, self.prediction_enabled, self.status) {
            (Some(cached), true, CellStatus::Ready) => compose(sensor, &self.historical, &cached.response),
            _ => historical_chart(sensor, &self.historical),
        };
    }
}

impl ChartCell {
    pub fn new(
        sensor: SensorType,
        initial_hours: u32,
        repository: Arc<dyn SensorRepository>,
        config_store: ConfigStore,
    ) -> Self {
        let model_config = config_store.load_or_default(sensor);
        let prediction_enabled =
            sensor.supports_forecast() && config_store.is_prediction_enabled(sensor);

        let state = CellState {
            status: CellStatus::Idle,
            range: RangeSelector::fixed(initial_hours),
            awaiting_custom: false,
            generation: 0,
            in_flight: None,
            pending: None,
            historical: TimeSeries::default(),
            chart: historical_chart(sensor, &TimeSeries::default()),
            error: None,
            prediction_enabled,
            forecast: None,
            forecast_generation: 0,
            prediction_error: None,
            model_config,
        };

        Self {
            inner: Arc::new(CellInner {
                sensor,
                repository,
                config_store,
                state: Mutex::new(state),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CellState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn start_fetch(&self, state: &mut CellState, range: RangeSelector) -> BoxFuture<'static, ()> {
        state.generation += 1;
        state.status = CellStatus::Loading;
        state.in_flight = Some(range);
        state.error = None;

        tracing::debug!(
            sensor = self.inner.sensor.ui_id(),
            generation = state.generation,
            ?range,
            "Fetching historical data"
        );

        let fetch = self.clone().run_fetch(state.generation, range).boxed().shared();
        state.pending = Some(fetch.clone());
        fetch.boxed()
    }

    async fn run_fetch(self, generation: u64, range: RangeSelector) {
        let sensor = self.inner.sensor;
        let result = self.inner.repository.fetch_historical(sensor, range).await;

        let needs_forecast = {
            let mut state = self.lock();
            if state.generation != generation {
                tracing::debug!(
                    sensor = sensor.ui_id(),
                    generation,
                    current = state.generation,
                    "Discarding stale historical response"
                );
                return;
            }
            state.in_flight = None;
            state.pending = None;

            match result {
                Ok(payload) => {
                    state.historical = map_payload(sensor, &payload, range.label_span_hours());
                    state.status = CellStatus::Ready;
                    state.error = None;
                }
                Err(e) => {
                    tracing::warn!(sensor = sensor.ui_id(), error = %e, "Historical fetch failed");
                    state.historical = fallback_series();
                    state.status = CellStatus::Error;
                    state.error = Some(e.to_string());
                }
            }
            state.rebuild_chart(sensor);

            state.status == CellStatus::Ready && state.prediction_enabled && state.forecast.is_none()
        };

        if needs_forecast {
            self.load_forecast().await;
        }
    }

    /// Fetch the forecast for the current model config and apply it if it is
    /// still wanted when it arrives.
    async fn load_forecast(&self) {
        let sensor = self.inner.sensor;
        let (generation, config) = {
            let mut state = self.lock();
            state.forecast_generation += 1;
            (state.forecast_generation, state.model_config)
        };

        let result = self.inner.repository.fetch_forecast(sensor, config).await;

        let keep_enabled = {
            let mut state = self.lock();
            if state.forecast_generation != generation || !state.prediction_enabled {
                tracing::debug!(sensor = sensor.ui_id(), generation, "Discarding stale forecast");
                return;
            }

            let keep = match result {
                Ok(response) if response.is_usable() => {
                    state.forecast = Some(CachedForecast { config, response });
                    state.prediction_error = None;
                    true
                }
                Ok(response) => {
                    tracing::info!(
                        sensor = sensor.ui_id(),
                        message = response.message.as_deref().unwrap_or(""),
                        "Forecast unavailable, disabling overlay"
                    );
                    false
                }
                Err(e) => {
                    tracing::warn!(sensor = sensor.ui_id(), error = %e, "Forecast fetch failed");
                    state.prediction_error = Some(e.to_string());
                    false
                }
            };

            if !keep {
                state.prediction_enabled = false;
                state.forecast = None;
            }
            state.rebuild_chart(sensor);
            keep
        };

        self.persist_enabled(keep_enabled);
    }

    fn persist_enabled(&self, enabled: bool) {
        if let Err(e) = self
            .inner
            .config_store
            .set_prediction_enabled(self.inner.sensor, enabled)
        {
            tracing::warn!(sensor = self.inner.sensor.ui_id(), error = %e, "Failed to persist prediction flag");
        }
    }

    /// Show or hide the forecast overlay. Turning it on reuses a cached
    /// forecast fetched with the current model config.
    pub async fn set_prediction(&self, enabled: bool) -> DashboardResult<()> {
        let sensor = self.inner.sensor;
        if enabled && !sensor.supports_forecast() {
            return Err(DashboardError::ForecastUnsupported(sensor));
        }

        let needs_fetch = {
            let mut state = self.lock();
            state.prediction_error = None;

            if !enabled {
                state.prediction_enabled = false;
                state.forecast_generation += 1;
                let historical_len = state.historical.len();
                state.chart = strip_overlay(&state.chart, historical_len);
                false
            } else {
                state.prediction_enabled = true;
                let cached = state
                    .forecast
                    .as_ref()
                    .is_some_and(|f| f.config == state.model_config);
                if cached {
                    state.rebuild_chart(sensor);
                } else {
                    state.forecast = None;
                }
                !cached
            }
        };

        tracing::info!(sensor = sensor.ui_id(), enabled, "Prediction overlay toggled");

        if needs_fetch {
            self.load_forecast().await;
        } else {
            self.persist_enabled(enabled);
        }
        Ok(())
    }

    /// Apply a saved model config. A visible overlay is refetched with it.
    pub async fn update_model_config(&self, config: ModelConfig) {
        let refetch = {
            let mut state = self.lock();
            state.model_config = config;
            state.forecast = None;
            state.forecast_generation += 1;
            state.rebuild_chart(self.inner.sensor);
            state.prediction_enabled
        };

        if refetch {
            self.load_forecast().await;
        }
    }

    pub fn model_config(&self) -> ModelConfig {
        self.lock().model_config
    }
}

impl ChartHandle for ChartCell {
    fn sensor(&self) -> SensorType {
        self.inner.sensor
    }

    fn set_range(&self, hours: i64) -> Option<BoxFuture<'static, ()>> {
        if hours < 0 {
            self.await_custom();
            return None;
        }

        let sensor = self.inner.sensor;
        let mut state = self.lock();
        let range = RangeSelector::fixed(u32::try_from(hours).unwrap_or(u32::MAX));
        if state.status == CellStatus::Loading && state.in_flight == Some(range) {
            tracing::debug!(sensor = sensor.ui_id(), hours, "Fetch already in flight, dropping");
            return None;
        }

        state.range = range;
        state.awaiting_custom = false;
        Some(self.start_fetch(&mut state, range))
    }

    fn set_custom_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DashboardResult<BoxFuture<'static, ()>> {
        let range = RangeSelector::custom(start, end)?;
        let mut state = self.lock();
        state.range = range;
        state.awaiting_custom = false;
        Ok(self.start_fetch(&mut state, range))
    }

    fn await_custom(&self) {
        let mut state = self.lock();
        if state.range.is_custom() {
            return;
        }
        state.generation += 1;
        state.status = CellStatus::Loading;
        state.awaiting_custom = true;
        state.in_flight = None;
        state.pending = None;
        tracing::debug!(sensor = self.inner.sensor.ui_id(), "Awaiting custom range");
    }

    fn refresh(&self, origin: RefreshOrigin) -> Option<BoxFuture<'static, ()>> {
        let mut state = self.lock();
        if state.status == CellStatus::Loading {
            return state.pending.clone().map(|fetch| fetch.boxed());
        }
        if origin == RefreshOrigin::Bulk && state.range.is_custom() {
            tracing::debug!(sensor = self.inner.sensor.ui_id(), "Skipping bulk refresh in custom mode");
            return None;
        }

        let range = state.range;
        Some(self.start_fetch(&mut state, range))
    }

    fn snapshot(&self) -> ChartSnapshot {
        let state = self.lock();
        ChartSnapshot {
            sensor: self.inner.sensor,
            status: state.status,
            awaiting_custom_range: state.awaiting_custom,
            range: state.range,
            chart: state.chart.clone(),
            error: state.error.clone(),
            prediction_enabled: state.prediction_enabled,
            prediction_error: state.prediction_error.clone(),
            model_config: state.model_config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::local_store::{LocalStore, MemoryStore};
    use crate::application::overlay::{FORECAST_RADIUS, SPACERS_PER_DAY};
    use crate::application::testing::{forecast_of, Call, MockRepository};
    use std::time::Duration;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn cell_with(sensor: SensorType, store: Arc<MemoryStore>) -> (Arc<MockRepository>, ChartCell) {
        let repo = Arc::new(MockRepository::new());
        let config_store = ConfigStore::new(repo.clone(), store);
        let cell = ChartCell::new(sensor, 24, repo.clone(), config_store);
        (repo, cell)
    }

    fn cell(sensor: SensorType) -> (Arc<MockRepository>, ChartCell) {
        cell_with(sensor, Arc::new(MemoryStore::new()))
    }

    fn plotted(snapshot: &ChartSnapshot) -> Vec<Option<f64>> {
        snapshot.chart.historical.values[..3].to_vec()
    }

    #[tokio::test]
    async fn test_set_range_fetches_and_formats_labels() {
        let (repo, cell) = cell(SensorType::Ph);
        assert_eq!(cell.snapshot().status, CellStatus::Idle);

        let fetch = cell.set_range(6).unwrap();
        assert_eq!(cell.snapshot().status, CellStatus::Loading);
        fetch.await;

        let snapshot = cell.snapshot();
        assert_eq!(snapshot.status, CellStatus::Ready);
        assert_eq!(snapshot.range, RangeSelector::fixed(6));
        assert_eq!(snapshot.chart.labels, vec!["01 ene 10:00", "11:00", "12:00"]);
        assert_eq!(plotted(&snapshot), vec![Some(6.0); 3]);
        assert_eq!(repo.historical_calls(SensorType::Ph), vec![RangeSelector::fixed(6)]);
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let (repo, cell) = cell(SensorType::Temperature);
        repo.delay(RangeSelector::fixed(24), Duration::from_millis(80));

        let slow = cell.set_range(24).unwrap();
        let fast = cell.set_range(6).unwrap();
        tokio::join!(slow, fast);

        let snapshot = cell.snapshot();
        assert_eq!(snapshot.status, CellStatus::Ready);
        assert_eq!(snapshot.range, RangeSelector::fixed(6));
        assert_eq!(plotted(&snapshot), vec![Some(6.0); 3]);
    }

    #[tokio::test]
    async fn test_duplicate_requests_dropped_while_loading() {
        let (repo, cell) = cell(SensorType::Ph);

        let fetch = cell.set_range(24).unwrap();
        assert!(cell.set_range(24).is_none());
        let joined_user = cell.refresh(RefreshOrigin::User).unwrap();
        let joined_bulk = cell.refresh(RefreshOrigin::Bulk).unwrap();
        tokio::join!(fetch, joined_user, joined_bulk);

        assert_eq!(repo.historical_calls(SensorType::Ph).len(), 1);
        cell.refresh(RefreshOrigin::User).unwrap().await;
        assert_eq!(repo.historical_calls(SensorType::Ph).len(), 2);
    }

    #[tokio::test]
    async fn test_negative_hours_wait_for_custom_dates() {
        let (repo, cell) = cell(SensorType::Conductivity);

        assert!(cell.set_range(-1).is_none());
        let snapshot = cell.snapshot();
        assert_eq!(snapshot.status, CellStatus::Loading);
        assert!(snapshot.awaiting_custom_range);
        assert!(repo.calls().is_empty());

        cell.set_custom_range(date("2024-01-01"), date("2024-01-07"))
            .unwrap()
            .await;
        let snapshot = cell.snapshot();
        assert_eq!(snapshot.status, CellStatus::Ready);
        assert!(!snapshot.awaiting_custom_range);
        assert!(snapshot.range.is_custom());
        assert_eq!(snapshot.chart.labels[0], "01/01 10:00");
        assert_eq!(plotted(&snapshot), vec![Some(-1.0); 3]);

        // already in custom mode: nothing to prepare
        assert!(cell.set_range(-1).is_none());
        assert!(!cell.snapshot().awaiting_custom_range);
    }

    #[tokio::test]
    async fn test_refresh_while_loading_waits_for_in_flight_fetch() {
        let (repo, cell) = cell(SensorType::Ph);
        repo.delay(RangeSelector::fixed(6), Duration::from_millis(50));

        let fetch = cell.set_range(6).unwrap();
        tokio::spawn(fetch);
        tokio::task::yield_now().await;

        cell.refresh(RefreshOrigin::Bulk).unwrap().await;
        let snapshot = cell.snapshot();
        assert_eq!(snapshot.status, CellStatus::Ready);
        assert_eq!(plotted(&snapshot), vec![Some(6.0); 3]);
        assert_eq!(repo.historical_calls(SensorType::Ph), vec![RangeSelector::fixed(6)]);
    }

    #[tokio::test]
    async fn test_await_custom_has_nothing_to_join() {
        let (repo, cell) = cell(SensorType::Ph);
        cell.await_custom();

        assert!(cell.refresh(RefreshOrigin::Bulk).is_none());
        assert!(cell.refresh(RefreshOrigin::User).is_none());
        assert!(cell.snapshot().awaiting_custom_range);
        assert!(repo.calls().is_empty());
    }

    #[tokio::test]
    async fn test_waiting_state_discards_in_flight_fixed_fetch() {
        let (repo, cell) = cell(SensorType::Ph);
        repo.delay(RangeSelector::fixed(24), Duration::from_millis(30));

        let fetch = cell.set_range(24).unwrap();
        assert!(cell.set_range(-1).is_none());
        fetch.await;

        let snapshot = cell.snapshot();
        assert_eq!(snapshot.status, CellStatus::Loading);
        assert!(snapshot.awaiting_custom_range);
    }

    #[tokio::test]
    async fn test_custom_range_validation() {
        let (repo, cell) = cell(SensorType::Ph);
        let result = cell.set_custom_range(date("2024-01-07"), date("2024-01-01"));
        assert!(matches!(result, Err(DashboardError::InvalidRange { .. })));
        assert!(repo.calls().is_empty());
    }

    #[tokio::test]
    async fn test_custom_range_bypasses_throttle() {
        let (repo, cell) = cell(SensorType::Ph);
        let fixed = cell.set_range(24).unwrap();
        let custom = cell
            .set_custom_range(date("2024-01-01"), date("2024-01-07"))
            .unwrap();
        tokio::join!(fixed, custom);

        assert_eq!(repo.historical_calls(SensorType::Ph).len(), 2);
        assert!(cell.snapshot().range.is_custom());
    }

    #[tokio::test]
    async fn test_bulk_refresh_skips_custom_mode() {
        let (repo, cell) = cell(SensorType::Ph);
        cell.set_custom_range(date("2024-01-01"), date("2024-01-07"))
            .unwrap()
            .await;

        assert!(cell.refresh(RefreshOrigin::Bulk).is_none());
        cell.refresh(RefreshOrigin::User).unwrap().await;

        let calls = repo.historical_calls(SensorType::Ph);
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(RangeSelector::is_custom));
    }

    #[tokio::test]
    async fn test_fetch_failure_shows_fallback_then_recovers() {
        let (repo, cell) = cell(SensorType::WaterLevel);
        repo.fail_historical(SensorType::WaterLevel, true);

        cell.refresh(RefreshOrigin::User).unwrap().await;
        let snapshot = cell.snapshot();
        assert_eq!(snapshot.status, CellStatus::Error);
        assert!(snapshot.error.as_deref().unwrap().contains("500"));
        assert_eq!(snapshot.chart.labels.len(), 5);
        assert_eq!(snapshot.chart.historical.values.len(), 5);

        repo.fail_historical(SensorType::WaterLevel, false);
        cell.refresh(RefreshOrigin::User).unwrap().await;
        let snapshot = cell.snapshot();
        assert_eq!(snapshot.status, CellStatus::Ready);
        assert_eq!(snapshot.error, None);
        assert_eq!(snapshot.chart.labels.len(), 3);
    }

    #[tokio::test]
    async fn test_missing_metric_is_empty_not_error() {
        let (repo, cell) = cell(SensorType::Temperature);
        repo.omit_metric(SensorType::Temperature);

        cell.set_range(6).unwrap().await;
        let snapshot = cell.snapshot();
        assert_eq!(snapshot.status, CellStatus::Ready);
        assert!(snapshot.chart.is_empty());
    }

    #[tokio::test]
    async fn test_overlay_recomposed_after_refetch() {
        let (repo, cell) = cell(SensorType::Ph);
        repo.set_forecast(forecast_of(&[7.2, 7.4]));

        cell.set_range(24).unwrap().await;
        cell.set_prediction(true).await.unwrap();
        let before = cell.snapshot();
        assert_eq!(before.chart.len(), 3 + 2 * (SPACERS_PER_DAY + 1));
        assert_eq!(before.chart.prediction.as_ref().unwrap().values[2], Some(24.0));

        cell.set_range(6).unwrap().await;
        let after = cell.snapshot();
        let prediction = after.chart.prediction.as_ref().unwrap();
        assert_eq!(after.chart.len(), 3 + 2 * (SPACERS_PER_DAY + 1));
        assert_eq!(prediction.values[2], Some(6.0));
        assert_eq!(after.chart.labels[0], "01 ene 10:00");
        assert_eq!(
            prediction.point_radius.iter().filter(|r| **r == FORECAST_RADIUS).count(),
            2
        );
        assert_eq!(repo.forecast_calls(), 1);
    }

    #[tokio::test]
    async fn test_toggle_is_idempotent() {
        let (repo, cell) = cell(SensorType::Conductivity);
        repo.set_forecast(forecast_of(&[500.0, 900.0, 1300.0]));
        cell.set_range(24).unwrap().await;
        let historical_only = cell.snapshot().chart;

        cell.set_prediction(true).await.unwrap();
        let first = cell.snapshot().chart;
        cell.set_prediction(false).await.unwrap();
        let off = cell.snapshot().chart;
        cell.set_prediction(true).await.unwrap();
        let second = cell.snapshot().chart;

        assert_eq!(first, second);
        assert_eq!(off, historical_only);
        assert_eq!(repo.forecast_calls(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_forecast_resets_toggle() {
        let store = Arc::new(MemoryStore::new());
        let (repo, cell) = cell_with(SensorType::Ph, store.clone());
        repo.set_forecast(ForecastResponse {
            success: false,
            predictions: Vec::new(),
            message: Some("not enough data".to_string()),
        });
        cell.set_range(24).unwrap().await;

        cell.set_prediction(true).await.unwrap();
        let snapshot = cell.snapshot();
        assert!(!snapshot.prediction_enabled);
        assert_eq!(snapshot.prediction_error, None);
        assert!(snapshot.chart.prediction.is_none());
        assert_eq!(store.get("prediction_ph_enabled").as_deref(), Some("false"));
    }

    #[tokio::test]
    async fn test_forecast_failure_is_inline() {
        let (repo, cell) = cell(SensorType::Ph);
        repo.fail_forecast(true);
        cell.set_range(24).unwrap().await;

        cell.set_prediction(true).await.unwrap();
        let snapshot = cell.snapshot();
        assert_eq!(snapshot.status, CellStatus::Ready);
        assert!(!snapshot.prediction_enabled);
        assert!(snapshot.prediction_error.is_some());
        assert_eq!(snapshot.chart.len(), 3);
    }

    #[tokio::test]
    async fn test_toggle_off_discards_in_flight_forecast() {
        let store = Arc::new(MemoryStore::new());
        let (repo, cell) = cell_with(SensorType::Ph, store.clone());
        repo.set_forecast(forecast_of(&[7.1, 7.2]));
        repo.delay_forecast(ModelConfig::default(), Duration::from_millis(50));
        cell.set_range(24).unwrap().await;

        let (enabled, disabled) = tokio::join!(cell.set_prediction(true), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            cell.set_prediction(false).await
        });
        enabled.unwrap();
        disabled.unwrap();

        let snapshot = cell.snapshot();
        assert!(!snapshot.prediction_enabled);
        assert!(snapshot.chart.prediction.is_none());
        assert_eq!(snapshot.chart.len(), 3);
        assert_eq!(repo.forecast_calls(), 1);
        assert_eq!(store.get("prediction_ph_enabled").as_deref(), Some("false"));
    }

    #[tokio::test]
    async fn test_config_change_supersedes_in_flight_forecast() {
        let (repo, cell) = cell(SensorType::Ph);
        let updated = ModelConfig::new(2, 7);
        repo.set_forecast_for(ModelConfig::default(), forecast_of(&[7.0, 7.0, 7.0]));
        repo.set_forecast_for(updated, forecast_of(&[8.0, 8.5]));
        repo.delay_forecast(ModelConfig::default(), Duration::from_millis(60));
        cell.set_range(24).unwrap().await;

        let (enabled, ()) = tokio::join!(cell.set_prediction(true), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            cell.update_model_config(updated).await
        });
        enabled.unwrap();

        let snapshot = cell.snapshot();
        let prediction = snapshot.chart.prediction.as_ref().unwrap();
        assert!(snapshot.prediction_enabled);
        assert_eq!(snapshot.model_config, updated);
        assert_eq!(snapshot.chart.len(), 3 + 2 * (SPACERS_PER_DAY + 1));
        assert_eq!(prediction.values.last(), Some(&Some(8.5)));
        assert_eq!(
            repo.calls().iter().filter(|c| matches!(c, Call::Forecast(..))).cloned().collect::<Vec<_>>(),
            vec![
                Call::Forecast(SensorType::Ph, ModelConfig::default()),
                Call::Forecast(SensorType::Ph, updated),
            ]
        );
    }

    #[tokio::test]
    async fn test_forecast_unsupported_sensor() {
        let (repo, cell) = cell(SensorType::Temperature);
        let result = cell.set_prediction(true).await;
        assert!(matches!(result, Err(DashboardError::ForecastUnsupported(_))));
        assert_eq!(repo.forecast_calls(), 0);
    }

    #[tokio::test]
    async fn test_enabled_flag_restored_on_first_load() {
        let store = Arc::new(MemoryStore::new());
        store.set("prediction_ph_enabled", "true").unwrap();
        let (repo, cell) = cell_with(SensorType::Ph, store);
        repo.set_forecast(forecast_of(&[7.0]));

        assert!(cell.snapshot().prediction_enabled);
        cell.set_range(24).unwrap().await;

        let snapshot = cell.snapshot();
        assert!(snapshot.chart.prediction.is_some());
        assert_eq!(repo.forecast_calls(), 1);
    }

    #[tokio::test]
    async fn test_model_config_change_refetches_visible_overlay() {
        let (repo, cell) = cell(SensorType::Ph);
        repo.set_forecast(forecast_of(&[7.0]));
        cell.set_range(24).unwrap().await;
        cell.set_prediction(true).await.unwrap();

        repo.set_forecast(forecast_of(&[7.0, 7.1, 7.2]));
        cell.update_model_config(ModelConfig::new(3, 9)).await;

        let snapshot = cell.snapshot();
        assert_eq!(snapshot.model_config, ModelConfig::new(3, 9));
        assert_eq!(snapshot.chart.len(), 3 + 3 * (SPACERS_PER_DAY + 1));
        assert_eq!(
            repo.calls().last(),
            Some(&Call::Forecast(SensorType::Ph, ModelConfig::new(3, 9)))
        );
    }
}
