// Range controller - Keeps every chart on the same time window
use crate::application::chart_cell::{ChartHandle, RefreshOrigin};
use crate::domain::dashboard::{ChartSnapshot, WindowSelection};
use crate::domain::range::RangeSelector;
use crate::domain::sensor::SensorType;
use crate::error::DashboardResult;
use chrono::NaiveDate;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::task::JoinHandle;

pub struct RangeController {
    window: RwLock<WindowSelection>,
    cells: Vec<Arc<dyn ChartHandle>>,
}

impl RangeController {
    pub fn new(initial_hours: u32) -> Self {
        Self {
            window: RwLock::new(WindowSelection::Fixed {
                hours: initial_hours,
            }),
            cells: Vec::new(),
        }
    }

    /// Cells live as long as the controller; there is no deregistration.
    pub fn register(&mut self, cell: Arc<dyn ChartHandle>) {
        self.cells.push(cell);
    }

    pub fn window(&self) -> WindowSelection {
        *self.window.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, selection: WindowSelection) {
        *self.window.write().unwrap_or_else(PoisonError::into_inner) = selection;
    }

    pub fn snapshots(&self) -> Vec<ChartSnapshot> {
        self.cells.iter().map(|c| c.snapshot()).collect()
    }

    /// Broadcast a fixed window in registration order. Fetches run in the
    /// background; the handles are returned for callers that want to wait.
    pub fn set_window(&self, hours: u32) -> Vec<JoinHandle<()>> {
        self.record(WindowSelection::Fixed { hours });
        tracing::info!(hours, cells = self.cells.len(), "Window changed");

        self.cells
            .iter()
            .filter_map(|cell| cell.set_range(i64::from(hours)))
            .map(tokio::spawn)
            .collect()
    }

    /// Custom mode chosen before any dates: every cell waits.
    pub fn select_custom(&self) {
        self.record(WindowSelection::CustomPending);
        tracing::info!("Custom range selected, awaiting dates");

        for cell in &self.cells {
            cell.await_custom();
        }
    }

    pub fn set_custom_range(&self, start: NaiveDate, end: NaiveDate) -> DashboardResult<Vec<JoinHandle<()>>> {
        RangeSelector::custom(start, end)?;
        self.record(WindowSelection::Custom { start, end });
        tracing::info!(%start, %end, "Custom range applied");

        let mut handles = Vec::with_capacity(self.cells.len());
        for cell in &self.cells {
            match cell.set_custom_range(start, end) {
                Ok(fetch) => handles.push(tokio::spawn(fetch)),
                Err(e) => {
                    tracing::warn!(sensor = cell.sensor().ui_id(), error = %e, "Cell rejected custom range")
                }
            }
        }
        Ok(handles)
    }

    /// Refresh every cell concurrently and wait for all of them. A cell that
    /// is already loading is waited on rather than refetched, so every
    /// returned cell has settled when this resolves. Individual failures stay
    /// inside their cell; this never fails. Returns the sensors refreshed or
    /// waited on.
    pub async fn refresh_all(&self) -> Vec<SensorType> {
        let pending: Vec<(SensorType, JoinHandle<()>)> = self
            .cells
            .iter()
            .filter_map(|cell| {
                cell.refresh(RefreshOrigin::Bulk)
                    .map(|fetch| (cell.sensor(), tokio::spawn(fetch)))
            })
            .collect();

        let (sensors, handles): (Vec<_>, Vec<_>) = pending.into_iter().unzip();
        let results = futures::future::join_all(handles).await;

        for (sensor, result) in sensors.iter().zip(results) {
            if let Err(e) = result {
                tracing::error!(sensor = sensor.ui_id(), error = %e, "Refresh task aborted");
            }
        }

        tracing::debug!(refreshed = sensors.len(), "Bulk refresh complete");
        sensors
    }
}
