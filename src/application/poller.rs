// Periodic auto-refresh of every chart
use crate::application::range_controller::RangeController;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Background `refresh_all` loop. Dropping the poller stops it.
pub struct Poller {
    handle: JoinHandle<()>,
}

impl Poller {
    /// `None` when `every` is zero (polling disabled).
    pub fn spawn(controller: Arc<RangeController>, every: Duration) -> Option<Self> {
        if every.is_zero() {
            return None;
        }

        tracing::info!(interval_secs = every.as_secs(), "Starting chart poller");
        let handle = tokio::spawn(async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            // first tick fires immediately; the initial load is done elsewhere
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let refreshed = controller.refresh_all().await;
                tracing::debug!(refreshed = refreshed.len(), "Poll refresh done");
            }
        });

        Some(Self { handle })
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
