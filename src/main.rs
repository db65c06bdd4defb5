// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod error;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::application::local_store::{LocalStore, MemoryStore};
use crate::application::poller::Poller;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::file_store::FileStore;
use crate::infrastructure::http_repository::HttpSensorRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    adjust_days, get_chart, get_dashboard, get_prediction_config, health_check, refresh_all,
    refresh_chart, save_prediction_config, select_custom, set_custom_range, set_prediction,
    set_window,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_dashboard_config()?;
    let sensors = config.dashboard.sensor_types()?;

    // Create repository and local storage (infrastructure layer)
    let repository = Arc::new(HttpSensorRepository::new(
        config.api.base_url,
        config.api.token,
        Duration::from_secs(config.api.timeout_secs),
    )?);
    let store: Arc<dyn LocalStore> = match &config.storage.path {
        Some(path) => Arc::new(FileStore::open(path)?),
        None => {
            tracing::warn!("No storage.path configured, preferences will not survive restarts");
            Arc::new(MemoryStore::new())
        }
    };

    // Create services (application layer)
    let dashboard_service = DashboardService::new(
        repository,
        store,
        &sensors,
        config.dashboard.default_window_hours,
    );

    // Initial load, then keep the charts fresh
    dashboard_service.refresh_all().await;
    let _poller = Poller::spawn(
        dashboard_service.controller(),
        Duration::from_secs(config.dashboard.poll_interval_secs),
    );

    let state = Arc::new(AppState { dashboard_service });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/range", post(set_window))
        .route("/range/custom/select", post(select_custom))
        .route("/range/custom", post(set_custom_range))
        .route("/refresh", post(refresh_all))
        .route("/charts/:sensor", get(get_chart))
        .route("/charts/:sensor/refresh", post(refresh_chart))
        .route("/charts/:sensor/prediction", post(set_prediction))
        .route(
            "/charts/:sensor/config",
            get(get_prediction_config).post(save_prediction_config),
        )
        .route("/charts/:sensor/config/days", post(adjust_days))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid server.bind address: {}", config.server.bind))?;
    tracing::info!("Starting reservoir-dashboard on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
