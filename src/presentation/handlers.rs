// HTTP request handlers
use crate::domain::model_config::ModelConfig;
use crate::domain::sensor::SensorType;
use crate::error::{DashboardError, DashboardResult};
use crate::infrastructure::json_mapper::{
    chart_to_json, config_to_json, dashboard_to_json, ChartView, ConfigView, DashboardView,
};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct WindowRequest {
    pub hours: u32,
}

#[derive(Deserialize)]
pub struct CustomRangeRequest {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Deserialize)]
pub struct PredictionToggle {
    pub enabled: bool,
}

fn parse_sensor(id: &str) -> DashboardResult<SensorType> {
    SensorType::from_ui_id(id).ok_or_else(|| DashboardError::UnknownSensor(id.to_string()))
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    Json(dashboard_to_json(state.dashboard_service.dashboard()))
}

pub async fn get_chart(
    Path(sensor): Path<String>,
    State(state): State<Arc<AppState>>,
) -> DashboardResult<Json<ChartView>> {
    let snapshot = state.dashboard_service.chart(parse_sensor(&sensor)?)?;
    Ok(Json(chart_to_json(snapshot)))
}

/// Returns as soon as the window is recorded; charts load in the background.
pub async fn set_window(
    State(state): State<Arc<AppState>>,
    Json(request): Json<WindowRequest>,
) -> impl IntoResponse {
    state.dashboard_service.set_window(request.hours);
    (
        StatusCode::ACCEPTED,
        Json(dashboard_to_json(state.dashboard_service.dashboard())),
    )
}

pub async fn select_custom(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.dashboard_service.select_custom();
    (
        StatusCode::ACCEPTED,
        Json(dashboard_to_json(state.dashboard_service.dashboard())),
    )
}

pub async fn set_custom_range(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CustomRangeRequest>,
) -> DashboardResult<impl IntoResponse> {
    state
        .dashboard_service
        .set_custom_range(request.start, request.end)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(dashboard_to_json(state.dashboard_service.dashboard())),
    ))
}

/// Retry one chart, custom range included. Waits for the fetch.
pub async fn refresh_chart(
    Path(sensor): Path<String>,
    State(state): State<Arc<AppState>>,
) -> DashboardResult<Json<ChartView>> {
    let snapshot = state
        .dashboard_service
        .refresh_chart(parse_sensor(&sensor)?)
        .await?;
    Ok(Json(chart_to_json(snapshot)))
}

/// Waits until every chart has settled.
pub async fn refresh_all(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    Json(dashboard_to_json(state.dashboard_service.refresh_all().await))
}

pub async fn set_prediction(
    Path(sensor): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(toggle): Json<PredictionToggle>,
) -> DashboardResult<Json<ChartView>> {
    let snapshot = state
        .dashboard_service
        .set_prediction(parse_sensor(&sensor)?, toggle.enabled)
        .await?;
    Ok(Json(chart_to_json(snapshot)))
}

pub async fn get_prediction_config(
    Path(sensor): Path<String>,
    State(state): State<Arc<AppState>>,
) -> DashboardResult<Json<ConfigView>> {
    let config = state
        .dashboard_service
        .prediction_config(parse_sensor(&sensor)?)?;
    Ok(Json(config_to_json(config, None)))
}

pub async fn adjust_days(
    Path(sensor): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(config): Json<ModelConfig>,
) -> DashboardResult<Json<ConfigView>> {
    let adjustment = state
        .dashboard_service
        .adjust_days(parse_sensor(&sensor)?, config)?;
    Ok(Json(config_to_json(adjustment.config, adjustment.notice)))
}

pub async fn save_prediction_config(
    Path(sensor): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(config): Json<ModelConfig>,
) -> DashboardResult<Json<ConfigView>> {
    let saved = state
        .dashboard_service
        .save_prediction_config(parse_sensor(&sensor)?, config)
        .await?;
    Ok(Json(config_to_json(saved, None)))
}
