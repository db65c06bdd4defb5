// Error types shared across layers
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde_json::json;

use crate::domain::sensor::SensorType;

/// Failures talking to the backend API.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse response: {0}")]
    Decode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("invalid range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("unknown sensor: {0}")]
    UnknownSensor(String),

    #[error("forecasts are not available for {}", .0.title())]
    ForecastUnsupported(SensorType),

    #[error("invalid prediction config")]
    Validation(Vec<String>),

    #[error("backend error: {0}")]
    Api(#[from] ApiError),

    #[error("storage error: {0}")]
    Storage(String),
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let (status, details) = match &self {
            Self::InvalidRange { .. } | Self::ForecastUnsupported(_) => {
                (StatusCode::BAD_REQUEST, Vec::new())
            }
            Self::UnknownSensor(_) => (StatusCode::NOT_FOUND, Vec::new()),
            Self::Validation(errors) => (StatusCode::UNPROCESSABLE_ENTITY, errors.clone()),
            Self::Api(e) => {
                tracing::error!(error = %e, "Backend API error");
                (StatusCode::BAD_GATEWAY, Vec::new())
            }
            Self::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, Vec::new())
            }
        };

        let body = Json(json!({
            "error": self.to_string(),
            "details": details,
        }));

        (status, body).into_response()
    }
}

pub type DashboardResult<T> = Result<T, DashboardError>;
