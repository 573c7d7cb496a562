use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::discipline::{DisciplineError, RepositoryError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("server error: {0}")]
    Server(#[from] axum::Error),
    #[error("discipline error: {0}")]
    Discipline(#[from] DisciplineError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Discipline(err) => discipline_status(err),
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub fn discipline_status(error: &DisciplineError) -> StatusCode {
    match error {
        DisciplineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DisciplineError::NotFound { .. }
        | DisciplineError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        DisciplineError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        DisciplineError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
