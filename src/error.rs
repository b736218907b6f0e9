//! Error types for the planner, the JSON store and the HTTP layer.
//!
//! Streak and suggestion computation are total and have no error type;
//! only the outer layers can fail.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use uuid::Uuid;

/// Failures of planner mutations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PlannerError {
    #[error("task not found: {0}")]
    TaskNotFound(Uuid),

    #[error("habit not found: {0}")]
    HabitNotFound(Uuid),

    #[error("{0}")]
    Validation(String),
}

/// Failures reading or writing db.json.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything a handler can return.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Planner(#[from] PlannerError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    BadRequest(String),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Planner(PlannerError::TaskNotFound(_))
            | AppError::Planner(PlannerError::HabitNotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Planner(PlannerError::Validation(_)) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Store(_) | AppError::Serialize(_) => {
                log::error!("{self}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
