use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::validation::ValidationError;

/// Failures of the task collection itself.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored document could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("schema violation: {0}")]
    Schema(&'static str),
}

/// Errors a service handler turns into an HTTP response.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("Task not found.")]
    NotFound,
    /// The message is what the client sees; the source is only logged.
    #[error("{message}")]
    Storage {
        message: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ServiceError {
    pub fn storage(message: &'static str, source: StoreError) -> Self {
        tracing::error!(error = %source, "{message}");
        ServiceError::Storage { message, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "message": self.to_string() }))).into_response()
    }
}
