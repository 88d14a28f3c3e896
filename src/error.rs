use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use spdlog::prelude::*;
use thiserror::Error;

use crate::dataset::DatasetError;
use crate::openai::CompletionError;

/// Request-level failures and the HTTP status each maps to. Every failure is
/// terminal for the current request; nothing is retried.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("OpenAI API key not configured")]
    ApiKeyMissing,

    #[error("Failed to read dataset")]
    Dataset(#[from] DatasetError),

    #[error("{0}")]
    Completion(#[from] CompletionError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::MissingFields => StatusCode::BAD_REQUEST,
            AppError::ApiKeyMissing | AppError::Dataset(_) | AppError::Completion(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            match &self {
                AppError::Dataset(source) => error!("Dataset read failed: {}", source),
                other => error!("Request failed: {}", other),
            }
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
