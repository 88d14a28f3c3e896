use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Json, State};
use serde::{Deserialize, Serialize};
use spdlog::prelude::*;

use crate::dataset::{self, DatasetRow};
use crate::error::AppError;
use crate::openai::CompletionClient;
use crate::pages::NoticeBoard;

/// Shared handles cloned into each request task. Nothing here is mutable
/// between requests apart from the notice board, which owns its own lock.
#[derive(Clone)]
pub struct AppState {
    pub completion: Option<Arc<CompletionClient>>,
    pub dataset_path: Arc<PathBuf>,
    pub notices: NoticeBoard,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub template: Option<String>,
    #[serde(rename = "inputData")]
    pub input_data: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

// POST /api/generate
//
// Credential check comes first: a missing key is 500 regardless of body
// validity, and neither path issues a provider request.
pub async fn generate(
    State(state): State<AppState>,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let client = state.completion.as_ref().ok_or(AppError::ApiKeyMissing)?;

    let (template, input_data) = match (body.template, body.input_data) {
        (Some(template), Some(input_data))
            if !template.is_empty() && !input_data.is_empty() =>
        {
            (template, input_data)
        }
        _ => return Err(AppError::MissingFields),
    };

    info!("Generating report text ({} bytes of observations)", input_data.len());
    let content = client.complete(&template, &input_data).await?;

    Ok(Json(GenerateResponse { content }))
}

// GET /api/dataset
pub async fn get_dataset(
    State(state): State<AppState>,
) -> Result<Json<Vec<DatasetRow>>, AppError> {
    let rows = dataset::load(&state.dataset_path)?;
    Ok(Json(rows))
}

// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn make_state(completion: Option<CompletionClient>, dataset_path: PathBuf) -> AppState {
        AppState {
            completion: completion.map(Arc::new),
            dataset_path: Arc::new(dataset_path),
            notices: NoticeBoard::new(Duration::from_secs(pages::AUTO_CLOSE_SECS)),
        }
    }

    fn valid_body() -> GenerateRequest {
        GenerateRequest {
            template: Some("Articulation summary".to_string()),
            input_data: Some("Produced /r/ in 8 of 10 trials".to_string()),
        }
    }

    async fn error_payload(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_generate_without_api_key_is_500_even_for_valid_body() {
        let state = make_state(None, PathBuf::from("unused.csv"));

        let result = generate(State(state), Json(valid_body())).await;

        let err = result.err().expect("expected configuration error");
        let (status, payload) = error_payload(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(payload["error"], "OpenAI API key not configured");
    }

    #[tokio::test]
    async fn test_generate_with_missing_field_is_400_without_provider_call() {
        // A configured client whose key is fake: validation fails before any
        // request could go out, so the key is never used.
        let client = CompletionClient::new("test-key".to_string());
        let state = make_state(Some(client), PathBuf::from("unused.csv"));

        let body = GenerateRequest {
            template: Some("Articulation summary".to_string()),
            input_data: None,
        };
        let result = generate(State(state), Json(body)).await;

        let err = result.err().expect("expected validation error");
        let (status, payload) = error_payload(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload["error"], "Missing required fields");
    }

    #[tokio::test]
    async fn test_generate_with_empty_field_is_400() {
        let client = CompletionClient::new("test-key".to_string());
        let state = make_state(Some(client), PathBuf::from("unused.csv"));

        let body = GenerateRequest {
            template: Some(String::new()),
            input_data: Some("notes".to_string()),
        };
        let result = generate(State(state), Json(body)).await;

        assert!(matches!(result, Err(AppError::MissingFields)));
    }

    #[tokio::test]
    async fn test_dataset_route_returns_rows() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"a,b\n1,2\n").unwrap();
        let state = make_state(None, file.path().to_path_buf());

        let Json(rows) = get_dataset(State(state)).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["a"], "1");
        assert_eq!(rows[0]["b"], "2");
    }

    #[tokio::test]
    async fn test_dataset_route_missing_file_is_500() {
        let state = make_state(None, PathBuf::from("no/such/file.csv"));

        let err = get_dataset(State(state)).await.err().unwrap();
        let (status, payload) = error_payload(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(payload["error"], "Failed to read dataset");
    }

    #[tokio::test]
    async fn test_request_body_field_names_are_camel_case() {
        let body: GenerateRequest =
            serde_json::from_str(r#"{"template":"t","inputData":"i"}"#).unwrap();

        assert_eq!(body.template.as_deref(), Some("t"));
        assert_eq!(body.input_data.as_deref(), Some("i"));
    }
}
