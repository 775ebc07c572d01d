//! Axum HTTP surface for the analyze pipeline.
//!
//! One pipeline execution per inbound request; concurrent requests share
//! only the immutable services held in [`AppState`]. Failures at any stage
//! short-circuit into the uniform error body, never a partial result.

use crate::ai::VisionService;
use crate::fetch::ImageFetcher;
use crate::models::{AnalyzeRequest, AnalyzeResponse, ErrorBody, InlineImage};
use crate::Result;
use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub const MISSING_FIELDS_ERROR: &str = "Missing imageUrl, prompt, or mimeType in request body";
pub const ANALYZE_FAILED_ERROR: &str = "Failed to analyze image.";

/// Shared application state. Read-only after startup.
pub struct AppState {
    pub fetcher: Arc<dyn ImageFetcher>,
    pub vision: Arc<dyn VisionService>,
}

impl AppState {
    pub fn new(fetcher: Arc<dyn ImageFetcher>, vision: Arc<dyn VisionService>) -> Self {
        Self { fetcher, vision }
    }
}

/// Build the Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/analyze", post(analyze_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: Arc<AppState>, host: &str, port: u16) -> Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Fetch, encode, invoke, extract. Strictly sequential; the first failing
/// stage aborts the rest (a fetch failure must never reach the model).
async fn run_pipeline(state: &AppState, request: &AnalyzeRequest) -> Result<String> {
    let bytes = state.fetcher.fetch(&request.image_url).await?;
    let image = InlineImage::encode(&bytes, &request.mime_type);
    state.vision.analyze(&request.prompt, &image).await
}

/// Fixed 400 body for every client-side request defect: missing fields,
/// empty fields, or a body the extractor could not decode.
fn invalid_request_response() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: MISSING_FIELDS_ERROR.to_string(),
            details: None,
        }),
    )
        .into_response()
}

async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    request: std::result::Result<Json<AnalyzeRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Ok(Json(request)) = request else {
        return invalid_request_response();
    };

    if !request.is_complete() {
        return invalid_request_response();
    }

    match run_pipeline(&state, &request).await {
        Ok(analysis) => {
            info!("Analysis completed for {}", request.image_url);
            (StatusCode::OK, Json(AnalyzeResponse { analysis })).into_response()
        }
        Err(e) => {
            error!("Error in AI analysis: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: ANALYZE_FAILED_ERROR.to_string(),
                    details: Some(e.details()),
                }),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::mock::{MockVisionClient, MockVisionFailure};
    use crate::fetch::MockImageFetcher;
    use crate::Error;

    fn make_request() -> AnalyzeRequest {
        AnalyzeRequest {
            image_url: "https://x/img.png".to_string(),
            prompt: "Analyze this webpage UI".to_string(),
            mime_type: "image/png".to_string(),
        }
    }

    #[tokio::test]
    async fn test_pipeline_returns_model_text() {
        let fetcher = Arc::new(MockImageFetcher::new().with_response(vec![0x89, 0x50]));
        let vision =
            Arc::new(MockVisionClient::new().with_response("The layout is cluttered.".to_string()));
        let state = AppState::new(fetcher, vision);

        let analysis = run_pipeline(&state, &make_request()).await.unwrap();
        assert_eq!(analysis, "The layout is cluttered.");
    }

    #[tokio::test]
    async fn test_fetch_failure_never_reaches_model() {
        let fetcher = Arc::new(MockImageFetcher::new().with_failure("Not Found"));
        let vision = Arc::new(MockVisionClient::new());
        let state = AppState::new(fetcher.clone(), vision.clone());

        let err = run_pipeline(&state, &make_request()).await.unwrap_err();

        assert!(matches!(err, Error::ResourceFetch(_)));
        assert_eq!(fetcher.get_call_count(), 1);
        assert_eq!(vision.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_completion_propagates() {
        let fetcher = Arc::new(MockImageFetcher::new());
        let vision =
            Arc::new(MockVisionClient::new().with_failure(MockVisionFailure::EmptyCompletion));
        let state = AppState::new(fetcher, vision);

        let err = run_pipeline(&state, &make_request()).await.unwrap_err();
        assert!(matches!(err, Error::EmptyCompletion));
    }
}
