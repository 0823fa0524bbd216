//! Mention histogram endpoint.
//!
//! `GET /analyze/:keyword/:option` answers `{"labels": [...], "response": [...]}`
//! on success and `{"error": "..."}` otherwise.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tally_analytics::HistogramResult;
use tally_social::SearchError;

use crate::pipeline::{ConfigurationError, PipelineError};
use crate::AppState;

/// GET /analyze/:keyword/:option
pub async fn analyze(
    State(state): State<AppState>,
    Path((keyword, option)): Path<(String, String)>,
) -> Result<Json<HistogramResult>, PipelineError> {
    match state.pipeline.run(&keyword, &option).await {
        Ok(result) => Ok(Json(result)),
        Err(err) => {
            tracing::warn!(%keyword, %option, kind = err.kind(), error = %err, "analyze.failed");
            Err(err)
        }
    }
}

pub fn analyze_routes() -> Router<AppState> {
    Router::new().route("/analyze/:keyword/:option", get(analyze))
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = match &self {
            PipelineError::Configuration(ConfigurationError::UnknownOption(_))
            | PipelineError::Search(SearchError::InvalidQuery(_)) => StatusCode::BAD_REQUEST,
            PipelineError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PipelineError::Search(_)
            | PipelineError::Transport(_)
            | PipelineError::ServiceStatus(_)
            | PipelineError::MalformedResponse(_)
            | PipelineError::MalformedAnnotation(_) => StatusCode::BAD_GATEWAY,
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
