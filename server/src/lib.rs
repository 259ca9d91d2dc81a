// server/src/lib.rs

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response as AxumResponse},
    routing::{delete, get, post},
    Json, Router,
};
use gate_core::{ChatMessage, DecisionResult, StatsSnapshot};
use orchestrator::DecisionOrchestrator;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tower_http::{cors::{Any, CorsLayer}, trace::TraceLayer};

pub type SharedOrchestrator = Arc<DecisionOrchestrator>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecideRequest {
    pub user_message: String,
    #[serde(default)]
    pub session: Option<Value>,
    #[serde(default)]
    pub recent_messages: Vec<ChatMessage>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid decision request: {0}")]
    InvalidRequest(#[from] JsonRejection),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> AxumResponse {
        tracing::warn!(error = %self, "[Server] Rejected request");
        let status = match &self {
            ApiError::InvalidRequest(rejection) => rejection.status(),
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

async fn decide_handler(
    State(orchestrator): State<SharedOrchestrator>,
    payload: Result<Json<DecideRequest>, JsonRejection>,
) -> Result<Json<DecisionResult>, ApiError> {
    let Json(request) = payload?;
    let result = orchestrator
        .decide(&request.user_message, request.session.as_ref(), &request.recent_messages)
        .await;
    Ok(Json(result))
}

async fn stats_handler(State(orchestrator): State<SharedOrchestrator>) -> Json<StatsSnapshot> {
    Json(orchestrator.stats())
}

async fn clear_cache_handler(State(orchestrator): State<SharedOrchestrator>) -> StatusCode {
    orchestrator.clear_cache();
    StatusCode::NO_CONTENT
}

pub fn app(orchestrator: SharedOrchestrator) -> Router {
    Router::new()
        .route("/api/v1/memory-decision", post(decide_handler))
        .route("/api/v1/memory-decision/stats", get(stats_handler))
        .route("/api/v1/memory-decision/cache", delete(clear_cache_handler))
        .with_state(orchestrator)
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}
