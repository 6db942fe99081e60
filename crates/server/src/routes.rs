//! Route handlers.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use medquery_core::AppError;
use medquery_retrieval::Answer;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
}

/// `GET /`
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "mode": "Real-Time Automation",
    }))
}

/// `POST /query`
pub async fn query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<Answer>, ApiError> {
    let Json(request) = payload.map_err(|e| AppError::InvalidRequest(e.body_text()))?;

    let answer = state
        .pipeline
        .answer_within(&request.question, state.request_timeout)
        .await?;

    tracing::info!(sources = answer.citations.len(), "Answered query");

    Ok(Json(answer))
}
