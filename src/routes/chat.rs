use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::{
    error::AppResult,
    routes::AppState,
    services::chat::{self, ChatReply},
};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub message: String,
    #[serde(default)]
    pub context: Map<String, Value>,
}

/// Handler for the counsellor chat endpoint
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> AppResult<Json<ChatReply>> {
    let reply = chat::respond(
        &state.gateway,
        state.records.as_ref(),
        &request.user_id,
        &request.message,
        request.context,
    )
    .await?;
    Ok(Json(reply))
}
