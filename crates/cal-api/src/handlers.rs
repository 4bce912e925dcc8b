//! HTTP API handlers
//!
//! Request handlers for chat and health endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use cal_core::llm::{split_system, Message};
use cal_core::system_prompt;

use crate::error::{ApiError, Result};
use crate::server::AppState;

/// Chat response payload
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// Assistant's final reply text
    pub response: String,
    /// Session id for subsequent requests
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

/// Health check endpoint
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Chat endpoint: one user message in, one assistant reply out.
///
/// The body is taken as a raw JSON value so a missing or non-string
/// `message` maps to the 400 contract instead of an extractor rejection.
/// A body that is not JSON at all gets the same 400 shape.
pub async fn chat(
    State(state): State<AppState>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<ChatResponse>> {
    let Json(body) =
        body.map_err(|_| ApiError::InvalidRequest("No message provided".to_string()))?;

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::InvalidRequest("No message provided".to_string()))?;

    let session_id = body
        .get("sessionId")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .unwrap_or_else(|| state.default_session_id.clone());

    debug!(session_id = %session_id, "Chat request");

    // Serialize concurrent requests on the same session
    let session_lock = state.sessions.lock(&session_id);
    let _guard = session_lock.lock().await;

    let mut session = state.sessions.get_or_create(&session_id).await?;
    // Policy is injected exactly once, as the first turn of a new session
    session.ensure_system_turn(system_prompt());
    let mut messages = session.messages;

    let stamped = format!(
        "{}\n\nCURRENT DATE & TIME: {}",
        message,
        chrono::Local::now().format("%Y-%m-%d %H:%M")
    );
    messages.push(Message::user(&stamped));

    let (system, history) = split_system(messages);

    let result = state
        .llm
        .run_agent_loop(
            history,
            system.clone(),
            &state.tools,
            state.config.agent.max_iterations,
            state.config.agent.max_tokens,
        )
        .await?;

    info!(
        session_id = %session_id,
        iterations = result.iterations,
        tool_calls = result.tool_calls.len(),
        input_tokens = result.total_tokens.input_tokens,
        output_tokens = result.total_tokens.output_tokens,
        "Chat completed"
    );

    // Persist the full transcript, keeping the policy turn first
    let mut transcript = Vec::with_capacity(result.messages.len() + 1);
    if let Some(system) = system {
        transcript.push(Message::system(&system));
    }
    transcript.extend(result.messages);
    state.sessions.replace_messages(&session_id, transcript).await?;

    Ok(Json(ChatResponse {
        response: result.final_response,
        session_id,
    }))
}
