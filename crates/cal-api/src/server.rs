//! HTTP API Server
//!
//! Starts and manages the axum-based HTTP server.

use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use cal_core::{Config, LlmClient, SessionManager, ToolManager};

use crate::routes::routes;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub llm: Arc<LlmClient>,
    pub sessions: Arc<SessionManager>,
    pub tools: Arc<ToolManager>,
    /// Fallback session id for requests that carry none, generated at startup
    pub default_session_id: String,
}

/// Build the application router with CORS applied
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP API server
pub async fn start_server(
    port: u16,
    config: Config,
    llm: Arc<LlmClient>,
    sessions: Arc<SessionManager>,
    tools: Arc<ToolManager>,
    default_session_id: String,
) -> anyhow::Result<()> {
    let state = AppState {
        config,
        llm,
        sessions,
        tools,
        default_session_id,
    };

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("HTTP API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::util::ServiceExt;

    fn test_state() -> AppState {
        let config = Config::default();
        let llm = Arc::new(LlmClient::new(&config).expect("client"));
        AppState {
            config,
            llm,
            sessions: Arc::new(SessionManager::in_memory().expect("store")),
            tools: Arc::new(ToolManager::new()),
            default_session_id: "test-default".to_string(),
        }
    }

    #[tokio::test]
    async fn test_health_returns_ok() {
        let app = app(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_chat_rejects_blank_message() {
        let app = app(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"message": "   "}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({"error": "No message provided"}));
    }

    #[tokio::test]
    async fn test_chat_rejects_missing_message() {
        let app = app(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"sessionId": "s1"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chat_rejects_non_json_body_with_json_error() {
        let app = app(test_state());

        // Extractor failures keep the same JSON error shape as validation
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/chat")
                    .header("content-type", "text/plain")
                    .body(Body::from("hello"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({"error": "No message provided"}));
    }

    #[tokio::test]
    async fn test_chat_rejects_malformed_json_body() {
        let app = app(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/chat")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chat_rejects_non_string_message() {
        let app = app(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"message": 42}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
