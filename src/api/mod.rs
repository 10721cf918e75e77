//! HTTP layer: the liveness probe.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::app_state::AppState;

/// Health check response body.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    message: String,
    version: String,
    uptime_secs: i64,
    timestamp: String,
}

/// `GET /health` — fixed "service is running" payload.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let now = Utc::now();
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "OK".to_string(),
            message: "alphasense-oracle is running".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: (now - state.started_at).num_seconds(),
            timestamp: now.to_rfc3339(),
        }),
    )
}

/// Builds the HTTP router.
pub fn build_router() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn health_returns_ok_payload() {
        let app = build_router().with_state(AppState::new());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value.get("status").and_then(|v| v.as_str()), Some("OK"));
    }
}
