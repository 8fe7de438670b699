pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers::handle_analyze;
use crate::collateral::handlers::handle_collateral;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis API
        .route("/api/v1/analyze", post(handle_analyze))
        // Collateral API
        .route("/api/v1/collateral", post(handle_collateral))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::llm_client::gateway::testing::ScriptedGateway;
    use crate::vocabulary::sample_vocabulary;

    fn state() -> AppState {
        AppState {
            gateway: Arc::new(ScriptedGateway::repeating(json!({}))),
            vocabulary: Arc::new(sample_vocabulary()),
            config: Config::test_defaults(),
        }
    }

    #[tokio::test]
    async fn test_health_reports_vocabulary_sizes() {
        let response = build_router(state())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["vocabulary"]["tags"], 2);
        assert_eq!(body["vocabulary"]["bisac"], 2);
        assert_eq!(body["vocabulary"]["ibic"], 1);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let response = build_router(state())
            .oneshot(Request::get("/api/v1/manuscripts").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
