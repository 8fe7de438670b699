//! Axum route handlers for the Collateral API.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::collateral::{generate_collateral, BookBrief, Collateral, CollateralKind};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CollateralRequest {
    pub kind: CollateralKind,
    pub book: BookBrief,
}

/// POST /api/v1/collateral
///
/// Writes one piece of marketing collateral from a book's metadata.
pub async fn handle_collateral(
    State(state): State<AppState>,
    Json(request): Json<CollateralRequest>,
) -> Result<Json<Collateral>, AppError> {
    if request.book.title.trim().is_empty() {
        return Err(AppError::Validation("book.title cannot be empty".to_string()));
    }
    if request.book.synopsis.trim().is_empty() {
        return Err(AppError::Validation(
            "book.synopsis cannot be empty".to_string(),
        ));
    }

    let collateral = generate_collateral(state.gateway.as_ref(), request.kind, &request.book)
        .await
        .map_err(|e| AppError::Llm(format!("Collateral generation failed: {e}")))?;

    Ok(Json(collateral))
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

    use crate::config::Config;
    use crate::llm_client::gateway::testing::ScriptedGateway;
    use crate::routes::build_router;
    use crate::state::AppState;
    use crate::vocabulary::sample_vocabulary;

    async fn post_collateral(gateway: Arc<ScriptedGateway>, body: Value) -> (StatusCode, Value) {
        let state = AppState {
            gateway,
            vocabulary: Arc::new(sample_vocabulary()),
            config: Config::test_defaults(),
        };
        let response = build_router(state)
            .oneshot(
                Request::post("/api/v1/collateral")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_collateral_round_trip_through_router() {
        let gateway = Arc::new(ScriptedGateway::repeating(
            json!({"headline": "Titular", "body": "Cuerpo"}),
        ));

        let (status, body) = post_collateral(
            gateway.clone(),
            json!({
                "kind": "salesPitch",
                "book": {"title": "La casa", "synopsis": "Una inspectora vuelve."}
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["kind"], "salesPitch");
        assert_eq!(body["headline"], "Titular");
        assert_eq!(body["body"], "Cuerpo");
        assert!(body["generatedAt"].is_string());
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_collateral_requires_synopsis() {
        let gateway = Arc::new(ScriptedGateway::repeating(json!({"headline": "h", "body": "b"})));

        let (status, body) = post_collateral(
            gateway.clone(),
            json!({"kind": "pressRelease", "book": {"title": "La casa", "synopsis": " "}}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(gateway.calls(), 0);
    }
}
