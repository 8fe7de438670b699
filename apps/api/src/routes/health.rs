use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;
use crate::vocabulary::Scheme;

/// GET /health
/// Returns service status, version and the size of the loaded vocabulary.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let vocabulary = &state.vocabulary;
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "imprint-api",
        "vocabulary": {
            "tags": vocabulary.tags().len(),
            "bisac": vocabulary.codes(Scheme::Bisac).len(),
            "thema": vocabulary.codes(Scheme::Thema).len(),
            "ibic": vocabulary.codes(Scheme::Ibic).len(),
        }
    }))
}
