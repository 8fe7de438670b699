//! Axum route handlers for the Analysis API.

use std::time::Duration;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::analysis::models::AnalysisResult;
use crate::analysis::orchestrator::{ClassificationOrchestrator, ClassificationStatus};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub text: String,
    /// Any non-negative JSON number, rounded to a whole count.
    pub word_count: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub analysis_id: Uuid,
    #[serde(flatten)]
    pub analysis: AnalysisResult,
    pub word_count: u64,
    /// The submitted text, untruncated.
    pub raw_text: String,
    pub attempts: u32,
    pub classification_status: ClassificationStatus,
    pub generated_at: DateTime<Utc>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyze
///
/// Generates publishing metadata and validated subject classifications for a manuscript.
/// Long manuscripts are clipped to `MAX_MANUSCRIPT_CHARS` before prompting.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }
    let word_count = parse_word_count(request.word_count)?;

    let manuscript = truncate_chars(&request.text, state.config.max_manuscript_chars);
    if manuscript.len() < request.text.len() {
        info!(
            "Manuscript clipped to {} characters ({} bytes of {})",
            state.config.max_manuscript_chars,
            manuscript.len(),
            request.text.len()
        );
    }

    let orchestrator =
        ClassificationOrchestrator::new(state.gateway.clone(), state.vocabulary.clone())
            .with_max_attempts(state.config.max_classification_attempts)
            .with_fallback(state.config.code_fallback);

    let timeout_secs = state.config.request_timeout_secs;
    let classified = tokio::time::timeout(
        Duration::from_secs(timeout_secs),
        orchestrator.classify(manuscript, word_count),
    )
    .await
    .map_err(|_| AppError::Timeout(timeout_secs))?
    .map_err(|e| AppError::Llm(format!("Manuscript analysis failed: {e}")))?;

    info!(
        "Analysis complete: status={:?}, attempts={}, tags={}",
        classified.status,
        classified.attempts,
        classified.analysis.tags.len()
    );

    Ok(Json(AnalyzeResponse {
        analysis_id: Uuid::new_v4(),
        analysis: classified.analysis,
        word_count,
        raw_text: request.text,
        attempts: classified.attempts,
        classification_status: classified.status,
        generated_at: Utc::now(),
    }))
}

fn parse_word_count(value: f64) -> Result<u64, AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::Validation(
            "wordCount must be a non-negative number".to_string(),
        ));
    }
    Ok(value.round() as u64)
}

/// First `max_chars` characters of `text`, never splitting a character.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
