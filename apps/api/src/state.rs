use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::GenerationGateway;
use crate::vocabulary::Vocabulary;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    /// Model backend. Production: `LlmClient`.
    pub gateway: Arc<dyn GenerationGateway>,
    pub vocabulary: Arc<Vocabulary>,
    pub config: Config,
}
