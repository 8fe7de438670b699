mod analysis;
mod collateral;
mod config;
mod errors;
mod llm_client;
mod routes;
mod state;
mod vocabulary;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::vocabulary::{Scheme, Vocabulary};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Imprint API v{}", env!("CARGO_PKG_VERSION"));

    // Load the controlled vocabulary once; it is read-only from here on
    let vocabulary = Vocabulary::load(config.vocabulary_dir.as_deref())
        .context("Failed to load controlled vocabulary")?;
    info!(
        "Vocabulary loaded ({}): {} tags, {} BISAC, {} THEMA, {} IBIC codes",
        config
            .vocabulary_dir
            .as_ref()
            .map(|dir| dir.display().to_string())
            .unwrap_or_else(|| "embedded".to_string()),
        vocabulary.tags().len(),
        vocabulary.codes(Scheme::Bisac).len(),
        vocabulary.codes(Scheme::Thema).len(),
        vocabulary.codes(Scheme::Ibic).len()
    );

    // Initialize LLM client
    let llm = LlmClient::new(
        config.anthropic_api_key.clone(),
        config.llm_api_url.clone(),
        config.llm_model.clone(),
    )
    .context("Failed to build LLM client")?;
    info!("LLM client initialized (model: {})", llm.model());

    info!(
        "Classification: up to {} attempts, fallback {:?}, {}s request timeout",
        config.max_classification_attempts, config.code_fallback, config.request_timeout_secs
    );

    // Build app state
    let state = AppState {
        gateway: Arc::new(llm),
        vocabulary: Arc::new(vocabulary),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
