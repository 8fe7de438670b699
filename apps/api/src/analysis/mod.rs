// Manuscript analysis: metadata generation with controlled-vocabulary classification.
// Flow: base prompt → retry orchestrator (gateway → validator → correction) → normalizer.
// All model calls go through the GenerationGateway, no direct API calls here.

pub mod correction;
pub mod handlers;
pub mod models;
pub mod normalizer;
pub mod orchestrator;
pub mod prompts;
pub mod schema;
pub mod validator;
