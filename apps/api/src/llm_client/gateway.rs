//! Generation Gateway: the boundary between Imprint's pipelines and a generative model.
//!
//! The schema a response must conform to travels separately from the prompt text, so
//! nothing downstream ever parses prompt structure.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::llm_client::LlmError;

/// Named JSON Schema the model output must satisfy.
#[derive(Debug, Clone, Serialize)]
pub struct OutputSchema {
    pub name: String,
    pub description: String,
    pub schema: Value,
}

impl OutputSchema {
    pub fn new(name: impl Into<String>, description: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
        }
    }
}

/// One stateless model call: prompt in, structured JSON out.
///
/// Carried in `AppState` as `Arc<dyn GenerationGateway>`. Implementations never keep
/// conversation state between calls.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    async fn generate(
        &self,
        system: &str,
        prompt: &str,
        schema: &OutputSchema,
    ) -> Result<Value, LlmError>;
}
