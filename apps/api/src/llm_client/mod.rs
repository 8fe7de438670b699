/// LLM Client: the single point of entry for all model calls in Imprint.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// Callers depend on the `GenerationGateway` trait; `LlmClient` is its production backend.
///
/// Structured output is obtained by forcing a single tool whose `input_schema` is the
/// caller's `OutputSchema`. The tool call's input is the structured result.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod gateway;
pub mod prompts;

pub use gateway::{GenerationGateway, OutputSchema};

pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Default model when `LLM_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 8192;
/// HTTP attempts per call when the API answers 429 or 5xx.
const MAX_TRANSPORT_ATTEMPTS: u32 = 3;
const HTTP_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolDefinition<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ToolDefinition<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: &'a Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice<'a> {
    #[serde(rename = "type")]
    choice_type: &'a str,
    name: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
    pub name: Option<String>,
    pub input: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }

    /// Input of the first `tool_use` block addressed to `tool_name`.
    pub fn tool_input(&self, tool_name: &str) -> Option<&Value> {
        self.content
            .iter()
            .find(|b| b.block_type == "tool_use" && b.name.as_deref() == Some(tool_name))
            .and_then(|b| b.input.as_ref())
    }

    /// The structured result: the forced tool call's input, or JSON text if the model
    /// answered in prose instead.
    pub fn structured(&self, tool_name: &str) -> Result<Value, LlmError> {
        if let Some(input) = self.tool_input(tool_name) {
            return Ok(input.clone());
        }

        let text = self.text().ok_or(LlmError::EmptyContent)?;
        let text = strip_json_fences(text);
        if text.is_empty() {
            return Err(LlmError::EmptyContent);
        }
        serde_json::from_str(text).map_err(LlmError::Parse)
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// The single LLM client used by all services in Imprint.
/// Wraps the Anthropic Messages API with transport retry and structured output.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: String, api_url: String, model: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
                .build()?,
            api_key,
            api_url,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes a raw call, returning the full response object.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    async fn call(&self, request_body: &AnthropicRequest<'_>) -> Result<LlmResponse, LlmError> {
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_TRANSPORT_ATTEMPTS {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.api_url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<AnthropicError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let llm_response: LlmResponse = response.json().await?;

            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                llm_response.usage.input_tokens, llm_response.usage.output_tokens
            );

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_TRANSPORT_ATTEMPTS,
        }))
    }
}

#[async_trait]
impl GenerationGateway for LlmClient {
    async fn generate(
        &self,
        system: &str,
        prompt: &str,
        schema: &OutputSchema,
    ) -> Result<Value, LlmError> {
        let request_body = AnthropicRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
            tools: vec![ToolDefinition {
                name: &schema.name,
                description: &schema.description,
                input_schema: &schema.schema,
            }],
            tool_choice: Some(ToolChoice {
                choice_type: "tool",
                name: &schema.name,
            }),
        };

        let response = self.call(&request_body).await?;
        response.structured(&schema.name)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(content: Value) -> LlmResponse {
        serde_json::from_value(json!({
            "content": content,
            "usage": {"input_tokens": 10, "output_tokens": 20}
        }))
        .unwrap()
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_structured_prefers_matching_tool_input() {
        let response = response(json!([
            {"type": "text", "text": "{\"from\": \"text\"}"},
            {"type": "tool_use", "id": "t1", "name": "record_analysis", "input": {"from": "tool"}}
        ]));
        assert_eq!(
            response.structured("record_analysis").unwrap(),
            json!({"from": "tool"})
        );
    }

    #[test]
    fn test_structured_ignores_other_tools() {
        let response = response(json!([
            {"type": "tool_use", "id": "t1", "name": "something_else", "input": {"x": 1}}
        ]));
        assert!(matches!(
            response.structured("record_analysis"),
            Err(LlmError::EmptyContent)
        ));
    }

    #[test]
    fn test_structured_falls_back_to_fenced_text() {
        let response = response(json!([
            {"type": "text", "text": "```json\n{\"title\": \"La sombra\"}\n```"}
        ]));
        assert_eq!(
            response.structured("record_analysis").unwrap(),
            json!({"title": "La sombra"})
        );
    }

    #[test]
    fn test_structured_empty_content() {
        assert!(matches!(
            response(json!([])).structured("record_analysis"),
            Err(LlmError::EmptyContent)
        ));
        assert!(matches!(
            response(json!([{"type": "text", "text": "   "}])).structured("record_analysis"),
            Err(LlmError::EmptyContent)
        ));
    }

    #[test]
    fn test_structured_malformed_text_is_parse_error() {
        let response = response(json!([{"type": "text", "text": "not json at all"}]));
        assert!(matches!(
            response.structured("record_analysis"),
            Err(LlmError::Parse(_))
        ));
    }

    #[test]
    fn test_request_serializes_forced_tool() {
        let schema = json!({"type": "object"});
        let request = AnthropicRequest {
            model: DEFAULT_MODEL,
            max_tokens: MAX_TOKENS,
            system: "sys",
            messages: vec![AnthropicMessage {
                role: "user",
                content: "hello",
            }],
            tools: vec![ToolDefinition {
                name: "record_analysis",
                description: "desc",
                input_schema: &schema,
            }],
            tool_choice: Some(ToolChoice {
                choice_type: "tool",
                name: "record_analysis",
            }),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["tool_choice"], json!({"type": "tool", "name": "record_analysis"}));
        assert_eq!(value["tools"][0]["input_schema"], schema);
        assert_eq!(value["messages"][0]["role"], "user");
    }
}
