//! Marketing collateral: press releases, interviews, social posts, sales pitches and
//! reading reports written from a book's approved metadata.
//!
//! One gateway call per piece. There is no validation loop: the output is free text with
//! no controlled vocabulary to check.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::collateral::prompts::{
    AUTHOR_INTERVIEW_INSTRUCTION, COLLATERAL_PROMPT_TEMPLATE, COLLATERAL_SYSTEM,
    PRESS_RELEASE_INSTRUCTION, READING_REPORT_INSTRUCTION, SALES_PITCH_INSTRUCTION,
    SOCIAL_POSTS_INSTRUCTION,
};
use crate::llm_client::prompts::{FIDELITY_INSTRUCTION, LANGUAGE_INSTRUCTION};
use crate::llm_client::{GenerationGateway, LlmError, OutputSchema};

pub mod handlers;
pub mod prompts;

pub const COLLATERAL_TOOL_NAME: &str = "record_collateral";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CollateralKind {
    PressRelease,
    AuthorInterview,
    SocialPosts,
    SalesPitch,
    ReadingReport,
}

impl CollateralKind {
    fn instruction(self) -> &'static str {
        match self {
            CollateralKind::PressRelease => PRESS_RELEASE_INSTRUCTION,
            CollateralKind::AuthorInterview => AUTHOR_INTERVIEW_INSTRUCTION,
            CollateralKind::SocialPosts => SOCIAL_POSTS_INSTRUCTION,
            CollateralKind::SalesPitch => SALES_PITCH_INSTRUCTION,
            CollateralKind::ReadingReport => READING_REPORT_INSTRUCTION,
        }
    }
}

/// The slice of an analysis result collateral is written from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookBrief {
    pub title: String,
    pub synopsis: String,
    #[serde(default)]
    pub author_bio: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct CollateralDraft {
    headline: String,
    body: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Collateral {
    pub kind: CollateralKind,
    pub headline: String,
    pub body: String,
    pub generated_at: DateTime<Utc>,
}

pub fn collateral_schema() -> OutputSchema {
    OutputSchema::new(
        COLLATERAL_TOOL_NAME,
        "Record one piece of marketing collateral.",
        json!({
            "type": "object",
            "properties": {
                "headline": {"type": "string"},
                "body": {"type": "string"}
            },
            "required": ["headline", "body"],
            "additionalProperties": false
        }),
    )
}

fn build_collateral_prompt(kind: CollateralKind, book: &BookBrief) -> Result<String, LlmError> {
    let book_json = serde_json::to_string_pretty(book)?;

    Ok(COLLATERAL_PROMPT_TEMPLATE
        .replace("{fidelity_instruction}", FIDELITY_INSTRUCTION)
        .replace("{language_instruction}", LANGUAGE_INSTRUCTION)
        .replace("{kind_instruction}", kind.instruction())
        .replace("{book_json}", &book_json))
}

/// Writes one piece of collateral. Gateway failures and empty output are errors.
pub async fn generate_collateral(
    gateway: &dyn GenerationGateway,
    kind: CollateralKind,
    book: &BookBrief,
) -> Result<Collateral, LlmError> {
    let prompt = build_collateral_prompt(kind, book)?;
    let value = gateway
        .generate(COLLATERAL_SYSTEM, &prompt, &collateral_schema())
        .await?;
    let draft: CollateralDraft = serde_json::from_value(value)?;

    if draft.body.trim().is_empty() {
        return Err(LlmError::EmptyContent);
    }

    Ok(Collateral {
        kind,
        headline: draft.headline.trim().to_string(),
        body: draft.body.trim().to_string(),
        generated_at: Utc::now(),
    })
}
