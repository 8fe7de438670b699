//! Output contract for the analysis call, independent of the prompt wording.

use serde_json::{json, Value};

use crate::llm_client::OutputSchema;

pub const ANALYSIS_TOOL_NAME: &str = "record_manuscript_analysis";

fn string_array() -> Value {
    json!({"type": "array", "items": {"type": "string"}})
}

fn classification_item() -> Value {
    json!({
        "type": "object",
        "properties": {
            "code": {"type": "string"},
            "description": {"type": "string"},
            "justification": {"type": "string"}
        },
        "required": ["code", "description", "justification"],
        "additionalProperties": false
    })
}

fn subject_classification() -> Value {
    let tier = json!({"type": "array", "items": classification_item()});
    json!({
        "type": "object",
        "properties": {
            "main": tier.clone(),
            "secondary": tier.clone(),
            "related": tier
        },
        "required": ["main", "secondary", "related"],
        "additionalProperties": false
    })
}

/// JSON Schema of `AnalysisResult` as the model must return it.
pub fn analysis_schema() -> OutputSchema {
    let schema = json!({
        "type": "object",
        "properties": {
            "title": {"type": "string"},
            "synopsis": {"type": "string"},
            "authorBio": {"type": "string"},
            "citations": string_array(),
            "tags": string_array(),
            "classifications": {
                "type": "object",
                "properties": {
                    "bisac": subject_classification(),
                    "thema": subject_classification(),
                    "ibic": subject_classification()
                },
                "required": ["bisac", "thema", "ibic"],
                "additionalProperties": false
            }
        },
        "required": ["title", "synopsis", "authorBio", "citations", "tags", "classifications"],
        "additionalProperties": false
    });

    OutputSchema::new(
        ANALYSIS_TOOL_NAME,
        "Record the publishing metadata and subject classification of a manuscript.",
        schema,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_requires_every_top_level_field() {
        let schema = analysis_schema();
        let required: Vec<&str> = schema.schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        for field in ["title", "synopsis", "authorBio", "citations", "tags", "classifications"] {
            assert!(required.contains(&field), "{field} not required");
        }
        assert_eq!(schema.name, ANALYSIS_TOOL_NAME);
    }

    #[test]
    fn test_schema_requires_all_tiers_and_item_fields() {
        let schema = analysis_schema().schema;
        for scheme in ["bisac", "thema", "ibic"] {
            let classification = &schema["properties"]["classifications"]["properties"][scheme];
            assert_eq!(
                classification["required"],
                json!(["main", "secondary", "related"])
            );
            assert_eq!(
                classification["properties"]["main"]["items"]["required"],
                json!(["code", "description", "justification"])
            );
        }
    }
}
