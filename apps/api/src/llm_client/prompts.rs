// Shared prompt fragments.
// Each pipeline that calls the model defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments only.

/// Instruction appended wherever the model works from manuscript content.
pub const FIDELITY_INSTRUCTION: &str = "\
    CRITICAL: Base every statement on the material provided. \
    Do NOT invent characters, events, awards, sales figures or biographical facts. \
    If the material does not support a claim, leave it out.";

/// Language rule shared by every editorial output.
pub const LANGUAGE_INSTRUCTION: &str = "\
    Write all free text in the language of the manuscript. \
    Codes, tags and field names stay exactly as supplied.";
