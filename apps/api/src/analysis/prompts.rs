// Prompt constants for manuscript analysis.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for manuscript analysis.
pub const ANALYSIS_SYSTEM: &str = "You are a senior acquisitions editor and metadata specialist \
    at a trade publisher. You read manuscripts and prepare their catalogue metadata. \
    You MUST answer by calling the provided tool with arguments that match its schema exactly. \
    Do NOT include any text outside the tool call.";

/// Analysis prompt template.
/// Replace: {fidelity_instruction}, {language_instruction}, {word_count}, {tag_list},
///          {bisac_list}, {thema_list}, {ibic_list}, then {manuscript} last.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"{fidelity_instruction}

{language_instruction}

Analyse the manuscript below ({word_count} words) and produce its publishing metadata:

- title: the working title found in the manuscript, or a fitting one if none is present.
- synopsis: a back-cover synopsis of 150 to 250 words. Do not reveal the ending.
- authorBio: a short third-person author biography using only what the manuscript reveals; if it reveals nothing, write a neutral one-sentence placeholder.
- citations: 3 to 5 short, striking quotations copied verbatim from the manuscript.
- tags: 5 to 10 tags chosen ONLY from ALLOWED TAGS, copied exactly.
- classifications: for each of BISAC, THEMA and IBIC, give 2 "main", 2 "secondary" and 2 "related" entries. Each entry has "code" (copied exactly from that scheme's list), "description" and "justification" (one sentence explaining why the code fits this manuscript).

HARD RULES:
1. Tags MUST come from ALLOWED TAGS. Codes MUST come from the list of their own scheme.
2. NEVER invent, shorten or alter a code. A code from one scheme is never valid in another.
3. If no listed value fits well, choose the closest listed one rather than inventing a new one.

ALLOWED TAGS:
{tag_list}

BISAC CODES:
{bisac_list}

THEMA CODES:
{thema_list}

IBIC CODES:
{ibic_list}

MANUSCRIPT:
{manuscript}"#;
