// Prompt constants for marketing collateral.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for collateral generation.
pub const COLLATERAL_SYSTEM: &str = "You are the marketing and publicity lead of a trade \
    publisher. You write clear, specific copy that sells a book without overselling it. \
    You MUST answer by calling the provided tool with arguments that match its schema exactly.";

/// Collateral prompt template.
/// Replace: {fidelity_instruction}, {language_instruction}, {kind_instruction}, {book_json}
pub const COLLATERAL_PROMPT_TEMPLATE: &str = r#"{fidelity_instruction}

{language_instruction}

TASK:
{kind_instruction}

BOOK METADATA (source of truth — ONLY use facts from here):
{book_json}

Return a "headline" (one line) and a "body" (the full piece, plain text, paragraphs separated by blank lines)."#;

pub const PRESS_RELEASE_INSTRUCTION: &str = "Write a press release announcing the \
    publication. Headline: the news angle. Body: dateline placeholder [CITY, DATE], a lead \
    paragraph, two paragraphs on the book, one paragraph on the author, and a closing \
    boilerplate placeholder [ABOUT THE PUBLISHER].";

pub const AUTHOR_INTERVIEW_INSTRUCTION: &str = "Write an author interview of 6 to 8 questions \
    a literary journalist would ask about this book. Headline: the interview title. Body: \
    alternate 'Q:' and 'A:' lines; answers are suggested talking points in the author's voice \
    and must stay within what the metadata supports.";

pub const SOCIAL_POSTS_INSTRUCTION: &str = "Write 5 social media posts promoting the book, \
    each under 280 characters, with at most 3 hashtags drawn from the book's tags. Headline: a \
    campaign name. Body: one post per paragraph.";

pub const SALES_PITCH_INSTRUCTION: &str = "Write a sales pitch for booksellers and \
    distributors. Headline: a one-line hook. Body: the pitch in under 200 words, naming the \
    target readership and two comparable titles described generically (no invented sales \
    figures).";

pub const READING_REPORT_INSTRUCTION: &str = "Write an editorial reading report. Headline: a \
    one-line verdict. Body: sections 'Summary', 'Strengths', 'Weaknesses', 'Market' and \
    'Recommendation', each a short paragraph.";
