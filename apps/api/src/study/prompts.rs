// All LLM prompt constants for the study module.
// Placeholders are substituted by `study::prompt::assemble`.

/// System prompt shared by every study artifact.
pub const STUDY_SYSTEM: &str = "You are a patient study assistant helping a student learn from \
    their own notes. Use only the material in the notes. \
    Write plain text; do not wrap the answer in code fences.";

/// Summary template. Replace `{notes}`.
pub const SUMMARY_PROMPT_TEMPLATE: &str = r#"Summarize the following notes in 5-6 easy bullet points.
Put each bullet point on its own line and start it with "- ".
Do not add an introduction or a conclusion.

NOTES:
{notes}"#;

/// Quiz template. Replace `{count}`, `{notes}`.
pub const QUIZ_PROMPT_TEMPLATE: &str = r#"Create {count} quiz questions (with answers) from the following notes.

Use EXACTLY this format for every question, with nothing else between pairs:
Q: <question>
A: <answer>

NOTES:
{notes}"#;

/// Flashcard template. Replace `{count}`, `{notes}`.
/// Same `Q:` / `A:` delimiters as the quiz so one parser handles both.
pub const FLASHCARDS_PROMPT_TEMPLATE: &str = r#"Convert these notes into {count} flashcards (Q&A format).
Keep the front of each card short; the back holds the fact to remember.

Use EXACTLY this format for every card, with nothing else between cards:
Q: <front of the card>
A: <back of the card>

NOTES:
{notes}"#;

/// Schedule template. Replace `{hours}`, `{notes}`.
pub const SCHEDULE_PROMPT_TEMPLATE: &str = r#"Create a {hours}-hour study plan using these notes. Divide into sessions with breaks.

RULES:
1. The whole plan, breaks included, must fit within {hours} hours
2. Give every session a time range and the topics it covers
3. Include short rest breaks between sessions
4. End with a brief review session

NOTES:
{notes}"#;
