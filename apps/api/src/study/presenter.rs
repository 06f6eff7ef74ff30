//! Result Presenter: best-effort parsing of free-form model output into
//! display structures.
//!
//! The `Q:` / `A:` contract in the prompts is advisory. Lines that do not
//! match are skipped, and a response with no recognizable pairs yields an
//! empty list rather than an error.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::study::prompt::ArtifactKind;

/// One question/answer (or front/back) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "items", rename_all = "snake_case")]
pub enum Structured {
    Bullets(Vec<String>),
    Pairs(Vec<QaPair>),
}

/// A generated artifact ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactResult {
    pub kind: ArtifactKind,
    pub raw_text: String,
    /// `None` for schedules, which are shown as free text.
    pub structured: Option<Structured>,
}

// "Q: ...", "Q1: ...", "**Question 2:** ...", "- Front: ..."
static RE_QUESTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:[-*•>]\s*)?(?:\d+[.)]\s*)?\**\s*(?:question|front|q)\s*\d*\s*\**\s*:\s*\**\s*(.*?)\s*\**\s*$",
    )
    .unwrap()
});

// "A: ...", "**Answer:** ...", "Back: ..."
static RE_ANSWER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:[-*•>]\s*)?\**\s*(?:answer|back|a)\s*\d*\s*\**\s*:\s*\**\s*(.*?)\s*\**\s*$",
    )
    .unwrap()
});

// Answer on the same line as its question: "Q: What is ATP? A: Energy currency."
static RE_INLINE_ANSWER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s\**(?:A|Answer|Back)\s*\**:\s*\**\s*").unwrap());

static RE_LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[-*•+]|\d+[.)])\s+").unwrap());

/// Maps raw model output to an `ArtifactResult`. Never fails.
pub fn present(kind: ArtifactKind, raw_text: &str) -> ArtifactResult {
    let structured = match kind {
        ArtifactKind::Summary => Some(Structured::Bullets(parse_bullets(raw_text))),
        ArtifactKind::Quiz | ArtifactKind::Flashcards => {
            Some(Structured::Pairs(parse_pairs(raw_text)))
        }
        ArtifactKind::Schedule => None,
    };

    ArtifactResult {
        kind,
        raw_text: raw_text.to_string(),
        structured,
    }
}

fn parse_bullets(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("```"))
        .map(|line| RE_LIST_MARKER.replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

fn parse_pairs(raw: &str) -> Vec<QaPair> {
    let mut pairs = Vec::new();
    let mut pending: Option<String> = None;

    let lines: Vec<&str> = raw.lines().collect();

    for (i, line) in lines.iter().enumerate() {
        if let Some(caps) = RE_QUESTION.captures(line) {
            let question = caps[1].trim();

            // "Q: What is vitamin A: retinol?" followed by "A: ..." is one long question.
            let answer_follows = lines[i + 1..]
                .iter()
                .find(|next| !next.trim().is_empty())
                .is_some_and(|next| RE_ANSWER.is_match(next));

            if let Some(m) = RE_INLINE_ANSWER.find(question).filter(|_| !answer_follows) {
                let (q, a) = (question[..m.start()].trim(), clean(&question[m.end()..]));
                if !q.is_empty() && !a.is_empty() {
                    pairs.push(QaPair {
                        question: q.to_string(),
                        answer: a.to_string(),
                    });
                    pending = None;
                    continue;
                }
            }

            // A question without an answer is dropped when the next one starts.
            pending = Some(question.to_string()).filter(|q| !q.is_empty());
        } else if let Some(caps) = RE_ANSWER.captures(line) {
            let answer = caps[1].trim();
            if answer.is_empty() {
                continue;
            }
            if let Some(question) = pending.take() {
                pairs.push(QaPair {
                    question,
                    answer: answer.to_string(),
                });
            }
        }
    }

    pairs
}

fn clean(fragment: &str) -> &str {
    fragment.trim().trim_end_matches('*').trim_end()
}
