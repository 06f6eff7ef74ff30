//! Prompt Assembler: one fixed template per artifact kind, with the full
//! study material embedded verbatim.

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::study::material::StudyMaterial;
use crate::study::prompts::{
    FLASHCARDS_PROMPT_TEMPLATE, QUIZ_PROMPT_TEMPLATE, SCHEDULE_PROMPT_TEMPLATE, STUDY_SYSTEM,
    SUMMARY_PROMPT_TEMPLATE,
};

pub const DEFAULT_ITEM_COUNT: u32 = 5;
pub const MAX_ITEM_COUNT: u32 = 20;
pub const MAX_STUDY_HOURS: f64 = 24.0;

/// A generated study aid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Summary,
    Quiz,
    Flashcards,
    Schedule,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::Summary,
        ArtifactKind::Quiz,
        ArtifactKind::Flashcards,
        ArtifactKind::Schedule,
    ];
}

/// Per-request knobs. Absent counts fall back to `DEFAULT_ITEM_COUNT`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtifactParams {
    pub hours: Option<f64>,
    pub question_count: Option<u32>,
    pub card_count: Option<u32>,
}

/// What gets sent to the generation service.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptPayload {
    pub kind: ArtifactKind,
    pub system: &'static str,
    pub prompt: String,
}

/// Builds the prompt for `kind`.
///
/// Schedule hours come from `params.hours`, else from the material. Missing,
/// non-positive, or over-24 hours fail before any prompt is built.
pub fn assemble(
    kind: ArtifactKind,
    material: &StudyMaterial,
    params: &ArtifactParams,
) -> Result<PromptPayload, ValidationError> {
    // Parameters go in before the notes so braces inside the notes are never touched.
    let template = match kind {
        ArtifactKind::Summary => SUMMARY_PROMPT_TEMPLATE.to_string(),
        ArtifactKind::Quiz => QUIZ_PROMPT_TEMPLATE
            .replace("{count}", &item_count(params.question_count)?.to_string()),
        ArtifactKind::Flashcards => FLASHCARDS_PROMPT_TEMPLATE
            .replace("{count}", &item_count(params.card_count)?.to_string()),
        ArtifactKind::Schedule => {
            let hours = study_hours(params.hours.or(material.study_hours_available()))?;
            SCHEDULE_PROMPT_TEMPLATE.replace("{hours}", &hours.to_string())
        }
    };

    Ok(PromptPayload {
        kind,
        system: STUDY_SYSTEM,
        prompt: template.replace("{notes}", material.text()),
    })
}

fn item_count(requested: Option<u32>) -> Result<u32, ValidationError> {
    match requested {
        None => Ok(DEFAULT_ITEM_COUNT),
        Some(n) if (1..=MAX_ITEM_COUNT).contains(&n) => Ok(n),
        Some(n) => Err(ValidationError::InvalidCount(n)),
    }
}

fn study_hours(hours: Option<f64>) -> Result<f64, ValidationError> {
    let hours = hours.ok_or(ValidationError::MissingHours)?;
    if !hours.is_finite() || hours <= 0.0 || hours > MAX_STUDY_HOURS {
        return Err(ValidationError::HoursOutOfRange(hours));
    }
    Ok(hours)
}
