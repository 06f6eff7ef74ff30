//! Input Normalizer: turns typed notes, a speech transcript, or extracted PDF
//! text into one canonical `StudyMaterial`.
//!
//! No I/O happens here. Transcription and PDF extraction run in `speech` and
//! `pdf` before the text reaches `normalize`.

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// How the user supplied the material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    Typed,
    Spoken,
    PdfUpload,
}

/// Normalized study text. Only `normalize` builds one, so the text is always
/// non-empty and within the configured limit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyMaterial {
    text: String,
    source_mode: SourceMode,
    study_hours_available: Option<f64>,
}

impl StudyMaterial {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source_mode(&self) -> SourceMode {
        self.source_mode
    }

    pub fn study_hours_available(&self) -> Option<f64> {
        self.study_hours_available
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Validates raw input and produces a `StudyMaterial`.
///
/// Oversized input is rejected, never truncated. `hours` is carried as-is;
/// the schedule prompt validates it when a schedule is requested.
pub fn normalize(
    mode: SourceMode,
    raw: &str,
    hours: Option<f64>,
    max_chars: usize,
) -> Result<StudyMaterial, ValidationError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(ValidationError::EmptyInput);
    }

    let chars = text.chars().count();
    if chars > max_chars {
        return Err(ValidationError::InputTooLong {
            chars,
            limit: max_chars,
        });
    }

    Ok(StudyMaterial {
        text: text.to_string(),
        source_mode: mode,
        study_hours_available: hours,
    })
}
