//! Axum route handlers for the Study API.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{AppError, ValidationError};
use crate::pdf::extract_pdf_text;
use crate::speech::SpeechClip;
use crate::state::AppState;
use crate::study::material::{normalize, SourceMode};
use crate::study::pipeline::{generate_study_pack, GenerationSettings, StudyPack};
use crate::study::prompt::{ArtifactKind, ArtifactParams};

const DEFAULT_AUDIO_NAME: &str = "recording.webm";
const DEFAULT_AUDIO_TYPE: &str = "audio/webm";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub mode: SourceMode,
    pub text: String,
    pub hours: Option<f64>,
    pub question_count: Option<u32>,
    pub card_count: Option<u32>,
    /// Defaults to all four artifacts.
    pub kinds: Option<Vec<ArtifactKind>>,
}

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub transcript: String,
    pub chars: usize,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub text: String,
    pub chars: usize,
}

#[derive(Debug, Deserialize)]
pub struct SpeakRequest {
    pub text: String,
}

struct Upload {
    bytes: Bytes,
    file_name: Option<String>,
    content_type: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/study/generate
///
/// Normalizes the material and generates the requested artifacts.
/// Artifacts that fail come back as `unavailable` alongside the ones that succeeded.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<StudyPack>, AppError> {
    let material = normalize(
        request.mode,
        &request.text,
        request.hours,
        state.config.max_material_chars,
    )?;

    let kinds = request.kinds.unwrap_or_else(|| ArtifactKind::ALL.to_vec());
    if kinds.is_empty() {
        return Err(AppError::BadRequest(
            "kinds must name at least one artifact".to_string(),
        ));
    }

    let params = ArtifactParams {
        hours: request.hours,
        question_count: request.question_count,
        card_count: request.card_count,
    };
    let settings = GenerationSettings {
        model: &state.config.llm_model,
        timeout: state.config.request_timeout(),
    };

    let pack = generate_study_pack(
        state.generator.as_ref(),
        &settings,
        &material,
        &kinds,
        &params,
    )
    .await?;

    Ok(Json(pack))
}

/// POST /api/v1/study/transcribe
///
/// Multipart field `audio`: a recorded clip. Returns the transcript, which the
/// page then submits to `/generate` in Spoken mode.
pub async fn handle_transcribe(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TranscribeResponse>, AppError> {
    let upload = read_upload(&mut multipart, "audio", state.config.max_upload_bytes).await?;
    info!("Transcribing {} bytes of audio", upload.bytes.len());

    let transcript = state
        .transcriber
        .transcribe(SpeechClip {
            bytes: upload.bytes,
            file_name: upload
                .file_name
                .unwrap_or_else(|| DEFAULT_AUDIO_NAME.to_string()),
            content_type: upload
                .content_type
                .unwrap_or_else(|| DEFAULT_AUDIO_TYPE.to_string()),
        })
        .await?;

    Ok(Json(TranscribeResponse {
        chars: transcript.chars().count(),
        transcript,
    }))
}

/// POST /api/v1/study/extract
///
/// Multipart field `file`: a PDF. Returns its text, already normalized, so an
/// empty or oversized document is reported before the user hits Generate.
pub async fn handle_extract(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, AppError> {
    let upload = read_upload(&mut multipart, "file", state.config.max_upload_bytes).await?;
    info!(
        "Extracting text from {} ({} bytes)",
        upload.file_name.as_deref().unwrap_or("upload.pdf"),
        upload.bytes.len()
    );

    let raw = extract_pdf_text(upload.bytes).await?;
    let material = normalize(
        SourceMode::PdfUpload,
        &raw,
        None,
        state.config.max_material_chars,
    )?;

    Ok(Json(ExtractResponse {
        chars: material.char_count(),
        text: material.text().to_string(),
    }))
}

/// POST /api/v1/study/speak
///
/// Reads the given text (normally the summary) aloud. Responds with audio bytes.
pub async fn handle_speak(
    State(state): State<AppState>,
    Json(request): Json<SpeakRequest>,
) -> Result<Response, AppError> {
    let text = request.text.trim();
    if text.is_empty() {
        return Err(ValidationError::EmptyInput.into());
    }
    let chars = text.chars().count();
    if chars > state.config.max_speech_chars {
        return Err(ValidationError::InputTooLong {
            chars,
            limit: state.config.max_speech_chars,
        }
        .into());
    }

    let audio = state.synthesizer.synthesize(text).await?;

    Ok(([(header::CONTENT_TYPE, audio.content_type)], audio.bytes).into_response())
}

/// Reads the first multipart field named `field_name`, enforcing `limit` bytes.
async fn read_upload(
    multipart: &mut Multipart,
    field_name: &str,
    limit: usize,
) -> Result<Upload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit, "Invalid multipart body"))?
    {
        if field.name() != Some(field_name) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, limit, "Failed to read upload"))?;

        if bytes.is_empty() {
            return Err(ValidationError::MissingUpload(field_name.to_string()).into());
        }
        if bytes.len() > limit {
            return Err(ValidationError::UploadTooLarge {
                bytes: bytes.len(),
                limit,
            }
            .into());
        }

        return Ok(Upload {
            bytes,
            file_name,
            content_type,
        });
    }

    Err(ValidationError::MissingUpload(field_name.to_string()).into())
}

/// The body limit surfaces as a multipart read error; report it as an upload
/// size problem rather than a malformed request.
fn multipart_error(error: MultipartError, limit: usize, context: &str) -> AppError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ValidationError::UploadOverLimit { limit }.into();
    }
    AppError::BadRequest(format!("{context}: {}", error.body_text()))
}
