//! Study pack generation: orchestrates the per-artifact flow.
//!
//! Flow: assemble every prompt (validation) → fan out one generation call per
//! artifact → present each response.
//!
//! The calls share nothing but an immutable `StudyMaterial`, so they run
//! concurrently. Each one is bounded by a timeout. A failure marks only its
//! own artifact unavailable; partial success is a normal outcome.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::{ServiceError, ValidationError};
use crate::llm_client::TextGenerator;
use crate::study::material::{SourceMode, StudyMaterial};
use crate::study::presenter::{present, ArtifactResult};
use crate::study::prompt::{assemble, ArtifactKind, ArtifactParams, PromptPayload};

/// Outcome of one artifact request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArtifactOutcome {
    Ready(ArtifactResult),
    Unavailable {
        kind: ArtifactKind,
        error: ServiceError,
        message: String,
    },
}

impl ArtifactOutcome {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            ArtifactOutcome::Ready(result) => result.kind,
            ArtifactOutcome::Unavailable { kind, .. } => *kind,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ArtifactOutcome::Ready(_))
    }
}

/// Everything produced by one "Generate" action.
#[derive(Debug, Clone, Serialize)]
pub struct StudyPack {
    pub request_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub source_mode: SourceMode,
    pub material_chars: usize,
    /// In the order the kinds were requested.
    pub artifacts: Vec<ArtifactOutcome>,
}

/// Settings for the generation calls, taken from `Config` at the call site.
#[derive(Debug, Clone)]
pub struct GenerationSettings<'a> {
    pub model: &'a str,
    pub timeout: Duration,
}

/// Runs the generation pipeline for the requested artifact kinds.
///
/// Returns a `ValidationError` before any external call if a prompt cannot be
/// built (e.g. a schedule without hours). Service failures never surface
/// here; they are recorded per artifact.
pub async fn generate_study_pack(
    generator: &dyn TextGenerator,
    settings: &GenerationSettings<'_>,
    material: &StudyMaterial,
    kinds: &[ArtifactKind],
    params: &ArtifactParams,
) -> Result<StudyPack, ValidationError> {
    let mut unique_kinds: Vec<ArtifactKind> = Vec::with_capacity(kinds.len());
    for kind in kinds {
        if !unique_kinds.contains(kind) {
            unique_kinds.push(*kind);
        }
    }

    let payloads = unique_kinds
        .iter()
        .map(|kind| assemble(*kind, material, params))
        .collect::<Result<Vec<_>, _>>()?;

    let request_id = Uuid::new_v4();
    info!(
        "Study pack {request_id}: {} artifacts from {} chars of {:?} material",
        payloads.len(),
        material.char_count(),
        material.source_mode()
    );

    let artifacts = join_all(
        payloads
            .iter()
            .map(|payload| run_artifact(generator, settings, payload, request_id)),
    )
    .await;

    let unavailable: Vec<ArtifactKind> = artifacts
        .iter()
        .filter(|a| !a.is_ready())
        .map(ArtifactOutcome::kind)
        .collect();
    info!(
        "Study pack {request_id}: {}/{} artifacts ready, unavailable: {:?}",
        artifacts.len() - unavailable.len(),
        artifacts.len(),
        unavailable
    );

    Ok(StudyPack {
        request_id,
        generated_at: Utc::now(),
        source_mode: material.source_mode(),
        material_chars: material.char_count(),
        artifacts,
    })
}

async fn run_artifact(
    generator: &dyn TextGenerator,
    settings: &GenerationSettings<'_>,
    payload: &PromptPayload,
    request_id: Uuid,
) -> ArtifactOutcome {
    let started = Instant::now();
    let call = generator.generate(payload.system, &payload.prompt, settings.model);

    let result = match tokio::time::timeout(settings.timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(ServiceError::Timeout),
    };

    match result {
        Ok(raw_text) => {
            info!(
                "Study pack {request_id}: {:?} ready in {}ms",
                payload.kind,
                started.elapsed().as_millis()
            );
            ArtifactOutcome::Ready(present(payload.kind, &raw_text))
        }
        Err(error) => {
            warn!(
                "Study pack {request_id}: {:?} unavailable after {}ms: {error}",
                payload.kind,
                started.elapsed().as_millis()
            );
            ArtifactOutcome::Unavailable {
                kind: payload.kind,
                message: error.to_string(),
                error,
            }
        }
    }
}
