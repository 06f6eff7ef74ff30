//! Speech collaborators: transcription for the Spoken input mode and
//! synthesis for "Read aloud".
//!
//! Both are remote calls behind traits. `AppState` holds them as
//! `Arc<dyn Transcriber>` / `Arc<dyn Synthesizer>`.

use async_trait::async_trait;
use bytes::Bytes;

use crate::errors::ServiceError;

pub mod clients;

pub use clients::{SpeechClient, WhisperClient};

/// A bounded audio recording uploaded by the user.
#[derive(Debug, Clone)]
pub struct SpeechClip {
    pub bytes: Bytes,
    pub file_name: String,
    pub content_type: String,
}

/// Synthesized audio ready to stream back to the page.
#[derive(Debug, Clone)]
pub struct SpeechAudio {
    pub bytes: Bytes,
    pub content_type: String,
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Returns the transcript, or `NoSpeechDetected` when nothing was recognized.
    async fn transcribe(&self, clip: SpeechClip) -> Result<String, ServiceError>;
}

#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<SpeechAudio, ServiceError>;
}

/// Blank transcripts count as "no speech", matching how recognizers report silence.
pub(crate) fn transcript_or_silence(text: &str) -> Result<String, ServiceError> {
    let text = text.trim();
    if text.is_empty() {
        Err(ServiceError::NoSpeechDetected)
    } else {
        Ok(text.to_string())
    }
}
