//! HTTP implementations of the speech traits against the OpenAI-compatible
//! `/audio/transcriptions` and `/audio/speech` endpoints.

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header::CONTENT_TYPE, multipart, Client};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::errors::ServiceError;
use crate::llm_client::{build_http_client, status_error, transport_error};
use crate::speech::{transcript_or_silence, SpeechAudio, SpeechClip, Synthesizer, Transcriber};

const SPEECH_FORMAT: &str = "wav";
const DEFAULT_AUDIO_CONTENT_TYPE: &str = "audio/wav";

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Speech-to-text via a Whisper model.
#[derive(Clone)]
pub struct WhisperClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
    model: String,
}

impl WhisperClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config)?,
            base_url: config.llm_base_url.clone(),
            api_key: config.groq_api_key.clone(),
            model: config.stt_model.clone(),
        })
    }
}

#[async_trait]
impl Transcriber for WhisperClient {
    async fn transcribe(&self, clip: SpeechClip) -> Result<String, ServiceError> {
        let size = clip.bytes.len();
        let part = multipart::Part::bytes(clip.bytes.to_vec())
            .file_name(clip.file_name)
            .mime_str(&clip.content_type)
            .map_err(|e| {
                warn!("Rejected audio content type: {e}");
                ServiceError::ServiceUnavailable("unsupported audio content type".into())
            })?;

        let form = multipart::Form::new()
            .text("model", self.model.clone())
            .text("response_format", "json")
            .part("file", part);

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let transcription: TranscriptionResponse = response.json().await.map_err(|e| {
            warn!("Transcription response could not be decoded: {e}");
            ServiceError::ServiceUnavailable("malformed response from speech service".into())
        })?;

        debug!("Transcribed {size} bytes of audio with {}", self.model);
        transcript_or_silence(&transcription.text)
    }
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'a str,
}

/// Text-to-speech for reading the summary aloud.
#[derive(Clone)]
pub struct SpeechClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
    model: String,
    voice: String,
}

impl SpeechClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config)?,
            base_url: config.llm_base_url.clone(),
            api_key: config.groq_api_key.clone(),
            model: config.tts_model.clone(),
            voice: config.tts_voice.clone(),
        })
    }
}

#[async_trait]
impl Synthesizer for SpeechClient {
    async fn synthesize(&self, text: &str) -> Result<SpeechAudio, ServiceError> {
        let request_body = SpeechRequest {
            model: &self.model,
            voice: &self.voice,
            input: text,
            response_format: SPEECH_FORMAT,
        };

        let response = self
            .client
            .post(format!("{}/audio/speech", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&request_body)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| v.starts_with("audio/"))
            .unwrap_or(DEFAULT_AUDIO_CONTENT_TYPE)
            .to_string();

        let bytes: Bytes = response.bytes().await.map_err(|e| transport_error(&e))?;
        if bytes.is_empty() {
            return Err(ServiceError::EmptyResponse);
        }

        debug!("Synthesized {} bytes of {content_type}", bytes.len());
        Ok(SpeechAudio {
            bytes,
            content_type,
        })
    }
}
