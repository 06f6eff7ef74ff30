use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use secrecy::SecretString;

const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_LLM_MODEL: &str = "llama-3.1-8b-instant";
const DEFAULT_STT_MODEL: &str = "whisper-large-v3-turbo";
const DEFAULT_TTS_MODEL: &str = "playai-tts";
const DEFAULT_TTS_VOICE: &str = "Fritz-PlayAI";

/// Application configuration loaded from environment variables once at startup.
/// Fails startup if required variables are missing.
///
/// `Debug` is derived: `SecretString` prints as redacted, so the API key never
/// reaches the logs.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: SecretString,
    /// OpenAI-compatible base URL shared by chat, transcription and speech endpoints.
    pub llm_base_url: String,
    pub llm_model: String,
    pub stt_model: String,
    pub tts_model: String,
    pub tts_voice: String,
    pub request_timeout_secs: u64,
    /// Upper bound on normalized study material, in characters.
    pub max_material_chars: usize,
    pub max_upload_bytes: usize,
    pub max_speech_chars: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            groq_api_key: SecretString::from(require_env("GROQ_API_KEY")?),
            llm_base_url: env_or("LLM_BASE_URL", DEFAULT_LLM_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            llm_model: env_or("LLM_MODEL", DEFAULT_LLM_MODEL),
            stt_model: env_or("STT_MODEL", DEFAULT_STT_MODEL),
            tts_model: env_or("TTS_MODEL", DEFAULT_TTS_MODEL),
            tts_voice: env_or("TTS_VOICE", DEFAULT_TTS_VOICE),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 60)?,
            max_material_chars: parse_env("MAX_MATERIAL_CHARS", 24_000)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 25 * 1024 * 1024)?,
            max_speech_chars: parse_env("MAX_SPEECH_CHARS", 10_000)?,
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number (got '{raw}')")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
pub fn test_config() -> Config {
    Config {
        groq_api_key: SecretString::from("gsk_test_key".to_string()),
        llm_base_url: DEFAULT_LLM_BASE_URL.to_string(),
        llm_model: DEFAULT_LLM_MODEL.to_string(),
        stt_model: DEFAULT_STT_MODEL.to_string(),
        tts_model: DEFAULT_TTS_MODEL.to_string(),
        tts_voice: DEFAULT_TTS_VOICE.to_string(),
        request_timeout_secs: 5,
        max_material_chars: 2_000,
        max_upload_bytes: 1024 * 1024,
        max_speech_chars: 500,
        port: 0,
        rust_log: "debug".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_output_redacts_api_key() {
        let rendered = format!("{:?}", test_config());
        assert!(!rendered.contains("gsk_test_key"));
        assert!(rendered.contains("llama-3.1-8b-instant"));
    }

    #[test]
    fn test_parse_env_falls_back_to_default() {
        let value: u64 = parse_env("STUDY_API_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
