pub mod health;
pub mod page;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::study::handlers;

/// Multipart framing on top of the raw upload.
const BODY_LIMIT_SLACK: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + BODY_LIMIT_SLACK;

    Router::new()
        .route("/", get(page::index_handler))
        .route("/health", get(health::health_handler))
        // Study API
        .route("/api/v1/study/generate", post(handlers::handle_generate))
        .route("/api/v1/study/transcribe", post(handlers::handle_transcribe))
        .route("/api/v1/study/extract", post(handlers::handle_extract))
        .route("/api/v1/study/speak", post(handlers::handle_speak))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use bytes::Bytes;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::test_config;
    use crate::errors::ServiceError;
    use crate::llm_client::TextGenerator;
    use crate::speech::{SpeechAudio, SpeechClip, Synthesizer, Transcriber};

    struct FakeGenerator {
        fail_quiz: bool,
        calls: Mutex<u32>,
    }

    #[async_trait]
    impl TextGenerator for FakeGenerator {
        async fn generate(
            &self,
            _system: &str,
            prompt: &str,
            _model: &str,
        ) -> Result<String, ServiceError> {
            *self.calls.lock().unwrap() += 1;
            if prompt.contains("quiz questions") {
                if self.fail_quiz {
                    return Err(ServiceError::ServiceUnavailable("status 503".into()));
                }
                return Ok(
                    "Q: What is converted?\nA: Light\nQ: Into what?\nA: Chemical energy".into(),
                );
            }
            if prompt.contains("flashcards") {
                return Ok("Q: Chlorophyll\nA: Green pigment".into());
            }
            if prompt.starts_with("Summarize") {
                return Ok("- Light becomes chemical energy".into());
            }
            Ok("0:00 Read\n0:50 Break".into())
        }
    }

    struct FakeTranscriber;

    #[async_trait]
    impl Transcriber for FakeTranscriber {
        async fn transcribe(&self, clip: SpeechClip) -> Result<String, ServiceError> {
            if clip.bytes.as_ref() == b"silence" {
                return Err(ServiceError::NoSpeechDetected);
            }
            Ok(format!("{} via {}", clip.file_name, clip.content_type))
        }
    }

    struct FakeSynthesizer;

    #[async_trait]
    impl Synthesizer for FakeSynthesizer {
        async fn synthesize(&self, text: &str) -> Result<SpeechAudio, ServiceError> {
            Ok(SpeechAudio {
                bytes: Bytes::from(format!("RIFF{text}")),
                content_type: "audio/wav".to_string(),
            })
        }
    }

    fn app_with(generator: Arc<FakeGenerator>) -> Router {
        build_router(AppState {
            config: test_config(),
            generator,
            transcriber: Arc::new(FakeTranscriber),
            synthesizer: Arc::new(FakeSynthesizer),
        })
    }

    fn app() -> Router {
        app_with(Arc::new(FakeGenerator {
            fail_quiz: false,
            calls: Mutex::new(0),
        }))
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_request(
        uri: &str,
        field: &str,
        file_name: &str,
        mime: &str,
        data: &[u8],
    ) -> Request<Body> {
        let mut body = format!(
            "--BOUNDARY\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {mime}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n--BOUNDARY--\r\n");

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=BOUNDARY")
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_index_page_served() {
        let response = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(html.to_vec()).unwrap();
        assert!(html.contains(r#"const API = "/api/v1/study";"#));
        assert!(html.contains(r#"API + "/generate""#));
    }

    #[tokio::test]
    async fn test_generate_typed_notes_returns_four_artifacts() {
        let response = app()
            .oneshot(json_request(
                "/api/v1/study/generate",
                json!({
                    "mode": "typed",
                    "text": "Photosynthesis converts light into chemical energy.",
                    "hours": 3
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let artifacts = body["artifacts"].as_array().unwrap();
        assert_eq!(artifacts.len(), 4);
        assert!(artifacts.iter().all(|a| a["status"] == "ready"));
        assert_eq!(artifacts[1]["kind"], "quiz");
        assert_eq!(artifacts[1]["structured"]["items"].as_array().unwrap().len(), 2);
        assert_eq!(body["source_mode"], "typed");
    }

    #[tokio::test]
    async fn test_generate_reports_partial_success() {
        let generator = Arc::new(FakeGenerator {
            fail_quiz: true,
            calls: Mutex::new(0),
        });
        let response = app_with(generator.clone())
            .oneshot(json_request(
                "/api/v1/study/generate",
                json!({
                    "mode": "typed",
                    "text": "Photosynthesis converts light into chemical energy.",
                    "hours": 3
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let statuses: Vec<_> = body["artifacts"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| {
                (
                    a["kind"].as_str().unwrap().to_string(),
                    a["status"].as_str().unwrap().to_string(),
                )
            })
            .collect();
        assert_eq!(
            statuses,
            vec![
                ("summary".to_string(), "ready".to_string()),
                ("quiz".to_string(), "unavailable".to_string()),
                ("flashcards".to_string(), "ready".to_string()),
                ("schedule".to_string(), "ready".to_string()),
            ]
        );
        assert_eq!(*generator.calls.lock().unwrap(), 4);
    }

    #[tokio::test]
    async fn test_generate_rejects_blank_text_without_calling_service() {
        let generator = Arc::new(FakeGenerator {
            fail_quiz: false,
            calls: Mutex::new(0),
        });
        let response = app_with(generator.clone())
            .oneshot(json_request(
                "/api/v1/study/generate",
                json!({"mode": "spoken", "text": "   ", "hours": 2}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(*generator.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_generate_schedule_requires_hours() {
        let response = app()
            .oneshot(json_request(
                "/api/v1/study/generate",
                json!({"mode": "typed", "text": "Some notes", "hours": 0}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app()
            .oneshot(json_request(
                "/api/v1/study/generate",
                json!({"mode": "typed", "text": "Some notes", "kinds": ["summary"]}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_generate_rejects_oversized_material() {
        let text = "x".repeat(test_config().max_material_chars + 1);
        let response = app()
            .oneshot(json_request(
                "/api/v1/study/generate",
                json!({"mode": "typed", "text": text, "hours": 1}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_transcribe_returns_transcript() {
        let response = app()
            .oneshot(multipart_request(
                "/api/v1/study/transcribe",
                "audio",
                "note.ogg",
                "audio/ogg",
                b"OggS....",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["transcript"], "note.ogg via audio/ogg");
    }

    #[tokio::test]
    async fn test_transcribe_no_speech_is_unprocessable() {
        let response = app()
            .oneshot(multipart_request(
                "/api/v1/study/transcribe",
                "audio",
                "note.webm",
                "audio/webm",
                b"silence",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(response).await["error"]["code"], "NO_SPEECH_DETECTED");
    }

    #[tokio::test]
    async fn test_transcribe_missing_field_is_validation_error() {
        let response = app()
            .oneshot(multipart_request(
                "/api/v1/study/transcribe",
                "other",
                "note.webm",
                "audio/webm",
                b"data",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_just_over_limit_reports_size() {
        let limit = test_config().max_upload_bytes;
        let response = app()
            .oneshot(multipart_request(
                "/api/v1/study/transcribe",
                "audio",
                "lecture.webm",
                "audio/webm",
                &vec![0u8; limit + 1],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(
            body["error"]["message"],
            format!("Upload is {} bytes; the limit is {limit}", limit + 1)
        );
    }

    #[tokio::test]
    async fn test_upload_far_over_limit_reports_size() {
        let limit = test_config().max_upload_bytes;
        let response = app()
            .oneshot(multipart_request(
                "/api/v1/study/extract",
                "file",
                "textbook.pdf",
                "application/pdf",
                &vec![b'%'; limit + 200 * 1024],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(
            body["error"]["message"],
            format!("Upload exceeds the limit of {limit} bytes; choose a smaller file")
        );
    }

    #[tokio::test]
    async fn test_extract_rejects_non_pdf() {
        let response = app()
            .oneshot(multipart_request(
                "/api/v1/study/extract",
                "file",
                "notes.pdf",
                "application/pdf",
                b"definitely not a pdf",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(response).await["error"]["code"], "UNREADABLE_DOCUMENT");
    }

    #[tokio::test]
    async fn test_speak_returns_audio() {
        let response = app()
            .oneshot(json_request(
                "/api/v1/study/speak",
                json!({"text": " Light becomes chemical energy "}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/wav");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"RIFFLight becomes chemical energy");
    }

    #[tokio::test]
    async fn test_speak_rejects_empty_and_long_text() {
        let response = app()
            .oneshot(json_request("/api/v1/study/speak", json!({"text": ""})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let long = "a".repeat(test_config().max_speech_chars + 1);
        let response = app()
            .oneshot(json_request("/api/v1/study/speak", json!({"text": long})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
