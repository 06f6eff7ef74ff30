mod config;
mod errors;
mod llm_client;
mod pdf;
mod routes;
mod speech;
mod state;
mod study;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::speech::{SpeechClient, WhisperClient};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Study API v{}", env!("CARGO_PKG_VERSION"));

    let llm = LlmClient::new(&config)?;
    info!(
        "LLM client initialized (model: {}, base: {})",
        config.llm_model, config.llm_base_url
    );

    let transcriber = WhisperClient::new(&config)?;
    let synthesizer = SpeechClient::new(&config)?;
    info!(
        "Speech clients initialized (stt: {}, tts: {}/{})",
        config.stt_model, config.tts_model, config.tts_voice
    );

    let state = AppState {
        generator: Arc::new(llm),
        transcriber: Arc::new(transcriber),
        synthesizer: Arc::new(synthesizer),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
