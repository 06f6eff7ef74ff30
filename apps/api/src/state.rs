use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::TextGenerator;
use crate::speech::{Synthesizer, Transcriber};

/// Shared application state injected into all route handlers via Axum extractors.
///
/// The three remote collaborators are trait objects so tests can inject fakes.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub generator: Arc<dyn TextGenerator>,
    pub transcriber: Arc<dyn Transcriber>,
    pub synthesizer: Arc<dyn Synthesizer>,
}
