use std::sync::Arc;

use crate::interview::service::InterviewService;
use crate::speech::SpeechSynthesizer;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Every external client is constructed once in `main` and passed in here;
/// nothing below the handlers reaches for globals.
#[derive(Clone)]
pub struct AppState {
    pub interviews: Arc<InterviewService>,
    /// Used directly by the live speech stream endpoint.
    pub speech: Arc<dyn SpeechSynthesizer>,
    /// `audio/{format}` for streamed speech responses.
    pub audio_content_type: String,
}
