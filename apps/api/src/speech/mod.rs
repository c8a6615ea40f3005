//! Text-to-speech via the OpenAI speech endpoint.
//!
//! Two delivery paths:
//! - `synthesize_to_asset` buffers the audio into the public media directory and
//!   returns its URL (used for every persisted question).
//! - `synthesize_stream` hands back the live chunk stream for immediate playback.

use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{Stream, StreamExt};
use reqwest::Client;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;

const OPENAI_SPEECH_URL: &str = "https://api.openai.com/v1/audio/speech";
/// Audio files live under `{media_dir}/AUDIO_SUBDIR` and are served at `/media/AUDIO_SUBDIR`.
pub const AUDIO_SUBDIR: &str = "audio";

/// A finite, non-restartable sequence of audio chunks.
pub type AudioStream = Pin<Box<dyn Stream<Item = Result<Bytes, AppError>> + Send>>;

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Generates audio for `text`, stores it durably and returns a public URL.
    /// The file name is `{filename_hint}-{random suffix}.{format}`.
    async fn synthesize_to_asset(&self, text: &str, filename_hint: &str)
        -> Result<String, AppError>;

    /// Generates audio for `text` without buffering it to storage.
    async fn synthesize_stream(&self, text: &str) -> Result<AudioStream, AppError>;
}

/// Where synthesized audio is written and how it is addressed publicly.
#[derive(Debug, Clone)]
pub struct MediaDir {
    root: PathBuf,
    public_base_url: String,
}

impl MediaDir {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.root.join(AUDIO_SUBDIR)
    }

    pub fn public_url(&self, file_name: &str) -> String {
        format!("{}/media/{}/{}", self.public_base_url, AUDIO_SUBDIR, file_name)
    }

    /// Creates the audio directory if it does not exist yet.
    pub async fn ensure(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(self.audio_dir()).await
    }
}

/// `{hint}-{uuid}.{format}`. The UUID suffix keeps concurrent calls with the
/// same hint from colliding.
pub fn asset_file_name(hint: &str, format: &str) -> String {
    let hint = if hint.trim().is_empty() { "tts" } else { hint };
    format!("{}-{}.{}", hint, Uuid::new_v4().simple(), format)
}

/// Drains `chunks` into `dir/file_name`. Data goes to a `.part` file first and is
/// renamed on success, so a failed download never leaves a truncated asset behind.
pub async fn write_asset<S>(dir: &Path, file_name: &str, mut chunks: S) -> Result<u64, AppError>
where
    S: Stream<Item = Result<Bytes, AppError>> + Unpin,
{
    let final_path = dir.join(file_name);
    let part_path = dir.join(format!("{file_name}.part"));

    let mut file = tokio::fs::File::create(&part_path)
        .await
        .map_err(|e| AppError::Speech(format!("Cannot create {}: {e}", part_path.display())))?;

    let mut written = 0u64;
    let result: Result<(), AppError> = async {
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)
                .await
                .map_err(|e| AppError::Speech(format!("Audio write failed: {e}")))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| AppError::Speech(format!("Audio flush failed: {e}")))
    }
    .await;
    drop(file);

    if let Err(e) = result {
        let _ = tokio::fs::remove_file(&part_path).await;
        return Err(e);
    }

    tokio::fs::rename(&part_path, &final_path)
        .await
        .map_err(|e| AppError::Speech(format!("Audio rename failed: {e}")))?;

    Ok(written)
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'a str,
}

/// Settings for `OpenAiSpeechClient`, taken from `Config` at startup.
#[derive(Debug, Clone)]
pub struct SpeechSettings {
    pub api_key: String,
    pub model: String,
    pub voice: String,
    pub format: String,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct OpenAiSpeechClient {
    client: Client,
    settings: SpeechSettings,
    media: MediaDir,
}

impl OpenAiSpeechClient {
    pub fn new(settings: SpeechSettings, media: MediaDir) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(settings.timeout).build()?,
            settings,
            media,
        })
    }

    /// Sends the speech request and returns the response body as a chunk stream.
    async fn request_audio(&self, text: &str) -> Result<AudioStream, AppError> {
        let body = SpeechRequest {
            model: &self.settings.model,
            voice: &self.settings.voice,
            input: text,
            response_format: &self.settings.format,
        };

        let response = self
            .client
            .post(OPENAI_SPEECH_URL)
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Speech(format!("Speech request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Speech(format!(
                "Speech API returned {status}: {body}"
            )));
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| AppError::Speech(format!("Audio stream error: {e}"))));

        Ok(Box::pin(stream))
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeechClient {
    async fn synthesize_to_asset(
        &self,
        text: &str,
        filename_hint: &str,
    ) -> Result<String, AppError> {
        let file_name = asset_file_name(filename_hint, &self.settings.format);
        let chunks = self.request_audio(text).await?;

        let bytes = write_asset(&self.media.audio_dir(), &file_name, chunks).await?;
        info!("Synthesized {} ({} bytes)", file_name, bytes);

        Ok(self.media.public_url(&file_name))
    }

    async fn synthesize_stream(&self, text: &str) -> Result<AudioStream, AppError> {
        debug!("Streaming speech for {} chars", text.chars().count());
        self.request_audio(text).await
    }
}
