use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    pub openai_api_key: String,
    pub llm_model: String,
    pub tts_model: String,
    pub tts_voice: String,
    pub tts_format: String,
    /// Root of the publicly served media tree. Audio lands in `{media_dir}/audio`.
    pub media_dir: PathBuf,
    /// Base URL prefixed to every public media path.
    pub public_base_url: String,
    pub llm_timeout: Duration,
    pub tts_timeout: Duration,
    pub storage_timeout: Duration,
    pub document_url_ttl: Duration,
    pub max_upload_bytes: usize,
    /// Browser origins allowed by CORS: `FRONTEND_ORIGIN` then each `EXTRA_ORIGINS` entry.
    pub allowed_origins: Vec<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
            llm_model: env_or("LLM_MODEL", crate::llm_client::DEFAULT_MODEL),
            tts_model: env_or("TTS_MODEL", "tts-1"),
            tts_voice: env_or("TTS_VOICE", "alloy"),
            tts_format: env_or("TTS_FORMAT", "mp3"),
            media_dir: PathBuf::from(env_or("MEDIA_DIR", "./media")),
            public_base_url: env_or("PUBLIC_BASE_URL", "http://localhost:8080")
                .trim_end_matches('/')
                .to_string(),
            llm_timeout: Duration::from_secs(parse_env("LLM_TIMEOUT_SECS", 120)?),
            tts_timeout: Duration::from_secs(parse_env("TTS_TIMEOUT_SECS", 60)?),
            storage_timeout: Duration::from_secs(parse_env("STORAGE_TIMEOUT_SECS", 30)?),
            document_url_ttl: Duration::from_secs(
                parse_env::<u64>("DOCUMENT_URL_TTL_HOURS", 24)? * 3600,
            ),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            allowed_origins: allowed_origins(
                &env_or("FRONTEND_ORIGIN", "http://localhost:3000"),
                &env_or("EXTRA_ORIGINS", ""),
            ),
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    /// MIME type of synthesized audio, e.g. `audio/mp3`.
    pub fn audio_content_type(&self) -> String {
        format!("audio/{}", self.tts_format)
    }
}

/// `extra` is comma-separated; blank entries are skipped.
fn allowed_origins(frontend: &str, extra: &str) -> Vec<String> {
    std::iter::once(frontend)
        .chain(extra.split(','))
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_origins_frontend_first() {
        assert_eq!(
            allowed_origins("http://localhost:3000", " https://a.example , ,https://b.example"),
            vec![
                "http://localhost:3000",
                "https://a.example",
                "https://b.example"
            ]
        );
    }

    #[test]
    fn test_allowed_origins_without_extras() {
        assert_eq!(
            allowed_origins("https://app.example", ""),
            vec!["https://app.example"]
        );
    }
}
