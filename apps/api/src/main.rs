mod auth;
mod config;
mod db;
mod errors;
mod interview;
mod llm_client;
mod routes;
mod speech;
mod state;
mod storage;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::interview::service::InterviewService;
use crate::interview::store::PgSessionStore;
use crate::llm_client::LlmClient;
use crate::routes::{build_router, cors_layer};
use crate::speech::{MediaDir, OpenAiSpeechClient, SpeechSettings};
use crate::state::AppState;
use crate::storage::S3ObjectStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interview API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgSessionStore::new(db));

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    let objects = Arc::new(S3ObjectStore::new(
        s3,
        config.s3_bucket.clone(),
        config.document_url_ttl,
        config.storage_timeout,
    ));
    info!("S3 client initialized (bucket: {})", config.s3_bucket);

    // Initialize LLM client
    let llm = Arc::new(LlmClient::new(
        config.anthropic_api_key.clone(),
        config.llm_model.clone(),
        config.llm_timeout,
    )?);
    info!("LLM client initialized (model: {})", llm.model());

    // Initialize speech client and media directory
    let media = MediaDir::new(&config.media_dir, &config.public_base_url);
    media.ensure().await?;
    let speech = Arc::new(OpenAiSpeechClient::new(
        SpeechSettings {
            api_key: config.openai_api_key.clone(),
            model: config.tts_model.clone(),
            voice: config.tts_voice.clone(),
            format: config.tts_format.clone(),
            timeout: config.tts_timeout,
        },
        media,
    )?);
    info!(
        "Speech client initialized (model: {}, voice: {}, format: {})",
        config.tts_model, config.tts_voice, config.tts_format
    );

    let interviews = Arc::new(InterviewService::new(
        store,
        objects,
        llm,
        speech.clone(),
    ));

    // Build app state
    let state = AppState {
        interviews,
        speech,
        audio_content_type: config.audio_content_type(),
    };

    // Build router
    let app = build_router(state, &config.media_dir, config.max_upload_bytes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.allowed_origins)?);
    info!("CORS origins: {}", config.allowed_origins.join(", "));

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "interview-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    // MinIO serves buckets by path, not by virtual host.
    let s3_config = aws_sdk_s3::config::Builder::from(&s3_config)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}
