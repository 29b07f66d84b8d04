//! FinSense - conversational personal-finance tutor
//!
//! Serves a single chat page backed by an `OpenAI`-compatible completion
//! model, keeping a short rolling history per browser session.

mod api;
mod chat;
mod config;
mod conversation;
mod llm;
mod prompt;
mod reply;
mod shutdown;

use api::{create_router, AppState};
use chat::ChatService;
use config::ServerConfig;
use conversation::{ConversationStore, InMemoryStore, SqliteStore};
use llm::{LlmConfig, LlmService, LoggingService, OpenAIService};
use prompt::SystemPrompt;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "finsense=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = ServerConfig::from_env()?;
    let variant = config.prompt_variant;

    let system_prompt = if let Some(path) = &config.system_prompt_file {
        SystemPrompt::from_file(variant, path)?
    } else {
        SystemPrompt::builtin(variant)
    };
    tracing::info!(
        variant = %variant,
        version = system_prompt.version(),
        "System prompt loaded"
    );

    // Conversation store: durable when a path is given
    let store: Arc<dyn ConversationStore> = if let Some(db_path) = &config.db_path {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        tracing::info!(path = %db_path.display(), "Opening conversation database");
        Arc::new(SqliteStore::open(db_path)?)
    } else {
        tracing::info!("Keeping conversations in memory");
        Arc::new(InMemoryStore::new())
    };

    // Completion client
    let llm_config = LlmConfig::from_env()?;
    if llm_config.api_key.is_none() {
        tracing::warn!("No LLM API key configured. Set OPENAI_API_KEY or LLM_GATEWAY.");
    }
    let temperature = llm_config
        .temperature
        .unwrap_or_else(|| variant.default_temperature());
    let llm: Arc<dyn LlmService> = Arc::new(LoggingService::new(Arc::new(OpenAIService::new(
        &llm_config,
    )?)));
    tracing::info!(
        model = %llm.model_id(),
        base_url = %llm_config.base_url,
        temperature,
        "Completion client initialized"
    );

    // Create application state
    let chat = ChatService::new(store, llm, system_prompt, temperature);
    let state = AppState::new(Arc::new(chat));

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("FinSense server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
