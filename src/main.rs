//! Stillpoint server binary.
//!
//! Wires configuration, the DeepSeek generator, and the in-memory session
//! registry into the axum router and serves it.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use stillpoint::adapters::ai::{DeepSeekConfig, DeepSeekGenerator, ValidatingGenerator};
use stillpoint::adapters::http::conversation::{self, ConversationAppState};
use stillpoint::adapters::storage::InMemorySessionRegistry;
use stillpoint::application::CollectorOptions;
use stillpoint::config::AppConfig;
use stillpoint::ports::TextGenerator;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.server.log_level))
        .init();

    tracing::info!(
        environment = ?config.server.environment,
        model = %config.ai.model,
        max_turns = config.conversation.max_turns,
        "starting stillpoint"
    );

    let generator = build_generator(&config)?;
    let registry = InMemorySessionRegistry::new();
    let options = CollectorOptions::new(
        config.conversation.max_turns,
        config.conversation.context_window,
    );
    let app_state = ConversationAppState::new(registry, generator, options);

    let app = conversation::routes()
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config)?)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )));

    let addr = config.server.socket_addr();
    tracing::info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_generator(config: &AppConfig) -> Result<Arc<dyn TextGenerator>, Box<dyn std::error::Error>> {
    let api_key = config
        .ai
        .deepseek_api_key
        .clone()
        .ok_or("DeepSeek API key is not configured")?;

    let deepseek = DeepSeekGenerator::new(
        DeepSeekConfig::new(api_key)
            .with_model(config.ai.model.clone())
            .with_base_url(config.ai.base_url.clone())
            .with_timeout(config.ai.timeout())
            .with_max_tokens(config.ai.max_tokens)
            .with_temperature(config.ai.temperature),
    );

    Ok(Arc::new(ValidatingGenerator::new(
        Arc::new(deepseek),
        config.ai.max_output_chars,
    )))
}

fn cors_layer(config: &AppConfig) -> Result<CorsLayer, Box<dyn std::error::Error>> {
    let origins = config.server.cors_origins_list();

    if origins.is_empty() {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers(Any));
    }

    let mut parsed = Vec::with_capacity(origins.len());
    for origin in origins {
        parsed.push(origin.parse::<HeaderValue>()?);
    }

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any))
}
