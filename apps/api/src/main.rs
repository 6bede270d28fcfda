mod config;
mod db;
mod errors;
mod flows;
mod interactions;
mod llm_client;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::flows::invoker::FlowInvoker;
use crate::interactions::store::PgDocumentStore;
use crate::interactions::{InteractionLogger, NoopInteractionLogger, StoreInteractionLogger};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting InternSpark API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Interaction logging is optional infrastructure
    let logger = build_interaction_logger(&config).await;

    let invoker = FlowInvoker::new(Arc::new(llm), logger, config.llm_timeout);
    info!("Flow invoker ready (timeout: {:?})", config.llm_timeout);

    // Build app state
    let state = AppState { invoker };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the web frontend origin once it is deployed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Picks the interaction logger once, so flows never branch on configuration.
/// An unreachable store downgrades to the no-op logger instead of failing start-up.
async fn build_interaction_logger(config: &Config) -> Arc<dyn InteractionLogger> {
    let Some(database_url) = config.database_url.as_deref() else {
        info!("DATABASE_URL not set; interaction logging disabled");
        return Arc::new(NoopInteractionLogger);
    };

    match create_pool(database_url).await {
        Ok(pool) => {
            info!("Interaction logging enabled (PostgreSQL)");
            Arc::new(StoreInteractionLogger::new(Arc::new(PgDocumentStore::new(
                pool,
            ))))
        }
        Err(e) => {
            error!("Interaction store unavailable, logging disabled: {e:?}");
            Arc::new(NoopInteractionLogger)
        }
    }
}
