mod config;
mod error;
mod extract;
mod gemini;
mod models;
mod normalize;
mod pipeline;
mod prompts;
mod render;
mod routes;

use routes::{build_router, AppState};
use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};
use std::sync::Arc;
use tower_http::{cors::{CorsLayer, Any}, trace::TraceLayer};

use crate::config::Config;
use crate::gemini::GeminiClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // A missing credential stops the process before anything is served.
    let config = Config::from_env()?;
    let gemini = GeminiClient::new(&config)?;
    tracing::info!(?config, "Stylist backend ready (model: {})", gemini.model());

    let state = AppState { generator: Arc::new(gemini) };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        );

    let addr = SocketAddr::from(([0,0,0,0], config.port));
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async { tokio::signal::ctrl_c().await.ok(); })
        .await?;
    Ok(())
}
