//! FormCraft API server

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use formcraft_api::{build_router, ApiState, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::load()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_new(&config.log_filter)?)
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.uses_dev_secret() {
        tracing::warn!("using the built-in development JWT secret; set FORMCRAFT_JWT_SECRET");
    }

    let app = build_router(ApiState::in_memory(&config));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("FormCraft API listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
