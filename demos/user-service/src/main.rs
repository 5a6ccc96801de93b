use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use user_service::config::Config;
use user_service::users::{MemoryStore, Users};

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads the environment
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("info,{}=debug,rpc_kit=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();
    let users = Users::new(Arc::new(MemoryStore::new()));
    let app = user_service::app(&config, users)?;

    let address = config.address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!(
        %address,
        environment = ?config.environment,
        openapi = user_service::OPENAPI_PATH,
        "user-service listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("user-service stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received, draining connections"),
        Err(err) => {
            error!(error = %err, "cannot listen for ctrl-c, shutdown must be forced");
            std::future::pending::<()>().await;
        }
    }
}
