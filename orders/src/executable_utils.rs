use crate::http::{AppState, router};
use crate::service::OrderService;
use clap::Parser;
use common::config::{BackendConfig, Config};
use std::{error::Error, sync::Arc};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to config file
    #[arg(short, long, default_value = "orders/config/backend.yaml")]
    pub config: String,
}

pub fn initialize_executable() -> Result<Config, Box<dyn Error + Send + Sync>> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let config = Config::load(&args.config)?;
    Ok(config)
}

pub fn initialize_tracing(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_new(log_level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

pub async fn run_backend(
    config: BackendConfig,
    service: Arc<OrderService>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let app = router(AppState { service });

    tracing::info!("Starting order service at {}", config.server_address);
    let listener = tokio::net::TcpListener::bind(&config.server_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
