use anyhow::{Context, Result};
use futures_util::StreamExt;
use hf_forward::{Forwarder, InferenceRequest, config};
use tokio::io::AsyncReadExt;
use tracing::info;

/// Validates that a log level string is valid
fn validate_log_level(level: &str) -> Result<()> {
    level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .map_err(|_| {
            anyhow::anyhow!(
                "Invalid log level: '{}'. Valid levels: error, warn, info, debug, trace",
                level
            )
        })?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (before logging setup)
    let config = match config::load().await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Environment variable overrides config
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.logs.level.clone());

    if let Err(e) = validate_log_level(&log_level) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(&log_level))?,
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let model = config
        .defaults
        .model
        .clone()
        .context("defaults.model must be set in the configuration")?;

    let mut prompt = String::new();
    tokio::io::stdin().read_to_string(&mut prompt).await?;

    info!("Forwarding prompt to model {}", model);

    let forwarder = Forwarder::new(&config.endpoint);
    let request = InferenceRequest::new(model, prompt)
        .parameters(config.defaults.parameters.clone())
        .stream(config.defaults.stream);

    let mut chunks = forwarder.forward(request)?;
    while let Some(chunk) = chunks.next().await {
        println!("{}", serde_json::to_string(&chunk?)?);
    }

    forwarder.sessions().shutdown();
    Ok(())
}
