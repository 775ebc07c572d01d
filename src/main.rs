use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uilens::ai::GeminiVisionClient;
use uilens::fetch::HttpImageFetcher;
use uilens::models::Config;
use uilens::server::{self, AppState};

#[derive(Debug, Parser)]
#[command(name = "uilens")]
#[command(about = "AI critique server for webpage screenshots")]
struct CliArgs {
    /// Bind host, overriding UILENS_HOST.
    #[arg(long)]
    host: Option<String>,

    /// Bind port, overriding UILENS_PORT.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "uilens=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting uilens");

    let args = CliArgs::parse();

    // Fail fast: a missing credential must stop the process before the
    // listener binds, never surface on the first request.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let host = args.host.unwrap_or_else(|| config.host.clone());
    let port = args.port.unwrap_or(config.port);

    // Reuse one HTTP connection pool across the fetcher and model client.
    let http_client = reqwest::Client::new();

    let state = Arc::new(AppState::new(
        Arc::new(HttpImageFetcher::new_with_client(http_client.clone())),
        Arc::new(GeminiVisionClient::new_with_client(
            config.gemini_api_key,
            config.gemini_model.clone(),
            http_client,
        )),
    ));
    info!("Vision provider: Gemini (model: {})", config.gemini_model);

    if let Err(e) = server::serve(state, &host, port).await {
        error!("Server failed: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
