//! Sketchnet relay server binary.

use clap::Parser;
use sketchnet_server::ServerConfig;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sketchnet_server=info,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::parse();
    if let Err(e) = sketchnet_server::run(config).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
