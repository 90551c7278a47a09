//! Sketchnet editor shell entry point.

use clap::Parser;
use sketchnet_client::ClientConfig;

fn main() {
    env_logger::init();
    log::info!("Starting sketchnet");

    let config = ClientConfig::parse();
    let stdin = std::io::stdin();
    if let Err(e) = sketchnet_client::run(&config, stdin.lock(), std::io::stdout()) {
        log::error!("{e}");
        eprintln!("sketchnet: {e}");
        std::process::exit(1);
    }
}
