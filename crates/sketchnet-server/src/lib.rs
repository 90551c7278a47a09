//! Sketchnet relay server.
//!
//! Holds the canonical sketch, assigns shape ids and fans every accepted edit
//! out to all connected clients over a newline-delimited TCP protocol:
//!
//! ```text
//! ellipse 10 10 50 50 -16777216 -1    client -> server, new shape
//! ellipse 10 10 50 50 -16777216 0     server -> every client, id assigned
//! DELETE 0                            either direction
//! ```
//!
//! A read-only HTTP surface exposes health and a JSON snapshot.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod hub;
pub mod state;
pub mod store;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use hub::{BroadcastHub, PeerId};
pub use state::RelayState;
pub use store::{Assignment, CanonicalStore};

/// Accept connections forever, one task per client.
pub async fn serve(listener: TcpListener, state: Arc<RelayState>) {
    loop {
        let (stream, addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("Accept failed: {}", e);
                continue;
            }
        };
        if let Err(e) = stream.set_nodelay(true) {
            warn!("Could not set TCP_NODELAY for {}: {}", addr, e);
        }
        tokio::spawn(handler::handle_connection(stream, addr, Arc::clone(&state)));
    }
}

/// Bind the configured listeners and run until Ctrl-C.
pub async fn run(config: ServerConfig) -> ServerResult<()> {
    let state = Arc::new(RelayState::new());

    let listener = TcpListener::bind(config.listen)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.listen,
            source,
        })?;
    info!("Sketchnet relay listening on {}", listener.local_addr()?);

    if let Some(addr) = config.http_addr() {
        let http_listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        info!("HTTP admin surface on http://{}", addr);
        let app = http::router(Arc::clone(&state));
        tokio::spawn(async move {
            if let Err(e) = axum::serve(http_listener, app).await {
                warn!("HTTP admin surface stopped: {}", e);
            }
        });
    }

    tokio::select! {
        _ = serve(listener, state) => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Shutting down");
        }
    }
    Ok(())
}
