use std::io;
use std::net::SocketAddr;

use sketchnet_core::ProtocolError;
use thiserror::Error;

/// Errors raised by the relay.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("malformed message: {0}")]
    Malformed(#[from] ProtocolError),
    #[error("store lock poisoned")]
    LockPoisoned,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for relay operations.
pub type ServerResult<T> = Result<T, ServerError>;
