//! Per-connection task.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::state::RelayState;

/// How long queued lines may take to reach a departing peer.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Serve one client until it disconnects or misbehaves.
///
/// The snapshot is queued before any inbound line is read. Failures end this
/// connection only.
pub async fn handle_connection(stream: TcpStream, addr: SocketAddr, state: Arc<RelayState>) {
    let peer = Uuid::new_v4();
    info!("New connection: {} from {}", peer, addr);

    let (reader, writer) = stream.into_split();
    let (tx, rx) = unbounded_channel::<String>();
    if let Err(e) = state.join(peer, tx) {
        warn!("Could not register {}: {}", peer, e);
        return;
    }

    let mut write_task = tokio::spawn(write_lines(writer, rx));
    let mut lines = BufReader::new(reader).lines();
    let mut writer_done = false;

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if let Err(e) = state.submit(peer, &line) {
                        warn!("Closing {}: {} (line {:?})", peer, e, line);
                        break;
                    }
                }
                Ok(None) => {
                    debug!("{} closed its stream", peer);
                    break;
                }
                Err(e) => {
                    warn!("Read error for {}: {}", peer, e);
                    break;
                }
            },
            _ = &mut write_task => {
                debug!("Writer for {} stopped", peer);
                writer_done = true;
                break;
            }
        }
    }

    // Deregistering drops the hub's sender, so the writer ends once the
    // queue is flushed
    state.leave(peer);
    if !writer_done && timeout(DRAIN_TIMEOUT, &mut write_task).await.is_err() {
        debug!("Writer for {} did not drain in time", peer);
        write_task.abort();
    }
    info!("Connection closed: {}", peer);
}

/// Drain a connection's queue onto its socket.
async fn write_lines(mut writer: OwnedWriteHalf, mut rx: UnboundedReceiver<String>) {
    while let Some(line) = rx.recv().await {
        let mut bytes = line.into_bytes();
        bytes.push(b'\n');
        if let Err(e) = writer.write_all(&bytes).await {
            warn!("Write failed: {}", e);
            return;
        }
    }
}
