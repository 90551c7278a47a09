//! Broadcast hub: the set of live connections and fan-out to them.

use dashmap::DashMap;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};
use uuid::Uuid;

/// Connection identifier.
pub type PeerId = Uuid;

/// Outbound queues of every registered connection.
///
/// Each connection drains its own queue on its own task, so a slow or dead
/// recipient never holds up delivery to the others.
#[derive(Debug, Default)]
pub struct BroadcastHub {
    peers: DashMap<PeerId, UnboundedSender<String>>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, peer: PeerId, sender: UnboundedSender<String>) {
        self.peers.insert(peer, sender);
        debug!("Registered peer {} ({} connected)", peer, self.peers.len());
    }

    /// Returns whether the peer was registered.
    pub fn deregister(&self, peer: PeerId) -> bool {
        let removed = self.peers.remove(&peer).is_some();
        if removed {
            debug!("Deregistered peer {} ({} connected)", peer, self.peers.len());
        }
        removed
    }

    /// Queue `line` for every registered connection, the originator included.
    ///
    /// Returns the number of connections that accepted it.
    pub fn broadcast(&self, line: &str) -> usize {
        let mut delivered = 0;
        for entry in self.peers.iter() {
            if entry.value().send(line.to_string()).is_ok() {
                delivered += 1;
            } else {
                // Connection task already gone; it deregisters itself
                warn!("Skipping closed peer {}", entry.key());
            }
        }
        delivered
    }

    /// Queue `line` for one connection.
    pub fn send_to(&self, peer: PeerId, line: &str) -> bool {
        self.peers
            .get(&peer)
            .is_some_and(|sender| sender.send(line.to_string()).is_ok())
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    pub fn is_registered(&self, peer: PeerId) -> bool {
        self.peers.contains_key(&peer)
    }
}
