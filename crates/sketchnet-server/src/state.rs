//! Shared relay state: one canonical store and the broadcast hub.

use std::sync::{Mutex, MutexGuard};

use sketchnet_core::{Message, Shape, ShapeId, encode_shape};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use crate::error::{ServerError, ServerResult};
use crate::hub::{BroadcastHub, PeerId};
use crate::store::CanonicalStore;

/// State shared by every connection task.
#[derive(Debug, Default)]
pub struct RelayState {
    store: Mutex<CanonicalStore>,
    hub: BroadcastHub,
}

impl RelayState {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> ServerResult<MutexGuard<'_, CanonicalStore>> {
        self.store.lock().map_err(|_| ServerError::LockPoisoned)
    }

    /// Add a connection: queue the current snapshot for it, then subscribe it
    /// to broadcasts.
    ///
    /// Both happen under the store lock, so no edit can land between the
    /// snapshot and the subscription. Returns the number of snapshot lines.
    pub fn join(&self, peer: PeerId, sender: UnboundedSender<String>) -> ServerResult<usize> {
        let store = self.store()?;
        let snapshot = store.snapshot();
        for (id, shape) in &snapshot {
            // Receiver is owned by the caller and still alive here
            let _ = sender.send(encode_shape(shape, Some(*id)));
        }
        self.hub.register(peer, sender);
        info!(
            "Peer {} joined with {} shapes ({} connected)",
            peer,
            snapshot.len(),
            self.hub.peer_count()
        );
        Ok(snapshot.len())
    }

    /// Apply one inbound line and broadcast the authoritative version.
    ///
    /// Upserts are re-encoded with the assigned id, which also puts the line
    /// in canonical form.
    ///
    /// The broadcast is queued while the store lock is held, so every
    /// connection receives edits in the order the store applied them.
    /// Returns the line that was broadcast.
    pub fn submit(&self, peer: PeerId, line: &str) -> ServerResult<String> {
        let message = Message::decode(line)?;

        let mut store = self.store()?;
        let outgoing = match message {
            Message::Upsert { id: claimed, shape } => {
                let assigned = store.apply_edit(shape.clone(), claimed);
                if assigned.allocated {
                    info!("Peer {} created {} {}", peer, shape.kind(), assigned.id);
                } else {
                    debug!("Peer {} updated {} {}", peer, shape.kind(), assigned.id);
                }
                encode_shape(&shape, Some(assigned.id))
            }
            Message::Delete { id } => {
                let existed = store.apply_delete(id);
                info!("Peer {} deleted {} (present: {})", peer, id, existed);
                Message::Delete { id }.encode()
            }
        };
        let delivered = self.hub.broadcast(&outgoing);
        drop(store);

        debug!("Broadcast {:?} to {} peers", outgoing, delivered);
        Ok(outgoing)
    }

    /// Remove a connection from the broadcast set.
    pub fn leave(&self, peer: PeerId) {
        if self.hub.deregister(peer) {
            info!("Peer {} left ({} connected)", peer, self.hub.peer_count());
        }
    }

    pub fn snapshot(&self) -> ServerResult<Vec<(ShapeId, Shape)>> {
        Ok(self.store()?.snapshot())
    }

    pub fn next_id(&self) -> ServerResult<ShapeId> {
        Ok(self.store()?.next_id())
    }

    pub fn peer_count(&self) -> usize {
        self.hub.peer_count()
    }

    pub fn hub(&self) -> &BroadcastHub {
        &self.hub
    }
}
