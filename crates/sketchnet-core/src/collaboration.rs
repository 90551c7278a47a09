//! Client-side replica of the shared sketch.
//!
//! The [`Mirror`] keeps two separate slots: the confirmed [`Sketch`], which
//! only changes when a line arrives from the server, and an optional
//! [`PendingEdit`] that is drawn on top while a local gesture is in progress.
//! Local edits are never applied to the confirmed sketch directly; they are
//! queued as outgoing lines and show up once the server echoes them.

use crate::protocol::{Message, ProtocolError, encode_shape};
use crate::shapes::{Shape, ShapeId};
use crate::sketch::Sketch;

/// A shape under local construction or manipulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    /// `None` for a brand-new shape, `Some` when editing a confirmed one.
    pub id: Option<ShapeId>,
    pub shape: Shape,
}

/// What applying a server line did to the mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorEvent {
    Upserted { id: ShapeId, created: bool },
    Deleted { id: ShapeId, existed: bool },
}

impl MirrorEvent {
    pub fn id(&self) -> ShapeId {
        match self {
            MirrorEvent::Upserted { id, .. } | MirrorEvent::Deleted { id, .. } => *id,
        }
    }
}

/// Local view of the canonical sketch plus the edit in progress.
#[derive(Debug, Clone, Default)]
pub struct Mirror {
    confirmed: Sketch,
    pending: Option<PendingEdit>,
    /// Lines waiting to be sent to the server.
    outgoing: Vec<String>,
}

impl Mirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shapes confirmed by the server.
    pub fn sketch(&self) -> &Sketch {
        &self.confirmed
    }

    pub fn pending(&self) -> Option<&PendingEdit> {
        self.pending.as_ref()
    }

    pub fn pending_mut(&mut self) -> Option<&mut PendingEdit> {
        self.pending.as_mut()
    }

    /// Start a local edit. Replaces any edit already in progress.
    pub fn begin_pending(&mut self, id: Option<ShapeId>, shape: Shape) {
        self.pending = Some(PendingEdit { id, shape });
    }

    /// Drop the edit in progress without sending anything.
    pub fn discard_pending(&mut self) -> Option<PendingEdit> {
        self.pending.take()
    }

    /// Send the edit in progress and clear it.
    ///
    /// The shape reappears only once the server echoes it back.
    pub fn commit_pending(&mut self) -> Option<String> {
        let PendingEdit { id, shape } = self.pending.take()?;
        Some(self.queue(encode_shape(&shape, id)))
    }

    /// Apply one line received from the server.
    pub fn handle_line(&mut self, line: &str) -> Result<MirrorEvent, ProtocolError> {
        let event = match Message::decode(line)? {
            // The server always resolves the sentinel before broadcasting
            Message::Upsert { id: None, .. } => return Err(ProtocolError::InvalidId("-1".into())),
            Message::Upsert {
                id: Some(id),
                shape,
            } => {
                let created = self.confirmed.upsert(id, shape).is_none();
                MirrorEvent::Upserted { id, created }
            }
            Message::Delete { id } => {
                let existed = self.confirmed.remove(id).is_some();
                if self.pending.as_ref().is_some_and(|p| p.id == Some(id)) {
                    log::debug!("Shape {id} deleted remotely while being edited");
                    self.pending = None;
                }
                MirrorEvent::Deleted { id, existed }
            }
        };
        log::debug!("Applied server line: {event:?}");
        Ok(event)
    }

    /// Queue a new shape. The server assigns its id.
    pub fn submit_new(&mut self, shape: &Shape) -> String {
        self.queue(encode_shape(shape, None))
    }

    /// Queue an overwrite of a confirmed shape.
    pub fn submit_update(&mut self, id: ShapeId, shape: &Shape) -> String {
        self.queue(encode_shape(shape, Some(id)))
    }

    pub fn submit_delete(&mut self, id: ShapeId) -> String {
        self.queue(Message::Delete { id }.encode())
    }

    fn queue(&mut self, line: String) -> String {
        self.outgoing.push(line.clone());
        line
    }

    /// Take all pending outgoing lines.
    pub fn take_outgoing(&mut self) -> Vec<String> {
        std::mem::take(&mut self.outgoing)
    }

    pub fn has_outgoing(&self) -> bool {
        !self.outgoing.is_empty()
    }

    /// Everything to draw, back to front.
    ///
    /// The pending edit is last. While a confirmed shape is being moved, its
    /// confirmed copy is skipped so it is not drawn twice.
    pub fn paint_order(&self) -> Vec<(Option<ShapeId>, &Shape)> {
        let hidden = self.pending.as_ref().and_then(|p| p.id);
        let mut order: Vec<(Option<ShapeId>, &Shape)> = self
            .confirmed
            .iter()
            .filter(|(id, _)| Some(*id) != hidden)
            .map(|(id, shape)| (Some(id), shape))
            .collect();
        if let Some(pending) = &self.pending {
            order.push((pending.id, &pending.shape));
        }
        order
    }

    /// Topmost confirmed shape under (x, y).
    pub fn hit_test(&self, x: i32, y: i32) -> Option<ShapeId> {
        self.confirmed.hit_test(x, y)
    }
}
