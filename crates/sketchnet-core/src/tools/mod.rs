//! Editor gestures.
//!
//! Pointer input arrives as press/drag/release triples. The [`ToolManager`]
//! turns them into pending edits and outgoing lines on a [`Mirror`].

use crate::collaboration::Mirror;
use crate::shapes::{Color, Shape, ShapeId, ShapeKind, Vertex};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a gesture does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Create a new shape of the given kind.
    Draw(ShapeKind),
    /// Drag an existing shape.
    Move,
    /// Apply the current color to an existing shape.
    Recolor,
    /// Remove an existing shape.
    Delete,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Draw(ShapeKind::Polyline)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Draw(kind) => write!(f, "draw {kind}"),
            Mode::Move => f.write_str("move"),
            Mode::Recolor => f.write_str("recolor"),
            Mode::Delete => f.write_str("delete"),
        }
    }
}

/// Progress of the current gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolState {
    #[default]
    Idle,
    /// A new shape is being drawn from `anchor`.
    Drawing { anchor: Vertex },
    /// A confirmed shape was picked; `last` is the previous pointer position.
    TargetSelected { id: ShapeId, last: Vertex },
}

/// Current mode, color, and gesture state.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    mode: Mode,
    color: Color,
    state: ToolState,
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn state(&self) -> ToolState {
        self.state
    }

    /// Check if a gesture is in progress.
    pub fn is_active(&self) -> bool {
        self.state != ToolState::Idle
    }

    /// Switch mode. Any gesture in progress is abandoned.
    pub fn set_mode(&mut self, mirror: &mut Mirror, mode: Mode) {
        self.cancel(mirror);
        self.mode = mode;
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Start a gesture at `at`.
    ///
    /// Returns false when nothing happened (a pick mode hit empty canvas).
    pub fn press(&mut self, mirror: &mut Mirror, at: Vertex) -> bool {
        if self.is_active() {
            self.cancel(mirror);
        }

        match self.mode {
            Mode::Draw(kind) => {
                mirror.begin_pending(None, Shape::anchored(kind, at, self.color));
                self.state = ToolState::Drawing { anchor: at };
                true
            }
            Mode::Move | Mode::Recolor | Mode::Delete => {
                let Some(id) = mirror.hit_test(at.x, at.y) else {
                    return false;
                };
                self.pick(mirror, id);
                self.state = ToolState::TargetSelected { id, last: at };
                true
            }
        }
    }

    fn pick(&self, mirror: &mut Mirror, id: ShapeId) {
        let Some(shape) = mirror.sketch().get(id).cloned() else {
            return;
        };
        match self.mode {
            Mode::Move => mirror.begin_pending(Some(id), shape),
            Mode::Recolor => {
                let mut shape = shape;
                shape.set_color(self.color);
                mirror.submit_update(id, &shape);
            }
            Mode::Delete => {
                mirror.submit_delete(id);
            }
            Mode::Draw(_) => {}
        }
    }

    /// Continue the gesture to `to`.
    pub fn drag(&mut self, mirror: &mut Mirror, to: Vertex) {
        match self.state {
            ToolState::Idle => {}
            ToolState::Drawing { anchor } => {
                if let Some(pending) = mirror.pending_mut() {
                    pending.shape.reshape(anchor, to);
                }
            }
            ToolState::TargetSelected { id, last } => {
                if self.mode == Mode::Move {
                    self.move_target(mirror, id, last, to);
                }
                self.state = ToolState::TargetSelected { id, last: to };
            }
        }
    }

    /// Finish the gesture at `at`.
    pub fn release(&mut self, mirror: &mut Mirror, at: Vertex) {
        match self.state {
            ToolState::Idle => return,
            ToolState::Drawing { anchor } => {
                if let Some(pending) = mirror.pending_mut() {
                    // Polylines already received this point from the last drag
                    let last = pending.shape.vertices().last().copied();
                    if pending.shape.kind() != ShapeKind::Polyline || last != Some(at) {
                        pending.shape.reshape(anchor, at);
                    }
                }
                mirror.commit_pending();
            }
            ToolState::TargetSelected { id, last } => {
                if self.mode == Mode::Move {
                    if at != last {
                        self.move_target(mirror, id, last, at);
                    }
                    mirror.commit_pending();
                }
            }
        }
        self.state = ToolState::Idle;
    }

    /// Abandon the gesture without sending anything further.
    pub fn cancel(&mut self, mirror: &mut Mirror) {
        if self.is_active() {
            mirror.discard_pending();
        }
        self.state = ToolState::Idle;
    }

    fn move_target(&self, mirror: &mut Mirror, id: ShapeId, from: Vertex, to: Vertex) {
        let Some(pending) = mirror.pending_mut() else {
            return;
        };
        pending
            .shape
            .move_by(to.x.saturating_sub(from.x), to.y.saturating_sub(from.y));
        let shape = pending.shape.clone();
        mirror.submit_update(id, &shape);
    }
}
