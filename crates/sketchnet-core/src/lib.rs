//! Sketchnet Core Library
//!
//! Shape model, line protocol and client-side replica for the sketchnet
//! shared canvas.

pub mod collaboration;
pub mod protocol;
pub mod shapes;
pub mod sketch;
pub mod sync;
pub mod tools;

pub use collaboration::{Mirror, MirrorEvent, PendingEdit};
pub use protocol::{Message, ProtocolError, decode_shape, encode_shape};
pub use shapes::{Color, Shape, ShapeId, ShapeKind, ShapeTrait, Vertex};
pub use sketch::Sketch;
pub use sync::{ConnectionError, ConnectionState, NativeConnection, SyncEvent};
pub use tools::{Mode, ToolManager, ToolState};
