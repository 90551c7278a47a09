//! Line-based wire protocol.
//!
//! One message per line, whitespace-separated tokens:
//!
//! ```text
//! ellipse|rectangle|segment <x1> <y1> <x2> <y2> <color> <id>
//! polyline <x1> <y1> ... <xn> <yn> <color> <id>
//! DELETE <id>
//! ```
//!
//! `<color>` is packed ARGB as a signed 32-bit integer. `<id>` is a
//! non-negative integer, or `-1` when the server must assign one.

use std::fmt::Write as _;

use thiserror::Error;

use crate::shapes::{Color, Polyline, Shape, ShapeId, ShapeKind, Vertex};

/// Keyword that introduces a deletion.
pub const DELETE_KEYWORD: &str = "DELETE";

/// Wire value meaning "no identity assigned yet".
pub const UNASSIGNED_ID: i64 = -1;

/// A line that does not follow the wire grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("empty message")]
    Empty,
    #[error("unknown message type: {0:?}")]
    UnknownKind(String),
    #[error("wrong number of tokens for {kind}: {count}")]
    TokenCount { kind: String, count: usize },
    #[error("invalid {field}: {token:?}")]
    InvalidNumber { field: &'static str, token: String },
    #[error("invalid shape id: {0}")]
    InvalidId(String),
    #[error("DELETE requires an assigned id")]
    UnassignedDelete,
}

/// A decoded protocol line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Create or overwrite a shape. `id` is `None` for the unassigned sentinel.
    Upsert { id: Option<ShapeId>, shape: Shape },
    /// Remove a shape.
    Delete { id: ShapeId },
}

impl Message {
    /// Parse one line (without its terminator).
    pub fn decode(line: &str) -> Result<Self, ProtocolError> {
        let tokens: Vec<&str> = line.split_ascii_whitespace().collect();
        let Some(&head) = tokens.first() else {
            return Err(ProtocolError::Empty);
        };

        if head == DELETE_KEYWORD {
            if tokens.len() != 2 {
                return Err(ProtocolError::TokenCount {
                    kind: DELETE_KEYWORD.to_string(),
                    count: tokens.len(),
                });
            }
            return match parse_id(tokens[1])? {
                Some(id) => Ok(Message::Delete { id }),
                None => Err(ProtocolError::UnassignedDelete),
            };
        }

        let (shape, id) = decode_shape_tokens(&tokens)?;
        Ok(Message::Upsert { id, shape })
    }

    /// Render as a single line (no trailing newline).
    pub fn encode(&self) -> String {
        match self {
            Message::Upsert { id, shape } => encode_shape(shape, *id),
            Message::Delete { id } => format!("{DELETE_KEYWORD} {id}"),
        }
    }

    /// Identity this message refers to, if assigned.
    pub fn id(&self) -> Option<ShapeId> {
        match self {
            Message::Upsert { id, .. } => *id,
            Message::Delete { id } => Some(*id),
        }
    }
}

/// Encode a shape together with its identity (`None` → `-1`).
pub fn encode_shape(shape: &Shape, id: Option<ShapeId>) -> String {
    let mut line = String::from(shape.kind().keyword());
    for v in shape.vertices() {
        // Writing into a String cannot fail
        let _ = write!(line, " {} {}", v.x, v.y);
    }
    let _ = write!(line, " {}", shape.color().to_wire());
    match id {
        Some(id) => {
            let _ = write!(line, " {id}");
        }
        None => {
            let _ = write!(line, " {UNASSIGNED_ID}");
        }
    }
    line
}

/// Decode a shape line into the shape and its identity.
pub fn decode_shape(line: &str) -> Result<(Shape, Option<ShapeId>), ProtocolError> {
    let tokens: Vec<&str> = line.split_ascii_whitespace().collect();
    if tokens.is_empty() {
        return Err(ProtocolError::Empty);
    }
    decode_shape_tokens(&tokens)
}

fn decode_shape_tokens(tokens: &[&str]) -> Result<(Shape, Option<ShapeId>), ProtocolError> {
    let head = tokens[0];
    let kind = ShapeKind::from_keyword(head)
        .filter(|kind| kind.keyword() == head)
        .ok_or_else(|| ProtocolError::UnknownKind(head.to_string()))?;

    let wrong_count = || ProtocolError::TokenCount {
        kind: head.to_string(),
        count: tokens.len(),
    };

    // keyword + coordinates + color + id
    if tokens.len() < 5 {
        return Err(wrong_count());
    }
    let coords = &tokens[1..tokens.len() - 2];
    let color = parse_color(tokens[tokens.len() - 2])?;
    let id = parse_id(tokens[tokens.len() - 1])?;

    if coords.len() % 2 != 0 {
        return Err(wrong_count());
    }
    let vertices = coords
        .chunks(2)
        .map(|pair| Ok(Vertex::new(parse_coord(pair[0])?, parse_coord(pair[1])?)))
        .collect::<Result<Vec<_>, ProtocolError>>()?;

    let shape = match kind {
        ShapeKind::Polyline => {
            Shape::Polyline(Polyline::from_points(vertices, color).ok_or_else(wrong_count)?)
        }
        two_corner => {
            let &[a, b] = vertices.as_slice() else {
                return Err(wrong_count());
            };
            let mut shape = Shape::anchored(two_corner, a, color);
            shape.reshape(a, b);
            shape
        }
    };
    Ok((shape, id))
}

fn parse_coord(token: &str) -> Result<i32, ProtocolError> {
    token.parse().map_err(|_| ProtocolError::InvalidNumber {
        field: "coordinate",
        token: token.to_string(),
    })
}

fn parse_color(token: &str) -> Result<Color, ProtocolError> {
    token
        .parse::<i32>()
        .map(Color::from_wire)
        .map_err(|_| ProtocolError::InvalidNumber {
            field: "color",
            token: token.to_string(),
        })
}

fn parse_id(token: &str) -> Result<Option<ShapeId>, ProtocolError> {
    let value: i64 = token.parse().map_err(|_| ProtocolError::InvalidNumber {
        field: "id",
        token: token.to_string(),
    })?;
    match value {
        UNASSIGNED_ID => Ok(None),
        v if v >= 0 => Ok(Some(ShapeId::new(v as u64))),
        v => Err(ProtocolError::InvalidId(v.to_string())),
    }
}
