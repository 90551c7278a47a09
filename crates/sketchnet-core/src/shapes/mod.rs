//! Shape definitions for the shared canvas.

mod ellipse;
mod polyline;
mod rectangle;
mod segment;

pub use ellipse::Ellipse;
pub use polyline::Polyline;
pub use rectangle::Rectangle;
pub use segment::Segment;

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Distance (in pixels) within which a click counts as hitting a stroke.
pub const HIT_TOLERANCE: f64 = 3.0;

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(u32);

impl Color {
    pub const BLACK: Color = Color(0x000000);
    pub const WHITE: Color = Color(0xFFFFFF);

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self((u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b))
    }

    /// Build from a packed `0xRRGGBB` value. Bits above 24 are dropped.
    pub fn from_packed(rgb: u32) -> Self {
        Self(rgb & 0x00FF_FFFF)
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        ((self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8)
    }

    /// Signed packed ARGB form used on the wire (alpha is always opaque).
    pub fn to_wire(self) -> i32 {
        (0xFF00_0000 | self.0) as i32
    }

    /// Parse the wire form, ignoring the alpha byte.
    pub fn from_wire(value: i32) -> Self {
        Self::from_packed(value as u32)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

/// Error returned when a `#rrggbb` color string can't be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color: {0:?} (expected #rrggbb)")]
pub struct ParseColorError(pub String);

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 {
            return Err(ParseColorError(s.to_string()));
        }
        u32::from_str_radix(hex, 16)
            .map(Color::from_packed)
            .map_err(|_| ParseColorError(s.to_string()))
    }
}

/// A point in integer canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vertex {
    pub x: i32,
    pub y: i32,
}

impl Vertex {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Shift by (dx, dy), clamping at the edges of the coordinate range.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    pub fn to_point(self) -> Point {
        Point::new(f64::from(self.x), f64::from(self.y))
    }
}

impl From<(i32, i32)> for Vertex {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// Variant tag of a shape. Fixed once the shape exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Ellipse,
    Rectangle,
    Segment,
    Polyline,
}

impl ShapeKind {
    /// Keyword that introduces this shape on the wire.
    pub fn keyword(self) -> &'static str {
        match self {
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Segment => "segment",
            ShapeKind::Polyline => "polyline",
        }
    }

    /// Look up a wire keyword. `freehand` is accepted as the editor name for polylines.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "ellipse" => Some(ShapeKind::Ellipse),
            "rectangle" => Some(ShapeKind::Rectangle),
            "segment" => Some(ShapeKind::Segment),
            "polyline" | "freehand" => Some(ShapeKind::Polyline),
            _ => None,
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Server-assigned identity of a shape.
///
/// Allocated in strictly increasing order and never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(u64);

impl ShapeId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = kurbo::Vec2::new(b.x - a.x, b.y - a.y);
    let pv = kurbo::Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    (point - proj).hypot()
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => (point - *only).hypot(),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Behaviour shared by every shape variant.
pub trait ShapeTrait {
    /// Variant tag.
    fn kind(&self) -> ShapeKind;

    /// Bounding box in canvas coordinates.
    fn bounds(&self) -> Rect;

    /// Whether the canvas point (x, y) hits this shape.
    fn contains(&self, x: i32, y: i32) -> bool;

    /// Translate every defining coordinate.
    fn move_by(&mut self, dx: i32, dy: i32);

    fn color(&self) -> Color;

    fn set_color(&mut self, color: Color);
}

/// Closed set of drawable shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Shape {
    Ellipse(Ellipse),
    Rectangle(Rectangle),
    Segment(Segment),
    Polyline(Polyline),
}

impl Shape {
    /// Start a shape of the given kind at a single point, as a drawing gesture does.
    pub fn anchored(kind: ShapeKind, at: Vertex, color: Color) -> Self {
        match kind {
            ShapeKind::Ellipse => Shape::Ellipse(Ellipse::anchored(at, color)),
            ShapeKind::Rectangle => Shape::Rectangle(Rectangle::anchored(at, color)),
            ShapeKind::Segment => Shape::Segment(Segment::anchored(at, color)),
            ShapeKind::Polyline => Shape::Polyline(Polyline::anchored(at, color)),
        }
    }

    /// Continue a drawing gesture: two-corner shapes span `anchor`..`to`,
    /// segments move their end, polylines gain a vertex.
    pub fn reshape(&mut self, anchor: Vertex, to: Vertex) {
        match self {
            Shape::Ellipse(s) => s.set_corners(anchor, to),
            Shape::Rectangle(s) => s.set_corners(anchor, to),
            Shape::Segment(s) => s.set_end(to),
            Shape::Polyline(s) => s.extend(to),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Ellipse(s) => s.kind(),
            Shape::Rectangle(s) => s.kind(),
            Shape::Segment(s) => s.kind(),
            Shape::Polyline(s) => s.kind(),
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Ellipse(s) => s.bounds(),
            Shape::Rectangle(s) => s.bounds(),
            Shape::Segment(s) => s.bounds(),
            Shape::Polyline(s) => s.bounds(),
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        match self {
            Shape::Ellipse(s) => s.contains(x, y),
            Shape::Rectangle(s) => s.contains(x, y),
            Shape::Segment(s) => s.contains(x, y),
            Shape::Polyline(s) => s.contains(x, y),
        }
    }

    pub fn move_by(&mut self, dx: i32, dy: i32) {
        match self {
            Shape::Ellipse(s) => s.move_by(dx, dy),
            Shape::Rectangle(s) => s.move_by(dx, dy),
            Shape::Segment(s) => s.move_by(dx, dy),
            Shape::Polyline(s) => s.move_by(dx, dy),
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Shape::Ellipse(s) => s.color(),
            Shape::Rectangle(s) => s.color(),
            Shape::Segment(s) => s.color(),
            Shape::Polyline(s) => s.color(),
        }
    }

    pub fn set_color(&mut self, color: Color) {
        match self {
            Shape::Ellipse(s) => s.set_color(color),
            Shape::Rectangle(s) => s.set_color(color),
            Shape::Segment(s) => s.set_color(color),
            Shape::Polyline(s) => s.set_color(color),
        }
    }

    /// Defining coordinates in wire order.
    pub fn vertices(&self) -> Vec<Vertex> {
        match self {
            Shape::Ellipse(s) => vec![s.top_left, s.bottom_right],
            Shape::Rectangle(s) => vec![s.top_left, s.bottom_right],
            Shape::Segment(s) => vec![s.start, s.end],
            Shape::Polyline(s) => s.points().to_vec(),
        }
    }
}

/// Normalize two corners into (top-left, bottom-right).
pub(crate) fn normalize_corners(a: Vertex, b: Vertex) -> (Vertex, Vertex) {
    (
        Vertex::new(a.x.min(b.x), a.y.min(b.y)),
        Vertex::new(a.x.max(b.x), a.y.max(b.y)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_wire_black() {
        assert_eq!(Color::BLACK.to_wire(), -16777216);
        assert_eq!(Color::from_wire(-16777216), Color::BLACK);
    }

    #[test]
    fn test_color_wire_ignores_alpha() {
        let red = Color::from_rgb(255, 0, 0);
        assert_eq!(Color::from_wire(red.to_wire()), red);
        assert_eq!(Color::from_wire(0x00FF_0000), red);
    }

    #[test]
    fn test_color_parse() {
        assert_eq!("#ff8000".parse::<Color>().unwrap().rgb(), (255, 128, 0));
        assert_eq!("00ff00".parse::<Color>().unwrap(), Color::from_rgb(0, 255, 0));
        assert!("#fff".parse::<Color>().is_err());
        assert!("#gggggg".parse::<Color>().is_err());
        assert_eq!(Color::from_rgb(1, 2, 3).to_string(), "#010203");
    }

    #[test]
    fn test_kind_keywords() {
        for kind in [
            ShapeKind::Ellipse,
            ShapeKind::Rectangle,
            ShapeKind::Segment,
            ShapeKind::Polyline,
        ] {
            assert_eq!(ShapeKind::from_keyword(kind.keyword()), Some(kind));
        }
        assert_eq!(ShapeKind::from_keyword("freehand"), Some(ShapeKind::Polyline));
        assert_eq!(ShapeKind::from_keyword("circle"), None);
    }

    #[test]
    fn test_point_to_segment_dist() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!((point_to_segment_dist(Point::new(5.0, 3.0), a, b) - 3.0).abs() < 1e-9);
        assert!((point_to_segment_dist(Point::new(13.0, 4.0), a, b) - 5.0).abs() < 1e-9);
        // Degenerate segment
        assert!((point_to_segment_dist(Point::new(3.0, 4.0), a, a) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_anchored_then_reshape() {
        let mut shape = Shape::anchored(ShapeKind::Rectangle, Vertex::new(50, 50), Color::BLACK);
        shape.reshape(Vertex::new(50, 50), Vertex::new(10, 20));
        assert_eq!(shape.vertices(), vec![Vertex::new(10, 20), Vertex::new(50, 50)]);

        let mut line = Shape::anchored(ShapeKind::Polyline, Vertex::new(0, 0), Color::BLACK);
        line.reshape(Vertex::new(0, 0), Vertex::new(5, 5));
        line.reshape(Vertex::new(0, 0), Vertex::new(9, 1));
        assert_eq!(line.vertices().len(), 3);
    }

    #[test]
    fn test_move_and_recolor_keep_kind() {
        let mut shape = Shape::anchored(ShapeKind::Segment, Vertex::new(0, 0), Color::BLACK);
        shape.reshape(Vertex::new(0, 0), Vertex::new(10, 0));
        shape.move_by(5, 5);
        shape.set_color(Color::WHITE);
        assert_eq!(shape.kind(), ShapeKind::Segment);
        assert_eq!(shape.vertices(), vec![Vertex::new(5, 5), Vertex::new(15, 5)]);
        assert_eq!(shape.color(), Color::WHITE);
    }
}
