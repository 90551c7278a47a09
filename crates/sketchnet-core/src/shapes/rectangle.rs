//! Rectangle shape.

use super::{Color, ShapeKind, ShapeTrait, Vertex, normalize_corners};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle.
///
/// Stored as an upper-left and a lower-right corner with x1 <= x2 and y1 <= y2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rectangle {
    pub(crate) top_left: Vertex,
    pub(crate) bottom_right: Vertex,
    pub(crate) color: Color,
}

impl Rectangle {
    /// Create a rectangle from two corner points.
    pub fn new(a: Vertex, b: Vertex, color: Color) -> Self {
        let (top_left, bottom_right) = normalize_corners(a, b);
        Self {
            top_left,
            bottom_right,
            color,
        }
    }

    /// An "empty" rectangle with only one corner set so far.
    pub fn anchored(at: Vertex, color: Color) -> Self {
        Self::new(at, at, color)
    }

    /// Redefine the rectangle from two corners, in any order.
    pub fn set_corners(&mut self, a: Vertex, b: Vertex) {
        (self.top_left, self.bottom_right) = normalize_corners(a, b);
    }

    pub fn top_left(&self) -> Vertex {
        self.top_left
    }

    pub fn bottom_right(&self) -> Vertex {
        self.bottom_right
    }

    pub fn width(&self) -> u32 {
        self.bottom_right.x.abs_diff(self.top_left.x)
    }

    pub fn height(&self) -> u32 {
        self.bottom_right.y.abs_diff(self.top_left.y)
    }
}

impl ShapeTrait for Rectangle {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Rectangle
    }

    fn bounds(&self) -> Rect {
        Rect::from_points(self.top_left.to_point(), self.bottom_right.to_point())
    }

    fn contains(&self, x: i32, y: i32) -> bool {
        // kurbo's Rect::contains is exclusive on the far edges; clicks on the border count here
        let p = Point::new(f64::from(x), f64::from(y));
        let r = self.bounds();
        p.x >= r.x0 && p.x <= r.x1 && p.y >= r.y0 && p.y <= r.y1
    }

    fn move_by(&mut self, dx: i32, dy: i32) {
        self.top_left = self.top_left.offset(dx, dy);
        self.bottom_right = self.bottom_right.offset(dx, dy);
    }

    fn color(&self) -> Color {
        self.color
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}
