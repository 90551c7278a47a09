//! Line segment shape.

use super::{Color, HIT_TOLERANCE, ShapeKind, ShapeTrait, Vertex, point_to_segment_dist};
use kurbo::{Line as KurboLine, Point, Rect};
use serde::{Deserialize, Serialize};

/// A straight segment from `start` to `end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub(crate) start: Vertex,
    pub(crate) end: Vertex,
    pub(crate) color: Color,
}

impl Segment {
    pub fn new(start: Vertex, end: Vertex, color: Color) -> Self {
        Self { start, end, color }
    }

    /// A zero-length segment at a point.
    pub fn anchored(at: Vertex, color: Color) -> Self {
        Self::new(at, at, color)
    }

    /// Move the end point, keeping the start fixed.
    pub fn set_end(&mut self, end: Vertex) {
        self.end = end;
    }

    pub fn start(&self) -> Vertex {
        self.start
    }

    pub fn end(&self) -> Vertex {
        self.end
    }

    /// Get as a kurbo Line.
    pub fn as_kurbo(&self) -> KurboLine {
        KurboLine::new(self.start.to_point(), self.end.to_point())
    }
}

impl ShapeTrait for Segment {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Segment
    }

    fn bounds(&self) -> Rect {
        Rect::from_points(self.start.to_point(), self.end.to_point())
    }

    fn contains(&self, x: i32, y: i32) -> bool {
        let line = self.as_kurbo();
        point_to_segment_dist(Point::new(f64::from(x), f64::from(y)), line.p0, line.p1)
            <= HIT_TOLERANCE
    }

    fn move_by(&mut self, dx: i32, dy: i32) {
        self.start = self.start.offset(dx, dy);
        self.end = self.end.offset(dx, dy);
    }

    fn color(&self) -> Color {
        self.color
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_within_tolerance() {
        let seg = Segment::new(Vertex::new(0, 0), Vertex::new(100, 0), Color::BLACK);
        assert!(seg.contains(50, 0));
        assert!(seg.contains(50, 3));
        assert!(!seg.contains(50, 4));
        // Past the end point
        assert!(seg.contains(102, 0));
        assert!(!seg.contains(110, 0));
    }

    #[test]
    fn test_end_is_not_normalized() {
        let mut seg = Segment::anchored(Vertex::new(40, 40), Color::BLACK);
        seg.set_end(Vertex::new(0, 0));
        assert_eq!(seg.start(), Vertex::new(40, 40));
        assert_eq!(seg.end(), Vertex::new(0, 0));
    }

    #[test]
    fn test_move_by() {
        let mut seg = Segment::new(Vertex::new(0, 0), Vertex::new(10, 10), Color::BLACK);
        seg.move_by(-2, 3);
        assert_eq!(seg.start(), Vertex::new(-2, 3));
        assert_eq!(seg.end(), Vertex::new(8, 13));
    }
}
