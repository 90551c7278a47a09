//! Freehand polyline shape.

use super::{Color, HIT_TOLERANCE, ShapeKind, ShapeTrait, Vertex, point_to_polyline_dist};
use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};

/// A series of joints connected by straight strokes.
///
/// Always holds at least one point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polyline {
    pub(crate) points: Vec<Vertex>,
    pub(crate) color: Color,
}

impl Polyline {
    /// Initial zero-length polyline at a point.
    pub fn anchored(at: Vertex, color: Color) -> Self {
        Self {
            points: vec![at],
            color,
        }
    }

    /// Create from existing points. Returns `None` when `points` is empty.
    pub fn from_points(points: Vec<Vertex>, color: Color) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        Some(Self { points, color })
    }

    /// Append a joint to the end of the line.
    pub fn extend(&mut self, point: Vertex) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[Vertex] {
        &self.points
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the path has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Path representation for renderers.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut iter = self.points.iter().map(|p| p.to_point());
        if let Some(first) = iter.next() {
            path.move_to(first);
            for point in iter {
                path.line_to(point);
            }
        }
        path
    }
}

impl ShapeTrait for Polyline {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Polyline
    }

    fn bounds(&self) -> Rect {
        let mut iter = self.points.iter().map(|p| p.to_point());
        let Some(first) = iter.next() else {
            return Rect::ZERO;
        };
        iter.fold(Rect::from_points(first, first), |rect, p| rect.union_pt(p))
    }

    fn contains(&self, x: i32, y: i32) -> bool {
        let points: Vec<Point> = self.points.iter().map(|p| p.to_point()).collect();
        point_to_polyline_dist(Point::new(f64::from(x), f64::from(y)), &points) <= HIT_TOLERANCE
    }

    fn move_by(&mut self, dx: i32, dy: i32) {
        for point in &mut self.points {
            *point = point.offset(dx, dy);
        }
    }

    fn color(&self) -> Color {
        self.color
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}
