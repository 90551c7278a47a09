//! Ellipse shape.

use super::{Color, ShapeKind, ShapeTrait, Vertex, normalize_corners};
use kurbo::{Ellipse as KurboEllipse, Point, Rect};
use serde::{Deserialize, Serialize};

/// An axis-aligned ellipse inscribed in the box between two corners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ellipse {
    /// Upper-left corner of the bounding box.
    pub(crate) top_left: Vertex,
    /// Lower-right corner of the bounding box.
    pub(crate) bottom_right: Vertex,
    pub(crate) color: Color,
}

impl Ellipse {
    /// Create an ellipse from two opposite corners of its bounding box.
    pub fn new(a: Vertex, b: Vertex, color: Color) -> Self {
        let (top_left, bottom_right) = normalize_corners(a, b);
        Self {
            top_left,
            bottom_right,
            color,
        }
    }

    /// A zero-size ellipse at a single point.
    pub fn anchored(at: Vertex, color: Color) -> Self {
        Self::new(at, at, color)
    }

    /// Redefine the bounding box from two corners, in any order.
    pub fn set_corners(&mut self, a: Vertex, b: Vertex) {
        (self.top_left, self.bottom_right) = normalize_corners(a, b);
    }

    pub fn top_left(&self) -> Vertex {
        self.top_left
    }

    pub fn bottom_right(&self) -> Vertex {
        self.bottom_right
    }

    /// Get as a kurbo Ellipse.
    pub fn as_kurbo(&self) -> KurboEllipse {
        KurboEllipse::from_rect(self.bounds())
    }
}

impl ShapeTrait for Ellipse {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Ellipse
    }

    fn bounds(&self) -> Rect {
        Rect::from_points(self.top_left.to_point(), self.bottom_right.to_point())
    }

    fn contains(&self, x: i32, y: i32) -> bool {
        let bounds = self.bounds();
        let a = bounds.width() / 2.0;
        let b = bounds.height() / 2.0;
        if a < f64::EPSILON || b < f64::EPSILON {
            return false;
        }
        let center = bounds.center();
        let p = Point::new(f64::from(x), f64::from(y));
        let dx = (p.x - center.x) / a;
        let dy = (p.y - center.y) / b;
        dx * dx + dy * dy <= 1.0
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ellipse_normalizes_corners() {
        let ellipse = Ellipse::new(Vertex::new(50, 60), Vertex::new(10, 20), Color::BLACK);
        assert_eq!(ellipse.top_left(), Vertex::new(10, 20));
        assert_eq!(ellipse.bottom_right(), Vertex::new(50, 60));
    }

    #[test]
    fn test_contains_center_and_edge() {
        let ellipse = Ellipse::new(Vertex::new(10, 10), Vertex::new(50, 50), Color::BLACK);
        assert!(ellipse.contains(30, 30));
        assert!(ellipse.contains(50, 30));
        assert!(!ellipse.contains(51, 30));
        // Bounding box corner lies outside the ellipse
        assert!(!ellipse.contains(12, 12));
    }

    #[test]
    fn test_degenerate_contains_nothing() {
        let ellipse = Ellipse::anchored(Vertex::new(5, 5), Color::BLACK);
        assert!(!ellipse.contains(5, 5));
    }

    #[test]
    fn test_move_by() {
        let mut ellipse = Ellipse::new(Vertex::new(0, 0), Vertex::new(20, 10), Color::BLACK);
        ellipse.move_by(5, -5);
        assert_eq!(ellipse.top_left(), Vertex::new(5, -5));
        assert_eq!(ellipse.bottom_right(), Vertex::new(25, 5));
        assert!(ellipse.contains(15, 0));
    }

    #[test]
    fn test_as_kurbo_radii() {
        let ellipse = Ellipse::new(Vertex::new(0, 0), Vertex::new(60, 40), Color::BLACK);
        let radii = ellipse.as_kurbo().radii();
        assert!((radii.x - 30.0).abs() < 1e-9);
        assert!((radii.y - 20.0).abs() < 1e-9);
    }
}
