//! Ordered collection of identified shapes.

use crate::shapes::{Shape, ShapeId};
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Shapes keyed by identity.
///
/// Iteration is in ascending id order, which is also paint order: later ids
/// are drawn on top.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sketch {
    shapes: BTreeMap<ShapeId, Shape>,
}

impl Sketch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the shape stored under `id`.
    /// Returns the previous shape, if any.
    pub fn upsert(&mut self, id: ShapeId, shape: Shape) -> Option<Shape> {
        self.shapes.insert(id, shape)
    }

    /// Remove a shape. Removing an absent id is a no-op.
    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        self.shapes.remove(&id)
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    pub fn contains_id(&self, id: ShapeId) -> bool {
        self.shapes.contains_key(&id)
    }

    /// Shapes back to front.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (ShapeId, &Shape)> {
        self.shapes.iter().map(|(&id, shape)| (id, shape))
    }

    pub fn ids(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.shapes.keys().copied()
    }

    /// Highest id currently present.
    pub fn last_id(&self) -> Option<ShapeId> {
        self.shapes.keys().next_back().copied()
    }

    /// Topmost shape under (x, y).
    pub fn hit_test(&self, x: i32, y: i32) -> Option<ShapeId> {
        self.shapes_at(x, y).into_iter().next()
    }

    /// Every shape under (x, y), front to back.
    pub fn shapes_at(&self, x: i32, y: i32) -> Vec<ShapeId> {
        self.iter()
            .rev()
            .filter(|(_, shape)| shape.contains(x, y))
            .map(|(id, _)| id)
            .collect()
    }

    /// Union of all shape bounds.
    pub fn bounds(&self) -> Option<Rect> {
        self.shapes
            .values()
            .map(Shape::bounds)
            .reduce(|acc, b| acc.union(b))
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Color, Rectangle, Vertex};

    fn rect(x1: i32, y1: i32, x2: i32, y2: i32) -> Shape {
        Shape::Rectangle(Rectangle::new(
            Vertex::new(x1, y1),
            Vertex::new(x2, y2),
            Color::BLACK,
        ))
    }

    #[test]
    fn test_iteration_is_ascending() {
        let mut sketch = Sketch::new();
        sketch.upsert(ShapeId::new(5), rect(0, 0, 1, 1));
        sketch.upsert(ShapeId::new(1), rect(0, 0, 1, 1));
        sketch.upsert(ShapeId::new(3), rect(0, 0, 1, 1));
        let ids: Vec<u64> = sketch.ids().map(ShapeId::value).collect();
        assert_eq!(ids, vec![1, 3, 5]);
        assert_eq!(sketch.last_id(), Some(ShapeId::new(5)));
    }

    #[test]
    fn test_upsert_overwrites_in_place() {
        let mut sketch = Sketch::new();
        assert!(sketch.upsert(ShapeId::new(0), rect(0, 0, 1, 1)).is_none());
        assert!(sketch.upsert(ShapeId::new(0), rect(0, 0, 9, 9)).is_some());
        assert_eq!(sketch.len(), 1);
        assert_eq!(sketch.get(ShapeId::new(0)), Some(&rect(0, 0, 9, 9)));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut sketch = Sketch::new();
        sketch.upsert(ShapeId::new(0), rect(0, 0, 1, 1));
        assert!(sketch.remove(ShapeId::new(0)).is_some());
        assert!(sketch.remove(ShapeId::new(0)).is_none());
        assert!(sketch.is_empty());
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let mut sketch = Sketch::new();
        sketch.upsert(ShapeId::new(0), rect(0, 0, 100, 100));
        sketch.upsert(ShapeId::new(1), rect(50, 50, 150, 150));
        assert_eq!(sketch.hit_test(75, 75), Some(ShapeId::new(1)));
        assert_eq!(sketch.hit_test(10, 10), Some(ShapeId::new(0)));
        assert_eq!(sketch.hit_test(500, 500), None);
        assert_eq!(
            sketch.shapes_at(75, 75),
            vec![ShapeId::new(1), ShapeId::new(0)]
        );
    }

    #[test]
    fn test_bounds() {
        let mut sketch = Sketch::new();
        assert!(sketch.bounds().is_none());
        sketch.upsert(ShapeId::new(0), rect(0, 0, 10, 10));
        sketch.upsert(ShapeId::new(1), rect(20, 5, 30, 40));
        let bounds = sketch.bounds().unwrap();
        assert!((bounds.x1 - 30.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut sketch = Sketch::new();
        sketch.upsert(ShapeId::new(2), rect(0, 0, 10, 10));
        let json = sketch.to_json().unwrap();
        assert_eq!(Sketch::from_json(&json).unwrap(), sketch);
    }
}
