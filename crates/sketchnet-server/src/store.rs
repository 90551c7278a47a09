//! Canonical store: the authoritative sketch and id allocation.

use sketchnet_core::{Shape, ShapeId, Sketch};

/// Identity chosen for an applied edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub id: ShapeId,
    /// Whether `id` was freshly allocated (the line must be rewritten).
    pub allocated: bool,
}

/// Server-side ground truth.
///
/// Not synchronized itself; callers hold it behind a single lock so that
/// allocation, mutation and snapshots never interleave.
#[derive(Debug, Default)]
pub struct CanonicalStore {
    sketch: Sketch,
    next_id: u64,
}

impl CanonicalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a shape.
    ///
    /// A claimed id that is currently present is overwritten in place. Any
    /// other claim, including the unassigned sentinel (`None`), a deleted id
    /// or one never issued, gets the next fresh id.
    pub fn apply_edit(&mut self, shape: Shape, claimed: Option<ShapeId>) -> Assignment {
        if let Some(id) = claimed.filter(|id| self.sketch.contains_id(*id)) {
            self.sketch.upsert(id, shape);
            return Assignment {
                id,
                allocated: false,
            };
        }

        let id = self.allocate();
        self.sketch.upsert(id, shape);
        Assignment {
            id,
            allocated: true,
        }
    }

    /// Remove a shape. Returns whether it was present; absent ids are a no-op.
    pub fn apply_delete(&mut self, id: ShapeId) -> bool {
        self.sketch.remove(id).is_some()
    }

    /// Full state in ascending id order.
    pub fn snapshot(&self) -> Vec<(ShapeId, Shape)> {
        self.sketch
            .iter()
            .map(|(id, shape)| (id, shape.clone()))
            .collect()
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.sketch.get(id)
    }

    /// The id the next new shape will receive.
    pub fn next_id(&self) -> ShapeId {
        ShapeId::new(self.next_id)
    }

    pub fn len(&self) -> usize {
        self.sketch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sketch.is_empty()
    }

    fn allocate(&mut self) -> ShapeId {
        let id = ShapeId::new(self.next_id);
        self.next_id += 1;
        id
    }
}
