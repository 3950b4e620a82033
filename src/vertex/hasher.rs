//! `VertexHasher`: key derivation with grid identity pinning.
//!
//! Keys are only meaningful while the grid that minted their identity
//! token is alive; if a grid were dropped and its token reused, two
//! different cells could collide under one key. The hasher therefore
//! exclusively owns a registry of every grid it has hashed, holding them
//! live for its entire lifetime. Weak references would not do: aliasing
//! here is correctness-critical, not an optimisation.

use std::sync::Arc;

use crate::grid::{Grid, Position};
use crate::perf::FastMap;
use crate::vertex::{GridId, Vertex, VertexKey};

/// Derives [`VertexKey`]s and pins the grids behind them.
#[derive(Default)]
pub struct VertexHasher {
    seen: FastMap<GridId, Arc<dyn Grid>>,
}

impl VertexHasher {
    /// Empty hasher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Key of `vertex`, registering its grid on first sight.
    pub fn key(&mut self, vertex: &Vertex) -> VertexKey {
        let id = vertex.grid.id();
        self.seen.entry(id).or_insert_with(|| vertex.grid.clone());
        VertexKey {
            grid: id,
            pos: vertex.pos,
        }
    }

    /// Key of a raw `(grid, position)` pair.
    pub fn key_at(&mut self, grid: &Arc<dyn Grid>, pos: Position) -> VertexKey {
        let id = grid.id();
        self.seen.entry(id).or_insert_with(|| grid.clone());
        VertexKey { grid: id, pos }
    }

    /// Pinned grid behind `id`, if this hasher has seen it.
    pub fn grid(&self, id: GridId) -> Option<&Arc<dyn Grid>> {
        self.seen.get(&id)
    }

    /// Number of distinct grids pinned.
    pub fn grids_seen(&self) -> usize {
        self.seen.len()
    }
}

impl std::fmt::Debug for VertexHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VertexHasher")
            .field("grids_seen", &self.seen.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{CellData, FlatGrid};

    fn grid() -> Arc<dyn Grid> {
        Arc::new(FlatGrid::new(
            Position::new(0, 0, 0),
            [4, 4, 1],
            CellData::named("air"),
        ))
    }

    #[test]
    fn same_cell_same_key() {
        let g = grid();
        let mut hasher = VertexHasher::new();
        let a = hasher.key(&Vertex::new(g.clone(), Position::new(1, 2, 0)));
        let b = hasher.key_at(&g, Position::new(1, 2, 0));
        assert_eq!(a, b);
        assert_eq!(hasher.grids_seen(), 1);
    }

    #[test]
    fn hasher_pins_grids() {
        let g = grid();
        let id = g.id();
        let weak = Arc::downgrade(&g);
        let mut hasher = VertexHasher::new();
        hasher.key(&Vertex::new(g, Position::new(0, 0, 0)));
        // The caller's Arc is gone; the hasher's registry keeps it alive.
        assert!(weak.upgrade().is_some());
        assert!(hasher.grid(id).is_some());
        drop(hasher);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn distinct_grids_distinct_keys() {
        let (g, h) = (grid(), grid());
        let mut hasher = VertexHasher::new();
        let a = hasher.key_at(&g, Position::new(0, 0, 0));
        let b = hasher.key_at(&h, Position::new(0, 0, 0));
        assert_ne!(a, b);
        assert_eq!(hasher.grids_seen(), 2);
    }
}
