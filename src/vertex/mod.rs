//! Vertex identity: grids, positions and the hash tokens that name them.
//!
//! A vertex is a `(grid, position)` pair. Trackers never compare vertices
//! structurally; they compare [`VertexKey`]s, the equality-comparable
//! token derived from the grid's identity and the position. Within one
//! hasher's lifetime, key equality is vertex equality — the hasher pins
//! every grid it has seen so identity tokens cannot be reused by a later
//! grid (see [`VertexHasher`]).

pub mod hasher;

use std::fmt;
use std::num::NonZeroU64;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

pub use hasher::VertexHasher;

use crate::grid::{Grid, Position};
use crate::track_error::TrackError;

/// Stable identity token of a grid.
///
/// Wraps a nonzero `u64`; 0 is reserved as an invalid/sentinel value.
/// `repr(transparent)` keeps the same ABI and alignment as `u64`.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct GridId(NonZeroU64);

static NEXT_GRID_ID: AtomicU64 = AtomicU64::new(1);

impl GridId {
    /// Creates a `GridId` from a raw `u64` value.
    ///
    /// Returns an error if `raw == 0`.
    #[inline]
    pub fn new(raw: u64) -> Result<Self, TrackError> {
        NonZeroU64::new(raw)
            .map(GridId)
            .ok_or(TrackError::InvalidGridId)
    }

    /// Allocates a process-unique id. Ids are never reused within one
    /// process, which keeps [`VertexKey`]s unambiguous even across grid
    /// teardown.
    pub fn fresh() -> Self {
        let raw = NEXT_GRID_ID.fetch_add(1, Ordering::Relaxed);
        // The counter starts at 1 and only increments.
        GridId(NonZeroU64::new(raw).expect("grid id counter wrapped"))
    }

    /// Returns the underlying `u64` value.
    #[inline]
    pub fn get(&self) -> u64 {
        self.0.get()
    }
}

impl TryFrom<u64> for GridId {
    type Error = TrackError;
    #[inline]
    fn try_from(raw: u64) -> Result<Self, TrackError> {
        GridId::new(raw)
    }
}

impl fmt::Debug for GridId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GridId").field(&self.get()).finish()
    }
}

impl fmt::Display for GridId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Equality-comparable token naming one vertex.
///
/// Two vertices are equal iff their keys are equal. Keys are `Copy` and
/// order deterministically (grid id major, then position), which the
/// partition tables rely on for reproducible diagnostics.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct VertexKey {
    /// Identity token of the owning grid.
    pub grid: GridId,
    /// Cell coordinate within that grid.
    pub pos: Position,
}

impl fmt::Debug for VertexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.grid, self.pos)
    }
}

impl fmt::Display for VertexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.grid, self.pos)
    }
}

/// One trackable cell: a grid handle plus a position.
///
/// Cloning is cheap (an `Arc` bump); vertices flow through floods by
/// value.
#[derive(Clone)]
pub struct Vertex {
    /// The grid this vertex lives in.
    pub grid: Arc<dyn Grid>,
    /// Cell coordinate within `grid`.
    pub pos: Position,
}

impl Vertex {
    /// Construct a vertex.
    pub fn new(grid: Arc<dyn Grid>, pos: Position) -> Self {
        Vertex { grid, pos }
    }
}

impl fmt::Debug for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.grid.id(), self.pos)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_zero_returns_error() {
        assert!(GridId::new(0).is_err());
    }

    #[test]
    fn fresh_ids_are_distinct() {
        let a = GridId::fresh();
        let b = GridId::fresh();
        assert_ne!(a, b);
    }

    #[test]
    fn key_equality_is_grid_and_position() {
        let g = GridId::new(7).unwrap();
        let h = GridId::new(8).unwrap();
        let p = Position::new(1, 2, 3);
        let a = VertexKey { grid: g, pos: p };
        let b = VertexKey { grid: g, pos: p };
        let c = VertexKey { grid: h, pos: p };
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn key_ordering_is_grid_major() {
        let a = VertexKey {
            grid: GridId::new(1).unwrap(),
            pos: Position::new(9, 9, 9),
        };
        let b = VertexKey {
            grid: GridId::new(2).unwrap(),
            pos: Position::new(0, 0, 0),
        };
        assert!(a < b);
    }

    #[test]
    fn display_and_debug() {
        let k = VertexKey {
            grid: GridId::new(3).unwrap(),
            pos: Position::new(1, 0, -2),
        };
        assert_eq!(format!("{k}"), "3@(1,0,-2)");
        assert_eq!(format!("{k:?}"), "3@(1,0,-2)");
    }

    #[test]
    fn bincode_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
        let k = VertexKey {
            grid: GridId::new(456).unwrap(),
            pos: Position::new(-1, 2, -3),
        };
        let bytes = bincode::serialize(&k)?;
        let k2: VertexKey = bincode::deserialize(&bytes)?;
        assert_eq!(k2, k);
        Ok(())
    }
}
