//! Grid abstraction: coordinate spaces the tracker can observe.
//!
//! A grid supports two queries: cell lookup at a position and neighbour
//! resolution of a position plus an offset. Neighbour resolution may land
//! in a *different* grid (portals) and may report an inbound direction
//! that differs from the raw offset (rotation); both are expressed by
//! [`Hop`]. Positions outside a grid's supported region yield the
//! dedicated [`Lookup::OutOfBounds`] sentinel, which is not an error:
//! traversals silently skip such cells.
//!
//! Grids must be logically immutable for the duration of one tracker
//! operation; the write-back cache in [`crate::cache`] withholds writes
//! until the operation's `exit`.

pub mod cell;
pub mod flat;
pub mod position;

use std::sync::Arc;

pub use cell::{CellData, MetaPatch};
pub use flat::FlatGrid;
pub use position::{Offset, Position};

use crate::track_error::TrackError;
use crate::vertex::GridId;

/// Result of a grid query: a value, or the out-of-bounds sentinel.
///
/// Deliberately not `Option`: out-of-bounds is a distinct, sticky
/// condition ("this coordinate is outside the region"), not "no data".
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The grid resolved the query.
    Hit(T),
    /// The coordinate falls outside the grid's supported region.
    OutOfBounds,
}

impl<T> Lookup<T> {
    /// `Some` on a hit, `None` when out of bounds.
    #[inline]
    pub fn hit(self) -> Option<T> {
        match self {
            Lookup::Hit(v) => Some(v),
            Lookup::OutOfBounds => None,
        }
    }

    /// True when the query resolved.
    #[inline]
    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit(_))
    }
}

/// A resolved neighbour: where the step landed and from which direction
/// it arrives there.
#[derive(Clone)]
pub struct Hop {
    /// Destination grid when the step crossed into another grid;
    /// `None` means the step stayed in the source grid.
    pub grid: Option<Arc<dyn Grid>>,
    /// Destination position, in the destination grid's coordinates.
    pub pos: Position,
    /// Effective inbound direction at the destination. Equals the raw
    /// offset for plain grids; a portal or rotation may change it.
    pub dir: Offset,
}

impl std::fmt::Debug for Hop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hop")
            .field("grid", &self.grid.as_ref().map(|g| g.id()))
            .field("pos", &self.pos)
            .field("dir", &self.dir)
            .finish()
    }
}

/// Read access to one coordinate space.
///
/// Implementations must keep `id()` stable for the grid's lifetime and
/// must answer repeated identical queries identically within one tracker
/// operation.
pub trait Grid {
    /// Stable identity token of this grid.
    fn id(&self) -> GridId;

    /// Cell payload at `pos`, or out-of-bounds.
    fn get(&self, pos: Position) -> Lookup<CellData>;

    /// Resolve `pos + offset`, possibly crossing into another grid.
    fn neighbour(&self, pos: Position, offset: Offset) -> Lookup<Hop>;
}

/// Write access, used only by the write-back cache's flush path.
pub trait GridMut: Grid {
    /// Replace the cell at `pos`.
    fn set(&mut self, pos: Position, cell: CellData) -> Result<(), TrackError>;

    /// Merge a metadata patch at `pos`. Flush ordering guarantees the
    /// node write at `pos` has already landed.
    fn set_meta(&mut self, pos: Position, meta: MetaPatch) -> Result<(), TrackError>;
}
