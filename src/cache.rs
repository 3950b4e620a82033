//! Write-back cache: isolating one tracker operation from its own writes.
//!
//! Between a space's `enter` and `exit`, callbacks may want to rewrite
//! cells and attach metadata, but the in-flight floods assume the grid
//! is a pure function of the pre-operation world. The cache interposes
//! two levels between callbacks and the real grid:
//!
//! - **Read level**: the first read of a position pins its
//!   pre-operation value; later reads return the pinned value even
//!   after a write to the same position.
//! - **Write level**: writes accumulate and land on the grid exactly
//!   once, at [`WriteBackCache::flush`]. Metadata patches flush after
//!   all node writes, so at any position the node write completes
//!   before its metadata.
//!
//! Both levels key by [`Position`] value, so distinct objects naming
//! the same cell coalesce.

use crate::grid::{CellData, Grid, GridMut, Lookup, MetaPatch, Position};
use crate::perf::FastMap;
use crate::track_error::TrackError;

/// Two-level cache over one mutable grid.
pub struct WriteBackCache<'g, G: GridMut> {
    grid: &'g mut G,
    reads: FastMap<Position, Lookup<CellData>>,
    writes: FastMap<Position, CellData>,
    metas: FastMap<Position, MetaPatch>,
}

impl<'g, G: GridMut> WriteBackCache<'g, G> {
    /// Open a cache over `grid`. The grid must not be mutated behind
    /// the cache's back until [`WriteBackCache::flush`].
    pub fn new(grid: &'g mut G) -> Self {
        WriteBackCache {
            grid,
            reads: FastMap::default(),
            writes: FastMap::default(),
            metas: FastMap::default(),
        }
    }

    /// Pre-operation cell at `pos`. Uncached reads fall through to the
    /// grid and pin what they find (out-of-bounds included).
    pub fn get(&mut self, pos: Position) -> Lookup<CellData> {
        if let Some(pinned) = self.reads.get(&pos) {
            return pinned.clone();
        }
        let fresh = self.grid.get(pos);
        self.reads.insert(pos, fresh.clone());
        fresh
    }

    /// Queue a cell write at `pos`. Later writes to the same position
    /// win; nothing reaches the grid before flush.
    pub fn set(&mut self, pos: Position, cell: CellData) {
        self.writes.insert(pos, cell);
    }

    /// Queue a metadata patch at `pos`. Patches to the same position
    /// merge key-wise.
    pub fn set_meta(&mut self, pos: Position, meta: MetaPatch) {
        self.metas.entry(pos).or_default().merge(meta);
    }

    /// Number of distinct positions with a queued cell write.
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    /// Number of distinct positions with a queued metadata patch.
    pub fn pending_metas(&self) -> usize {
        self.metas.len()
    }

    /// Apply all queued writes: cells first, then metadata. Consumes
    /// the cache; the first failing write aborts the flush.
    pub fn flush(self) -> Result<(), TrackError> {
        let WriteBackCache {
            grid,
            writes,
            metas,
            ..
        } = self;
        for (pos, cell) in writes {
            grid.set(pos, cell)?;
        }
        for (pos, patch) in metas {
            grid.set_meta(pos, patch)?;
        }
        Ok(())
    }

    /// Drop all queued writes without touching the grid.
    pub fn discard(self) {}
}

impl<G: GridMut> std::fmt::Debug for WriteBackCache<'_, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteBackCache")
            .field("reads", &self.reads.len())
            .field("writes", &self.writes.len())
            .field("metas", &self.metas.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::FlatGrid;

    fn grid() -> FlatGrid {
        FlatGrid::new(Position::new(0, 0, 0), [3, 3, 1], CellData::named("air"))
    }

    #[test]
    fn reads_pin_the_pre_operation_world() {
        let mut g = grid();
        let p = Position::new(1, 1, 0);
        let mut cache = WriteBackCache::new(&mut g);
        assert_eq!(cache.get(p), Lookup::Hit(CellData::named("air")));
        cache.set(p, CellData::named("stone"));
        // The write is queued; reads still see the old cell.
        assert_eq!(cache.get(p), Lookup::Hit(CellData::named("air")));
        cache.flush().unwrap();
        assert_eq!(g.get(p), Lookup::Hit(CellData::named("stone")));
    }

    #[test]
    fn unread_positions_flush_too() {
        let mut g = grid();
        let p = Position::new(0, 2, 0);
        let mut cache = WriteBackCache::new(&mut g);
        cache.set(p, CellData::named("cobble"));
        assert_eq!(cache.pending_writes(), 1);
        cache.flush().unwrap();
        assert_eq!(g.get(p), Lookup::Hit(CellData::named("cobble")));
    }

    #[test]
    fn last_write_wins_and_metas_merge() {
        let mut g = grid();
        let p = Position::new(2, 0, 0);
        let mut cache = WriteBackCache::new(&mut g);
        cache.set(p, CellData::named("stone"));
        cache.set(p, CellData::named("cobble"));
        cache.set_meta(p, MetaPatch::entry("a", "1"));
        cache.set_meta(p, MetaPatch::entry("b", "2"));
        assert_eq!(cache.pending_writes(), 1);
        assert_eq!(cache.pending_metas(), 1);
        cache.flush().unwrap();
        assert_eq!(g.get(p), Lookup::Hit(CellData::named("cobble")));
        assert_eq!(g.meta(p).unwrap().0.len(), 2);
    }

    #[test]
    fn discard_leaves_grid_untouched() {
        let mut g = grid();
        let p = Position::new(1, 0, 0);
        let mut cache = WriteBackCache::new(&mut g);
        cache.set(p, CellData::named("stone"));
        cache.discard();
        assert_eq!(g.get(p), Lookup::Hit(CellData::named("air")));
    }

    #[test]
    fn out_of_bounds_reads_are_pinned_not_errors() {
        let mut g = grid();
        let mut cache = WriteBackCache::new(&mut g);
        assert_eq!(cache.get(Position::new(9, 9, 9)), Lookup::OutOfBounds);
        assert_eq!(cache.get(Position::new(9, 9, 9)), Lookup::OutOfBounds);
    }

    #[test]
    fn out_of_bounds_write_aborts_flush() {
        let mut g = grid();
        let mut cache = WriteBackCache::new(&mut g);
        cache.set(Position::new(9, 9, 9), CellData::named("stone"));
        assert!(cache.flush().is_err());
    }
}
