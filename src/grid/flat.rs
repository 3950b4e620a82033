//! `FlatGrid`: a flat-array in-memory grid.
//!
//! Backs the test suites and benches; also a reasonable starting point
//! for bindings that mirror a finite box of a world. Cells are stored
//! densely, metadata sparsely. `neighbour` never crosses grids and
//! reports the raw offset as the inbound direction.

use crate::grid::cell::{CellData, MetaPatch};
use crate::grid::position::{Offset, Position};
use crate::grid::{Grid, GridMut, Hop, Lookup};
use crate::perf::FastMap;
use crate::track_error::TrackError;
use crate::vertex::GridId;

/// Dense box-shaped grid with a fixed fill cell.
pub struct FlatGrid {
    id: GridId,
    min: Position,
    dims: [usize; 3],
    cells: Vec<CellData>,
    metas: FastMap<Position, MetaPatch>,
}

impl FlatGrid {
    /// Box of `dims` cells with its lowest corner at `min`, filled with
    /// copies of `fill`.
    pub fn new(min: Position, dims: [usize; 3], fill: CellData) -> Self {
        let volume = dims[0] * dims[1] * dims[2];
        FlatGrid {
            id: GridId::fresh(),
            min,
            dims,
            cells: vec![fill; volume],
            metas: FastMap::default(),
        }
    }

    fn index(&self, pos: Position) -> Option<usize> {
        let mut idx = 0usize;
        // Row-major, x fastest.
        for axis in (0..3).rev() {
            let rel = pos[axis] - self.min[axis];
            if rel < 0 || rel as usize >= self.dims[axis] {
                return None;
            }
            idx = idx * self.dims[axis] + rel as usize;
        }
        Some(idx)
    }

    /// Stored metadata at `pos`, if any.
    pub fn meta(&self, pos: Position) -> Option<&MetaPatch> {
        self.metas.get(&pos)
    }

    /// Fill a run of positions with copies of `cell`. Out-of-bounds
    /// positions error; nothing is written past the first failure.
    pub fn fill<I: IntoIterator<Item = Position>>(
        &mut self,
        positions: I,
        cell: &CellData,
    ) -> Result<(), TrackError> {
        for pos in positions {
            self.set(pos, cell.clone())?;
        }
        Ok(())
    }
}

impl Grid for FlatGrid {
    fn id(&self) -> GridId {
        self.id
    }

    fn get(&self, pos: Position) -> Lookup<CellData> {
        match self.index(pos) {
            Some(i) => Lookup::Hit(self.cells[i].clone()),
            None => Lookup::OutOfBounds,
        }
    }

    fn neighbour(&self, pos: Position, offset: Offset) -> Lookup<Hop> {
        let dest = pos + offset;
        if self.index(dest).is_none() {
            return Lookup::OutOfBounds;
        }
        Lookup::Hit(Hop {
            grid: None,
            pos: dest,
            dir: offset,
        })
    }
}

impl GridMut for FlatGrid {
    fn set(&mut self, pos: Position, cell: CellData) -> Result<(), TrackError> {
        match self.index(pos) {
            Some(i) => {
                self.cells[i] = cell;
                Ok(())
            }
            None => Err(TrackError::WriteOutOfBounds(pos)),
        }
    }

    fn set_meta(&mut self, pos: Position, meta: MetaPatch) -> Result<(), TrackError> {
        if self.index(pos).is_none() {
            return Err(TrackError::WriteOutOfBounds(pos));
        }
        self.metas.entry(pos).or_default().merge(meta);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> FlatGrid {
        FlatGrid::new(Position::new(-1, -1, 0), [3, 3, 1], CellData::named("air"))
    }

    #[test]
    fn get_inside_and_outside() {
        let g = grid();
        assert!(g.get(Position::new(0, 0, 0)).is_hit());
        assert!(g.get(Position::new(-1, -1, 0)).is_hit());
        assert!(g.get(Position::new(1, 1, 0)).is_hit());
        assert_eq!(g.get(Position::new(2, 0, 0)), Lookup::OutOfBounds);
        assert_eq!(g.get(Position::new(0, 0, 1)), Lookup::OutOfBounds);
    }

    #[test]
    fn neighbour_stays_in_grid_and_keeps_direction() {
        let g = grid();
        let hop = g
            .neighbour(Position::new(0, 0, 0), Offset::new(1, 0, 0))
            .hit()
            .unwrap();
        assert!(hop.grid.is_none());
        assert_eq!(hop.pos, Position::new(1, 0, 0));
        assert_eq!(hop.dir, Offset::new(1, 0, 0));
        assert!(matches!(
            g.neighbour(Position::new(1, 0, 0), Offset::new(1, 0, 0)),
            Lookup::OutOfBounds
        ));
    }

    #[test]
    fn set_and_fill_write_through() {
        let mut g = grid();
        let stone = CellData::named("stone");
        g.set(Position::new(0, 0, 0), stone.clone()).unwrap();
        g.fill(
            [Position::new(1, 0, 0), Position::new(-1, 0, 0)],
            &stone,
        )
        .unwrap();
        for x in -1..=1 {
            assert_eq!(g.get(Position::new(x, 0, 0)), Lookup::Hit(stone.clone()));
        }
        assert!(g.set(Position::new(5, 5, 5), stone).is_err());
    }

    #[test]
    fn meta_merges_per_position() {
        let mut g = grid();
        let p = Position::new(0, 1, 0);
        g.set_meta(p, MetaPatch::entry("a", "1")).unwrap();
        g.set_meta(p, MetaPatch::entry("b", "2")).unwrap();
        let meta = g.meta(p).unwrap();
        assert_eq!(meta.0.len(), 2);
    }
}
