//! Successor computation: from one vertex to its connected neighbours.
//!
//! The generic [`Successor`] trait is what the trackers and the flood
//! mapper consume. [`VoxelSuccessor`] is the voxel adapter: it composes
//! a grid, the neighbour-set table and the inbound-filter table into the
//! successor relation, in two phases:
//!
//! 1. **Candidate phase** — the source cell's hook enumerates tagged
//!    outbound offsets without looking at any destination.
//! 2. **Filter phase** — each candidate is resolved through the grid and
//!    the destination's inbound predicate decides acceptance.
//!
//! The split lets the source side and the destination side be registered
//! by parties that never see each other. Every candidate ends in exactly
//! one [`Resolution`] variant; overloaded nil-returns do not exist here.

use std::marker::PhantomData;

use crate::bounds::{KeyLike, VertexLike};
use crate::grid::Lookup;
use crate::lut::{FilterLut, FilterQuery, NeighborLut, QueryError};
use crate::perf::FastMap;
use crate::track_error::TrackError;
use crate::vertex::{Vertex, VertexHasher, VertexKey};

/// The successor relation: current neighbours of a vertex, keyed by hash.
///
/// Implementations must behave as a pure function of the graph state at
/// the moment of the call; trackers assume this while a flood is in
/// flight.
pub trait Successor {
    /// Vertex payload flowing through floods.
    type Vertex: VertexLike;
    /// Hash token naming a vertex.
    type Key: KeyLike;

    /// Neighbours of `vertex` under the tracked connectivity relation.
    fn successors(
        &mut self,
        vertex: &Self::Vertex,
        key: Self::Key,
    ) -> Result<FastMap<Self::Key, Self::Vertex>, TrackError>;
}

/// Closure adapter for [`Successor`], mostly for tests and benches.
pub struct FnSuccessor<V, K, F> {
    f: F,
    _marker: PhantomData<fn(K) -> V>,
}

impl<V, K, F> FnSuccessor<V, K, F>
where
    V: VertexLike,
    K: KeyLike,
    F: FnMut(&V, K) -> Result<FastMap<K, V>, TrackError>,
{
    /// Wrap a closure as a successor.
    pub fn new(f: F) -> Self {
        FnSuccessor {
            f,
            _marker: PhantomData,
        }
    }
}

impl<V, K, F> Successor for FnSuccessor<V, K, F>
where
    V: VertexLike,
    K: KeyLike,
    F: FnMut(&V, K) -> Result<FastMap<K, V>, TrackError>,
{
    type Vertex = V;
    type Key = K;

    fn successors(&mut self, vertex: &V, key: K) -> Result<FastMap<K, V>, TrackError> {
        (self.f)(vertex, key)
    }
}

/// Successor adapter that drops successors failing a predicate.
///
/// Trackers wrap their lower successor with this during repair floods
/// so out-of-scope vertices never reach the frontier (keeping bounded
/// floods' leftover-frontier diagnostics meaningful).
pub struct Filtered<'a, S, F> {
    inner: &'a mut S,
    keep: F,
}

impl<'a, S, F> Filtered<'a, S, F>
where
    S: Successor,
    F: FnMut(&S::Vertex, S::Key) -> bool,
{
    /// Wrap `inner`, keeping only successors `keep` accepts.
    pub fn new(inner: &'a mut S, keep: F) -> Self {
        Filtered { inner, keep }
    }
}

impl<S, F> Successor for Filtered<'_, S, F>
where
    S: Successor,
    F: FnMut(&S::Vertex, S::Key) -> bool,
{
    type Vertex = S::Vertex;
    type Key = S::Key;

    fn successors(
        &mut self,
        vertex: &S::Vertex,
        key: S::Key,
    ) -> Result<FastMap<S::Key, S::Vertex>, TrackError> {
        let mut out = self.inner.successors(vertex, key)?;
        out.retain(|k, v| (self.keep)(v, *k));
        Ok(out)
    }
}

/// Outcome of resolving one candidate offset.
#[derive(Clone, Debug)]
pub enum Resolution {
    /// The destination accepted; this is a successor.
    Accepted(Vertex),
    /// The destination (or its missing filter) declined.
    Rejected,
    /// The step or the destination cell fell outside its grid.
    OutOfBounds,
    /// The destination's filter hook misbehaved. Logged, then treated
    /// like a rejection.
    FilterError,
}

impl Resolution {
    /// The accepted vertex, if any.
    pub fn accepted(self) -> Option<Vertex> {
        match self {
            Resolution::Accepted(v) => Some(v),
            _ => None,
        }
    }
}

/// The voxel successor: neighbour-set table + inbound-filter table +
/// hasher, over whatever grids the vertices carry.
#[derive(Debug, Default)]
pub struct VoxelSuccessor {
    neighbors: NeighborLut,
    filters: FilterLut,
    hasher: VertexHasher,
}

impl VoxelSuccessor {
    /// Successor with empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Successor over pre-built tables.
    pub fn with_tables(neighbors: NeighborLut, filters: FilterLut) -> Self {
        VoxelSuccessor {
            neighbors,
            filters,
            hasher: VertexHasher::new(),
        }
    }

    /// Neighbour-set table, for registration.
    pub fn neighbors_mut(&mut self) -> &mut NeighborLut {
        &mut self.neighbors
    }

    /// Inbound-filter table, for registration.
    pub fn filters_mut(&mut self) -> &mut FilterLut {
        &mut self.filters
    }

    /// The hasher, for computing seed keys. Holds every grid seen.
    pub fn hasher_mut(&mut self) -> &mut VertexHasher {
        &mut self.hasher
    }

    /// Resolve every candidate of `vertex` to its tagged outcome.
    ///
    /// An out-of-bounds source or an unregistered/failing candidate hook
    /// yields an empty list.
    pub fn resolve_candidates(&mut self, vertex: &Vertex) -> Vec<(String, Resolution)> {
        let Lookup::Hit(src_cell) = vertex.grid.get(vertex.pos) else {
            return Vec::new();
        };
        let candidates = match self.neighbors.query(&src_cell) {
            Ok(c) => c,
            Err(QueryError::NoData) => return Vec::new(),
            Err(QueryError::HookFail(reason)) => {
                log::warn!(
                    "candidate hook for `{}` at {:?} failed: {reason}",
                    src_cell.name,
                    vertex
                );
                return Vec::new();
            }
        };
        candidates
            .into_iter()
            .map(|(extra, offset)| {
                let outcome = self.resolve_one(vertex, &src_cell, &extra, offset);
                (extra, outcome)
            })
            .collect()
    }

    fn resolve_one(
        &mut self,
        vertex: &Vertex,
        src_cell: &crate::grid::CellData,
        extra: &str,
        offset: crate::grid::Offset,
    ) -> Resolution {
        let Lookup::Hit(hop) = vertex.grid.neighbour(vertex.pos, offset) else {
            return Resolution::OutOfBounds;
        };
        let dest_grid = hop.grid.unwrap_or_else(|| vertex.grid.clone());
        let Lookup::Hit(dest_cell) = dest_grid.get(hop.pos) else {
            return Resolution::OutOfBounds;
        };
        let question = FilterQuery {
            src: src_cell.clone(),
            dest: dest_cell,
            extradata: extra.to_owned(),
            direction: hop.dir,
        };
        match self.filters.query(&question) {
            Ok(true) => Resolution::Accepted(Vertex::new(dest_grid, hop.pos)),
            Ok(false) => Resolution::Rejected,
            // No filter registered means the destination never opted in.
            Err(QueryError::NoData) => Resolution::Rejected,
            Err(QueryError::HookFail(reason)) => {
                log::warn!(
                    "inbound filter for `{}` at {} failed: {reason}",
                    question.dest.name,
                    hop.pos
                );
                Resolution::FilterError
            }
        }
    }

    fn successor_set(
        &mut self,
        vertex: &Vertex,
    ) -> Result<FastMap<VertexKey, Vertex>, TrackError> {
        let mut out = FastMap::default();
        for (_, outcome) in self.resolve_candidates(vertex) {
            let Some(dest) = outcome.accepted() else {
                continue;
            };
            let key = self.hasher.key(&dest);
            if out.insert(key, dest).is_some() {
                return Err(TrackError::DuplicateSuccessor {
                    source_vertex: format!("{vertex:?}"),
                    duplicate: key.to_string(),
                });
            }
        }
        Ok(out)
    }
}

impl Successor for VoxelSuccessor {
    type Vertex = Vertex;
    type Key = VertexKey;

    fn successors(
        &mut self,
        vertex: &Vertex,
        _key: VertexKey,
    ) -> Result<FastMap<VertexKey, Vertex>, TrackError> {
        self.successor_set(vertex)
    }
}
