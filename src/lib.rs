//! # voxel-track
//!
//! voxel-track is an in-memory incremental connectivity tracker for
//! undirected graphs whose vertices are voxel-like cells drawn from one
//! or more coordinate spaces ("grids"). Clients mutate the world one
//! vertex at a time; the tracker keeps connected-component answers
//! current without rescanning anything.
//!
//! ## Features
//! - A generic breadth-first [`mapper`](crate::mapper) with observer
//!   hooks, vertex limits and leftover-frontier reporting
//! - The voxel [`successor`](crate::successor): candidate offsets from
//!   the source's hook, acceptance from the destination's filter
//! - [`VertexSpace`](crate::space::VertexSpace): unbounded maximal
//!   components with incremental merge and split
//! - [`GroupSpace`](crate::space::GroupSpace) plus
//!   [`RopeGraph`](crate::space::RopeGraph): size-bounded components
//!   with a refcounted inter-group multigraph for coarse queries
//! - A [`write-back cache`](crate::cache) so in-flight operations never
//!   observe their own writes
//!
//! ## Concurrency model
//! Single-threaded and cooperative. `Mapper::advance` is the only
//! suspension point; no internal threads, futures or background tasks.
//! Grids are shared reads and must stay logically immutable for the
//! duration of one tracker operation.
//!
//! ## Error handling
//! Public entry points return [`TrackError`](crate::track_error::TrackError).
//! Out-of-bounds lookups are not errors (a dedicated sentinel), missing
//! hooks compose as absence, and partition-inconsistency observations
//! are logged warnings rather than failures.

pub mod bounds;
pub mod cache;
pub mod debug_invariants;
pub mod grid;
pub mod lut;
pub mod mapper;
pub mod perf;
pub mod space;
pub mod successor;
pub mod track_error;
pub mod vertex;

/// A convenient prelude importing the most-used traits and types.
pub mod prelude {
    pub use crate::bounds::{GroupLike, KeyLike, VertexLike};
    pub use crate::cache::WriteBackCache;
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::grid::{
        CellData, FlatGrid, Grid, GridMut, Hop, Lookup, MetaPatch, Offset, Position,
    };
    pub use crate::lut::{
        Candidates, FilterLut, FilterQuery, HandlerLut, HookError, NeighborLut, QueryError,
    };
    pub use crate::mapper::{
        Mapper, MapperHooks, MapperOptions, MapperStats, NoHooks, Remainder,
    };
    pub use crate::perf::{FastMap, FastSet};
    pub use crate::space::{
        GraphId, GroupId, GroupOptions, GroupSpace, NoEvents, RopeGraph, SpaceEvents,
        VertexSpace,
    };
    pub use crate::successor::{
        Filtered, FnSuccessor, Resolution, Successor, VoxelSuccessor,
    };
    pub use crate::track_error::TrackError;
    pub use crate::vertex::{GridId, Vertex, VertexHasher, VertexKey};
}
