//! TrackError: unified error type for voxel-track public APIs
//!
//! Every fallible public entry point in the crate reports failures through
//! this enum. Recoverable conditions (missing hooks, out-of-bounds lookups,
//! partition repair warnings) never appear here; they are swallowed locally
//! and logged. What remains are caller preconditions and internal
//! inconsistencies that must abort the enclosing operation.

use thiserror::Error;

use crate::grid::Position;

/// Unified error type for voxel-track operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrackError {
    /// Attempted to construct a `GridId` with a zero value (invalid).
    #[error("GridId must be non-zero (0 is reserved as invalid/sentinel)")]
    InvalidGridId,
    /// Attempted to construct a `GraphId` or `GroupId` with a zero value.
    #[error("component id must be non-zero (0 is reserved as invalid/sentinel)")]
    InvalidComponentId,
    /// A world-facing coordinate was not integer-aligned.
    #[error("coordinate component {axis} = {value} is not integer-aligned")]
    NonIntegerCoordinate {
        /// Axis label (`x`, `y` or `z`).
        axis: char,
        /// The offending component value.
        value: f64,
    },
    /// A handler was already registered for this key in this table.
    #[error("{lut}: handler for key `{key}` already registered")]
    DuplicateHandler {
        /// Display label of the handler table.
        lut: &'static str,
        /// The key whose registration was rejected.
        key: String,
    },
    /// Two candidate offsets of one successor call resolved to the same
    /// destination vertex. The neighbour-set table violated its uniqueness
    /// precondition.
    #[error("successor set for {source_vertex} contains duplicate destination {duplicate}")]
    DuplicateSuccessor {
        /// Source vertex of the successor call.
        source_vertex: String,
        /// The destination key that appeared twice.
        duplicate: String,
    },
    /// A write targeted a position outside the grid's supported region.
    #[error("write to out-of-bounds position {0}")]
    WriteOutOfBounds(Position),
    /// A group-size limit of zero was requested.
    #[error("group limit must be at least 1")]
    ZeroGroupLimit,
    /// An edge record pointed at a rope that does not exist.
    #[error("rope graph invariant broken: edge {0} bound to a missing rope")]
    DanglingRopeEdge(u64),
    /// A rope's edge count disagreed with the edge records bound to it.
    #[error("rope graph invariant broken: rope count {count} != bound edges {bound}")]
    RopeCountMismatch {
        /// Count reported by the rope itself.
        count: usize,
        /// Number of edge records bound to the rope.
        bound: usize,
    },
    /// The coarse adjacency table disagreed with the rope table.
    #[error("rope graph invariant broken: groupmap and rope table disagree")]
    GroupAdjacencyMismatch,
    /// A vertex was mapped to a component that does not contain it (or the
    /// reverse).
    #[error("partition invariant broken: {0}")]
    PartitionInconsistent(String),
    /// A group exceeded the configured size limit.
    #[error("group {group} holds {size} vertices, limit is {limit}")]
    GroupOverLimit {
        /// Offending group id (raw).
        group: u64,
        /// Observed member count.
        size: usize,
        /// Configured limit.
        limit: usize,
    },
}
