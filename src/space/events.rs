//! Partition-change events.
//!
//! A space reports every partition mutation through one polymorphic
//! collaborator. All methods default to no-ops, so an observer only
//! implements what it cares about and a missing hook is
//! indistinguishable from an explicit no-op. `enter`/`exit` bracket
//! every public operation; clients typically open a write-back cache in
//! `enter` and flush it in `exit` so in-flight floods never observe
//! their own writes.

use crate::perf::FastMap;
use crate::space::GraphId;

/// Observer of one vertex-space's partition changes.
pub trait SpaceEvents<V, K> {
    /// A public operation begins.
    fn enter(&mut self) {}

    /// The operation ends; deferred writes may flush now.
    fn exit(&mut self) {}

    /// A fresh, still-empty graph was allocated.
    fn graph_new(&mut self, _id: GraphId) {}

    /// One vertex was appended to an existing graph (the O(1) path).
    fn graph_append(&mut self, _id: GraphId, _vertex: &V, _key: K) {}

    /// A graph is about to be dissolved.
    fn graph_delete_pre(&mut self, _id: GraphId) {}

    /// The graph is gone; its members are unmapped.
    fn graph_delete_post(&mut self, _id: GraphId) {}

    /// A graph received its full member set in one batch.
    fn graph_assign(&mut self, _id: GraphId, _members: &FastMap<K, V>) {}

    /// One vertex left a graph that keeps existing.
    fn graph_remove_single(&mut self, _id: GraphId, _key: K) {}
}

/// The unit observer: ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoEvents;

impl<V, K> SpaceEvents<V, K> for NoEvents {}
