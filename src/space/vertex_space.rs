//! Unbounded connected-component tracking.
//!
//! A [`VertexSpace`] maintains, at all times, the partition of tracked
//! vertices into maximal connected components under the configured
//! successor relation. Mutations arrive one vertex at a time:
//!
//! - `add_vertex` may merge arbitrarily many existing graphs (plus any
//!   previously untracked region the flood absorbs).
//! - `remove_vertex` may split one graph into several; the caller hands
//!   in the successor set captured *before* the removal, because the
//!   vertex may already be unlinked from the world.
//! - `update` re-derives the component around a vertex whose edges
//!   changed in place.
//!
//! Partition inconsistencies observed along the way (a foreign graph in
//! a removal search, a hash missing from its graph) are warnings, not
//! errors: the operation logs and repairs what it can.

use crate::bounds::{KeyLike, VertexLike};
use crate::debug_invariants::DebugInvariants;
use crate::mapper::{Mapper, MapperHooks, MapperOptions};
use crate::perf::FastMap;
use crate::space::events::{NoEvents, SpaceEvents};
use crate::space::GraphId;
use crate::successor::Successor;
use crate::track_error::TrackError;

/// Unbounded connected-component tracker.
pub struct VertexSpace<S, E = NoEvents>
where
    S: Successor,
{
    successor: S,
    events: E,
    map: FastMap<S::Key, GraphId>,
    graphs: FastMap<GraphId, FastMap<S::Key, S::Vertex>>,
    next_id: GraphId,
}

/// Flood hooks of the merge path: every graph the flood touches is
/// consumed into the target graph.
struct MergeHooks<'a, V, K, E> {
    target: GraphId,
    map: &'a mut FastMap<K, GraphId>,
    graphs: &'a mut FastMap<GraphId, FastMap<K, V>>,
    events: &'a mut E,
}

impl<V, K, E> MapperHooks<V, K> for MergeHooks<'_, V, K, E>
where
    V: VertexLike,
    K: KeyLike,
    E: SpaceEvents<V, K>,
{
    fn visit(&mut self, _vertex: &V, key: K) {
        if let Some(&owner) = self.map.get(&key)
            && owner != self.target
        {
            self.events.graph_delete_pre(owner);
            if let Some(members) = self.graphs.remove(&owner) {
                for k in members.keys() {
                    self.map.remove(k);
                }
            } else {
                log::warn!("graph {owner} mapped but has no member table");
            }
            self.events.graph_delete_post(owner);
        }
        self.map.insert(key, self.target);
    }
}

/// Flood hooks of the removal probe: walk the old graph from one prior
/// successor, crossing off every outstanding successor it reaches.
struct ProbeHooks<'a, V, K> {
    graph: GraphId,
    map: &'a FastMap<K, GraphId>,
    outstanding: &'a mut FastMap<K, V>,
}

impl<V, K> MapperHooks<V, K> for ProbeHooks<'_, V, K>
where
    V: VertexLike,
    K: KeyLike,
{
    fn test_vertex(&mut self, _vertex: &V, key: K) -> bool {
        match self.map.get(&key) {
            Some(&g) if g == self.graph => true,
            Some(&g) => {
                log::warn!(
                    "foreign graph {g} encountered during removal search of graph {}",
                    self.graph
                );
                false
            }
            None => false,
        }
    }

    fn visit(&mut self, _vertex: &V, key: K) {
        self.outstanding.remove(&key);
    }
}

/// Flood hooks of the residual rebuild: collect an unmapped component.
struct ResidualHooks<'a, V, K> {
    map: &'a FastMap<K, GraphId>,
    outstanding: &'a mut FastMap<K, V>,
}

impl<V, K> MapperHooks<V, K> for ResidualHooks<'_, V, K>
where
    V: VertexLike,
    K: KeyLike,
{
    fn test_vertex(&mut self, _vertex: &V, key: K) -> bool {
        if self.map.contains_key(&key) {
            log::debug!("residual flood touched mapped vertex {key:?}, skipping");
            return false;
        }
        true
    }

    fn visit(&mut self, _vertex: &V, key: K) {
        self.outstanding.remove(&key);
    }
}

impl<S> VertexSpace<S, NoEvents>
where
    S: Successor,
{
    /// Space over `successor` with no observer.
    pub fn new(successor: S) -> Self {
        Self::with_events(successor, NoEvents)
    }
}

impl<S, E> VertexSpace<S, E>
where
    S: Successor,
    E: SpaceEvents<S::Vertex, S::Key>,
{
    /// Space over `successor`, reporting partition changes to `events`.
    pub fn with_events(successor: S, events: E) -> Self {
        VertexSpace {
            successor,
            events,
            map: FastMap::default(),
            graphs: FastMap::default(),
            next_id: GraphId::first(),
        }
    }

    /// The successor, for registration or seed-key derivation.
    pub fn successor_mut(&mut self) -> &mut S {
        &mut self.successor
    }

    /// Graph currently holding `key`, if tracked.
    pub fn which_graph(&self, key: S::Key) -> Option<GraphId> {
        self.map.get(&key).copied()
    }

    /// Members of graph `id`.
    pub fn graph_of(
        &self,
        id: GraphId,
    ) -> Option<impl Iterator<Item = (S::Key, &S::Vertex)> + '_> {
        self.graphs.get(&id).map(|m| m.iter().map(|(k, v)| (*k, v)))
    }

    /// Number of vertices in graph `id`.
    pub fn graph_len(&self, id: GraphId) -> Option<usize> {
        self.graphs.get(&id).map(|members| members.len())
    }

    /// Ids of all live graphs.
    pub fn graph_ids(&self) -> impl Iterator<Item = GraphId> + '_ {
        self.graphs.keys().copied()
    }

    /// Number of live graphs.
    pub fn graph_count(&self) -> usize {
        self.graphs.len()
    }

    /// Number of tracked vertices.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True when nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Track `vertex`. Returns `false` when its key is already tracked.
    ///
    /// A newly tracked vertex is flooded outward; every graph and every
    /// untracked region the flood reaches becomes part of one graph.
    /// When all successors already share a single graph the insertion is
    /// O(1) instead.
    pub fn add_vertex(&mut self, vertex: S::Vertex, key: S::Key) -> Result<bool, TrackError> {
        self.events.enter();
        let result = self.add_vertex_inner(vertex, key);
        self.events.exit();
        result
    }

    fn add_vertex_inner(&mut self, vertex: S::Vertex, key: S::Key) -> Result<bool, TrackError> {
        if self.map.contains_key(&key) {
            return Ok(false);
        }
        let successors = self.successor.successors(&vertex, key)?;

        // O(1) path: every successor already lives in one shared graph.
        let mut shared: Option<GraphId> = None;
        let mut uniform = !successors.is_empty();
        for sk in successors.keys() {
            let Some(&g) = self.map.get(sk) else {
                uniform = false;
                break;
            };
            if *shared.get_or_insert(g) != g {
                uniform = false;
                break;
            }
        }
        if uniform && let Some(g) = shared {
            self.events.graph_append(g, &vertex, key);
            self.map.insert(key, g);
            if let Some(members) = self.graphs.get_mut(&g) {
                members.insert(key, vertex);
            } else {
                log::warn!("graph {g} mapped but has no member table");
            }
            return Ok(true);
        }

        // General path: flood from the new vertex, consuming every graph
        // touched along the way.
        let target = self.next_id.bump();
        self.events.graph_new(target);
        let mut mapper = Mapper::new(Some((key, vertex)), MapperOptions::unbounded());
        {
            let mut hooks = MergeHooks {
                target,
                map: &mut self.map,
                graphs: &mut self.graphs,
                events: &mut self.events,
            };
            mapper.run(&mut self.successor, &mut hooks)?;
        }
        let members = mapper.into_visited().unwrap_or_default();
        self.graphs.insert(target, members);
        if let Some(members) = self.graphs.get(&target) {
            self.events.graph_assign(target, members);
        }
        Ok(true)
    }

    /// Stop tracking `key`. `prior` must be the successor set captured
    /// *before* the removal. Returns `false` when `key` was not tracked.
    ///
    /// When the removal disconnects the remaining graph, the graph is
    /// dissolved and one new graph is created per surviving component.
    pub fn remove_vertex(
        &mut self,
        key: S::Key,
        prior: &FastMap<S::Key, S::Vertex>,
    ) -> Result<bool, TrackError> {
        self.events.enter();
        let result = self.remove_vertex_inner(key, prior);
        self.events.exit();
        result
    }

    fn remove_vertex_inner(
        &mut self,
        key: S::Key,
        prior: &FastMap<S::Key, S::Vertex>,
    ) -> Result<bool, TrackError> {
        let Some(old) = self.map.remove(&key) else {
            return Ok(false);
        };
        match self.graphs.get_mut(&old) {
            Some(members) => {
                if members.remove(&key).is_none() {
                    log::warn!("hash {key:?} was mapped to graph {old} but not a member");
                }
                self.events.graph_remove_single(old, key);
                if members.is_empty() {
                    self.events.graph_delete_pre(old);
                    self.graphs.remove(&old);
                    self.events.graph_delete_post(old);
                    return Ok(true);
                }
            }
            None => {
                log::warn!("graph {old} mapped but has no member table");
                return Ok(true);
            }
        }

        // Prior successors still mapped to the old graph must remain
        // mutually connected, or the graph has split.
        let mut outstanding: FastMap<S::Key, S::Vertex> = FastMap::default();
        for (sk, sv) in prior {
            match self.map.get(sk) {
                Some(&g) if g == old => {
                    outstanding.insert(*sk, sv.clone());
                }
                Some(&g) => {
                    log::warn!(
                        "prior successor {sk:?} of removed {key:?} belongs to foreign graph {g}"
                    );
                }
                None => {}
            }
        }
        if outstanding.is_empty() {
            return Ok(true);
        }

        // Probe: flood the old graph from one prior successor.
        let Some((seed_key, seed_vertex)) =
            outstanding.iter().next().map(|(k, v)| (*k, v.clone()))
        else {
            return Ok(true);
        };
        let mut mapper = Mapper::new(Some((seed_key, seed_vertex)), MapperOptions::unbounded());
        {
            let mut hooks = ProbeHooks {
                graph: old,
                map: &self.map,
                outstanding: &mut outstanding,
            };
            mapper.run(&mut self.successor, &mut hooks)?;
        }
        if outstanding.is_empty() {
            // Every prior successor is still reachable: no split.
            return Ok(true);
        }

        // Split: dissolve the old graph and promote the probe's
        // component, then rebuild one graph per leftover component.
        self.events.graph_delete_pre(old);
        if let Some(members) = self.graphs.remove(&old) {
            for k in members.keys() {
                self.map.remove(k);
            }
        }
        self.events.graph_delete_post(old);

        let found = mapper.into_visited().unwrap_or_default();
        self.promote(found);
        self.rebuild_residuals(outstanding)?;
        Ok(true)
    }

    /// Re-derive the component around a tracked vertex whose edges
    /// changed in place. An untracked vertex is simply added.
    pub fn update(&mut self, vertex: S::Vertex, key: S::Key) -> Result<(), TrackError> {
        self.events.enter();
        let result = self.update_inner(vertex, key);
        self.events.exit();
        result
    }

    fn update_inner(&mut self, vertex: S::Vertex, key: S::Key) -> Result<(), TrackError> {
        let Some(&old) = self.map.get(&key) else {
            self.add_vertex_inner(vertex, key)?;
            return Ok(());
        };
        // Former members not reached by the re-flood become leftovers.
        let mut leftovers = self.graphs.get(&old).cloned().unwrap_or_default();

        let target = self.next_id.bump();
        self.events.graph_new(target);
        let mut mapper = Mapper::new(Some((key, vertex)), MapperOptions::unbounded());
        {
            let mut hooks = MergeHooks {
                target,
                map: &mut self.map,
                graphs: &mut self.graphs,
                events: &mut self.events,
            };
            mapper.run(&mut self.successor, &mut hooks)?;
        }
        let members = mapper.into_visited().unwrap_or_default();
        self.graphs.insert(target, members);
        if let Some(members) = self.graphs.get(&target) {
            self.events.graph_assign(target, members);
        }

        leftovers.retain(|k, _| !self.map.contains_key(k));
        self.rebuild_residuals(leftovers)?;
        Ok(())
    }

    /// Allocate a graph holding exactly `members`, mapping each key.
    fn promote(&mut self, members: FastMap<S::Key, S::Vertex>) -> Option<GraphId> {
        if members.is_empty() {
            return None;
        }
        let id = self.next_id.bump();
        self.events.graph_new(id);
        for k in members.keys() {
            self.map.insert(*k, id);
        }
        self.graphs.insert(id, members);
        if let Some(members) = self.graphs.get(&id) {
            self.events.graph_assign(id, members);
        }
        Some(id)
    }

    /// One flood per leftover component; every flood seeds from an
    /// outstanding vertex, so each iteration shrinks the set.
    fn rebuild_residuals(
        &mut self,
        mut outstanding: FastMap<S::Key, S::Vertex>,
    ) -> Result<(), TrackError> {
        while let Some(seed_key) = outstanding.keys().next().copied() {
            let Some(seed_vertex) = outstanding.remove(&seed_key) else {
                break;
            };
            let mut mapper =
                Mapper::new(Some((seed_key, seed_vertex)), MapperOptions::unbounded());
            {
                let mut hooks = ResidualHooks {
                    map: &self.map,
                    outstanding: &mut outstanding,
                };
                mapper.run(&mut self.successor, &mut hooks)?;
            }
            let found = mapper.into_visited().unwrap_or_default();
            self.promote(found);
        }
        Ok(())
    }
}

impl<S, E> DebugInvariants for VertexSpace<S, E>
where
    S: Successor,
    E: SpaceEvents<S::Vertex, S::Key>,
{
    fn validate_invariants(&self) -> Result<(), TrackError> {
        for (key, id) in &self.map {
            let Some(members) = self.graphs.get(id) else {
                return Err(TrackError::PartitionInconsistent(format!(
                    "key {key:?} mapped to missing graph {id}"
                )));
            };
            if !members.contains_key(key) {
                return Err(TrackError::PartitionInconsistent(format!(
                    "key {key:?} mapped to graph {id} but absent from it"
                )));
            }
        }
        let mut counted = 0usize;
        for (id, members) in &self.graphs {
            if members.is_empty() {
                return Err(TrackError::PartitionInconsistent(format!(
                    "graph {id} is empty but alive"
                )));
            }
            counted += members.len();
            for key in members.keys() {
                if self.map.get(key) != Some(id) {
                    return Err(TrackError::PartitionInconsistent(format!(
                        "graph {id} holds {key:?} which maps elsewhere"
                    )));
                }
            }
        }
        if counted != self.map.len() {
            return Err(TrackError::PartitionInconsistent(format!(
                "graphs hold {counted} vertices, map holds {}",
                self.map.len()
            )));
        }
        Ok(())
    }
}

impl<S, E> std::fmt::Debug for VertexSpace<S, E>
where
    S: Successor,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VertexSpace")
            .field("tracked", &self.map.len())
            .field("graphs", &self.graphs.len())
            .finish()
    }
}
