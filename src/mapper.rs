//! Breadth-first mapper: the flood traversal behind every tracker.
//!
//! ## Contract
//! - Each key is expanded at most once; `visit` fires exactly once per
//!   visited vertex; `finished` fires exactly once per run.
//! - `advance` is the sole suspension point. Callers may interleave
//!   other logic between calls, but must not mutate any state the
//!   in-flight successor observes.
//! - With a vertex limit, visiting stops at the limit and the leftover
//!   frontier is handed to `finished` (and stays readable via
//!   [`Mapper::remainder`] until the mapper is dropped).
//!
//! ## Complexity
//! A full run over a finite graph is O(V + E) `advance` steps, O(V)
//! memory. Sibling ordering within one expansion is unspecified.

use std::collections::VecDeque;

use crate::bounds::{KeyLike, VertexLike};
use crate::perf::{FastMap, FastSet};
use crate::successor::Successor;
use crate::track_error::TrackError;

/// Options recognised by [`Mapper::new`].
#[derive(Clone, Copy, Debug, Default)]
pub struct MapperOptions {
    /// Cap on the number of visited vertices. Excess frontiers remain
    /// queued and surface through the `finished` hook.
    pub vertex_limit: Option<usize>,
}

impl MapperOptions {
    /// No limit.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Visit at most `limit` vertices.
    pub fn limited(limit: usize) -> Self {
        MapperOptions {
            vertex_limit: Some(limit),
        }
    }
}

/// Observer hooks for one mapper run. All methods default to no-ops, so
/// a missing hook is indistinguishable from an explicit no-op.
pub trait MapperHooks<V, K> {
    /// Predicate run on a popped frontier; `false` drops the vertex
    /// without visiting or expanding it.
    fn test_vertex(&mut self, _vertex: &V, _key: K) -> bool {
        true
    }

    /// A vertex transitioned popped → visited.
    fn visit(&mut self, _vertex: &V, _key: K) {}

    /// A vertex entered the pending frontier.
    fn mark_frontier(&mut self, _vertex: &V, _key: K) {}

    /// The run terminated. `remainder` enumerates frontiers left behind;
    /// it is non-empty only when a vertex limit cut the run short.
    fn finished(&mut self, _remainder: Remainder<'_, V, K>) {}
}

/// The unit hook set: every callback is a no-op.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHooks;

impl<V, K> MapperHooks<V, K> for NoHooks {}

/// Counters accumulated over one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MapperStats {
    /// Vertices visited.
    pub visited: usize,
    /// Frontiers dropped by `test_vertex`.
    pub discarded: usize,
}

/// Single-pass iterator over the frontier a terminated run left behind.
///
/// Borrows the mapper's queue; dropping the mapper invalidates it.
pub struct Remainder<'a, V, K> {
    inner: std::collections::vec_deque::Iter<'a, (K, V)>,
}

impl<'a, V, K: Copy> Iterator for Remainder<'a, V, K> {
    type Item = (K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (*k, v))
    }
}

/// Breadth-first flood over an abstract graph.
pub struct Mapper<V, K> {
    queue: VecDeque<(K, V)>,
    pending: FastSet<K>,
    visited: FastMap<K, V>,
    finished: bool,
    discarded: usize,
    vertex_limit: Option<usize>,
}

impl<V, K> Mapper<V, K>
where
    V: VertexLike,
    K: KeyLike,
{
    /// Mapper seeded with zero or one frontier.
    ///
    /// With no seed the queue starts empty and the first `advance`
    /// terminates the run.
    pub fn new(seed: Option<(K, V)>, opts: MapperOptions) -> Self {
        let mut queue = VecDeque::new();
        let mut pending = FastSet::default();
        if let Some((key, vertex)) = seed {
            pending.insert(key);
            queue.push_back((key, vertex));
        }
        Mapper {
            queue,
            pending,
            visited: FastMap::default(),
            finished: false,
            discarded: 0,
            vertex_limit: opts.vertex_limit,
        }
    }

    /// One flood step. Returns `false` once the run has terminated.
    pub fn advance<S, H>(&mut self, successor: &mut S, hooks: &mut H) -> Result<bool, TrackError>
    where
        S: Successor<Vertex = V, Key = K>,
        H: MapperHooks<V, K>,
    {
        if self.finished {
            return Ok(false);
        }
        if let Some(limit) = self.vertex_limit
            && self.visited.len() >= limit
        {
            self.finish(hooks);
            return Ok(false);
        }
        let Some((key, vertex)) = self.queue.pop_front() else {
            self.finish(hooks);
            return Ok(false);
        };
        self.pending.remove(&key);
        if !hooks.test_vertex(&vertex, key) {
            self.discarded += 1;
            return Ok(true);
        }
        for (next_key, next_vertex) in successor.successors(&vertex, key)? {
            if self.visited.contains_key(&next_key) || self.pending.contains(&next_key) {
                continue;
            }
            hooks.mark_frontier(&next_vertex, next_key);
            self.pending.insert(next_key);
            self.queue.push_back((next_key, next_vertex));
        }
        hooks.visit(&vertex, key);
        self.visited.insert(key, vertex);
        Ok(true)
    }

    fn finish<H: MapperHooks<V, K>>(&mut self, hooks: &mut H) {
        self.finished = true;
        hooks.finished(Remainder {
            inner: self.queue.iter(),
        });
    }

    /// Drive the flood to termination.
    pub fn run<S, H>(&mut self, successor: &mut S, hooks: &mut H) -> Result<(), TrackError>
    where
        S: Successor<Vertex = V, Key = K>,
        H: MapperHooks<V, K>,
    {
        while self.advance(successor, hooks)? {}
        Ok(())
    }

    /// True once the run has terminated.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The visited map; `None` while the run is still in flight.
    pub fn visited(&self) -> Option<&FastMap<K, V>> {
        self.finished.then_some(&self.visited)
    }

    /// Consume the mapper and take the visited map; `None` while in
    /// flight.
    pub fn into_visited(self) -> Option<FastMap<K, V>> {
        self.finished.then_some(self.visited)
    }

    /// Frontiers left behind by a terminated run.
    pub fn remainder(&self) -> Remainder<'_, V, K> {
        Remainder {
            inner: self.queue.iter(),
        }
    }

    /// Run counters.
    pub fn stats(&self) -> MapperStats {
        MapperStats {
            visited: self.visited.len(),
            discarded: self.discarded,
        }
    }
}

impl<V, K> std::fmt::Debug for Mapper<V, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mapper")
            .field("queued", &self.queue.len())
            .field("visited", &self.visited.len())
            .field("discarded", &self.discarded)
            .field("finished", &self.finished)
            .finish()
    }
}
