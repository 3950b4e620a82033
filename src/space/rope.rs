//! Rope graph: the multigraph of inter-group boundaries.
//!
//! Every edge between vertices of two *different* groups belongs to the
//! rope of that (unordered) group pair. Ropes are reference-counted by
//! their edges: the rope exists while at least one edge holds it open,
//! and the coarse adjacency (`neighbours`) mirrors exactly the set of
//! live ropes. Self-pairs are rejected silently; intra-group edges are
//! simply not the rope graph's business.
//!
//! Mutation is vertex-centric: [`RopeGraph::update`] replaces every
//! edge incident on one vertex with the freshly observed cross-group
//! edges, and [`RopeGraph::forget`] is the empty replacement.

use std::fmt;

use crate::bounds::{GroupLike, KeyLike};
use crate::debug_invariants::DebugInvariants;
use crate::perf::{FastMap, FastSet};
use crate::track_error::TrackError;

/// Identity of one boundary edge.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct EdgeId(u64);

#[derive(Debug)]
struct Edge<K, G> {
    ends: [K; 2],
    pair: (G, G),
}

#[derive(Debug, Default)]
struct Rope {
    edges: FastSet<EdgeId>,
}

/// Refcounted multigraph of inter-group edges.
pub struct RopeGraph<K, G> {
    vertexmap: FastMap<K, FastSet<EdgeId>>,
    edges: FastMap<EdgeId, Edge<K, G>>,
    ropes: FastMap<(G, G), Rope>,
    groupmap: FastMap<G, FastSet<G>>,
    next_edge: u64,
}

fn canonical<G: GroupLike>(a: G, b: G) -> (G, G) {
    if a <= b { (a, b) } else { (b, a) }
}

impl<K, G> RopeGraph<K, G>
where
    K: KeyLike,
    G: GroupLike,
{
    /// Empty rope graph.
    pub fn new() -> Self {
        RopeGraph {
            vertexmap: FastMap::default(),
            edges: FastMap::default(),
            ropes: FastMap::default(),
            groupmap: FastMap::default(),
            next_edge: 0,
        }
    }

    /// Replace every edge incident on `key` with the given cross-group
    /// edges: one per successor whose group differs from `home`.
    ///
    /// Ropes whose last edge disappears are destroyed, together with
    /// their coarse adjacency; pairs touched again in the same call
    /// survive with their new edges.
    pub fn update<I>(&mut self, key: K, home: G, successors: I)
    where
        I: IntoIterator<Item = (K, G)>,
    {
        let touched = self.unlink(key);
        for (succ_key, succ_group) in successors {
            if succ_group == home {
                log::debug!("invalid group pair ({home:?}, {succ_group:?}), skipping edge");
                continue;
            }
            let pair = canonical(home, succ_group);
            if !self.ropes.contains_key(&pair) {
                self.groupmap.entry(home).or_default().insert(succ_group);
                self.groupmap.entry(succ_group).or_default().insert(home);
            }
            let eid = EdgeId(self.next_edge);
            self.next_edge += 1;
            self.edges.insert(
                eid,
                Edge {
                    ends: [key, succ_key],
                    pair,
                },
            );
            self.vertexmap.entry(key).or_default().insert(eid);
            self.vertexmap.entry(succ_key).or_default().insert(eid);
            self.ropes.entry(pair).or_default().edges.insert(eid);
        }
        self.sweep(touched);
    }

    /// Drop every edge incident on `key`.
    pub fn forget(&mut self, key: K) {
        let touched = self.unlink(key);
        self.sweep(touched);
    }

    /// Remove `key`'s edges from all tables, returning the rope pairs
    /// that lost edges (candidates for destruction).
    fn unlink(&mut self, key: K) -> FastSet<(G, G)> {
        let mut touched = FastSet::default();
        let Some(incident) = self.vertexmap.remove(&key) else {
            return touched;
        };
        for eid in incident {
            let Some(edge) = self.edges.remove(&eid) else {
                log::warn!("edge {eid:?} incident on {key:?} has no record");
                continue;
            };
            let other = if edge.ends[0] == key {
                edge.ends[1]
            } else {
                edge.ends[0]
            };
            if let Some(set) = self.vertexmap.get_mut(&other) {
                set.remove(&eid);
                if set.is_empty() {
                    self.vertexmap.remove(&other);
                }
            }
            if let Some(rope) = self.ropes.get_mut(&edge.pair) {
                rope.edges.remove(&eid);
            } else {
                log::warn!("edge {eid:?} bound to missing rope {:?}", edge.pair);
            }
            touched.insert(edge.pair);
        }
        touched
    }

    /// Destroy every touched rope that ended up empty.
    fn sweep(&mut self, touched: FastSet<(G, G)>) {
        for pair in touched {
            let empty = self
                .ropes
                .get(&pair)
                .is_some_and(|rope| rope.edges.is_empty());
            if !empty {
                continue;
            }
            self.ropes.remove(&pair);
            let (a, b) = pair;
            for (from, to) in [(a, b), (b, a)] {
                if let Some(set) = self.groupmap.get_mut(&from) {
                    set.remove(&to);
                    if set.is_empty() {
                        self.groupmap.remove(&from);
                    }
                }
            }
        }
    }

    /// Groups adjacent to `group` through at least one rope. Never
    /// yields `group` itself.
    pub fn neighbours(&self, group: G) -> impl Iterator<Item = G> + '_ {
        self.groupmap.get(&group).into_iter().flatten().copied()
    }

    /// Edge count of the rope between `a` and `b`, if it exists.
    pub fn rope_between(&self, a: G, b: G) -> Option<usize> {
        self.ropes.get(&canonical(a, b)).map(|r| r.edges.len())
    }

    /// Number of live ropes.
    pub fn rope_count(&self) -> usize {
        self.ropes.len()
    }

    /// Number of edges incident on `key`.
    pub fn edges_of(&self, key: K) -> usize {
        self.vertexmap.get(&key).map_or(0, |set| set.len())
    }

    /// True when no edges exist.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

impl<K, G> Default for RopeGraph<K, G>
where
    K: KeyLike,
    G: GroupLike,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, G> fmt::Debug for RopeGraph<K, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RopeGraph")
            .field("edges", &self.edges.len())
            .field("ropes", &self.ropes.len())
            .finish()
    }
}

impl<K, G> DebugInvariants for RopeGraph<K, G>
where
    K: KeyLike,
    G: GroupLike,
{
    fn validate_invariants(&self) -> Result<(), TrackError> {
        let mut per_rope: FastMap<(G, G), usize> = FastMap::default();
        for (eid, edge) in &self.edges {
            let (a, b) = edge.pair;
            if a >= b {
                return Err(TrackError::GroupAdjacencyMismatch);
            }
            for end in edge.ends {
                if !self
                    .vertexmap
                    .get(&end)
                    .is_some_and(|set| set.contains(eid))
                {
                    return Err(TrackError::PartitionInconsistent(format!(
                        "edge {eid:?} missing from endpoint {end:?}"
                    )));
                }
            }
            if !self
                .ropes
                .get(&edge.pair)
                .is_some_and(|rope| rope.edges.contains(eid))
            {
                return Err(TrackError::DanglingRopeEdge(eid.0));
            }
            *per_rope.entry(edge.pair).or_default() += 1;
        }
        for (pair, rope) in &self.ropes {
            let bound = per_rope.get(pair).copied().unwrap_or(0);
            if rope.edges.len() != bound {
                return Err(TrackError::RopeCountMismatch {
                    count: rope.edges.len(),
                    bound,
                });
            }
            if bound == 0 {
                return Err(TrackError::RopeCountMismatch { count: 0, bound: 0 });
            }
            let (a, b) = *pair;
            let forward = self.groupmap.get(&a).is_some_and(|s| s.contains(&b));
            let backward = self.groupmap.get(&b).is_some_and(|s| s.contains(&a));
            if !forward || !backward {
                return Err(TrackError::GroupAdjacencyMismatch);
            }
        }
        for (from, tos) in &self.groupmap {
            for to in tos {
                if !self.ropes.contains_key(&canonical(*from, *to)) {
                    return Err(TrackError::GroupAdjacencyMismatch);
                }
            }
        }
        Ok(())
    }
}
