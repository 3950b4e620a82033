//! Bounded connected-component tracking.
//!
//! A [`GroupSpace`] partitions tracked vertices into groups of at most
//! `group_limit` vertices. Growth past the limit spawns new groups
//! instead of merging, and the boundary between groups is maintained in
//! a [`RopeGraph`] so coarse connectivity stays queryable in amortised
//! O(1) per mutation — the expensive path only runs when a group may
//! have split, and even then every flood is bounded by the group limit.
//!
//! The `alive` predicate decides whether a vertex still exists as far
//! as the tracker is concerned; repair floods drop dead vertices, which
//! is also how removal works: notify `update` about a vertex whose
//! predicate now fails.

use std::fmt;

use crate::bounds::{KeyLike, VertexLike};
use crate::debug_invariants::DebugInvariants;
use crate::mapper::{Mapper, MapperHooks, MapperOptions, Remainder};
use crate::perf::FastMap;
use crate::space::GroupId;
use crate::space::rope::RopeGraph;
use crate::successor::{Filtered, Successor};
use crate::track_error::TrackError;

/// Options recognised by [`GroupSpace::new`].
#[derive(Clone, Copy, Debug)]
pub struct GroupOptions {
    /// Maximum vertices per group. Must be at least 1.
    pub group_limit: usize,
}

impl GroupOptions {
    /// Options with the given limit.
    pub fn limited(group_limit: usize) -> Self {
        GroupOptions { group_limit }
    }
}

/// Flood hooks shared by the repair floods: cross visited members off
/// the remaining set and note whether the bounded run left frontier
/// behind. Scope filtering happens in the wrapped successor, so the
/// frontier only ever holds in-scope vertices and a non-empty remainder
/// genuinely signals an oversized group.
struct FloodHooks<'a, V, K> {
    remaining: &'a mut FastMap<K, V>,
    leftover_frontier: bool,
}

impl<V, K> MapperHooks<V, K> for FloodHooks<'_, V, K>
where
    V: VertexLike,
    K: KeyLike,
{
    fn visit(&mut self, _vertex: &V, key: K) {
        self.remaining.remove(&key);
    }

    fn finished(&mut self, remainder: Remainder<'_, V, K>) {
        self.leftover_frontier = remainder.count() > 0;
    }
}

/// Bounded connected-component tracker with a rope graph boundary.
pub struct GroupSpace<S, A>
where
    S: Successor,
{
    successor: S,
    alive: A,
    limit: usize,
    map: FastMap<S::Key, GroupId>,
    groups: FastMap<GroupId, FastMap<S::Key, S::Vertex>>,
    ropes: RopeGraph<S::Key, GroupId>,
    next_id: GroupId,
}

impl<S> GroupSpace<S, fn(&S::Vertex, S::Key) -> bool>
where
    S: Successor,
{
    /// Space where every observed vertex counts as alive.
    pub fn new(successor: S, opts: GroupOptions) -> Result<Self, TrackError> {
        let always: fn(&S::Vertex, S::Key) -> bool = |_, _| true;
        Self::with_alive(successor, opts, always)
    }
}

impl<S, A> GroupSpace<S, A>
where
    S: Successor,
    A: FnMut(&S::Vertex, S::Key) -> bool,
{
    /// Space with an explicit liveness predicate.
    pub fn with_alive(successor: S, opts: GroupOptions, alive: A) -> Result<Self, TrackError> {
        if opts.group_limit == 0 {
            return Err(TrackError::ZeroGroupLimit);
        }
        Ok(GroupSpace {
            successor,
            alive,
            limit: opts.group_limit,
            map: FastMap::default(),
            groups: FastMap::default(),
            ropes: RopeGraph::new(),
            next_id: GroupId::first(),
        })
    }

    /// The successor, for registration or seed-key derivation.
    pub fn successor_mut(&mut self) -> &mut S {
        &mut self.successor
    }

    /// Configured group-size limit.
    pub fn group_limit(&self) -> usize {
        self.limit
    }

    /// Group currently holding `key`, if tracked.
    pub fn which_group(&self, key: S::Key) -> Option<GroupId> {
        self.map.get(&key).copied()
    }

    /// Members of group `id`.
    pub fn group_of(
        &self,
        id: GroupId,
    ) -> Option<impl Iterator<Item = (S::Key, &S::Vertex)> + '_> {
        self.groups.get(&id).map(|m| m.iter().map(|(k, v)| (*k, v)))
    }

    /// Number of vertices in group `id`.
    pub fn group_len(&self, id: GroupId) -> Option<usize> {
        self.groups.get(&id).map(|members| members.len())
    }

    /// Ids of all live groups.
    pub fn group_ids(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.groups.keys().copied()
    }

    /// Number of live groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of tracked vertices.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True when nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Groups adjacent to `id` through at least one rope.
    pub fn neighbours(&self, id: GroupId) -> impl Iterator<Item = GroupId> + '_ {
        self.ropes.neighbours(id)
    }

    /// The rope graph, read-only.
    pub fn ropes(&self) -> &RopeGraph<S::Key, GroupId> {
        &self.ropes
    }

    /// Track `vertex`. Returns `false` when its key is already tracked.
    ///
    /// The vertex joins the first successor group with room; when every
    /// neighbouring group is full (or there is none), a fresh group is
    /// spawned. Cross-group adjacencies are announced to the rope graph
    /// either way.
    pub fn add(&mut self, vertex: S::Vertex, key: S::Key) -> Result<bool, TrackError> {
        if self.map.contains_key(&key) {
            return Ok(false);
        }
        let successors = self.successor.successors(&vertex, key)?;

        let mut home: Option<GroupId> = None;
        let mut touching: Vec<(S::Key, GroupId)> = Vec::new();
        for successor_key in successors.keys() {
            match self.map.get(successor_key) {
                Some(&g) => {
                    if home.is_none()
                        && self.groups.get(&g).is_some_and(|m| m.len() < self.limit)
                    {
                        home = Some(g);
                    }
                    touching.push((*successor_key, g));
                }
                None => {
                    log::warn!(
                        "untracked successor {successor_key:?} of {key:?}, ignored for placement"
                    );
                }
            }
        }

        let home = match home {
            Some(g) => {
                if let Some(members) = self.groups.get_mut(&g) {
                    members.insert(key, vertex);
                }
                g
            }
            None => {
                let id = self.next_id.bump();
                let mut members = FastMap::default();
                members.insert(key, vertex);
                self.groups.insert(id, members);
                id
            }
        };
        self.map.insert(key, home);
        self.ropes.update(key, home, touching);
        Ok(true)
    }

    /// Notify the tracker that `vertex` (or its edges) changed.
    ///
    /// Untracked and dead: no-op. Untracked and alive: delegates to
    /// [`GroupSpace::add`]. Tracked: the holding group is repaired.
    /// Returns `true` when the partition changed shape.
    pub fn update(&mut self, vertex: S::Vertex, key: S::Key) -> Result<bool, TrackError> {
        match self.map.get(&key).copied() {
            None => {
                if (self.alive)(&vertex, key) {
                    self.add(vertex, key)
                } else {
                    Ok(false)
                }
            }
            Some(group) => self.repair(group),
        }
    }

    /// Stop tracking `key` outright, repairing the group it leaves.
    pub fn remove(&mut self, key: S::Key) -> Result<bool, TrackError> {
        let Some(group) = self.map.remove(&key) else {
            return Ok(false);
        };
        self.ropes.forget(key);
        let emptied = match self.groups.get_mut(&group) {
            Some(members) => {
                if members.remove(&key).is_none() {
                    log::warn!("hash {key:?} was mapped to group {group} but not a member");
                }
                members.is_empty()
            }
            None => {
                log::warn!("group {group} mapped but has no member table");
                return Ok(true);
            }
        };
        if emptied {
            self.groups.remove(&group);
        } else {
            self.repair(group)?;
        }
        Ok(true)
    }

    /// Detect whether group `group` has split and rebuild the partition
    /// if so. Returns `true` when `group` is no longer valid.
    pub fn repair(&mut self, group: GroupId) -> Result<bool, TrackError> {
        let Some(members) = self.groups.get(&group) else {
            log::warn!("repair on missing group {group}");
            return Ok(false);
        };
        if members.is_empty() {
            log::warn!("repair on empty group {group}");
            return Ok(false);
        }
        let mut remaining = members.clone();
        let Some((seed_key, seed_vertex)) =
            remaining.iter().next().map(|(k, v)| (*k, v.clone()))
        else {
            return Ok(false);
        };

        // Walk the group from the seed; a group of at most `limit`
        // vertices must fit within `limit` visits. A dead seed skips
        // the walk: the whole group is then rebuilt from scratch.
        let mut found: FastMap<S::Key, S::Vertex> = FastMap::default();
        if (self.alive)(&seed_vertex, seed_key) {
            let mut mapper = Mapper::new(
                Some((seed_key, seed_vertex)),
                MapperOptions::limited(self.limit),
            );
            let leftover_frontier;
            {
                let Self {
                    successor,
                    map,
                    alive,
                    ..
                } = self;
                let mut scoped = Filtered::new(successor, |v: &S::Vertex, k: S::Key| {
                    map.get(&k) == Some(&group) && alive(v, k)
                });
                let mut hooks = FloodHooks {
                    remaining: &mut remaining,
                    leftover_frontier: false,
                };
                mapper.run(&mut scoped, &mut hooks)?;
                leftover_frontier = hooks.leftover_frontier;
            }
            if leftover_frontier {
                log::warn!("remaining frontiers after size-bounded repair of group {group}");
            }
            found = mapper.into_visited().unwrap_or_default();
            if remaining.is_empty() {
                return Ok(false);
            }
        }

        // The group split: dissolve it entirely, then regroup the found
        // component and every leftover component.
        let former = self.groups.remove(&group).unwrap_or_default();
        for k in former.keys() {
            self.map.remove(k);
            self.ropes.forget(*k);
        }

        if !found.is_empty() {
            self.make_group(found)?;
        }
        while let Some(seed_key) = remaining.keys().next().copied() {
            let Some(seed_vertex) = remaining.remove(&seed_key) else {
                break;
            };
            if !(self.alive)(&seed_vertex, seed_key) {
                // Stale seed: the vertex is gone, nothing to regroup.
                continue;
            }
            let mut mapper = Mapper::new(
                Some((seed_key, seed_vertex)),
                MapperOptions::limited(self.limit),
            );
            {
                let Self {
                    successor,
                    map,
                    alive,
                    ..
                } = self;
                let mut scoped = Filtered::new(successor, |v: &S::Vertex, k: S::Key| {
                    !map.contains_key(&k) && former.contains_key(&k) && alive(v, k)
                });
                let mut hooks = FloodHooks {
                    remaining: &mut remaining,
                    leftover_frontier: false,
                };
                mapper.run(&mut scoped, &mut hooks)?;
            }
            let found = mapper.into_visited().unwrap_or_default();
            if !found.is_empty() {
                self.make_group(found)?;
            }
        }
        Ok(true)
    }

    /// Materialise a fresh connected set as a group: register every
    /// member first, then announce each member's cross-group
    /// adjacencies to the rope graph.
    fn make_group(&mut self, members: FastMap<S::Key, S::Vertex>) -> Result<GroupId, TrackError> {
        let id = self.next_id.bump();
        for k in members.keys() {
            self.map.insert(*k, id);
        }
        let roster: Vec<(S::Key, S::Vertex)> =
            members.iter().map(|(k, v)| (*k, v.clone())).collect();
        self.groups.insert(id, members);
        for (key, vertex) in roster {
            let successors = self.successor.successors(&vertex, key)?;
            let mut cross: Vec<(S::Key, GroupId)> = Vec::new();
            for successor_key in successors.keys() {
                if let Some(&successor_group) = self.map.get(successor_key) {
                    cross.push((*successor_key, successor_group));
                }
            }
            self.ropes.update(key, id, cross);
        }
        Ok(id)
    }
}

impl<S, A> DebugInvariants for GroupSpace<S, A>
where
    S: Successor,
    A: FnMut(&S::Vertex, S::Key) -> bool,
{
    fn validate_invariants(&self) -> Result<(), TrackError> {
        for (key, id) in &self.map {
            let holds = self
                .groups
                .get(id)
                .is_some_and(|members| members.contains_key(key));
            if !holds {
                return Err(TrackError::PartitionInconsistent(format!(
                    "key {key:?} mapped to group {id} but absent from it"
                )));
            }
        }
        for (id, members) in &self.groups {
            if members.is_empty() {
                return Err(TrackError::PartitionInconsistent(format!(
                    "group {id} is empty but alive"
                )));
            }
            if members.len() > self.limit {
                return Err(TrackError::GroupOverLimit {
                    group: id.get(),
                    size: members.len(),
                    limit: self.limit,
                });
            }
            for key in members.keys() {
                if self.map.get(key) != Some(id) {
                    return Err(TrackError::PartitionInconsistent(format!(
                        "group {id} holds {key:?} which maps elsewhere"
                    )));
                }
            }
        }
        self.ropes.validate_invariants()
    }
}

impl<S, A> fmt::Debug for GroupSpace<S, A>
where
    S: Successor,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupSpace")
            .field("tracked", &self.map.len())
            .field("groups", &self.groups.len())
            .field("limit", &self.limit)
            .field("ropes", &self.ropes)
            .finish()
    }
}
