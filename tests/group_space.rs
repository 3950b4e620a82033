use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::rc::Rc;

use voxel_track::debug_invariants::DebugInvariants;
use voxel_track::perf::FastMap;
use voxel_track::space::{GroupId, GroupOptions, GroupSpace};
use voxel_track::successor::{FnSuccessor, Successor};
use voxel_track::track_error::TrackError;

/// Mutable undirected world with a liveness set.
#[derive(Default)]
struct World {
    edges: HashMap<u32, BTreeSet<u32>>,
    dead: HashSet<u32>,
}

impl World {
    fn link(&mut self, a: u32, b: u32) {
        self.edges.entry(a).or_default().insert(b);
        self.edges.entry(b).or_default().insert(a);
    }

    fn kill(&mut self, v: u32) {
        self.dead.insert(v);
        if let Some(neighbours) = self.edges.remove(&v) {
            for n in neighbours {
                if let Some(back) = self.edges.get_mut(&n) {
                    back.remove(&v);
                }
            }
        }
    }

    fn successors(&self, v: u32) -> FastMap<u32, u32> {
        self.edges
            .get(&v)
            .into_iter()
            .flatten()
            .map(|&n| (n, n))
            .collect()
    }
}

type Shared = Rc<RefCell<World>>;

fn harness(
    limit: usize,
) -> (
    Shared,
    GroupSpace<impl Successor<Vertex = u32, Key = u32>, impl FnMut(&u32, u32) -> bool>,
) {
    let world: Shared = Rc::default();
    let reader = world.clone();
    let successor = FnSuccessor::new(move |_: &u32, k: u32| Ok(reader.borrow().successors(k)));
    let live = world.clone();
    let alive = move |_: &u32, k: u32| !live.borrow().dead.contains(&k);
    let space = GroupSpace::with_alive(successor, GroupOptions::limited(limit), alive).unwrap();
    (world, space)
}

fn members<S: Successor<Vertex = u32, Key = u32>, A>(
    space: &GroupSpace<S, A>,
    id: GroupId,
) -> BTreeSet<u32>
where
    A: FnMut(&u32, u32) -> bool,
{
    space.group_of(id).unwrap().map(|(k, _)| k).collect()
}

fn neighbours<S: Successor<Vertex = u32, Key = u32>, A>(
    space: &GroupSpace<S, A>,
    id: GroupId,
) -> Vec<GroupId>
where
    A: FnMut(&u32, u32) -> bool,
{
    let mut v: Vec<GroupId> = space.neighbours(id).collect();
    v.sort_unstable();
    v
}

#[test]
fn zero_limit_is_rejected() {
    let world: Shared = Rc::default();
    let reader = world.clone();
    let successor =
        FnSuccessor::new(move |_: &u32, k: u32| Ok(reader.borrow().successors(k)));
    assert!(matches!(
        GroupSpace::new(successor, GroupOptions::limited(0)),
        Err(TrackError::ZeroGroupLimit)
    ));
}

#[test]
fn growth_past_the_limit_spawns_groups() {
    let (world, mut space) = harness(2);
    for (a, b) in [(1, 2), (2, 3), (3, 4), (4, 5)] {
        world.borrow_mut().link(a, b);
    }
    for v in 1..=5 {
        assert!(space.add(v, v).unwrap());
    }
    space.debug_assert_invariants();

    assert_eq!(space.len(), 5);
    assert_eq!(space.group_count(), 3);
    for id in space.group_ids().collect::<Vec<_>>() {
        assert!(space.group_len(id).unwrap() <= 2);
    }
    // The rope chain mirrors the fine-grained chain.
    let g1 = space.which_group(1).unwrap();
    let g3 = space.which_group(3).unwrap();
    let g5 = space.which_group(5).unwrap();
    assert_eq!(space.which_group(2), Some(g1));
    assert_eq!(space.which_group(4), Some(g3));
    assert_eq!(neighbours(&space, g3), {
        let mut v = vec![g1, g5];
        v.sort_unstable();
        v
    });
}

#[test]
fn double_add_returns_false() {
    let (_world, mut space) = harness(4);
    assert!(space.add(1, 1).unwrap());
    assert!(!space.add(1, 1).unwrap());
    assert_eq!(space.len(), 1);
}

#[test]
fn full_neighbour_groups_force_a_new_group_with_ropes() {
    let (world, mut space) = harness(2);
    world.borrow_mut().link(1, 2);
    world.borrow_mut().link(3, 4);
    for v in 1..=4 {
        space.add(v, v).unwrap();
    }
    let g1 = space.which_group(1).unwrap();
    let g2 = space.which_group(3).unwrap();
    assert_eq!(space.group_len(g1), Some(2));
    assert_eq!(space.group_len(g2), Some(2));

    // Vertex 5 touches both groups; both are full.
    world.borrow_mut().link(5, 2);
    world.borrow_mut().link(5, 3);
    space.add(5, 5).unwrap();
    let g3 = space.which_group(5).unwrap();
    assert_ne!(g3, g1);
    assert_ne!(g3, g2);
    assert_eq!(members(&space, g3), BTreeSet::from([5]));
    assert_eq!(neighbours(&space, g3), {
        let mut v = vec![g1, g2];
        v.sort_unstable();
        v
    });
    assert_eq!(space.ropes().rope_between(g3, g1), Some(1));
    assert_eq!(space.ropes().rope_between(g3, g2), Some(1));
    space.debug_assert_invariants();
}

#[test]
fn dead_vertex_update_splits_group_and_repairs_ropes() {
    // Chain x1..x6, limit 4: groups {1,2,3,4} and {5,6} joined by one
    // rope edge (4-5).
    let (world, mut space) = harness(4);
    for (a, b) in [(1, 2), (2, 3), (3, 4), (4, 5), (5, 6)] {
        world.borrow_mut().link(a, b);
    }
    for v in 1..=6 {
        space.add(v, v).unwrap();
    }
    let g1 = space.which_group(1).unwrap();
    let g2 = space.which_group(5).unwrap();
    assert_eq!(members(&space, g1), BTreeSet::from([1, 2, 3, 4]));
    assert_eq!(members(&space, g2), BTreeSet::from([5, 6]));
    assert_eq!(space.ropes().rope_between(g1, g2), Some(1));
    space.debug_assert_invariants();

    // Vertex 4 disappears from the world.
    world.borrow_mut().kill(4);
    assert!(space.update(4, 4).unwrap());
    space.debug_assert_invariants();

    assert_eq!(space.which_group(4), None);
    let g1b = space.which_group(1).unwrap();
    assert_ne!(g1b, g1, "the split group's id is retired");
    assert_eq!(members(&space, g1b), BTreeSet::from([1, 2, 3]));
    assert_eq!(space.which_group(5), Some(g2), "far group is untouched");
    assert_eq!(members(&space, g2), BTreeSet::from([5, 6]));

    // The only rope edge died with vertex 4 and nothing replaces it.
    assert_eq!(space.ropes().rope_between(g1b, g2), None);
    assert_eq!(neighbours(&space, g2), Vec::<GroupId>::new());
}

#[test]
fn split_reannounces_surviving_cross_edges() {
    // Groups {1,2,3} and {4,5} with rope edge 3-4; killing 2 splits the
    // first group but the 3-4 boundary must survive into the new group.
    let (world, mut space) = harness(3);
    for (a, b) in [(1, 2), (2, 3), (3, 4), (4, 5)] {
        world.borrow_mut().link(a, b);
    }
    for v in 1..=5 {
        space.add(v, v).unwrap();
    }
    let g2 = space.which_group(4).unwrap();

    world.borrow_mut().kill(2);
    assert!(space.update(2, 2).unwrap());
    space.debug_assert_invariants();

    let lone = space.which_group(1).unwrap();
    let bridge = space.which_group(3).unwrap();
    assert_ne!(lone, bridge);
    assert_eq!(members(&space, lone), BTreeSet::from([1]));
    assert_eq!(members(&space, bridge), BTreeSet::from([3]));
    assert_eq!(space.ropes().rope_between(bridge, g2), Some(1));
    assert_eq!(neighbours(&space, g2), vec![bridge]);
}

#[test]
fn intact_group_survives_repair_unchanged() {
    let (world, mut space) = harness(8);
    for (a, b) in [(1, 2), (2, 3)] {
        world.borrow_mut().link(a, b);
    }
    for v in 1..=3 {
        space.add(v, v).unwrap();
    }
    let id = space.which_group(1).unwrap();
    // Nothing actually changed; repair detects no split.
    assert!(!space.update(2, 2).unwrap());
    assert_eq!(space.which_group(1), Some(id));
    assert_eq!(members(&space, id), BTreeSet::from([1, 2, 3]));
}

#[test]
fn update_of_untracked_vertex_respects_liveness() {
    let (world, mut space) = harness(4);
    world.borrow_mut().kill(9);
    assert!(!space.update(9, 9).unwrap());
    assert_eq!(space.len(), 0);

    assert!(space.update(1, 1).unwrap());
    assert_eq!(space.len(), 1);
}

#[test]
fn remove_keeps_connected_group_alive() {
    let (world, mut space) = harness(4);
    for (a, b) in [(1, 2), (2, 3)] {
        world.borrow_mut().link(a, b);
    }
    for v in 1..=3 {
        space.add(v, v).unwrap();
    }
    let id = space.which_group(1).unwrap();
    // Dropping the leaf leaves a still-connected group with its id.
    world.borrow_mut().kill(3);
    assert!(space.remove(3).unwrap());
    assert_eq!(space.which_group(3), None);
    assert_eq!(space.which_group(1), Some(id));
    assert_eq!(members(&space, id), BTreeSet::from([1, 2]));
    assert!(!space.remove(3).unwrap());
    space.debug_assert_invariants();
}

#[test]
fn groups_never_exceed_the_limit_under_churn() {
    let (world, mut space) = harness(3);
    // A 4×4 grid of vertices, row-major ids.
    let id = |x: u32, y: u32| y * 4 + x;
    for y in 0..4 {
        for x in 0..4 {
            if x + 1 < 4 {
                world.borrow_mut().link(id(x, y), id(x + 1, y));
            }
            if y + 1 < 4 {
                world.borrow_mut().link(id(x, y), id(x, y + 1));
            }
        }
    }
    for v in 0..16 {
        space.add(v, v).unwrap();
        space.debug_assert_invariants();
    }
    assert_eq!(space.len(), 16);
    // Knock out a column and let repair rebuild.
    for y in 0..4 {
        let v = id(1, y);
        world.borrow_mut().kill(v);
        space.update(v, v).unwrap();
        space.debug_assert_invariants();
    }
    assert_eq!(space.len(), 12);
    for gid in space.group_ids().collect::<Vec<_>>() {
        assert!(space.group_len(gid).unwrap() <= 3);
    }
}
