use voxel_track::debug_invariants::DebugInvariants;
use voxel_track::space::RopeGraph;

fn neighbours(g: &RopeGraph<&'static str, u32>, group: u32) -> Vec<u32> {
    let mut v: Vec<u32> = g.neighbours(group).collect();
    v.sort_unstable();
    v
}

#[test]
fn edge_lifecycle_holds_ropes_open() {
    let mut g: RopeGraph<&str, u32> = RopeGraph::new();

    // Vertex "a" in group 1 connects to "b" in group 2.
    g.update("a", 1, [("b", 2)]);
    assert_eq!(neighbours(&g, 1), vec![2]);
    g.debug_assert_invariants();

    // A second vertex of group 1 connects to the same "b".
    g.update("c", 1, [("b", 2)]);
    assert_eq!(neighbours(&g, 1), vec![2]);
    assert_eq!(g.rope_between(1, 2), Some(2));
    g.debug_assert_invariants();

    // "a" loses its edges; "c"'s edge still holds the rope open.
    g.update("a", 1, []);
    assert_eq!(neighbours(&g, 1), vec![2]);
    assert_eq!(g.rope_between(1, 2), Some(1));
    g.debug_assert_invariants();

    // The last edge goes; the rope dies with it.
    g.update("c", 1, []);
    assert_eq!(neighbours(&g, 1), Vec::<u32>::new());
    assert_eq!(g.rope_between(1, 2), None);
    assert!(g.is_empty());
    g.debug_assert_invariants();

    // "a" comes back with edges into two groups at once.
    g.update("a", 1, [("b", 2), ("c", 3)]);
    assert_eq!(neighbours(&g, 1), vec![2, 3]);
    g.debug_assert_invariants();

    // Removing "b" (the far endpoint) kills the 1-2 rope only.
    g.update("b", 2, []);
    assert_eq!(neighbours(&g, 1), vec![3]);
    assert_eq!(neighbours(&g, 3), vec![1]);
    g.debug_assert_invariants();
}

#[test]
fn rope_refcount_matches_edge_count() {
    let mut g: RopeGraph<u64, u32> = RopeGraph::new();
    for key in 0..5u64 {
        g.update(key, 1, [(100 + key, 2)]);
    }
    assert_eq!(g.rope_between(1, 2), Some(5));
    for key in 0..4u64 {
        g.forget(key);
        assert_eq!(g.rope_between(1, 2), Some(4 - key as usize));
        g.debug_assert_invariants();
    }
    g.forget(4);
    assert_eq!(g.rope_between(1, 2), None);
    assert_eq!(g.neighbours(1).count(), 0);
}

#[test]
fn neighbours_never_yields_self() {
    let mut g: RopeGraph<&str, u32> = RopeGraph::new();
    g.update("a", 1, [("b", 2), ("same", 1)]);
    assert_eq!(neighbours(&g, 1), vec![2]);
    // The self-pair left no trace.
    assert_eq!(g.rope_between(1, 1), None);
    assert_eq!(g.edges_of("same"), 0);
    g.debug_assert_invariants();
}

#[test]
fn update_is_a_replacement_not_an_append() {
    let mut g: RopeGraph<&str, u32> = RopeGraph::new();
    g.update("a", 1, [("b", 2), ("c", 3)]);
    assert_eq!(g.edges_of("a"), 2);
    // Re-announcing with a different set replaces, pair 1-3 survives.
    g.update("a", 1, [("c", 3)]);
    assert_eq!(g.edges_of("a"), 1);
    assert_eq!(g.rope_between(1, 2), None);
    assert_eq!(g.rope_between(1, 3), Some(1));
    g.debug_assert_invariants();
}
