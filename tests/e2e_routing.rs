//! End-to-end routing: placement → neighbor recomputation → route.
//!
//! Hand-wired adjacency exercises the planner directly; session-driven
//! scenarios exercise the whole chain the way a user would build a map.

use anchor_nav::{
    AnchorGraph, AnchorRecord, Error, NavigationSession, PathId, PathNode, Pose, RoomNode,
    RoutePlanner,
};
use pretty_assertions::assert_eq;

// ============================================================================
// Helpers
// ============================================================================

fn at(x: f32, z: f32) -> Pose {
    Pose::from_translation(x, 0.0, z)
}

/// Path node `id` at `x = id` with exactly the given outgoing edges.
fn wired(edges: &[(u32, &[u32])]) -> AnchorGraph {
    AnchorGraph::from_records(edges.iter().map(|&(id, out)| {
        AnchorRecord::path(
            at(id as f32, 0.0),
            PathNode::new(PathId(id), out.len().max(1) as u32).with_neighbors(out.iter().map(|&n| PathId(n))),
        )
    }))
    .unwrap()
}

fn ids(path: &[PathId]) -> Vec<u32> {
    path.iter().map(|p| p.0).collect()
}

// ============================================================================
// 1. Planner over hand-wired adjacency
// ============================================================================

#[test]
fn test_chain_of_four() {
    let mut graph = wired(&[(1, &[2]), (2, &[3]), (3, &[4]), (4, &[])]);
    let room = RoomNode { room_number: 40, closest_path_id: PathId(4) };
    graph.insert(AnchorRecord::room(at(4.0, 1.0), room)).unwrap();

    let path = RoutePlanner::new(&graph).route(PathId(1), &room).unwrap();
    assert_eq!(ids(&path), vec![1, 2, 3, 4]);
}

#[test]
fn test_dead_end_is_not_found() {
    let graph = wired(&[(1, &[2]), (2, &[]), (3, &[])]);
    let room = RoomNode { room_number: 30, closest_path_id: PathId(3) };
    let err = RoutePlanner::new(&graph).route(PathId(1), &room).unwrap_err();
    assert!(matches!(err, Error::NotFound { start: PathId(1), goal: PathId(3) }));
}

#[test]
fn test_branching_prefers_fewest_hops() {
    //   1 → 2 → 3 → 4 → 6
    //   1 → 5 → 6
    let graph = wired(&[(1, &[2, 5]), (2, &[3]), (3, &[4]), (4, &[6]), (5, &[6]), (6, &[])]);
    let room = RoomNode { room_number: 60, closest_path_id: PathId(6) };
    let path = RoutePlanner::new(&graph).route(PathId(1), &room).unwrap();
    assert_eq!(ids(&path), vec![1, 5, 6]);
}

#[test]
fn test_room_linked_to_removed_path_node() {
    let mut graph = wired(&[(1, &[2]), (2, &[])]);
    graph.insert(AnchorRecord::room(at(2.0, 1.0), RoomNode { room_number: 9, closest_path_id: PathId(2) }))
        .unwrap();
    let doomed = graph.find_path(PathId(2)).unwrap().id;
    graph.remove(doomed).unwrap();

    let err = RoutePlanner::new(&graph).plan(&at(1.0, 0.0), 9).unwrap_err();
    assert!(matches!(err, Error::NotFound { goal: PathId(2), .. }));
}

// ============================================================================
// 2. Session-driven scenarios
// ============================================================================

/// An L-shaped hallway: five nodes along x, then three along z.
fn hallway() -> NavigationSession {
    let session = NavigationSession::new();
    for x in 0..5 {
        session.place_path(at(x as f32 * 2.0, 0.0), 2).unwrap();
    }
    for z in 1..4 {
        session.place_path(at(8.0, z as f32 * 2.0), 2).unwrap();
    }
    session.place_room(at(9.0, 6.5), 204).unwrap();
    session.place_room(at(-1.0, 0.5), 101).unwrap();
    session.recompute_all_neighbors().unwrap();
    session
}

#[test]
fn test_route_walks_the_hallway() {
    let session = hallway();
    let route = session.find_route(&at(0.3, 0.2), 204).unwrap();

    assert_eq!(route.start(), Some(PathId(0)));
    assert_eq!(route.path_ids.last(), Some(&PathId(7)));
    assert_eq!(route.room.room_number, 204);
    assert_eq!(route.waypoints.len(), route.path_ids.len() + 1);
    assert_eq!(route.waypoints.last(), Some(&at(9.0, 6.5)));

    // every hop follows a stored edge
    let graph = session.snapshot();
    for pair in route.path_ids.windows(2) {
        let node = graph.find_path(pair[0]).unwrap().as_path().unwrap();
        assert!(node.neighbor_ids.contains(&pair[1]), "{} does not list {}", pair[0], pair[1]);
    }
}

#[test]
fn test_route_back_the_other_way() {
    let session = hallway();
    let route = session.find_route(&at(8.2, 6.1), 101).unwrap();
    assert_eq!(route.start(), Some(PathId(7)));
    assert_eq!(route.path_ids.last(), Some(&PathId(0)));
}

#[test]
fn test_route_to_room_at_start_node() {
    let session = hallway();
    let route = session.find_route(&at(-0.5, 0.0), 101).unwrap();
    assert_eq!(route.path_ids, vec![PathId(0)]);
    assert_eq!(route.segments().count(), 1);
}

#[test]
fn test_routes_need_recomputed_neighbors() {
    let session = NavigationSession::new();
    session.place_path(at(0.0, 0.0), 1).unwrap();
    session.place_path(at(1.0, 0.0), 1).unwrap();
    session.place_room(at(1.0, 1.0), 5).unwrap();

    // no adjacency yet
    assert!(matches!(session.find_route(&at(0.0, 0.0), 5), Err(Error::NotFound { .. })));

    session.recompute_all_neighbors().unwrap();
    let route = session.find_route(&at(0.0, 0.0), 5).unwrap();
    assert_eq!(route.path_ids, vec![PathId(0), PathId(1)]);
}

#[test]
fn test_asymmetric_edges_block_reverse_route() {
    // 0 and 1 pick each other; 2 is far out and picks 1, but nobody picks 2.
    let session = NavigationSession::new();
    session.place_path(at(0.0, 0.0), 1).unwrap();
    session.place_path(at(1.0, 0.0), 1).unwrap();
    session.place_path(at(10.0, 0.0), 1).unwrap();
    session.place_room(at(10.0, 1.0), 77).unwrap();
    session.place_room(at(0.0, 1.0), 11).unwrap();
    session.recompute_all_neighbors().unwrap();

    assert!(matches!(session.find_route(&at(0.0, 0.0), 77), Err(Error::NotFound { .. })));
    let route = session.find_route(&at(10.0, 0.0), 11).unwrap();
    assert_eq!(route.path_ids, vec![PathId(2), PathId(1), PathId(0)]);
}

#[test]
fn test_room_binding_ignores_later_nodes() {
    let session = NavigationSession::new();
    session.place_path(at(0.0, 0.0), 1).unwrap();
    session.place_path(at(6.0, 0.0), 1).unwrap();
    let room = session.place_room(at(4.0, 0.0), 3).unwrap();
    assert_eq!(room.as_room().unwrap().closest_path_id, PathId(1));

    session.place_path(at(4.0, 0.1), 1).unwrap();
    session.recompute_all_neighbors().unwrap();
    let graph = session.snapshot();
    assert_eq!(graph.find(room.id).unwrap().as_room().unwrap().closest_path_id, PathId(1));
}
