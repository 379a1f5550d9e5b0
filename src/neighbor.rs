//! Neighbor resolver — k-nearest path nodes by Euclidean distance.
//!
//! For every path node with desired degree `k`, the `k` closest OTHER path
//! nodes become its `neighbor_ids`. Full O(P²) rebuild on every call; path
//! anchors are placed by hand, so P stays small.
//!
//! ```text
//! for n in path nodes:
//!     candidates = path nodes - {n}          (by identity, not position)
//!     sort candidates by (distance, path id)
//!     n.neighbor_ids = first k
//! ```
//!
//! The resulting adjacency is directed and may be asymmetric: A can pick B
//! while B's own k nearest exclude A. That is kept as-is.

use tracing::debug;

use crate::model::{AnchorGraph, AnchorId, NeighborList, PathId, Pose};
use crate::Result;

/// One path node considered as a neighbor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub anchor_id: AnchorId,
    pub path_id: PathId,
    pub distance: f32,
}

/// The `k` path nodes closest to `origin`, ascending by distance, ties by
/// ascending path id. `exclude` drops one anchor by identity, so an anchor
/// sharing the origin's exact position is still a candidate.
pub fn nearest_path_nodes(
    graph: &AnchorGraph,
    origin: &Pose,
    k: usize,
    exclude: Option<AnchorId>,
) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = graph
        .path_nodes()
        .filter(|(rec, _)| Some(rec.id) != exclude)
        .map(|(rec, node)| Candidate {
            anchor_id: rec.id,
            path_id: node.id,
            distance: origin.distance_to(&rec.pose),
        })
        .collect();

    candidates.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.path_id.cmp(&b.path_id))
    });
    candidates.truncate(k);
    candidates
}

/// Compute fresh adjacency for every path node without touching the graph.
pub fn resolve_neighbors(graph: &AnchorGraph) -> Vec<(PathId, NeighborList)> {
    graph
        .path_nodes()
        .map(|(rec, node)| {
            let neighbors: NeighborList = nearest_path_nodes(
                graph,
                &rec.pose,
                node.desired_degree as usize,
                Some(rec.id),
            )
            .into_iter()
            .map(|c| c.path_id)
            .collect();
            debug!(path_id = %node.id, degree = node.desired_degree, ?neighbors, "resolved neighbors");
            (node.id, neighbors)
        })
        .collect()
}

/// Rebuild every path node's adjacency in place. Returns the number of
/// path nodes updated. Nothing is persisted.
pub fn recompute_neighbors(graph: &mut AnchorGraph) -> Result<usize> {
    let resolved = resolve_neighbors(graph);
    let updated = resolved.len();
    for (path_id, neighbors) in resolved {
        graph.replace_neighbors(path_id, neighbors)?;
    }
    Ok(updated)
}
