//! Navigation session — the single owner of one anchor graph.
//!
//! All state sits behind one `RwLock`:
//!
//! - **Writers** (`place_path`, `place_room`, `recompute_all_neighbors`,
//!   `load`, `reset`) hold the write lock for the whole read-modify-write,
//!   so neighbor recomputation never sees a half-inserted node and id
//!   assignment cannot race.
//! - **Readers** (`find_route`, `save`, `nearest_path_anchor`, `snapshot`)
//!   share the read lock.
//!
//! `load` decodes before taking the lock and only swaps under it, so a bad
//! buffer leaves the current graph untouched. No lock is held across an
//! `.await` in the store helpers.

use bytes::Bytes;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::codec;
use crate::config::NavigationConfig;
use crate::external::{AnchorStore, StoreLocation};
use crate::model::{AnchorGraph, AnchorRecord, PathId, PathNode, Pose, RoomNode};
use crate::neighbor;
use crate::route::{Route, RoutePlanner};
use crate::{Error, Result};

/// Counts describing the current graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphSummary {
    pub anchors: usize,
    pub path_nodes: usize,
    pub room_nodes: usize,
    pub next_path_id: PathId,
}

struct SessionState {
    graph: AnchorGraph,
    /// Next id handed to `place_path`. Bumped only on successful insert.
    next_path_id: u32,
}

impl SessionState {
    fn with_graph(graph: AnchorGraph) -> Self {
        let next_path_id = graph.max_path_id().map_or(0, |id| id.0.saturating_add(1));
        Self { graph, next_path_id }
    }

    fn summary(&self) -> GraphSummary {
        GraphSummary {
            anchors: self.graph.len(),
            path_nodes: self.graph.path_count(),
            room_nodes: self.graph.room_count(),
            next_path_id: PathId(self.next_path_id),
        }
    }
}

/// Orchestrates placement, adjacency, routing and persistence over one graph.
pub struct NavigationSession {
    config: NavigationConfig,
    state: RwLock<SessionState>,
}

impl NavigationSession {
    pub fn new() -> Self {
        Self::with_config(NavigationConfig::default())
    }

    pub fn with_config(config: NavigationConfig) -> Self {
        Self { config, state: RwLock::new(SessionState::with_graph(AnchorGraph::new())) }
    }

    /// Start from an existing graph; path ids continue after its highest one.
    pub fn from_graph(config: NavigationConfig, graph: AnchorGraph) -> Self {
        Self { config, state: RwLock::new(SessionState::with_graph(graph)) }
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Place a path node at `pose` with the next counter id. Its neighbor
    /// list starts empty until the next recomputation.
    pub fn place_path(&self, pose: Pose, desired_degree: u32) -> Result<AnchorRecord> {
        let max = self.config.max_desired_degree;
        if desired_degree == 0 || desired_degree > max {
            return Err(Error::InvalidDegree { degree: desired_degree, max });
        }

        let mut state = self.state.write();
        let id = PathId(state.next_path_id);
        let record = AnchorRecord::path(pose, PathNode::new(id, desired_degree));
        state.graph.insert(record.clone())?;
        state.next_path_id = state.next_path_id.saturating_add(1);

        info!(path_id = %id, desired_degree, anchor = %record.id, "path node placed");
        Ok(record)
    }

    /// Place a room at `pose`, bound for good to the path node nearest to
    /// it right now.
    pub fn place_room(&self, pose: Pose, room_number: u32) -> Result<AnchorRecord> {
        let mut state = self.state.write();
        let closest = neighbor::nearest_path_nodes(&state.graph, &pose, 1, None)
            .first()
            .map(|c| c.path_id)
            .ok_or(Error::NoCandidates)?;

        if state.graph.room_nodes().any(|(_, room)| room.room_number == room_number) {
            warn!(room_number, "room number already placed; routing to it will be ambiguous");
        }

        let record = AnchorRecord::room(pose, RoomNode { room_number, closest_path_id: closest });
        state.graph.insert(record.clone())?;

        info!(room_number, closest_path_id = %closest, anchor = %record.id, "room node placed");
        Ok(record)
    }

    /// Rebuild every path node's adjacency. Returns how many were updated.
    pub fn recompute_all_neighbors(&self) -> Result<usize> {
        let mut state = self.state.write();
        let updated = neighbor::recompute_neighbors(&mut state.graph)?;
        info!(updated, "neighbors recomputed");
        Ok(updated)
    }

    /// Replace the whole graph with a decoded one. On error the current
    /// graph is left exactly as it was.
    pub fn load(&self, bytes: &[u8]) -> Result<GraphSummary> {
        let (header, graph) = codec::decode_snapshot(bytes)?;
        for (_, node) in graph.path_nodes() {
            debug!(path_id = %node.id, neighbors = ?node.neighbor_ids, "loaded path node");
        }
        for (_, room) in graph.room_nodes() {
            debug!(room_number = room.room_number, closest_path_id = %room.closest_path_id, "loaded room node");
        }

        let mut state = self.state.write();
        *state = SessionState::with_graph(graph);
        let summary = state.summary();
        info!(
            anchors = summary.anchors,
            path_nodes = summary.path_nodes,
            room_nodes = summary.room_nodes,
            saved_at = %header.saved_at,
            "graph loaded"
        );
        Ok(summary)
    }

    /// Drop every anchor and restart path ids at 0.
    pub fn reset(&self) {
        *self.state.write() = SessionState::with_graph(AnchorGraph::new());
        info!("graph reset");
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Encode the current graph.
    pub fn save(&self) -> Bytes {
        let state = self.state.read();
        codec::encode(&state.graph)
    }

    /// Route from the path node nearest `user_pose` to `room_number`.
    pub fn find_route(&self, user_pose: &Pose, room_number: u32) -> Result<Route> {
        let state = self.state.read();
        RoutePlanner::new(&state.graph).plan(user_pose, room_number)
    }

    /// The path anchor nearest `pose`, the start a route would use.
    pub fn nearest_path_anchor(&self, pose: &Pose) -> Result<AnchorRecord> {
        let state = self.state.read();
        RoutePlanner::new(&state.graph).nearest_start(pose).cloned()
    }

    /// A copy of the current graph.
    pub fn snapshot(&self) -> AnchorGraph {
        self.state.read().graph.clone()
    }

    pub fn summary(&self) -> GraphSummary {
        self.state.read().summary()
    }

    // ========================================================================
    // Store helpers
    // ========================================================================

    /// Encode under the read lock, then hand the bytes to `store`.
    pub async fn save_to<S: AnchorStore + ?Sized>(&self, store: &S) -> Result<StoreLocation> {
        let bytes = self.save();
        let location = store.write(&bytes).await?;
        info!(%location, bytes = bytes.len(), "graph saved");
        Ok(location)
    }

    /// Fetch bytes from `store` and [`load`](Self::load) them.
    pub async fn load_from<S: AnchorStore + ?Sized>(
        &self,
        store: &S,
        location: &StoreLocation,
    ) -> Result<GraphSummary> {
        let bytes = store.read(location).await?;
        self.load(&bytes)
    }
}

impl Default for NavigationSession {
    fn default() -> Self {
        Self::new()
    }
}
