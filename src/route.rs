//! Route planner — breadth-first search over directed path adjacency.
//!
//! A route is resolved in three steps:
//!
//! 1. **Start**: the path anchor nearest the user's translation
//!    (linear scan, first encountered wins a tie).
//! 2. **Destination**: the single room anchor with the requested number.
//! 3. **Search**: BFS from the start along `neighbor_ids` until the node
//!    equal to the room's `closest_path_id` is dequeued.
//!
//! The id path is then materialized as poses with the room anchor's own
//! pose appended, so the renderer can draw a closed chain of segments.

use std::collections::VecDeque;

use hashbrown::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::model::{AnchorGraph, AnchorId, AnchorRecord, PathId, Pose, RoomNode};
use crate::{Error, Result};

/// A planned route ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub room: RoomNode,
    pub room_anchor: AnchorId,
    /// Path node ids from the start node to the room's linked node.
    pub path_ids: Vec<PathId>,
    /// One pose per path id, then the room anchor's pose.
    pub waypoints: Vec<Pose>,
}

impl Route {
    pub fn start(&self) -> Option<PathId> {
        self.path_ids.first().copied()
    }

    /// Number of path-to-path hops.
    pub fn hops(&self) -> usize {
        self.path_ids.len().saturating_sub(1)
    }

    /// Consecutive waypoint pairs, one per segment to draw.
    pub fn segments(&self) -> impl Iterator<Item = (&Pose, &Pose)> {
        self.waypoints.windows(2).map(|w| (&w[0], &w[1]))
    }
}

/// Read-only planner over one graph snapshot.
pub struct RoutePlanner<'g> {
    graph: &'g AnchorGraph,
}

impl<'g> RoutePlanner<'g> {
    pub fn new(graph: &'g AnchorGraph) -> Self {
        Self { graph }
    }

    /// Minimum-hop id path from `start` to `destination.closest_path_id`.
    ///
    /// Fails with `NotFound` when either endpoint is missing from the graph
    /// or the goal is unreachable along directed edges.
    pub fn route(&self, start: PathId, destination: &RoomNode) -> Result<Vec<PathId>> {
        let goal = destination.closest_path_id;
        let not_found = || Error::NotFound { start, goal };

        if !self.graph.contains_path(start) || !self.graph.contains_path(goal) {
            return Err(not_found());
        }

        let mut queue = VecDeque::from([start]);
        let mut visited: HashSet<PathId> = HashSet::from([start]);
        let mut parents: HashMap<PathId, PathId> = HashMap::new();

        while let Some(current) = queue.pop_front() {
            if current == goal {
                return Ok(reconstruct(start, goal, &parents));
            }

            let Some(node) = self.graph.find_path(current).and_then(AnchorRecord::as_path) else {
                continue;
            };
            for &next in &node.neighbor_ids {
                if visited.contains(&next) {
                    continue;
                }
                if !self.graph.contains_path(next) {
                    warn!(from = %current, missing = %next, "skipping dangling neighbor id");
                    continue;
                }
                visited.insert(next);
                parents.insert(next, current);
                queue.push_back(next);
            }
        }

        Err(not_found())
    }

    /// The path anchor closest to `user`. First encountered wins a tie.
    pub fn nearest_start(&self, user: &Pose) -> Result<&'g AnchorRecord> {
        let mut best: Option<(&'g AnchorRecord, f32)> = None;
        for (rec, _) in self.graph.path_nodes() {
            let distance = user.distance_to(&rec.pose);
            if best.is_none_or(|(_, shortest)| distance < shortest) {
                best = Some((rec, distance));
            }
        }
        best.map(|(rec, _)| rec).ok_or(Error::NoCandidates)
    }

    /// The unique room anchor numbered `room_number`.
    pub fn destination(&self, room_number: u32) -> Result<&'g AnchorRecord> {
        let mut matches = self
            .graph
            .room_nodes()
            .filter(|(_, room)| room.room_number == room_number)
            .map(|(rec, _)| rec);

        let first = matches.next().ok_or(Error::RoomNotFound(room_number))?;
        let extra = matches.count();
        if extra > 0 {
            return Err(Error::AmbiguousRoom { room_number, count: extra + 1 });
        }
        Ok(first)
    }

    /// Pose of every path id in order, then the room anchor's pose.
    pub fn waypoints(&self, path_ids: &[PathId], room_anchor: &AnchorRecord) -> Vec<Pose> {
        path_ids
            .iter()
            .filter_map(|id| self.graph.find_path(*id).map(|rec| rec.pose))
            .chain(std::iter::once(room_anchor.pose))
            .collect()
    }

    /// Start selection, destination resolution, search and materialization.
    pub fn plan(&self, user: &Pose, room_number: u32) -> Result<Route> {
        let start_anchor = self.nearest_start(user)?;
        let room_anchor = self.destination(room_number)?;
        let (Some(start), Some(room)) = (start_anchor.as_path(), room_anchor.as_room()) else {
            // both lookups only return anchors of the matching kind
            return Err(Error::NoCandidates);
        };

        let path_ids = self.route(start.id, room)?;
        debug!(room_number, start = %start.id, hops = path_ids.len().saturating_sub(1), "route planned");

        Ok(Route {
            room: *room,
            room_anchor: room_anchor.id,
            waypoints: self.waypoints(&path_ids, room_anchor),
            path_ids,
        })
    }
}

fn reconstruct(start: PathId, goal: PathId, parents: &HashMap<PathId, PathId>) -> Vec<PathId> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        match parents.get(&current) {
            Some(&parent) => {
                path.push(parent);
                current = parent;
            }
            None => break,
        }
    }
    path.reverse();
    path
}
