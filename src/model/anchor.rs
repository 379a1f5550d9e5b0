//! Anchor records and their path/room metadata.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use uuid::Uuid;

use super::Pose;

/// Opaque, globally unique anchor identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnchorId(pub Uuid);

impl AnchorId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for AnchorId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AnchorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller-assigned path node identifier, unique within a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathId(pub u32);

impl std::fmt::Display for PathId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Directed adjacency of one path node. Most nodes ask for 1-3 neighbors.
pub type NeighborList = SmallVec<[PathId; 4]>;

/// A waypoint in the navigable graph.
///
/// `neighbor_ids` is directed: listing B here says nothing about whether B
/// lists this node back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathNode {
    pub id: PathId,
    pub desired_degree: u32,
    pub neighbor_ids: NeighborList,
}

impl PathNode {
    pub fn new(id: PathId, desired_degree: u32) -> Self {
        Self { id, desired_degree, neighbor_ids: NeighborList::new() }
    }

    pub fn with_neighbors(mut self, neighbors: impl IntoIterator<Item = PathId>) -> Self {
        self.neighbor_ids = neighbors.into_iter().collect();
        self
    }
}

/// A named destination bound to its nearest path node at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomNode {
    pub room_number: u32,
    pub closest_path_id: PathId,
}

/// What an anchor stands for. Exactly one variant applies.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnchorKind {
    #[default]
    Unset,
    Path(PathNode),
    Room(RoomNode),
}

impl AnchorKind {
    pub fn name(&self) -> &'static str {
        match self {
            AnchorKind::Unset => "unset",
            AnchorKind::Path(_) => "path",
            AnchorKind::Room(_) => "room",
        }
    }
}

/// The persisted unit: identity + pose + kind metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorRecord {
    pub id: AnchorId,
    pub pose: Pose,
    pub kind: AnchorKind,
}

impl AnchorRecord {
    pub fn new(pose: Pose, kind: AnchorKind) -> Self {
        Self { id: AnchorId::new(), pose, kind }
    }

    pub fn path(pose: Pose, node: PathNode) -> Self {
        Self::new(pose, AnchorKind::Path(node))
    }

    pub fn room(pose: Pose, room: RoomNode) -> Self {
        Self::new(pose, AnchorKind::Room(room))
    }

    pub fn as_path(&self) -> Option<&PathNode> {
        match &self.kind {
            AnchorKind::Path(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_room(&self) -> Option<&RoomNode> {
        match &self.kind {
            AnchorKind::Room(room) => Some(room),
            _ => None,
        }
    }

    /// On-screen label: `P{id}:{degree}` for path nodes,
    /// `R{room}\n->{closest}` for rooms.
    pub fn placement_label(&self) -> String {
        match &self.kind {
            AnchorKind::Path(node) => format!("P{}:{}", node.id, node.desired_degree),
            AnchorKind::Room(room) => format!("R{}\n->{}", room.room_number, room.closest_path_id),
            AnchorKind::Unset => String::from("-1"),
        }
    }

    /// Label once adjacency is known: `P{id}:[a, b]` for path nodes.
    pub fn adjacency_label(&self) -> String {
        match &self.kind {
            AnchorKind::Path(node) => {
                let ids: Vec<String> = node.neighbor_ids.iter().map(|id| id.to_string()).collect();
                format!("P{}:[{}]", node.id, ids.join(", "))
            }
            _ => self.placement_label(),
        }
    }
}
