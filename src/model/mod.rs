//! # Anchor Graph Model
//!
//! Plain data for the navigation graph: poses, anchor records and the
//! graph container that holds them. These types cross every boundary:
//! resolver ↔ planner ↔ codec ↔ session ↔ external collaborators.
//!
//! Design rule: no distance search, no routing, no I/O here.
//! `AnchorGraph` only enforces write-time uniqueness.

pub mod pose;
pub mod anchor;
pub mod graph;

pub use pose::Pose;
pub use anchor::{
    AnchorId, AnchorKind, AnchorRecord, NeighborList, PathId, PathNode, RoomNode,
};
pub use graph::AnchorGraph;
