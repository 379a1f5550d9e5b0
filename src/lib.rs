//! # anchor-nav — Spatially-Anchored Navigation Graph
//!
//! Path and room anchors placed in a physical space, k-nearest adjacency
//! between path anchors, breadth-first routing from the user's position to
//! a room, and a portable binary encoding of the whole anchor set.
//!
//! ## Design Principles
//!
//! 1. **Model is pure data**: `AnchorGraph` stores and checks uniqueness, nothing more
//! 2. **Algorithms are functions over a snapshot**: `neighbor` and `route` never own state
//! 3. **One writer**: `NavigationSession` serializes every mutation behind one lock
//! 4. **Trait seams outward**: tracking, rendering and storage are `external` traits
//!
//! ## Quick Start
//!
//! ```rust
//! use anchor_nav::{NavigationSession, Pose};
//!
//! # fn example() -> anchor_nav::Result<()> {
//! let session = NavigationSession::new();
//! for x in [0.0, 1.0, 2.0] {
//!     session.place_path(Pose::from_translation(x, 0.0, 0.0), 2)?;
//! }
//! session.place_room(Pose::from_translation(2.0, 0.0, 1.0), 101)?;
//! session.recompute_all_neighbors()?;
//!
//! let route = session.find_route(&Pose::IDENTITY, 101)?;
//! assert_eq!(route.waypoints.len(), route.path_ids.len() + 1);
//!
//! let bytes = session.save();
//! let restored = NavigationSession::new();
//! restored.load(&bytes)?;
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Stores
//!
//! | Store | Feature | Description |
//! |-------|---------|-------------|
//! | Memory | (default) | In-memory blobs for testing/embedding |
//! | File | `fs` | One map file per directory, atomic rename |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod neighbor;
pub mod route;
pub mod codec;
pub mod session;
pub mod external;
pub mod interactor;
pub mod export;
pub mod config;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{
    AnchorGraph, AnchorId, AnchorKind, AnchorRecord, NeighborList,
    PathId, PathNode, Pose, RoomNode,
};

// ============================================================================
// Re-exports: Engine
// ============================================================================

pub use codec::{DecodeError, SnapshotHeader};
pub use route::{Route, RoutePlanner};
pub use session::{GraphSummary, NavigationSession};
pub use config::NavigationConfig;

// ============================================================================
// Re-exports: External seams
// ============================================================================

pub use external::{AnchorStore, MemoryStore, NullRenderer, PoseSource, Renderer, StoreLocation};
pub use interactor::{ActionOutcome, Interactor, SurfaceAction};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Duplicate path id {0}")]
    DuplicateId(PathId),

    #[error("Duplicate anchor identity {0}")]
    DuplicateAnchor(AnchorId),

    #[error("No route from path node {start} to path node {goal}")]
    NotFound { start: PathId, goal: PathId },

    #[error("No path anchors to choose from")]
    NoCandidates,

    #[error("Room {0} not found")]
    RoomNotFound(u32),

    #[error("Room {room_number} is ambiguous: {count} anchors share it")]
    AmbiguousRoom { room_number: u32, count: usize },

    #[error("Pose unavailable from tracking")]
    PoseUnavailable,

    #[error("Path node {0} not found")]
    PathNodeNotFound(PathId),

    #[error("Anchor {0} not found")]
    AnchorNotFound(AnchorId),

    #[error("Invalid desired degree {degree} (allowed 1..={max})")]
    InvalidDegree { degree: u32, max: u32 },

    #[error("Decode error: {reason}")]
    Decode {
        #[from]
        reason: DecodeError,
    },

    #[error("Encode error: {0}")]
    Encode(#[source] std::io::Error),

    #[error("Nothing stored at {0}")]
    LocationNotFound(StoreLocation),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
