//! # External Collaborators
//!
//! The graph engine talks to the outside world through three seams:
//!
//! | Trait | Role |
//! |-------|------|
//! | `PoseSource` | live tracking: user pose, surface hit-test pose |
//! | `Renderer` | markers and route segments on screen |
//! | `AnchorStore` | opaque byte sink/source for saved graphs |
//!
//! ## Implementations
//!
//! | Type | Module | Description |
//! |------|--------|-------------|
//! | `MemoryStore` | here | blobs in a map, for tests/embedding |
//! | `NullRenderer` | here | drops every draw call |
//! | `FileStore` | `file` | one file per map on disk (feature `fs`) |

#[cfg(feature = "fs")]
pub mod file;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use hashbrown::HashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::model::{AnchorId, Pose};
use crate::{Error, Result};

#[cfg(feature = "fs")]
pub use file::FileStore;

// ============================================================================
// Pose source
// ============================================================================

/// Live tracking. Each call yields one fresh, immutable snapshot or `None`
/// when tracking has nothing to offer right now. Callers never retry; a
/// `None` turns into `Error::PoseUnavailable`.
#[async_trait]
pub trait PoseSource: Send + Sync {
    /// Where the user (camera) is.
    async fn current_user_pose(&self) -> Option<Pose>;

    /// Where the screen-center ray meets a detected surface.
    async fn hit_test_pose(&self) -> Option<Pose>;
}

#[async_trait]
impl<T: PoseSource + ?Sized> PoseSource for Arc<T> {
    async fn current_user_pose(&self) -> Option<Pose> {
        (**self).current_user_pose().await
    }

    async fn hit_test_pose(&self) -> Option<Pose> {
        (**self).hit_test_pose().await
    }
}

// ============================================================================
// Renderer
// ============================================================================

/// On-screen output. Failures stay inside the renderer (log and move on);
/// nothing here feeds back into the engine's error taxonomy.
pub trait Renderer: Send + Sync {
    fn place_marker(&self, id: AnchorId, pose: &Pose, label: &str);
    fn clear_markers(&self);
    fn draw_segment(&self, from: &Pose, to: &Pose);
}

impl<T: Renderer + ?Sized> Renderer for Arc<T> {
    fn place_marker(&self, id: AnchorId, pose: &Pose, label: &str) {
        (**self).place_marker(id, pose, label)
    }

    fn clear_markers(&self) {
        (**self).clear_markers()
    }

    fn draw_segment(&self, from: &Pose, to: &Pose) {
        (**self).draw_segment(from, to)
    }
}

/// Renderer that draws nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn place_marker(&self, _id: AnchorId, _pose: &Pose, _label: &str) {}
    fn clear_markers(&self) {}
    fn draw_segment(&self, _from: &Pose, _to: &Pose) {}
}

// ============================================================================
// Anchor store
// ============================================================================

/// Where a saved graph lives: a path, a blob key, whatever the store uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreLocation(pub String);

impl std::fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque byte persistence.
#[async_trait]
pub trait AnchorStore: Send + Sync {
    async fn write(&self, bytes: &[u8]) -> Result<StoreLocation>;
    async fn read(&self, location: &StoreLocation) -> Result<Vec<u8>>;
}

/// In-memory store. Every write lands under a fresh `mem://N` location.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: Mutex<HashMap<StoreLocation, Vec<u8>>>,
    next: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.lock().is_empty()
    }

    /// Put raw bytes at a chosen location, bypassing `write`.
    pub fn insert(&self, location: StoreLocation, bytes: Vec<u8>) {
        self.blobs.lock().insert(location, bytes);
    }
}

#[async_trait]
impl AnchorStore for MemoryStore {
    async fn write(&self, bytes: &[u8]) -> Result<StoreLocation> {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        let location = StoreLocation(format!("mem://{n}"));
        self.blobs.lock().insert(location.clone(), bytes.to_vec());
        Ok(location)
    }

    async fn read(&self, location: &StoreLocation) -> Result<Vec<u8>> {
        self.blobs
            .lock()
            .get(location)
            .cloned()
            .ok_or_else(|| Error::LocationNotFound(location.clone()))
    }
}
