//! End-to-end surface actions: scripted tracking → interactor → session →
//! recording renderer / memory store.

use std::collections::VecDeque;
use std::sync::Arc;

use anchor_nav::{
    ActionOutcome, AnchorId, Error, Interactor, MemoryStore, NavigationSession, PathId, Pose,
    PoseSource, Renderer, StoreLocation, SurfaceAction,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

// ============================================================================
// Test doubles
// ============================================================================

/// Hands out queued hit-test poses one at a time; the user pose is fixed.
#[derive(Default)]
struct ScriptedPoses {
    hits: Mutex<VecDeque<Pose>>,
    user: Mutex<Option<Pose>>,
}

impl ScriptedPoses {
    fn queue_hit(&self, pose: Pose) {
        self.hits.lock().push_back(pose);
    }

    fn set_user(&self, pose: Option<Pose>) {
        *self.user.lock() = pose;
    }
}

#[async_trait]
impl PoseSource for ScriptedPoses {
    async fn current_user_pose(&self) -> Option<Pose> {
        *self.user.lock()
    }

    async fn hit_test_pose(&self) -> Option<Pose> {
        self.hits.lock().pop_front()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Draw {
    Marker(AnchorId, String),
    Clear,
    Segment(Pose, Pose),
}

#[derive(Default)]
struct RecordingRenderer {
    calls: Mutex<Vec<Draw>>,
}

impl RecordingRenderer {
    fn take(&self) -> Vec<Draw> {
        std::mem::take(&mut *self.calls.lock())
    }
}

impl Renderer for RecordingRenderer {
    fn place_marker(&self, id: AnchorId, _pose: &Pose, label: &str) {
        self.calls.lock().push(Draw::Marker(id, label.to_string()));
    }

    fn clear_markers(&self) {
        self.calls.lock().push(Draw::Clear);
    }

    fn draw_segment(&self, from: &Pose, to: &Pose) {
        self.calls.lock().push(Draw::Segment(*from, *to));
    }
}

type TestInteractor = Interactor<Arc<ScriptedPoses>, RecordingRenderer, MemoryStore>;

fn setup() -> (TestInteractor, Arc<ScriptedPoses>) {
    let poses = Arc::new(ScriptedPoses::default());
    let interactor = Interactor::new(
        Arc::new(NavigationSession::new()),
        Arc::clone(&poses),
        RecordingRenderer::default(),
        MemoryStore::new(),
    );
    (interactor, poses)
}

fn at(x: f32, z: f32) -> Pose {
    Pose::from_translation(x, 0.0, z)
}

/// Three path nodes in a row and room 12 at the far end, neighbors computed.
async fn build_map(interactor: &TestInteractor, poses: &ScriptedPoses) {
    for x in [0.0, 1.0, 2.0] {
        poses.queue_hit(at(x, 0.0));
        interactor.perform(SurfaceAction::PlacePath { degree: 2 }).await.unwrap();
    }
    poses.queue_hit(at(2.5, 0.5));
    interactor.perform(SurfaceAction::PlaceRoom { number: 12 }).await.unwrap();
    interactor.perform(SurfaceAction::RecomputeNeighbors).await.unwrap();
    interactor.renderer().take();
}

// ============================================================================
// Placement
// ============================================================================

#[tokio::test]
async fn test_place_path_draws_label() {
    let (interactor, poses) = setup();
    poses.queue_hit(at(1.0, 1.0));

    let outcome = interactor.perform(SurfaceAction::PlacePath { degree: 3 }).await.unwrap();
    let ActionOutcome::Placed(record) = outcome else {
        panic!("expected Placed, got {outcome:?}");
    };
    assert_eq!(record.pose, at(1.0, 1.0));
    assert_eq!(interactor.renderer().take(), vec![Draw::Marker(record.id, "P0:3".into())]);
}

#[tokio::test]
async fn test_place_room_draws_link() {
    let (interactor, poses) = setup();
    poses.queue_hit(at(0.0, 0.0));
    interactor.perform(SurfaceAction::PlacePath { degree: 1 }).await.unwrap();
    interactor.renderer().take();

    poses.queue_hit(at(0.5, 0.5));
    let ActionOutcome::Placed(room) =
        interactor.perform(SurfaceAction::PlaceRoom { number: 215 }).await.unwrap()
    else {
        panic!("expected Placed");
    };
    assert_eq!(interactor.renderer().take(), vec![Draw::Marker(room.id, "R215\n->0".into())]);
}

#[tokio::test]
async fn test_no_hit_is_pose_unavailable() {
    let (interactor, _poses) = setup();
    let err = interactor.perform(SurfaceAction::PlacePath { degree: 1 }).await.unwrap_err();
    assert!(matches!(err, Error::PoseUnavailable));
    assert!(interactor.session().snapshot().is_empty());
    assert!(interactor.renderer().take().is_empty());
}

#[tokio::test]
async fn test_room_without_paths_fails_cleanly() {
    let (interactor, poses) = setup();
    poses.queue_hit(at(0.0, 0.0));
    let err = interactor.perform(SurfaceAction::PlaceRoom { number: 1 }).await.unwrap_err();
    assert!(matches!(err, Error::NoCandidates));
    assert!(interactor.session().snapshot().is_empty());
}

// ============================================================================
// Recompute / save / load
// ============================================================================

#[tokio::test]
async fn test_recompute_redraws_adjacency() {
    let (interactor, poses) = setup();
    for x in [0.0, 1.0, 3.0] {
        poses.queue_hit(at(x, 0.0));
        interactor.perform(SurfaceAction::PlacePath { degree: 1 }).await.unwrap();
    }
    interactor.renderer().take();

    let outcome = interactor.perform(SurfaceAction::RecomputeNeighbors).await.unwrap();
    assert_eq!(outcome, ActionOutcome::Recomputed { updated: 3 });

    let labels: Vec<String> = interactor
        .renderer()
        .take()
        .into_iter()
        .filter_map(|d| match d {
            Draw::Marker(_, label) => Some(label),
            _ => None,
        })
        .collect();
    assert_eq!(labels, vec!["P0:[1]", "P1:[0]", "P2:[1]"]);
}

#[tokio::test]
async fn test_save_then_load_into_fresh_session() {
    let (interactor, poses) = setup();
    build_map(&interactor, &poses).await;

    let ActionOutcome::Saved { location } = interactor.perform(SurfaceAction::SaveGraph).await.unwrap() else {
        panic!("expected Saved");
    };
    assert_eq!(interactor.store().len(), 1);

    interactor.session().reset();
    let outcome = interactor.perform(SurfaceAction::LoadGraph { location }).await.unwrap();
    let ActionOutcome::Loaded(summary) = outcome else {
        panic!("expected Loaded");
    };
    assert_eq!(summary.path_nodes, 3);
    assert_eq!(summary.room_nodes, 1);

    let draws = interactor.renderer().take();
    assert_eq!(draws.first(), Some(&Draw::Clear));
    assert_eq!(draws.len(), 1 + 4);
}

#[tokio::test]
async fn test_load_missing_location_keeps_graph() {
    let (interactor, poses) = setup();
    build_map(&interactor, &poses).await;
    let before = interactor.session().snapshot();

    let err = interactor
        .perform(SurfaceAction::LoadGraph { location: StoreLocation("mem://nowhere".into()) })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::LocationNotFound(_)));
    assert_eq!(interactor.session().snapshot(), before);
}

#[tokio::test]
async fn test_load_corrupt_blob_keeps_graph() {
    let (interactor, poses) = setup();
    build_map(&interactor, &poses).await;
    let before = interactor.session().snapshot();

    let location = StoreLocation("mem://junk".into());
    interactor.store().insert(location.clone(), b"definitely not a graph".to_vec());
    let err = interactor.perform(SurfaceAction::LoadGraph { location }).await.unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
    assert_eq!(interactor.session().snapshot(), before);
    assert!(interactor.renderer().take().is_empty());
}

// ============================================================================
// Routing
// ============================================================================

#[tokio::test]
async fn test_find_route_draws_chain() {
    let (interactor, poses) = setup();
    build_map(&interactor, &poses).await;
    poses.set_user(Some(at(-0.3, 0.0)));

    let ActionOutcome::Routed(route) = interactor.perform(SurfaceAction::FindRoute { room: 12 }).await.unwrap()
    else {
        panic!("expected Routed");
    };
    // 0 lists [1, 2]
    assert_eq!(route.path_ids, vec![PathId(0), PathId(2)]);

    let draws = interactor.renderer().take();
    assert_eq!(
        draws,
        vec![
            Draw::Clear,
            Draw::Segment(at(0.0, 0.0), at(2.0, 0.0)),
            Draw::Segment(at(2.0, 0.0), at(2.5, 0.5)),
            Draw::Marker(route.room_anchor, "R12".into()),
        ]
    );
}

#[tokio::test]
async fn test_find_route_without_tracking() {
    let (interactor, poses) = setup();
    build_map(&interactor, &poses).await;
    poses.set_user(None);

    let err = interactor.perform(SurfaceAction::FindRoute { room: 12 }).await.unwrap_err();
    assert!(matches!(err, Error::PoseUnavailable));
    assert!(interactor.renderer().take().is_empty());
}

#[tokio::test]
async fn test_find_unknown_room() {
    let (interactor, poses) = setup();
    build_map(&interactor, &poses).await;
    poses.set_user(Some(at(0.0, 0.0)));

    let err = interactor.perform(SurfaceAction::FindRoute { room: 99 }).await.unwrap_err();
    assert!(matches!(err, Error::RoomNotFound(99)));
}
