//! Interactor — drives a session from the interactive surface.
//!
//! Each `SurfaceAction` maps 1:1 onto a session operation. The interactor
//! fetches whatever pose the action needs (one request, no retries), runs
//! the operation, then tells the renderer what changed.
//!
//! ```text
//! PlacePath { degree }   hit-test pose  → place_path       → marker "P{id}:{degree}"
//! PlaceRoom { number }   hit-test pose  → place_room       → marker "R{n}\n->{closest}"
//! RecomputeNeighbors                    → recompute        → redraw "P{id}:[..]"
//! SaveGraph                             → save → store
//! LoadGraph { location } store → load                      → redraw all
//! FindRoute { room }     user pose      → find_route       → segments + endpoint
//! ```

use std::sync::Arc;

use tracing::{info, warn};

use crate::external::{AnchorStore, PoseSource, Renderer, StoreLocation};
use crate::model::{AnchorGraph, AnchorRecord, Pose};
use crate::route::Route;
use crate::session::{GraphSummary, NavigationSession};
use crate::{Error, Result};

/// One user action on the interactive surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceAction {
    PlacePath { degree: u32 },
    PlaceRoom { number: u32 },
    RecomputeNeighbors,
    SaveGraph,
    LoadGraph { location: StoreLocation },
    FindRoute { room: u32 },
}

/// What a successful action produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Placed(AnchorRecord),
    Recomputed { updated: usize },
    Saved { location: StoreLocation },
    Loaded(GraphSummary),
    Routed(Route),
}

/// Binds a session to its live pose source, renderer and store.
pub struct Interactor<P, R, S> {
    session: Arc<NavigationSession>,
    poses: P,
    renderer: R,
    store: S,
}

impl<P, R, S> Interactor<P, R, S>
where
    P: PoseSource,
    R: Renderer,
    S: AnchorStore,
{
    pub fn new(session: Arc<NavigationSession>, poses: P, renderer: R, store: S) -> Self {
        Self { session, poses, renderer, store }
    }

    pub fn session(&self) -> &Arc<NavigationSession> {
        &self.session
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one action. A failed action leaves the graph unchanged and draws
    /// nothing.
    pub async fn perform(&self, action: SurfaceAction) -> Result<ActionOutcome> {
        let outcome = match action {
            SurfaceAction::PlacePath { degree } => {
                let pose = self.hit_test().await?;
                let record = self.session.place_path(pose, degree)?;
                self.renderer.place_marker(record.id, &record.pose, &record.placement_label());
                ActionOutcome::Placed(record)
            }
            SurfaceAction::PlaceRoom { number } => {
                let pose = self.hit_test().await?;
                let record = self.session.place_room(pose, number)?;
                self.renderer.place_marker(record.id, &record.pose, &record.placement_label());
                ActionOutcome::Placed(record)
            }
            SurfaceAction::RecomputeNeighbors => {
                let updated = self.session.recompute_all_neighbors()?;
                self.redraw(&self.session.snapshot());
                ActionOutcome::Recomputed { updated }
            }
            SurfaceAction::SaveGraph => {
                let location = self.session.save_to(&self.store).await?;
                ActionOutcome::Saved { location }
            }
            SurfaceAction::LoadGraph { location } => {
                let summary = self.session.load_from(&self.store, &location).await?;
                self.redraw(&self.session.snapshot());
                ActionOutcome::Loaded(summary)
            }
            SurfaceAction::FindRoute { room } => {
                let user = self.user_pose().await?;
                let route = self.session.find_route(&user, room)?;
                self.draw_route(&route);
                info!(room, hops = route.hops(), "route shown");
                ActionOutcome::Routed(route)
            }
        };
        Ok(outcome)
    }

    async fn hit_test(&self) -> Result<Pose> {
        self.poses.hit_test_pose().await.ok_or_else(|| {
            warn!("no surface under the reticle");
            Error::PoseUnavailable
        })
    }

    async fn user_pose(&self) -> Result<Pose> {
        self.poses.current_user_pose().await.ok_or_else(|| {
            warn!("tracking has no user pose");
            Error::PoseUnavailable
        })
    }

    /// Clear and re-place a marker for every anchor, path nodes showing
    /// their adjacency.
    fn redraw(&self, graph: &AnchorGraph) {
        self.renderer.clear_markers();
        for record in graph.records() {
            self.renderer.place_marker(record.id, &record.pose, &record.adjacency_label());
        }
    }

    fn draw_route(&self, route: &Route) {
        self.renderer.clear_markers();
        for (from, to) in route.segments() {
            self.renderer.draw_segment(from, to);
        }
        if let Some(end) = route.waypoints.last() {
            let label = format!("R{}", route.room.room_number);
            self.renderer.place_marker(route.room_anchor, end, &label);
        }
    }
}
