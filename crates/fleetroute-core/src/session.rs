//! Composition session.
//!
//! One explicit value owns everything an operator touches while composing:
//! the draw-mode flag, the lasso gesture, the job collection, the clusters
//! and the manual route. Every mutation runs to completion synchronously and
//! queues an [`Event`]; callers drain them with [`Session::drain_events`].

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::cluster::{Cluster, ClusterManager, Completion, Confirmation};
use crate::error::{LifecycleError, ValidationError};
use crate::events::Event;
use crate::geo::Coordinate;
use crate::gesture::{Circle, GestureMachine, GesturePhase};
use crate::job::Job;
use crate::route::{Route, RouteDraft, RouteMetadata};
use crate::storage::Config;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    draw_mode: bool,
    gesture: GestureMachine,
    jobs: Vec<Job>,
    clusters: ClusterManager,
    route: Route,
    #[serde(skip)]
    events: Vec<Event>,
}

impl Session {
    pub fn new(config: &Config) -> Self {
        Self {
            draw_mode: false,
            gesture: GestureMachine::new(config.gesture.min_radius_m),
            jobs: Vec::new(),
            clusters: ClusterManager::new(config.cluster.palette.clone()),
            route: Route::new(config.route.default_job_minutes),
            events: Vec::new(),
        }
    }

    /// Rebuild tunables from `config`, keeping jobs, clusters and route.
    pub fn apply_config(&mut self, config: &Config) {
        self.gesture.set_min_radius_m(config.gesture.min_radius_m);
        self.clusters.set_palette(config.cluster.palette.clone());
        self.route.set_default_job_minutes(config.route.default_job_minutes);
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn draw_mode(&self) -> bool {
        self.draw_mode
    }

    pub fn gesture(&self) -> &GestureMachine {
        &self.gesture
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn job(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn pending_jobs(&self) -> Vec<&Job> {
        self.jobs.iter().filter(|j| j.is_pending()).collect()
    }

    pub fn clusters(&self) -> &ClusterManager {
        &self.clusters
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Take all queued events.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ── Job store ────────────────────────────────────────────────────

    /// Replace the job collection with an authoritative copy.
    pub fn replace_jobs(&mut self, jobs: Vec<Job>) {
        let pending = jobs.iter().filter(|j| j.is_pending()).count();
        tracing::debug!(total = jobs.len(), pending, "jobs replaced");
        self.events.push(Event::JobsRefreshed {
            total: jobs.len(),
            pending,
            at: Utc::now(),
        });
        self.jobs = jobs;
    }

    pub fn record_sync_failure(&mut self, operation: &str, message: &str) {
        self.events.push(Event::SyncFailed {
            operation: operation.to_string(),
            message: message.to_string(),
            at: Utc::now(),
        });
    }

    // ── Drawing ──────────────────────────────────────────────────────

    /// Toggle draw mode. Turning it off cancels an in-progress gesture.
    pub fn set_draw_mode(&mut self, enabled: bool) -> bool {
        if self.draw_mode == enabled {
            return false;
        }
        if !enabled {
            self.cancel_gesture();
        }
        self.draw_mode = enabled;
        self.events.push(Event::DrawModeChanged {
            enabled,
            at: Utc::now(),
        });
        true
    }

    /// Pointer pressed. Ignored outside draw mode or while a gesture is active.
    pub fn pointer_down(&mut self, at: Coordinate) -> bool {
        if !self.draw_mode || self.gesture.is_drawing() {
            return false;
        }
        self.gesture.reset();
        if !self.gesture.press(at) {
            return false;
        }
        self.events.push(Event::GestureStarted {
            circle: Circle {
                center: at,
                radius_m: 0.0,
            },
            at: Utc::now(),
        });
        true
    }

    /// Pointer moved. Returns the live preview circle.
    pub fn pointer_move(&mut self, at: Coordinate) -> Option<Circle> {
        self.gesture.move_to(at)
    }

    /// Pointer released. Returns the cluster created from the lasso, if any.
    pub fn pointer_up(&mut self) -> Option<Cluster> {
        let radius_m = self.gesture.preview()?.radius_m;
        let committed = self.gesture.release();
        let now = Utc::now();

        let cluster = match committed {
            Some(circle) => {
                self.events.push(Event::GestureCommitted { circle, at: now });
                let cluster = self.clusters.create_cluster(circle, &self.jobs);
                match &cluster {
                    Some(c) => self.events.push(Event::ClusterCreated {
                        cluster_id: c.id.clone(),
                        number: c.number,
                        color: c.color.clone(),
                        member_ids: c.member_ids.clone(),
                        at: now,
                    }),
                    None => self.events.push(Event::ClusterEmpty { circle, at: now }),
                }
                cluster
            }
            None => {
                tracing::debug!(radius_m, "gesture below minimum radius");
                self.events.push(Event::GestureDiscarded {
                    cancelled: false,
                    radius_m,
                    at: now,
                });
                None
            }
        };

        self.gesture.reset();
        cluster
    }

    /// Abort drawing: discard any live gesture and leave draw mode.
    pub fn cancel_draw(&mut self) -> bool {
        let cancelled = self.cancel_gesture();
        let left = self.set_draw_mode(false);
        cancelled || left
    }

    fn cancel_gesture(&mut self) -> bool {
        let radius_m = match self.gesture.phase() {
            GesturePhase::Drawing { radius_m, .. } => radius_m,
            _ => return false,
        };
        self.gesture.cancel();
        self.gesture.reset();
        self.events.push(Event::GestureDiscarded {
            cancelled: true,
            radius_m,
            at: Utc::now(),
        });
        true
    }

    // ── Clusters ─────────────────────────────────────────────────────

    pub fn confirm_cluster(
        &mut self,
        cluster_id: &str,
    ) -> Result<Option<Confirmation>, LifecycleError> {
        let number = self
            .clusters
            .get(cluster_id)
            .map(|c| c.number)
            .ok_or_else(|| LifecycleError::ClusterNotFound(cluster_id.to_string()))?;
        let confirmation = self.clusters.confirm_cluster(cluster_id, &mut self.jobs)?;

        if let Some(c) = &confirmation {
            self.events.push(Event::ClusterConfirmed {
                cluster_id: c.group_id.clone(),
                number,
                grouped_ids: c.grouped.iter().map(|j| j.id.clone()).collect(),
                remaining: c.remaining.len(),
                at: Utc::now(),
            });
        }
        Ok(confirmation)
    }

    /// Resolve a display number to a cluster id.
    pub fn cluster_id_by_number(&self, number: u32) -> Result<String, LifecycleError> {
        self.clusters
            .by_number(number)
            .map(|c| c.id.clone())
            .ok_or_else(|| LifecycleError::ClusterNotFound(format!("#{number}")))
    }

    /// Complete every grouped job.
    pub fn complete_grouped(&mut self) -> Result<Completion, LifecycleError> {
        let completion = self.clusters.complete_grouped(&mut self.jobs)?;
        self.push_completed(&completion);
        Ok(completion)
    }

    /// Complete the grouped members of one cluster.
    pub fn complete_cluster(&mut self, cluster_id: &str) -> Result<Completion, LifecycleError> {
        let completion = self.clusters.complete_cluster(cluster_id, &mut self.jobs)?;
        self.push_completed(&completion);
        Ok(completion)
    }

    fn push_completed(&mut self, completion: &Completion) {
        self.events.push(Event::ClustersCompleted {
            completed_ids: completion.completed_ids.clone(),
            remaining: completion.remaining.len(),
            at: Utc::now(),
        });
    }

    /// Forget all cluster records. Job statuses are left as they are.
    pub fn clear_clusters(&mut self) -> usize {
        let count = self.clusters.clear_all();
        self.events.push(Event::ClustersCleared {
            count,
            at: Utc::now(),
        });
        count
    }

    // ── Route ────────────────────────────────────────────────────────

    /// Append a job from the collection to the route.
    pub fn add_to_route(&mut self, job_id: &str) -> Result<bool, LifecycleError> {
        let job = self
            .job(job_id)
            .cloned()
            .ok_or_else(|| LifecycleError::JobNotFound(job_id.to_string()))?;
        let added = self.route.add_job(job);
        if added {
            self.events.push(Event::RouteJobAdded {
                job_id: job_id.to_string(),
                position: self.route.len() - 1,
                at: Utc::now(),
            });
        }
        Ok(added)
    }

    pub fn remove_from_route(&mut self, job_id: &str) -> bool {
        let removed = self.route.remove_job(job_id);
        if removed {
            self.events.push(Event::RouteJobRemoved {
                job_id: job_id.to_string(),
                at: Utc::now(),
            });
        }
        removed
    }

    pub fn move_in_route(&mut self, from: usize, to: usize) -> Result<(), ValidationError> {
        self.route.move_job(from, to)?;
        if from != to {
            let job_id = self.route.jobs()[to].id.clone();
            self.events.push(Event::RouteJobMoved {
                job_id,
                from,
                to,
                at: Utc::now(),
            });
        }
        Ok(())
    }

    pub fn assign_driver(&mut self, driver_id: Option<String>) {
        self.route.assign_driver(driver_id);
    }

    pub fn assign_vehicle(&mut self, vehicle_id: Option<String>) {
        self.route.assign_vehicle(vehicle_id);
    }

    pub fn clear_route(&mut self) {
        self.route.clear();
        self.events.push(Event::RouteCleared { at: Utc::now() });
    }

    /// Validate the route for saving without side effects.
    pub fn draft_route(&self, metadata: &RouteMetadata) -> Result<RouteDraft, ValidationError> {
        self.route.draft(metadata)
    }

    pub fn mark_route_saved(&mut self, draft: &RouteDraft) {
        self.events.push(Event::RouteSaved {
            name: draft.name.clone(),
            job_count: draft.job_ids.len(),
            estimated_duration_min: draft.estimated_duration_min,
            at: Utc::now(),
        });
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}
