//! Integration tests for the lasso-to-route workflow.
//!
//! These drive a `Session` the way the CLI does: draw a circle, confirm the
//! captured cluster, complete it, and compose a route, with write-backs
//! going through an in-memory backend.

use fleetroute_core::sync::{MemoryBackend, Outbox, SyncBoundary};
use fleetroute_core::{
    Coordinate, Event, Job, JobStatus, RouteMetadata, Session, SessionStore,
};

fn center() -> Coordinate {
    Coordinate::new(-33.9249, 18.4241)
}

fn source_jobs() -> Vec<Job> {
    vec![
        Job::new("A", "Deliver pallets").with_location(center().destination(0.0, 50.0)),
        Job::new("B", "Install meter").with_location(center().destination(120.0, 150.0)),
        Job::new("C", "Collect returns").with_location(center().destination(240.0, 300.0)),
    ]
}

/// Press at the center, drag to `radius_m` north, release.
fn lasso(session: &mut Session, radius_m: f64) -> Option<fleetroute_core::Cluster> {
    assert!(session.pointer_down(center()));
    session.pointer_move(center().destination(0.0, radius_m));
    session.pointer_up()
}

#[test]
fn test_lasso_confirm_assigns_priorities_in_source_order() {
    let mut session = Session::default();
    session.replace_jobs(source_jobs());
    session.set_draw_mode(true);

    let cluster = lasso(&mut session, 200.0).unwrap();
    assert_eq!(cluster.number, 1);
    assert_eq!(cluster.member_ids, vec!["A", "B"]);

    let confirmation = session.confirm_cluster(&cluster.id).unwrap().unwrap();
    let ranked: Vec<(&str, Option<u32>)> = confirmation
        .grouped
        .iter()
        .map(|j| (j.id.as_str(), j.priority))
        .collect();
    assert_eq!(ranked, vec![("A", Some(1)), ("B", Some(2))]);
    assert!(confirmation
        .grouped
        .iter()
        .all(|j| j.group_id.as_deref() == Some(cluster.id.as_str())));

    assert_eq!(confirmation.remaining.len(), 1);
    assert_eq!(session.job("C").unwrap().status, JobStatus::Pending);
}

#[test]
fn test_small_circle_never_creates_cluster() {
    let mut session = Session::default();
    session.replace_jobs(source_jobs());
    session.set_draw_mode(true);
    session.drain_events();

    assert!(lasso(&mut session, 40.0).is_none());
    assert!(session.clusters().is_empty());

    let events = session.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::GestureDiscarded { cancelled: false, .. })));
    assert!(!events
        .iter()
        .any(|e| matches!(e, Event::ClusterCreated { .. } | Event::ClusterEmpty { .. })));
}

#[test]
fn test_cluster_numbers_increase_and_restart_after_clear() {
    let mut session = Session::default();
    session.replace_jobs(source_jobs());
    session.set_draw_mode(true);

    let first = lasso(&mut session, 100.0).unwrap();
    let second = lasso(&mut session, 400.0).unwrap();
    assert_eq!((first.number, second.number), (1, 2));
    assert_ne!(first.color, second.color);
    // A is already held by the first cluster
    assert_eq!(first.member_ids, vec!["A"]);
    assert_eq!(second.member_ids, vec!["B", "C"]);

    // an empty lasso does not consume a number
    session.confirm_cluster(&second.id).unwrap();
    assert!(lasso(&mut session, 400.0).is_none());
    assert_eq!(session.clusters().len(), 2);

    assert_eq!(session.clear_clusters(), 2);
    session.replace_jobs(source_jobs());
    let fresh = lasso(&mut session, 100.0).unwrap();
    assert_eq!(fresh.number, 1);
}

#[tokio::test]
async fn test_overlapping_lassos_never_write_back_empty_groups() {
    let mut session = Session::default();
    let mut boundary = SyncBoundary::new(MemoryBackend::new(source_jobs()), Outbox::in_memory());
    boundary.refresh(&mut session).await.unwrap();
    session.set_draw_mode(true);

    let small = lasso(&mut session, 100.0).unwrap();
    let large = lasso(&mut session, 200.0).unwrap();
    assert_eq!(small.member_ids, vec!["A"]);
    assert_eq!(large.member_ids, vec!["B"]);

    let second = boundary.confirm_cluster(&mut session, &large.id).await.unwrap().unwrap();
    let first = boundary.confirm_cluster(&mut session, &small.id).await.unwrap().unwrap();
    assert_eq!(second.grouped.len(), 1);
    assert_eq!(first.grouped.len(), 1);
    assert_eq!(first.grouped[0].priority, Some(1));
    assert_eq!(
        boundary.backend().calls(),
        vec!["confirm_cluster", "optimize", "confirm_cluster", "optimize"]
    );
}

#[test]
fn test_completion_leaves_other_jobs_alone() {
    let mut session = Session::default();
    session.replace_jobs(source_jobs());
    session.set_draw_mode(true);
    let cluster = lasso(&mut session, 200.0).unwrap();
    session.confirm_cluster(&cluster.id).unwrap();

    let completion = session.complete_cluster(&cluster.id).unwrap();
    assert_eq!(completion.completed_ids, vec!["A", "B"]);
    assert_eq!(session.job("A").unwrap().status, JobStatus::Completed);
    assert_eq!(session.job("A").unwrap().group_id, None);
    assert_eq!(session.job("C").unwrap().status, JobStatus::Pending);
}

#[test]
fn test_route_composition_and_estimate() {
    let mut session = Session::default();
    session.replace_jobs(vec![
        Job::new("A", "A").with_duration(20),
        Job::new("B", "B"),
        Job::new("C", "C").with_duration(15),
    ]);

    for id in ["A", "B", "C"] {
        assert!(session.add_to_route(id).unwrap());
    }
    assert!(!session.add_to_route("B").unwrap());
    assert_eq!(session.route().estimate_duration(), 65);

    session.move_in_route(0, 2).unwrap();
    assert_eq!(session.route().job_ids(), vec!["B", "C", "A"]);
    assert!(session.move_in_route(0, 3).is_err());
    assert_eq!(session.route().job_ids(), vec!["B", "C", "A"]);
}

#[tokio::test]
async fn test_full_flow_through_memory_backend() {
    let mut session = Session::default();
    let mut boundary = SyncBoundary::new(MemoryBackend::new(source_jobs()), Outbox::in_memory());
    assert_eq!(boundary.refresh(&mut session).await.unwrap(), 3);

    session.set_draw_mode(true);
    let cluster = lasso(&mut session, 200.0).unwrap();
    boundary
        .confirm_cluster(&mut session, &cluster.id)
        .await
        .unwrap();
    boundary.complete_grouped(&mut session).await.unwrap();

    let stored = boundary.backend().jobs();
    assert_eq!(stored[0].status, JobStatus::Completed);
    assert_eq!(stored[1].status, JobStatus::Completed);
    assert_eq!(stored[2].status, JobStatus::Pending);

    session.add_to_route("C").unwrap();
    let rejected = boundary
        .save_route(&mut session, &RouteMetadata::named(""))
        .await;
    assert!(rejected.is_err());
    assert!(boundary.backend().routes().is_empty());

    let draft = boundary
        .save_route(&mut session, &RouteMetadata::named("Afternoon"))
        .await
        .unwrap();
    assert_eq!(draft.job_ids, vec!["C"]);
    assert_eq!(
        boundary.backend().calls(),
        vec!["confirm_cluster", "optimize", "complete_jobs", "optimize", "save_route"]
    );
}

#[test]
fn test_session_survives_store_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::at(dir.path().join("session.json"));

    let mut session = Session::default();
    session.replace_jobs(source_jobs());
    session.set_draw_mode(true);
    let cluster = lasso(&mut session, 200.0).unwrap();
    session.add_to_route("C").unwrap();
    store.save(&session).unwrap();

    let mut loaded = store.load(&Default::default()).unwrap();
    assert!(loaded.drain_events().is_empty());
    assert!(loaded.draw_mode());
    assert_eq!(loaded.clusters().get(&cluster.id).unwrap().member_ids, vec!["A", "B"]);
    assert_eq!(loaded.route().job_ids(), vec!["C"]);
}
