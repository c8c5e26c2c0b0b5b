mod common;

use cadence_application::SchedulingService;
use cadence_core::agent::AgentCode;
use cadence_core::config::SchedulerSettings;
use cadence_core::member::{MembershipStatus, Seniority};
use cadence_core::session::{Session, SessionRepository, SessionSource};
use cadence_application::Repositories;
use cadence_infrastructure::{FileStore, InMemoryStore};
use chrono::{Duration, Utc};
use common::{BrokenMemberSessions, LimitedInserts, member, repositories, store_with_dana};
use std::sync::Arc;
use tempfile::TempDir;

fn service(store: &Arc<InMemoryStore>) -> SchedulingService {
    SchedulingService::new(repositories(store), &SchedulerSettings::default())
}

fn codes(sessions: &[Session]) -> Vec<AgentCode> {
    sessions.iter().map(|session| session.agent_code).collect()
}

#[tokio::test]
async fn test_new_member_gets_role_mapper_first() {
    let store = store_with_dana().await;
    let report = service(&store).run_scheduling_pass().await.unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(report.sessions_created, 1);
    assert!(report.errors.is_empty());

    let pending = store.list_pending_for_member("m-1").await.unwrap();
    assert_eq!(codes(&pending), vec![AgentCode::RoleMapper]);
    assert_eq!(pending[0].source, SessionSource::Autopilot);
}

#[tokio::test]
async fn test_pending_topic_is_not_scheduled_again() {
    let store = store_with_dana().await;
    let service = service(&store);

    service.run_scheduling_pass().await.unwrap();
    service.run_scheduling_pass().await.unwrap();

    let pending = store.list_pending_for_member("m-1").await.unwrap();
    let mut scheduled = codes(&pending);
    scheduled.sort_by_key(|code| code.order());
    assert_eq!(scheduled, vec![AgentCode::RoleMapper, AgentCode::WorkflowMapper]);
}

#[tokio::test]
async fn test_recently_completed_topic_waits_for_interval() {
    let store = store_with_dana().await;
    let mut done = Session::new(
        "m-1",
        "org-1",
        AgentCode::RoleMapper,
        SessionSource::Autopilot,
        Utc::now() - Duration::days(2),
    );
    done.mark_completed(Utc::now() - Duration::days(1)).unwrap();
    store.insert(&done).await.unwrap();

    let created = service(&store)
        .schedule_member(&member("m-1", "Dana Scully", Seniority::IndividualContributor), Utc::now())
        .await
        .unwrap();

    assert_eq!(codes(&created), vec![AgentCode::WorkflowMapper]);
}

#[tokio::test]
async fn test_member_failure_does_not_stop_the_pass() {
    let store = store_with_dana().await;
    store
        .upsert_member(member("m-2", "Fox Mulder", Seniority::Manager))
        .await;
    let mut gone = member("m-3", "Walter Skinner", Seniority::Executive);
    gone.status = MembershipStatus::Disabled;
    store.upsert_member(gone).await;

    let mut repositories = repositories(&store);
    repositories.sessions = BrokenMemberSessions::new(store.clone(), "m-2") as Arc<dyn SessionRepository>;
    let settings = SchedulerSettings {
        max_concurrency: 4,
        ..SchedulerSettings::default()
    };
    let report = SchedulingService::new(repositories, &settings)
        .run_scheduling_pass()
        .await
        .unwrap();

    assert_eq!(report.processed, 2);
    assert_eq!(report.sessions_created, 1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].member_id, "m-2");
    assert!(store.list_pending_for_member("m-3").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sessions_created_before_a_failed_insert_are_counted() {
    let store = store_with_dana().await;
    let mut repositories = repositories(&store);
    repositories.sessions = LimitedInserts::new(store.clone(), 1) as Arc<dyn SessionRepository>;
    let settings = SchedulerSettings {
        max_new_sessions_per_member: 2,
        ..SchedulerSettings::default()
    };
    let report = SchedulingService::new(repositories, &settings)
        .run_scheduling_pass()
        .await
        .unwrap();

    assert_eq!(report.sessions_created, 1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].member_id, "m-1");
    assert_eq!(store.list_pending_for_member("m-1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_corrupt_pending_session_is_reported_not_duplicated() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::new(temp_dir.path()).await.unwrap();
    store
        .upsert_member(&member("m-1", "Dana Scully", Seniority::IndividualContributor))
        .await
        .unwrap();
    let pending = Session::new("m-1", "org-1", AgentCode::Pulse, SessionSource::Manual, Utc::now());
    store.insert(&pending).await.unwrap();

    let path = temp_dir.path().join("sessions").join(format!("{}.json", pending.id));
    let content = std::fs::read_to_string(&path).unwrap();
    std::fs::write(&path, &content[..content.len() / 2]).unwrap();

    let report = SchedulingService::new(
        Repositories::from_store(Arc::new(store)),
        &SchedulerSettings::default(),
    )
    .run_scheduling_pass()
    .await
    .unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(report.sessions_created, 0);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].member_id, "m-1");
    assert_eq!(std::fs::read_dir(temp_dir.path().join("sessions")).unwrap().count(), 1);
}

#[tokio::test]
async fn test_schedule_manual() {
    let store = store_with_dana().await;
    let mut inactive = member("m-9", "Alex Krycek", Seniority::IndividualContributor);
    inactive.status = MembershipStatus::Invited;
    store.upsert_member(inactive).await;
    let service = service(&store);

    let session = service.schedule_manual("m-1", AgentCode::Pulse).await.unwrap();
    assert_eq!(session.source, SessionSource::Manual);
    assert!(session.is_pending());

    let err = service.schedule_manual("m-1", AgentCode::Pulse).await.unwrap_err();
    assert!(err.is_invalid_state());

    let err = service.schedule_manual("m-9", AgentCode::Pulse).await.unwrap_err();
    assert!(err.is_invalid_state());

    let err = service.schedule_manual("nobody", AgentCode::Pulse).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_scheduler_starts_once() {
    let store = store_with_dana().await;
    let service = Arc::new(service(&store));

    let handle = service.start_scheduler(3600).expect("first start");
    assert!(service.start_scheduler(3600).is_none());

    // The first pass runs right away
    for _ in 0..50 {
        if !store.list_pending_for_member("m-1").await.unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(store.list_pending_for_member("m-1").await.unwrap().len(), 1);
    handle.abort();
}
