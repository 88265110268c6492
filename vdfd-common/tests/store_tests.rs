//! SQLite store behavior against a real database file

use tempfile::TempDir;
use vdfd_common::models::{
    DistressIndicators, Lead, LeadInput, LeadStatus, Route, RouteInput, Waypoint,
};
use vdfd_common::store::{LocalStore, SqliteStore, SyncState};
use vdfd_common::sync::{Reconciler, RemoteOutcome};

fn lead(id: &str, user: &str, created_at: i64) -> Lead {
    let input = LeadInput {
        address: format!("{} Main St", created_at),
        lat: 40.0,
        lng: -75.0,
        estimated_value: Some(99_999.99),
        indicators: DistressIndicators {
            roof_damage: true,
            other: vec!["Vacant mailbox".into()],
            ..Default::default()
        },
        notes: "Line one\nline \"two\"".into(),
        ..Default::default()
    };
    Lead::new(id.into(), user.into(), input, created_at).unwrap()
}

fn route(id: &str, user: &str, created_at: i64) -> Route {
    let input = RouteInput {
        name: format!("Route {}", id),
        waypoints: vec![
            Waypoint::new(40.0, -75.0, "a", 1),
            Waypoint::new(40.1, -75.1, "b", 2),
        ],
        ..Default::default()
    };
    Route::new(id.into(), user.into(), input, created_at).unwrap()
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("vdfd.db");

    let original = lead("l1", "u1", 1_700_000_000_000);
    let planned = route("r1", "u1", 1_700_000_000_000);
    {
        let store = SqliteStore::open(&db_path).await.unwrap();
        store.put_lead(&original).await.unwrap();
        store.put_route(&planned).await.unwrap();
        store.pool().close().await;
    }
    assert!(db_path.exists());

    let store = SqliteStore::open(&db_path).await.unwrap();
    assert_eq!(store.get_lead("l1").await.unwrap(), Some(original));
    assert_eq!(store.get_route("r1").await.unwrap(), Some(planned));
    assert_eq!(store.get_lead("missing").await.unwrap(), None);
}

#[tokio::test]
async fn test_user_listing_is_newest_first() {
    let store = SqliteStore::in_memory().await.unwrap();
    store.put_lead(&lead("b", "u1", 2_000)).await.unwrap();
    store.put_lead(&lead("a", "u1", 3_000)).await.unwrap();
    store.put_lead(&lead("c", "u1", 2_000)).await.unwrap();
    store.put_lead(&lead("z", "u2", 9_000)).await.unwrap();

    let ids: Vec<String> = store
        .leads_for_user("u1")
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.id)
        .collect();
    assert_eq!(ids, vec!["a", "b", "c"]);

    store.put_route(&route("r1", "u1", 1_000)).await.unwrap();
    store.put_route(&route("r2", "u1", 5_000)).await.unwrap();
    let ids: Vec<String> = store
        .routes_for_user("u1")
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec!["r2", "r1"]);
}

#[tokio::test]
async fn test_put_overwrites_and_resets_sync_state() {
    let store = SqliteStore::in_memory().await.unwrap();
    let mut record = lead("l1", "u1", 1_000);
    store.put_lead(&record).await.unwrap();
    assert_eq!(store.lead_sync_state("l1").await.unwrap(), Some(SyncState::Pending));

    store.set_lead_sync_state("l1", &SyncState::Synced).await.unwrap();
    assert_eq!(store.lead_sync_state("l1").await.unwrap(), Some(SyncState::Synced));
    assert!(store.pending_leads("u1").await.unwrap().is_empty());

    record.status = LeadStatus::Closed;
    record.updated_at = 2_000;
    store.put_lead(&record).await.unwrap();
    assert_eq!(store.get_lead("l1").await.unwrap(), Some(record));
    assert_eq!(store.lead_sync_state("l1").await.unwrap(), Some(SyncState::Pending));
    assert_eq!(store.pending_leads("u1").await.unwrap().len(), 1);

    store
        .set_lead_sync_state("l1", &SyncState::Failed("timeout".into()))
        .await
        .unwrap();
    assert_eq!(
        store.lead_sync_state("l1").await.unwrap(),
        Some(SyncState::Failed("timeout".into()))
    );
    assert_eq!(store.pending_leads("u1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_reports_existence() {
    let store = SqliteStore::in_memory().await.unwrap();
    store.put_lead(&lead("l1", "u1", 1_000)).await.unwrap();
    store.put_route(&route("r1", "u1", 1_000)).await.unwrap();

    assert!(store.delete_lead("l1").await.unwrap());
    assert!(!store.delete_lead("l1").await.unwrap());
    assert_eq!(store.lead_sync_state("l1").await.unwrap(), None);

    assert!(store.delete_route("r1").await.unwrap());
    assert!(!store.delete_route("r1").await.unwrap());
}

#[tokio::test]
async fn test_local_only_push_leaves_record_pending() {
    let store = SqliteStore::in_memory().await.unwrap();
    let record = lead("l1", "u1", 1_000);
    store.put_lead(&record).await.unwrap();

    let outcome = Reconciler::local_only().push_lead(&store, &record).await;
    assert_eq!(outcome, RemoteOutcome::Skipped);
    assert_eq!(store.lead_sync_state("l1").await.unwrap(), Some(SyncState::Pending));
}
