//! Integration tests for the remote store against a real sync server.
//!
//! Starts `checked-sync` in-process on an OS-assigned port and drives it
//! through [`RemoteStore`], verifying the handshake, snapshot delivery,
//! multi-connection fan-out, and rejection handling.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;

use checked::store::{RemoteStore, StoreError, Subscription, TaskStore};
use checked_proto::task::{Task, TaskId, TaskPatch};
use checked_sync::server::start_server;

/// Generous upper bound for a local round trip.
const RECV_TIMEOUT: Duration = Duration::from_secs(5);

async fn start_test_server() -> String {
    let (addr, _handle) = start_server("127.0.0.1:0")
        .await
        .expect("failed to start test server");
    format!("ws://{addr}/ws")
}

async fn next_snapshot(sub: &mut Subscription) -> Vec<Task> {
    tokio::time::timeout(RECV_TIMEOUT, sub.next())
        .await
        .expect("timed out waiting for snapshot")
        .expect("subscription closed")
}

#[tokio::test]
async fn connect_delivers_an_initial_snapshot() {
    let url = start_test_server().await;
    let store = RemoteStore::connect(&url, "alice").await.expect("connect");

    let mut sub = store.subscribe();
    let snapshot = next_snapshot(&mut sub).await;
    assert!(snapshot.is_empty());
}

#[tokio::test]
async fn invalid_url_is_a_connect_error() {
    let err = RemoteStore::connect("not a url", "alice")
        .await
        .expect_err("should fail");
    assert!(matches!(err, StoreError::Connect(_)));
}

#[tokio::test]
async fn create_assigns_id_and_timestamps_server_side() {
    let url = start_test_server().await;
    let store = RemoteStore::connect(&url, "alice").await.expect("connect");
    let mut sub = store.subscribe();
    let _ = next_snapshot(&mut sub).await;

    store.create_task("Buy groceries").await.expect("create");
    let snapshot = next_snapshot(&mut sub).await;
    assert_eq!(snapshot.len(), 1);
    let task = &snapshot[0];
    assert_eq!(task.name, "Buy groceries");
    assert_eq!(task.owner, "alice");
    assert!(!task.is_done);
    assert_eq!(task.due_date, None);
    assert!(task.created_at > 0);
    assert_eq!(task.created_at, task.updated_at);
}

#[tokio::test]
async fn empty_name_create_is_rejected() {
    let url = start_test_server().await;
    let store = RemoteStore::connect(&url, "alice").await.expect("connect");

    let err = store.create_task("").await.expect_err("should reject");
    assert!(matches!(err, StoreError::Rejected(_)));
}

#[tokio::test]
async fn update_bumps_updated_at_monotonically() {
    let url = start_test_server().await;
    let store = RemoteStore::connect(&url, "alice").await.expect("connect");
    let mut sub = store.subscribe();
    let _ = next_snapshot(&mut sub).await;

    store.create_task("Tick").await.expect("create");
    let before = next_snapshot(&mut sub).await.remove(0);

    store
        .update_task(TaskPatch::set_done(before.id.clone(), true))
        .await
        .expect("update");
    let after = next_snapshot(&mut sub).await.remove(0);

    assert!(after.is_done);
    assert!(after.updated_at > before.updated_at);
    assert_eq!(after.created_at, before.created_at);
}

#[tokio::test]
async fn update_of_unknown_task_is_rejected() {
    let url = start_test_server().await;
    let store = RemoteStore::connect(&url, "alice").await.expect("connect");

    let err = store
        .update_task(TaskPatch::set_done(TaskId::new(), true))
        .await
        .expect_err("should reject");
    assert!(matches!(err, StoreError::Rejected(_)));
}

#[tokio::test]
async fn delete_empties_the_snapshot() {
    let url = start_test_server().await;
    let store = RemoteStore::connect(&url, "alice").await.expect("connect");
    let mut sub = store.subscribe();
    let _ = next_snapshot(&mut sub).await;

    store.create_task("Ephemeral").await.expect("create");
    let id = next_snapshot(&mut sub).await.remove(0).id;

    store.delete_task(&id).await.expect("delete");
    let snapshot = next_snapshot(&mut sub).await;
    assert!(snapshot.is_empty());
}

#[tokio::test]
async fn second_connection_sees_the_other_device_changes() {
    let url = start_test_server().await;
    let first = RemoteStore::connect(&url, "alice").await.expect("connect");
    let second = RemoteStore::connect(&url, "alice").await.expect("connect");

    let mut sub = second.subscribe();
    let _ = next_snapshot(&mut sub).await;

    first.create_task("From device one").await.expect("create");
    let snapshot = next_snapshot(&mut sub).await;
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].name, "From device one");
}

#[tokio::test]
async fn owners_are_isolated() {
    let url = start_test_server().await;
    let alice = RemoteStore::connect(&url, "alice").await.expect("connect");
    let bob = RemoteStore::connect(&url, "bob").await.expect("connect");

    alice.create_task("Alice's task").await.expect("create");

    let mut bob_sub = bob.subscribe();
    let snapshot = next_snapshot(&mut bob_sub).await;
    assert!(snapshot.is_empty());
}

#[tokio::test]
async fn late_subscriber_replays_the_cached_snapshot() {
    let url = start_test_server().await;
    let store = RemoteStore::connect(&url, "alice").await.expect("connect");

    let mut first = store.subscribe();
    let _ = next_snapshot(&mut first).await;
    store.create_task("Already here").await.expect("create");
    let _ = next_snapshot(&mut first).await;

    // A subscriber registered after the mutation still gets the latest
    // list without waiting for another change.
    let mut late = store.subscribe();
    let snapshot = next_snapshot(&mut late).await;
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].name, "Already here");
}
