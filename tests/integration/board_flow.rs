//! Integration tests for the board flow: key events drive the board,
//! queued mutations hit the store, and snapshots flow back through a
//! subscription.
//!
//! Uses the in-process store so every scenario is deterministic.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use checked::app::{App, Connection, RowTarget};
use checked::board::StoreOp;
use checked::store::{LocalStore, StoreError, Subscription, TaskStore};

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        app.handle_key_event(key(KeyCode::Char(c)));
    }
}

/// Submits every queued mutation to the store and applies the resulting
/// snapshots to the board. Failures are ignored, as in the real event
/// loop.
async fn pump(app: &mut App, store: &LocalStore, sub: &mut Subscription) {
    for op in app.take_ops() {
        let result = match &op {
            StoreOp::Create { name } => store.create_task(name).await,
            StoreOp::Update(patch) => store.update_task(patch.clone()).await,
            StoreOp::Delete(id) => store.delete_task(id).await,
        };
        let _ = result;
    }
    while let Some(tasks) = sub.try_next() {
        app.board.apply_snapshot(tasks);
    }
}

fn fresh_app() -> (App, LocalStore, Subscription) {
    let store = LocalStore::new("alice");
    let mut sub = store.subscribe();
    let mut app = App::new("alice", Connection::Offline);
    // Initial snapshot moves the board out of loading.
    app.board.apply_snapshot(sub.try_next().expect("initial snapshot"));
    (app, store, sub)
}

#[tokio::test]
async fn board_loads_on_first_snapshot() {
    let store = LocalStore::new("alice");
    let mut sub = store.subscribe();
    let mut app = App::new("alice", Connection::Offline);

    assert!(app.board.is_loading());
    app.board.apply_snapshot(sub.try_next().expect("initial snapshot"));
    assert!(!app.board.is_loading());
    assert!(app.board.tasks().is_empty());
}

#[tokio::test]
async fn add_task_end_to_end() {
    let (mut app, store, mut sub) = fresh_app();

    app.handle_key_event(key(KeyCode::Char('a')));
    type_text(&mut app, "Water the plants");
    app.handle_key_event(key(KeyCode::Enter));
    pump(&mut app, &store, &mut sub).await;

    let (pending, done) = app.board.partition();
    assert_eq!(pending.len(), 1);
    assert!(done.is_empty());
    assert_eq!(pending[0].name, "Water the plants");
    assert!(!pending[0].is_done);
    assert_eq!(pending[0].due_date, None);
}

#[tokio::test]
async fn new_tasks_append_to_the_pending_section() {
    let (mut app, store, mut sub) = fresh_app();

    for name in ["first", "second", "third"] {
        app.handle_key_event(key(KeyCode::Char('a')));
        type_text(&mut app, name);
        app.handle_key_event(key(KeyCode::Enter));
        pump(&mut app, &store, &mut sub).await;
    }

    let (pending, _) = app.board.partition();
    let names: Vec<&str> = pending.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["first", "second", "third"]);
}

#[tokio::test]
async fn toggle_moves_a_task_between_sections() {
    let (mut app, store, mut sub) = fresh_app();
    store.create_task("Finish me").await.expect("create");
    pump(&mut app, &store, &mut sub).await;

    app.selected = 0;
    app.handle_key_event(key(KeyCode::Char(' ')));
    pump(&mut app, &store, &mut sub).await;

    let (pending, done) = app.board.partition();
    assert!(pending.is_empty());
    assert_eq!(done.len(), 1);
    assert!(done[0].is_done);

    // Untoggle from the done section (rows: [AddRow, Done(0)]).
    app.selected = 1;
    assert_eq!(app.selected_row(), RowTarget::Done(0));
    app.handle_key_event(key(KeyCode::Char(' ')));
    pump(&mut app, &store, &mut sub).await;

    let (pending, done) = app.board.partition();
    assert_eq!(pending.len(), 1);
    assert!(done.is_empty());
}

#[tokio::test]
async fn rename_flow_updates_the_store() {
    let (mut app, store, mut sub) = fresh_app();
    store.create_task("Old").await.expect("create");
    pump(&mut app, &store, &mut sub).await;

    app.selected = 0;
    app.handle_key_event(key(KeyCode::Char('e')));
    type_text(&mut app, " and improved");
    app.handle_key_event(key(KeyCode::Enter));
    pump(&mut app, &store, &mut sub).await;

    let (pending, _) = app.board.partition();
    assert_eq!(pending[0].name, "Old and improved");
}

#[tokio::test]
async fn due_date_set_then_cleared() {
    let (mut app, store, mut sub) = fresh_app();
    store.create_task("Dated").await.expect("create");
    pump(&mut app, &store, &mut sub).await;

    app.selected = 0;
    app.handle_key_event(key(KeyCode::Char('d')));
    type_text(&mut app, "2026-09-15");
    app.handle_key_event(key(KeyCode::Enter));
    pump(&mut app, &store, &mut sub).await;

    let (pending, _) = app.board.partition();
    assert_eq!(
        pending[0].due_date,
        chrono::NaiveDate::from_ymd_opt(2026, 9, 15)
    );

    // Clearing: open the date editor and delete the prefilled value.
    app.handle_key_event(key(KeyCode::Char('d')));
    for _ in 0.."2026-09-15".len() {
        app.handle_key_event(key(KeyCode::Backspace));
    }
    app.handle_key_event(key(KeyCode::Enter));
    pump(&mut app, &store, &mut sub).await;

    let (pending, _) = app.board.partition();
    assert_eq!(pending[0].due_date, None);
}

#[tokio::test]
async fn delete_removes_a_pending_task() {
    let (mut app, store, mut sub) = fresh_app();
    store.create_task("Doomed").await.expect("create");
    pump(&mut app, &store, &mut sub).await;

    app.selected = 0;
    app.handle_key_event(key(KeyCode::Char('x')));
    pump(&mut app, &store, &mut sub).await;

    assert!(app.board.tasks().is_empty());
}

#[tokio::test]
async fn failed_operation_leaves_the_board_unchanged() {
    let (mut app, store, mut sub) = fresh_app();
    store.create_task("Survivor").await.expect("create");
    pump(&mut app, &store, &mut sub).await;

    // Delete the task behind the board's back, then try to toggle the
    // now-stale row. The store rejects; the board keeps its last
    // snapshot until a new one arrives.
    let id = app.board.tasks()[0].id.clone();
    store.delete_task(&id).await.expect("delete");

    app.selected = 0;
    app.handle_key_event(key(KeyCode::Char(' ')));
    let ops = app.take_ops();
    assert_eq!(ops.len(), 1);
    let StoreOp::Update(patch) = &ops[0] else {
        panic!("expected update");
    };
    let err = store
        .update_task(patch.clone())
        .await
        .expect_err("stale update");
    assert!(matches!(err, StoreError::Rejected(_)));

    // The deletion snapshot is still queued; consuming it empties the
    // board, and the failed toggle produced nothing further.
    while let Some(tasks) = sub.try_next() {
        app.board.apply_snapshot(tasks);
    }
    assert!(app.board.tasks().is_empty());
}

#[tokio::test]
async fn two_rows_edit_independently_end_to_end() {
    let (mut app, store, mut sub) = fresh_app();
    store.create_task("alpha").await.expect("create");
    store.create_task("beta").await.expect("create");
    pump(&mut app, &store, &mut sub).await;

    // Edit sessions are keyed by task id; open two and commit only one.
    let (pending, _) = app.board.partition();
    let (id_a, id_b) = (pending[0].id.clone(), pending[1].id.clone());
    app.board.begin_name_edit(&id_a);
    app.board.begin_name_edit(&id_b);

    let op = app.board.commit_name_edit(&id_b).expect("rename b");
    let StoreOp::Update(patch) = op else {
        panic!("expected update");
    };
    store.update_task(patch).await.expect("update");

    // Row A's session survives row B's commit.
    assert!(app.board.name_edit(&id_a).is_some());
    assert!(app.board.name_edit(&id_b).is_none());

    while let Some(tasks) = sub.try_next() {
        app.board.apply_snapshot(tasks);
    }
    assert!(app.board.name_edit(&id_a).is_some());
}
