//! Sync server core: shared state, WebSocket handler, connection registry,
//! and snapshot broadcasting.
//!
//! The server accepts WebSocket connections, binds each to an account via
//! a `Hello` message, applies task mutations to the authoritative
//! [`TaskCollection`], acknowledges each operation to the issuing
//! connection, and pushes the account's complete task list to every one
//! of its connections after every accepted mutation.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{RwLock, mpsc};

use checked_proto::store::{self, StoreMessage};

use crate::tasks::TaskCollection;

/// Shared server state holding the connection registry and task storage.
#[derive(Default)]
pub struct SyncState {
    /// Maps owner to that account's open connections, keyed by connection id.
    connections: RwLock<HashMap<String, HashMap<u64, mpsc::UnboundedSender<Message>>>>,
    /// Source of unique connection ids.
    next_conn_id: AtomicU64,
    /// Authoritative task storage.
    pub tasks: TaskCollection,
    /// Per-owner locks serializing mutation application, snapshot
    /// computation, and enqueue. Without this, two connections mutating
    /// concurrently could enqueue an older snapshot after a newer one and
    /// a third connection would see its list regress. Entries are never
    /// removed: dropping one while a clone is held would let two
    /// connections order independently again.
    owner_locks: tokio::sync::Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl SyncState {
    /// Creates a new state with an empty registry and empty task storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection for an owner, returning its connection id.
    pub async fn register(&self, owner: &str, sender: mpsc::UnboundedSender<Message>) -> u64 {
        let conn_id = self.next_conn_id.fetch_add(1, Ordering::Relaxed);
        let mut conns = self.connections.write().await;
        conns
            .entry(owner.to_string())
            .or_default()
            .insert(conn_id, sender);
        conn_id
    }

    /// Returns the lock serializing snapshot delivery for an owner.
    async fn owner_lock(&self, owner: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.owner_locks.lock().await;
        Arc::clone(locks.entry(owner.to_string()).or_default())
    }

    /// Removes a connection from the registry.
    pub async fn unregister(&self, owner: &str, conn_id: u64) {
        let mut conns = self.connections.write().await;
        if let Some(owner_conns) = conns.get_mut(owner) {
            owner_conns.remove(&conn_id);
            if owner_conns.is_empty() {
                conns.remove(owner);
            }
        }
    }

    /// Sends a message to one connection of an owner, if still registered.
    async fn send_to_conn(&self, owner: &str, conn_id: u64, msg: &StoreMessage) {
        let conns = self.connections.read().await;
        if let Some(sender) = conns.get(owner).and_then(|c| c.get(&conn_id))
            && let Ok(bytes) = store::encode(msg)
        {
            let _ = sender.send(Message::Binary(bytes.into()));
        }
    }

    /// Pushes the owner's current full snapshot to all of its connections.
    async fn broadcast_snapshot(&self, owner: &str) {
        let tasks = self.tasks.snapshot(owner).await;
        let msg = StoreMessage::Snapshot { tasks };
        let Ok(bytes) = store::encode(&msg) else {
            tracing::error!(owner = %owner, "failed to encode snapshot");
            return;
        };
        let conns = self.connections.read().await;
        if let Some(owner_conns) = conns.get(owner) {
            for sender in owner_conns.values() {
                let _ = sender.send(Message::Binary(bytes.clone().into()));
            }
        }
    }
}

/// Handles an upgraded WebSocket connection for a single client.
///
/// The connection lifecycle:
/// 1. Wait for a `Hello` message binding the connection to an account.
/// 2. Register the connection and send `Welcome` back.
/// 3. Send the initial full snapshot.
/// 4. Enter the mutation loop: apply, reply `Ack`/`Rejected`, broadcast.
/// 5. On disconnect, unregister the connection.
pub async fn handle_socket(socket: WebSocket, state: Arc<SyncState>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let Some(owner) = wait_for_hello(&mut ws_receiver).await else {
        tracing::warn!("connection closed before hello");
        return;
    };

    tracing::info!(owner = %owner, "client connecting");

    // Channel feeding this connection's WebSocket writer.
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    // Register and enqueue Welcome plus the initial snapshot under the
    // owner lock, so a concurrent broadcast either lands before the
    // registration (and its mutation is part of the initial snapshot) or
    // is enqueued after it. Everything goes through the channel; writing
    // directly to the socket here would let a queued broadcast overtake
    // the initial snapshot.
    let lock = state.owner_lock(&owner).await;
    let conn_id = {
        let _ordering = lock.lock().await;
        let conn_id = state.register(&owner, tx).await;
        let welcome = StoreMessage::Welcome {
            owner: owner.clone(),
        };
        state.send_to_conn(&owner, conn_id, &welcome).await;
        let initial = StoreMessage::Snapshot {
            tasks: state.tasks.snapshot(&owner).await,
        };
        state.send_to_conn(&owner, conn_id, &initial).await;
        conn_id
    };

    tracing::info!(owner = %owner, conn_id = conn_id, "client registered");

    // Writer task: forwards channel messages to the WebSocket.
    let writer_owner = owner.clone();
    let mut write_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_sender.send(msg).await.is_err() {
                tracing::warn!(owner = %writer_owner, "WebSocket write failed");
                break;
            }
        }
    });

    // Reader task: applies incoming mutations.
    let reader_owner = owner.clone();
    let reader_state = Arc::clone(&state);
    let mut read_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = ws_receiver.next().await {
            match msg {
                Message::Binary(data) => {
                    handle_binary_message(&reader_owner, conn_id, &data, &reader_state).await;
                }
                Message::Close(_) => {
                    tracing::info!(owner = %reader_owner, "received close frame");
                    break;
                }
                _ => {
                    // Ignore text, ping, pong frames.
                }
            }
        }
    });

    tokio::select! {
        _ = &mut read_task => {
            write_task.abort();
        }
        _ = &mut write_task => {
            read_task.abort();
        }
    }

    state.unregister(&owner, conn_id).await;
    tracing::info!(owner = %owner, conn_id = conn_id, "client disconnected");
}

/// Waits for the first message on the WebSocket, expecting a `Hello`.
///
/// Returns the owner if a valid `Hello` is received, or `None` if the
/// connection closes or an invalid message arrives.
async fn wait_for_hello(
    receiver: &mut (impl StreamExt<Item = Result<Message, axum::Error>> + Unpin),
) -> Option<String> {
    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Binary(data) => match store::decode(&data) {
                Ok(StoreMessage::Hello { owner }) => {
                    if owner.is_empty() {
                        tracing::warn!("received Hello with empty owner");
                        return None;
                    }
                    return Some(owner);
                }
                Ok(other) => {
                    tracing::warn!(msg = ?other, "expected Hello, got different message");
                    return None;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to decode hello message");
                    return None;
                }
            },
            Message::Close(_) => return None,
            _ => {
                // Skip non-binary frames (ping/pong) before hello.
            }
        }
    }
    None
}

/// Handles a binary WebSocket message from a bound connection.
async fn handle_binary_message(owner: &str, conn_id: u64, data: &[u8], state: &Arc<SyncState>) {
    let msg = match store::decode(data) {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!(owner = %owner, error = %e, "failed to decode message");
            let error = StoreMessage::Error {
                reason: format!("undecodable message: {e}"),
            };
            state.send_to_conn(owner, conn_id, &error).await;
            return;
        }
    };

    // Mutation application, the Ack/Rejected reply, and the resulting
    // broadcast happen under the owner lock so snapshots reach every
    // connection's queue in the order they were computed.
    let lock = state.owner_lock(owner).await;
    let _ordering = lock.lock().await;

    let (op_id, result) = match msg {
        StoreMessage::Create { op_id, name } => {
            let result = state.tasks.create(owner, &name).await.map(|task| {
                tracing::debug!(owner = %owner, id = %task.id, "task created");
            });
            (op_id, result.map_err(|e| e.to_string()))
        }
        StoreMessage::Update { op_id, patch } => {
            let result = state.tasks.apply(owner, &patch).await.map(|task| {
                tracing::debug!(owner = %owner, id = %task.id, "task updated");
            });
            (op_id, result.map_err(|e| e.to_string()))
        }
        StoreMessage::Delete { op_id, id } => {
            let result = state.tasks.delete(owner, &id).await.map(|()| {
                tracing::debug!(owner = %owner, id = %id, "task deleted");
            });
            (op_id, result.map_err(|e| e.to_string()))
        }
        StoreMessage::Hello { owner: new_owner } => {
            tracing::warn!(
                owner = %owner,
                new_owner = %new_owner,
                "received duplicate Hello from bound connection"
            );
            let error = StoreMessage::Error {
                reason: "connection is already bound to an account".to_string(),
            };
            state.send_to_conn(owner, conn_id, &error).await;
            return;
        }
        other => {
            tracing::warn!(owner = %owner, msg = ?other, "unexpected message type from client");
            let error = StoreMessage::Error {
                reason: "unexpected message type".to_string(),
            };
            state.send_to_conn(owner, conn_id, &error).await;
            return;
        }
    };

    match result {
        Ok(()) => {
            state
                .send_to_conn(owner, conn_id, &StoreMessage::Ack { op_id })
                .await;
            state.broadcast_snapshot(owner).await;
        }
        Err(reason) => {
            tracing::warn!(owner = %owner, op_id = op_id, reason = %reason, "mutation rejected");
            state
                .send_to_conn(owner, conn_id, &StoreMessage::Rejected { op_id, reason })
                .await;
        }
    }
}

/// Starts the sync server on the given address and returns the bound
/// address and a join handle.
///
/// This is the primary entry point used by both `main.rs` and test code.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    start_server_with_state(addr, Arc::new(SyncState::new())).await
}

/// Starts the sync server with a pre-configured [`SyncState`].
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server_with_state(
    addr: &str,
    state: Arc<SyncState>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let app = axum::Router::new()
        .route("/ws", axum::routing::get(ws_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "sync server error");
        }
    });

    Ok((bound_addr, handle))
}

/// axum handler that upgrades an HTTP request to a WebSocket connection.
async fn ws_handler(
    ws: axum::extract::ws::WebSocketUpgrade,
    axum::extract::State(state): axum::extract::State<Arc<SyncState>>,
) -> impl axum::response::IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}
