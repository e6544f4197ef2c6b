//! WebSocket client for the sync server.
//!
//! [`RemoteStore`] connects to a `checked-sync` server, binds the
//! connection to an account via `Hello`/`Welcome`, and then runs a single
//! background task that owns the socket: it writes mutations, completes
//! per-operation acknowledgment waiters, and fans incoming snapshots out
//! to every subscriber.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;

use checked_proto::store::{self, StoreMessage};
use checked_proto::task::{Task, TaskId, TaskPatch};

use super::{StoreError, Subscription, TaskStore};

/// Commands sent from store handles to the connection task.
enum StoreCommand {
    /// Submit a mutation and report its outcome on `done`.
    Op {
        msg: StoreMessage,
        op_id: u64,
        done: oneshot::Sender<Result<(), StoreError>>,
    },
    /// Register a new snapshot subscriber.
    Subscribe(mpsc::UnboundedSender<Vec<Task>>),
}

/// Handle to a live connection to the sync server.
///
/// Cheap to share by reference; all methods take `&self`. Dropping the
/// last handle shuts the background connection task down.
#[derive(Debug)]
pub struct RemoteStore {
    cmd_tx: mpsc::UnboundedSender<StoreCommand>,
    next_op_id: AtomicU64,
}

impl RemoteStore {
    /// Connects to a sync server and binds the connection to `owner`.
    ///
    /// Performs the `Hello`/`Welcome` handshake before returning, then
    /// spawns the background connection task. The initial snapshot is
    /// delivered through subscriptions, not here.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connect`] if the URL is invalid, the
    /// connection fails, or the handshake does not complete.
    pub async fn connect(url: &str, owner: &str) -> Result<Self, StoreError> {
        let parsed = url::Url::parse(url).map_err(|e| StoreError::Connect(e.to_string()))?;

        let (mut ws, _) = tokio_tungstenite::connect_async(parsed.as_str())
            .await
            .map_err(|e| StoreError::Connect(e.to_string()))?;

        let hello = StoreMessage::Hello {
            owner: owner.to_string(),
        };
        let bytes = store::encode(&hello).map_err(|e| StoreError::Connect(e.to_string()))?;
        ws.send(Message::Binary(bytes.into()))
            .await
            .map_err(|e| StoreError::Connect(e.to_string()))?;

        // Wait for the Welcome acknowledgment before handing the socket
        // to the background task.
        loop {
            let Some(frame) = ws.next().await else {
                return Err(StoreError::Connect("connection closed during handshake".into()));
            };
            let frame = frame.map_err(|e| StoreError::Connect(e.to_string()))?;
            match frame {
                Message::Binary(data) => match store::decode(&data) {
                    Ok(StoreMessage::Welcome { .. }) => break,
                    Ok(other) => {
                        return Err(StoreError::Connect(format!(
                            "expected Welcome, got {other:?}"
                        )));
                    }
                    Err(e) => return Err(StoreError::Connect(e.to_string())),
                },
                Message::Close(_) => {
                    return Err(StoreError::Connect("connection closed during handshake".into()));
                }
                _ => {
                    // Skip ping/pong frames during the handshake.
                }
            }
        }

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        tokio::spawn(connection_task(ws, cmd_rx));

        tracing::info!(url = %url, owner = %owner, "connected to sync server");

        Ok(Self {
            cmd_tx,
            next_op_id: AtomicU64::new(1),
        })
    }

    /// Submits a mutation and waits for the server's ack.
    async fn submit(
        &self,
        op_id: u64,
        msg: StoreMessage,
    ) -> Result<(), StoreError> {
        let (done_tx, done_rx) = oneshot::channel();
        self.cmd_tx
            .send(StoreCommand::Op {
                msg,
                op_id,
                done: done_tx,
            })
            .map_err(|_| StoreError::ConnectionClosed)?;
        done_rx.await.map_err(|_| StoreError::ConnectionClosed)?
    }

    /// Allocates the next operation correlation id.
    fn next_op_id(&self) -> u64 {
        self.next_op_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl TaskStore for RemoteStore {
    fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        // If the connection task is gone the subscription simply yields
        // nothing; the caller observes a silent end of deliveries.
        let _ = self.cmd_tx.send(StoreCommand::Subscribe(tx));
        Subscription::new(rx)
    }

    async fn create_task(&self, name: &str) -> Result<(), StoreError> {
        let op_id = self.next_op_id();
        self.submit(
            op_id,
            StoreMessage::Create {
                op_id,
                name: name.to_string(),
            },
        )
        .await
    }

    async fn update_task(&self, patch: TaskPatch) -> Result<(), StoreError> {
        let op_id = self.next_op_id();
        self.submit(op_id, StoreMessage::Update { op_id, patch }).await
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), StoreError> {
        let op_id = self.next_op_id();
        self.submit(
            op_id,
            StoreMessage::Delete {
                op_id,
                id: id.clone(),
            },
        )
        .await
    }
}

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Background task owning the WebSocket connection.
///
/// Multiplexes outgoing mutations with incoming frames. Snapshots are
/// cached so late subscribers still receive the latest full list, and
/// fanned out to every live subscriber. Pending acknowledgment waiters
/// are completed by `op_id`; on disconnect they all fail with
/// [`StoreError::ConnectionClosed`].
async fn connection_task(mut ws: WsStream, mut cmd_rx: mpsc::UnboundedReceiver<StoreCommand>) {
    let mut pending: HashMap<u64, oneshot::Sender<Result<(), StoreError>>> = HashMap::new();
    let mut subscribers: Vec<mpsc::UnboundedSender<Vec<Task>>> = Vec::new();
    let mut last_snapshot: Option<Vec<Task>> = None;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                None => {
                    // All store handles dropped: tear the connection down.
                    let _ = ws.send(Message::Close(None)).await;
                    break;
                }
                Some(StoreCommand::Subscribe(tx)) => {
                    // Replay the latest snapshot so every subscriber gets
                    // at least one initial full delivery.
                    if let Some(snapshot) = &last_snapshot {
                        let _ = tx.send(snapshot.clone());
                    }
                    subscribers.push(tx);
                }
                Some(StoreCommand::Op { msg, op_id, done }) => {
                    match store::encode(&msg) {
                        Ok(bytes) => {
                            if ws.send(Message::Binary(bytes.into())).await.is_err() {
                                let _ = done.send(Err(StoreError::ConnectionClosed));
                                break;
                            }
                            pending.insert(op_id, done);
                        }
                        Err(e) => {
                            let _ = done.send(Err(StoreError::Rejected(e.to_string())));
                        }
                    }
                }
            },
            frame = ws.next() => {
                let Some(Ok(frame)) = frame else {
                    tracing::warn!("sync connection closed");
                    break;
                };
                match frame {
                    Message::Binary(data) => {
                        handle_frame(&data, &mut pending, &mut subscribers, &mut last_snapshot);
                    }
                    Message::Close(_) => {
                        tracing::info!("sync server sent close frame");
                        break;
                    }
                    _ => {
                        // Ignore text, ping, pong frames.
                    }
                }
            }
        }
    }

    for (_, done) in pending.drain() {
        let _ = done.send(Err(StoreError::ConnectionClosed));
    }
}

/// Dispatches one decoded server frame.
fn handle_frame(
    data: &[u8],
    pending: &mut HashMap<u64, oneshot::Sender<Result<(), StoreError>>>,
    subscribers: &mut Vec<mpsc::UnboundedSender<Vec<Task>>>,
    last_snapshot: &mut Option<Vec<Task>>,
) {
    let msg = match store::decode(data) {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!(error = %e, "failed to decode server message");
            return;
        }
    };

    match msg {
        StoreMessage::Snapshot { tasks } => {
            subscribers.retain(|tx| tx.send(tasks.clone()).is_ok());
            *last_snapshot = Some(tasks);
        }
        StoreMessage::Ack { op_id } => {
            if let Some(done) = pending.remove(&op_id) {
                let _ = done.send(Ok(()));
            }
        }
        StoreMessage::Rejected { op_id, reason } => {
            if let Some(done) = pending.remove(&op_id) {
                let _ = done.send(Err(StoreError::Rejected(reason)));
            }
        }
        StoreMessage::Error { reason } => {
            tracing::warn!(reason = %reason, "sync server reported error");
        }
        other => {
            tracing::warn!(msg = ?other, "unexpected message from sync server");
        }
    }
}
