//! Data access layer for the remote task store.
//!
//! Defines the [`TaskStore`] trait that all store implementations must
//! satisfy. Concrete implementations:
//! - [`remote::RemoteStore`] — WebSocket client for the sync server
//! - [`local::LocalStore`] — in-process store for offline mode and tests
//!
//! The contract is deliberately thin: four operations plus a live query.
//! A [`Subscription`] yields the complete current task list on every
//! change, starting with at least one initial full snapshot. Deliveries
//! are always full, consistent snapshots — never diffs.

pub mod local;
pub mod remote;

pub use local::LocalStore;
pub use remote::RemoteStore;

use tokio::sync::mpsc;

use checked_proto::task::{Task, TaskId, TaskPatch};

/// Errors that can occur during store operations.
///
/// The store never retries; every failure propagates to the caller of
/// the operation that produced it.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Could not establish a connection to the store.
    #[error("store connection failed: {0}")]
    Connect(String),

    /// The connection to the store has been closed.
    #[error("store connection closed")]
    ConnectionClosed,

    /// The store rejected the operation.
    #[error("operation rejected: {0}")]
    Rejected(String),
}

/// Handle to a live query registration.
///
/// Yields the owner's complete task list on every remote change. Dropping
/// the subscription cancels delivery.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<Vec<Task>>,
}

impl Subscription {
    /// Wraps a snapshot receiver. Used by store implementations.
    #[must_use]
    pub(crate) const fn new(rx: mpsc::UnboundedReceiver<Vec<Task>>) -> Self {
        Self { rx }
    }

    /// Returns the next pending snapshot without blocking, if any.
    ///
    /// Suited to poll-based event loops: call once per tick and apply
    /// every delivery in order.
    pub fn try_next(&mut self) -> Option<Vec<Task>> {
        self.rx.try_recv().ok()
    }

    /// Waits for the next snapshot. Returns `None` once the store side
    /// has gone away.
    pub async fn next(&mut self) -> Option<Vec<Task>> {
        self.rx.recv().await
    }
}

/// Async contract for the remote task collection.
///
/// All four mutations resolve once the store has acknowledged (or
/// rejected) the write. Identifier and timestamp assignment is the
/// store's responsibility — callers never fabricate either.
pub trait TaskStore: Send + Sync {
    /// Registers a live query. The subscription receives at least one
    /// initial full snapshot, then the complete current list on every
    /// subsequent change.
    fn subscribe(&self) -> Subscription;

    /// Submits a new task with the given name and default fields.
    fn create_task(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Submits a partial update keyed by identifier; only included
    /// fields change.
    fn update_task(
        &self,
        patch: TaskPatch,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Removes the task with the given identifier.
    fn delete_task(
        &self,
        id: &TaskId,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
