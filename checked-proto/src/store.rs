//! Sync protocol between `Checked` clients and the store server.
//!
//! Defines the [`StoreMessage`] enum that is postcard-encoded and sent
//! over WebSocket binary frames. The protocol is snapshot-based: every
//! accepted mutation causes the server to push the owner's complete
//! current task list to all of that owner's connections. No diffs are
//! ever exposed to clients.

use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskId, TaskPatch};

/// Error type for codec encode/decode operations.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Messages exchanged between store clients and the sync server.
///
/// Mutations carry a client-assigned `op_id` so the issuing connection
/// can correlate the [`StoreMessage::Ack`] or [`StoreMessage::Rejected`]
/// reply with the operation that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreMessage {
    /// Client binds the connection to an account.
    ///
    /// Must be the first message sent after the WebSocket connection.
    /// The server responds with [`StoreMessage::Welcome`] followed by an
    /// initial [`StoreMessage::Snapshot`].
    Hello {
        /// Account id of the signed-in user.
        owner: String,
    },

    /// Server acknowledges the `Hello` (owner echoed back).
    Welcome {
        /// The account id that was bound.
        owner: String,
    },

    /// Create a new task with the given name and default fields.
    ///
    /// Identifier and timestamps are assigned by the server.
    Create {
        /// Client-assigned correlation id.
        op_id: u64,
        /// Name for the new task.
        name: String,
    },

    /// Apply a partial update; only included fields change.
    Update {
        /// Client-assigned correlation id.
        op_id: u64,
        /// The fields to change, keyed by task id.
        patch: TaskPatch,
    },

    /// Remove the task with the given identifier.
    Delete {
        /// Client-assigned correlation id.
        op_id: u64,
        /// Which task to delete.
        id: TaskId,
    },

    /// Server acknowledges a mutation.
    Ack {
        /// Correlation id of the acknowledged operation.
        op_id: u64,
    },

    /// Server rejects a mutation.
    Rejected {
        /// Correlation id of the rejected operation.
        op_id: u64,
        /// Human-readable rejection reason.
        reason: String,
    },

    /// Complete current task list for the bound owner.
    ///
    /// Pushed once after `Welcome` and again after every accepted
    /// mutation. Always a full, consistent snapshot.
    Snapshot {
        /// All tasks owned by the account.
        tasks: Vec<Task>,
    },

    /// Server reports a connection-level error.
    Error {
        /// Human-readable error description.
        reason: String,
    },
}

/// Encodes a [`StoreMessage`] into bytes using postcard.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the message cannot be serialized.
pub fn encode(msg: &StoreMessage) -> Result<Vec<u8>, CodecError> {
    postcard::to_allocvec(msg).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Decodes a [`StoreMessage`] from bytes using postcard.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the bytes cannot be deserialized.
pub fn decode(bytes: &[u8]) -> Result<StoreMessage, CodecError> {
    postcard::from_bytes(bytes).map_err(|e| CodecError::Serialization(e.to_string()))
}
