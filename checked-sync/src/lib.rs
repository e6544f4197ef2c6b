//! `Checked` sync server library.
//!
//! Exposes the sync server for use in tests and embedding. The server
//! accepts WebSocket connections, binds each to an account, applies task
//! mutations to the authoritative collection, and pushes full snapshots
//! to every connection of the affected account.

pub mod config;
pub mod server;
pub mod tasks;
