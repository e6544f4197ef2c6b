//! Shared protocol definitions for the `Checked` wire format.

pub mod store;
pub mod task;
