//! Task board state: the pending/done partition, per-row edit sessions,
//! and the add-task row.

pub mod input;
pub mod manager;
pub mod partition;

pub use input::TextInput;
pub use manager::{StoreOp, TaskBoard};
pub use partition::partition_tasks;
