//! Pending/done partition with the board's display ordering.

use checked_proto::task::Task;

/// Splits tasks into (pending, done) in display order.
///
/// Pending tasks sort ascending by creation time, so new tasks land at
/// the bottom of the list. Done tasks sort ascending by last update, so
/// the most recently completed task lands at the bottom of its section.
/// Ties preserve snapshot order (both sorts are stable).
#[must_use]
pub fn partition_tasks(tasks: &[Task]) -> (Vec<&Task>, Vec<&Task>) {
    let mut pending: Vec<&Task> = tasks.iter().filter(|t| !t.is_done).collect();
    let mut done: Vec<&Task> = tasks.iter().filter(|t| t.is_done).collect();
    pending.sort_by_key(|t| t.created_at);
    done.sort_by_key(|t| t.updated_at);
    (pending, done)
}
