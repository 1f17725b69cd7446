//! Which marathon apps and tasks count as monitorable instances

use super::marathon::{AppDescriptor, TaskDescriptor};

/// App label that opts an app into monitoring. Its value is the instance URL
/// suffix the aggregation layer appends to `host:port`.
pub const DISCOVERY_LABEL: &str = "turbineUrl";

/// True if the app carries the discovery label, whatever its value
#[must_use]
pub fn is_discoverable(app: &AppDescriptor) -> bool {
    app.labels.contains_key(DISCOVERY_LABEL)
}

/// True if the task's first health check reports it alive.
///
/// Tasks without health check results are treated as not yet healthy.
#[must_use]
pub fn is_healthy_task(task: &TaskDescriptor) -> bool {
    task.health_check_results
        .first()
        .is_some_and(|check| check.alive)
}
