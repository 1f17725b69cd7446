//! Keep-alive listener for aggregate monitors
//!
//! An aggregate monitor shuts itself down once nobody listens. Attaching this
//! permanent no-op listener keeps host connections open, so a real consumer
//! arriving later gets data that is already flowing.

use super::traits::{ClusterStats, DataHandler, PerformanceCriteria};
use crate::discovery::Instance;

pub const STATIC_LISTENER_NAME: &str = "StaticListener_For_Aggregator";

/// Non-critical, unqueued, no dedicated threads
pub const NON_CRITICAL_CRITERIA: PerformanceCriteria = PerformanceCriteria {
    is_critical: false,
    max_queue_size: 0,
    num_threads: 0,
};

/// Stateless no-op listener
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticListener;

impl DataHandler for StaticListener {
    fn name(&self) -> String {
        STATIC_LISTENER_NAME.to_string()
    }

    fn handle_data(&self, _stats: &[ClusterStats]) {}

    fn handle_host_lost(&self, _host: &Instance) {}

    fn criteria(&self) -> PerformanceCriteria {
        NON_CRITICAL_CRITERIA
    }
}
