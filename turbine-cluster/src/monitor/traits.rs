//! Boundary between cluster lifecycle management and the aggregation engine

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::discovery::Instance;
use crate::error::Result;

/// Lifecycle state of a registered monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorState {
    /// Created by the registry, never started
    Registered,
    Started,
    Stopped,
}

/// How much delivery effort a listener asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PerformanceCriteria {
    pub is_critical: bool,
    pub max_queue_size: usize,
    pub num_threads: usize,
}

/// Aggregated data for one cluster, handed to listeners as is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterStats {
    pub cluster: String,
    pub values: serde_json::Map<String, serde_json::Value>,
}

/// Consumer of a monitor's aggregated output
pub trait DataHandler: Send + Sync {
    /// Listeners are deduplicated by name
    fn name(&self) -> String;

    fn handle_data(&self, stats: &[ClusterStats]);

    fn handle_host_lost(&self, host: &Instance);

    fn criteria(&self) -> PerformanceCriteria;
}

/// A long-lived per-cluster aggregate monitor
pub trait ClusterMonitor: Send + Sync {
    fn cluster(&self) -> String;

    fn state(&self) -> MonitorState;

    fn is_running(&self) -> bool {
        self.state() == MonitorState::Started
    }

    /// Attach a listener; re-registering a name replaces the old listener
    fn register_listener(&self, listener: Arc<dyn DataHandler>);

    fn start_monitor(&self) -> Result<()>;

    /// Moves the monitor to `Stopped`; no-op when already stopped
    fn stop_monitor(&self);

    /// Stop delivering to listeners
    fn stop_dispatcher(&self);

    /// Replace the set of hosts the monitor aggregates from
    fn update_instances(&self, instances: HashSet<Instance>);
}
