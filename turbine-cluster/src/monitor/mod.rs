//! Per-cluster aggregate monitors and their lifecycle

pub mod aggregate;
pub mod listener;
pub mod manager;
pub mod registry;
pub mod traits;

pub use aggregate::AggregateClusterMonitor;
pub use listener::{StaticListener, NON_CRITICAL_CRITERIA, STATIC_LISTENER_NAME};
pub use manager::{ClusterMonitorManager, ClusterOutcome, OutcomeStatus};
pub use registry::{MonitorFactory, MonitorRegistry};
pub use traits::{ClusterMonitor, ClusterStats, DataHandler, MonitorState, PerformanceCriteria};
