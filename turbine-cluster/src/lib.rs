//! Marathon instance discovery and per-cluster monitor lifecycle

pub mod discovery;
pub mod error;
pub mod monitor;

pub use discovery::{Instance, InstanceDiscovery, MarathonClient};
pub use error::{Error, Result};
pub use monitor::{ClusterMonitor, ClusterMonitorManager, ClusterOutcome, MonitorRegistry, OutcomeStatus};
