//! Instance discovery from the marathon control plane

pub mod filter;
pub mod instance;
pub mod marathon;
pub mod naming;
pub mod service;

pub use filter::{is_discoverable, is_healthy_task, DISCOVERY_LABEL};
pub use instance::Instance;
pub use marathon::{AppDescriptor, AppDetail, HealthCheckResult, MarathonClient, TaskDescriptor};
pub use naming::{cluster_name, monitor_key};
pub use service::InstanceDiscovery;
