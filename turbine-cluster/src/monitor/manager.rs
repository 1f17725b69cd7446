//! Cluster monitor lifecycle driven by marathon discovery
//!
//! Every pass re-discovers cluster names, so clusters appearing in marathon
//! get a monitor on the next `init_all`. A failure to list apps fails the
//! pass; a failure to start one cluster's monitor is recorded and the pass
//! moves on to the next cluster.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use super::listener::StaticListener;
use super::registry::MonitorRegistry;
use super::traits::{ClusterMonitor, DataHandler};
use crate::discovery::{Instance, InstanceDiscovery};
use crate::error::Result;

/// What a lifecycle pass did to one cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    Started,
    /// Running from an earlier pass, left alone
    AlreadyRunning,
    Stopped,
    /// Start failed; the monitor and its dispatcher were stopped
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterOutcome {
    pub cluster: String,
    pub status: OutcomeStatus,
}

impl ClusterOutcome {
    fn new(cluster: &str, status: OutcomeStatus) -> Self {
        Self {
            cluster: cluster.to_string(),
            status,
        }
    }

    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failed(_))
    }
}

impl fmt::Display for ClusterOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            OutcomeStatus::Started => write!(f, "{}: started", self.cluster),
            OutcomeStatus::AlreadyRunning => write!(f, "{}: already running", self.cluster),
            OutcomeStatus::Stopped => write!(f, "{}: stopped", self.cluster),
            OutcomeStatus::Failed(reason) => write!(f, "{}: failed ({reason})", self.cluster),
        }
    }
}

/// Starts, stops and feeds the per-cluster monitors
pub struct ClusterMonitorManager {
    discovery: Arc<InstanceDiscovery>,
    registry: Arc<MonitorRegistry>,
    keep_alive: Arc<dyn DataHandler>,
}

impl ClusterMonitorManager {
    #[must_use]
    pub fn new(discovery: Arc<InstanceDiscovery>, registry: Arc<MonitorRegistry>) -> Self {
        Self {
            discovery,
            registry,
            keep_alive: Arc::new(StaticListener),
        }
    }

    #[must_use]
    pub const fn registry(&self) -> &Arc<MonitorRegistry> {
        &self.registry
    }

    /// Start a monitor for every discovered cluster
    ///
    /// Returns `Err` only when cluster names could not be discovered.
    pub async fn init_all(&self) -> Result<Vec<ClusterOutcome>> {
        let clusters = self.discovery.discover_clusters().await?;

        let outcomes: Vec<ClusterOutcome> = clusters
            .iter()
            .map(|cluster| self.init_cluster(cluster))
            .collect();

        let failed = outcomes.iter().filter(|o| o.is_failure()).count();
        tracing::info!(clusters = outcomes.len(), failed, "Cluster monitors initialized");
        Ok(outcomes)
    }

    fn init_cluster(&self, cluster: &str) -> ClusterOutcome {
        let monitor = self.registry.find_or_register(cluster);
        monitor.register_listener(self.keep_alive.clone());

        if monitor.is_running() {
            tracing::debug!(cluster = %cluster, "Monitor already running");
            return ClusterOutcome::new(cluster, OutcomeStatus::AlreadyRunning);
        }

        tracing::info!(cluster = %cluster, "Starting monitor for cluster");
        match monitor.start_monitor() {
            Ok(()) => ClusterOutcome::new(cluster, OutcomeStatus::Started),
            Err(e) => {
                tracing::warn!(cluster = %cluster, error = %e, "Could not init cluster monitor");
                Self::stop(monitor.as_ref());
                ClusterOutcome::new(cluster, OutcomeStatus::Failed(e.to_string()))
            }
        }
    }

    /// Stop the monitor and dispatcher of every discovered cluster
    pub async fn shutdown_all(&self) -> Result<Vec<ClusterOutcome>> {
        let clusters = self.discovery.discover_clusters().await?;

        let outcomes = clusters
            .iter()
            .map(|cluster| {
                let monitor = self.registry.find_or_register(cluster);
                Self::stop(monitor.as_ref());
                ClusterOutcome::new(cluster, OutcomeStatus::Stopped)
            })
            .collect::<Vec<_>>();

        tracing::info!(clusters = outcomes.len(), "Cluster monitors shut down");
        Ok(outcomes)
    }

    fn stop(monitor: &dyn ClusterMonitor) {
        monitor.stop_monitor();
        monitor.stop_dispatcher();
    }

    /// Registered monitor for `cluster`, if any. Never starts anything.
    #[must_use]
    pub fn resolve_monitor(&self, cluster: &str) -> Option<Arc<dyn ClusterMonitor>> {
        self.registry.find(cluster)
    }

    /// Hand the current instance set to the registered monitors
    ///
    /// Registered clusters missing from discovery get an empty set so their
    /// hosts are reported lost. Instances of clusters without a monitor are
    /// ignored until `init_all` registers one. Returns the number of
    /// instances discovered.
    pub async fn refresh_instances(&self) -> Result<usize> {
        let instances = self.discovery.discover_instances().await?;
        let total = instances.len();

        let mut by_cluster: HashMap<String, HashSet<Instance>> = HashMap::new();
        for instance in instances {
            by_cluster
                .entry(instance.cluster.clone())
                .or_default()
                .insert(instance);
        }

        for cluster in self.registry.cluster_names() {
            let Some(monitor) = self.registry.find(&cluster) else {
                continue;
            };
            let hosts = by_cluster.remove(&cluster).unwrap_or_default();
            tracing::debug!(cluster = %cluster, hosts = hosts.len(), "Updating monitor hosts");
            monitor.update_instances(hosts);
        }

        for (cluster, hosts) in &by_cluster {
            tracing::warn!(
                cluster = %cluster,
                hosts = hosts.len(),
                "Dropping hosts, no monitor registered for cluster"
            );
        }

        Ok(total)
    }
}
