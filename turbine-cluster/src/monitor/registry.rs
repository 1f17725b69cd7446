// Monitor Registry
//
// Name-keyed table of cluster monitors with atomic find-or-register

use dashmap::DashMap;
use std::sync::Arc;

use super::aggregate::AggregateClusterMonitor;
use super::traits::ClusterMonitor;
use crate::discovery::monitor_key;

/// Monitor factory function type, called with the cluster name
pub type MonitorFactory = Box<dyn Fn(&str) -> Arc<dyn ClusterMonitor> + Send + Sync>;

/// Registry of per-cluster monitors
///
/// Monitors live as long as the registry. Lookups for the same cluster always
/// return the same monitor, also under concurrent first lookups.
pub struct MonitorRegistry {
    factory: MonitorFactory,
    /// Monitors by `monitor_key(cluster)`
    monitors: DashMap<String, Arc<dyn ClusterMonitor>>,
}

impl MonitorRegistry {
    /// Create a registry that builds monitors with `factory`
    pub fn new(factory: MonitorFactory) -> Self {
        Self {
            factory,
            monitors: DashMap::new(),
        }
    }

    /// Registry producing [`AggregateClusterMonitor`]s
    #[must_use]
    pub fn with_aggregate_monitors() -> Self {
        Self::new(Box::new(|cluster: &str| -> Arc<dyn ClusterMonitor> {
            Arc::new(AggregateClusterMonitor::new(cluster))
        }))
    }

    /// Return the monitor for `cluster`, creating it on first use
    pub fn find_or_register(&self, cluster: &str) -> Arc<dyn ClusterMonitor> {
        // The entry guard holds the shard lock until the monitor is inserted
        self.monitors
            .entry(monitor_key(cluster))
            .or_insert_with(|| {
                tracing::info!(cluster = %cluster, "Registering aggregate monitor");
                (self.factory)(cluster)
            })
            .value()
            .clone()
    }

    /// Lookup only, never creates
    pub fn find(&self, cluster: &str) -> Option<Arc<dyn ClusterMonitor>> {
        self.monitors
            .get(&monitor_key(cluster))
            .map(|entry| entry.value().clone())
    }

    /// Clusters with a registered monitor
    pub fn cluster_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .monitors
            .iter()
            .map(|entry| entry.value().cluster())
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

impl Default for MonitorRegistry {
    fn default() -> Self {
        Self::with_aggregate_monitors()
    }
}
