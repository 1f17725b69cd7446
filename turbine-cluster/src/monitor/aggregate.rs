//! In-process aggregate monitor
//!
//! Tracks lifecycle state, listeners and the current host set for one
//! cluster. Host loss and host-count snapshots are pushed to listeners when
//! discovery hands over a new instance set.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use super::traits::{ClusterMonitor, ClusterStats, DataHandler, MonitorState};
use crate::discovery::Instance;
use crate::error::{Error, Result};

struct MonitorInner {
    state: MonitorState,
    dispatcher_running: bool,
    listeners: BTreeMap<String, Arc<dyn DataHandler>>,
    hosts: HashSet<Instance>,
}

/// Default [`ClusterMonitor`] implementation
pub struct AggregateClusterMonitor {
    cluster: String,
    inner: Mutex<MonitorInner>,
}

impl AggregateClusterMonitor {
    #[must_use]
    pub fn new(cluster: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            inner: Mutex::new(MonitorInner {
                state: MonitorState::Registered,
                dispatcher_running: false,
                listeners: BTreeMap::new(),
                hosts: HashSet::new(),
            }),
        }
    }

    /// Names of the attached listeners
    #[must_use]
    pub fn listener_names(&self) -> Vec<String> {
        self.inner.lock().listeners.keys().cloned().collect()
    }

    /// Hosts currently aggregated from
    #[must_use]
    pub fn hosts(&self) -> HashSet<Instance> {
        self.inner.lock().hosts.clone()
    }

    #[must_use]
    pub fn is_dispatching(&self) -> bool {
        self.inner.lock().dispatcher_running
    }

    fn snapshot(&self, hosts: &HashSet<Instance>) -> ClusterStats {
        let mut values = serde_json::Map::new();
        values.insert("reportingHosts".to_string(), hosts.len().into());
        values.insert(
            "hosts".to_string(),
            hosts
                .iter()
                .map(|h| serde_json::Value::String(h.hostname.clone()))
                .collect::<Vec<_>>()
                .into(),
        );
        ClusterStats {
            cluster: self.cluster.clone(),
            values,
        }
    }
}

impl ClusterMonitor for AggregateClusterMonitor {
    fn cluster(&self) -> String {
        self.cluster.clone()
    }

    fn state(&self) -> MonitorState {
        self.inner.lock().state
    }

    fn register_listener(&self, listener: Arc<dyn DataHandler>) {
        let name = listener.name();
        let mut inner = self.inner.lock();
        if inner.listeners.insert(name.clone(), listener).is_none() {
            tracing::debug!(cluster = %self.cluster, listener = %name, "Listener registered");
        }
    }

    fn start_monitor(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.listeners.is_empty() {
            return Err(Error::MonitorStart {
                cluster: self.cluster.clone(),
                reason: "no listeners registered".to_string(),
            });
        }
        inner.state = MonitorState::Started;
        inner.dispatcher_running = true;
        tracing::info!(cluster = %self.cluster, hosts = inner.hosts.len(), "Aggregate monitor started");
        Ok(())
    }

    fn stop_monitor(&self) {
        let mut inner = self.inner.lock();
        match inner.state {
            MonitorState::Started => {
                inner.state = MonitorState::Stopped;
                tracing::info!(cluster = %self.cluster, "Aggregate monitor stopped");
            }
            // Never ran, e.g. after a failed start
            MonitorState::Registered => inner.state = MonitorState::Stopped,
            MonitorState::Stopped => {}
        }
    }

    fn stop_dispatcher(&self) {
        self.inner.lock().dispatcher_running = false;
    }

    fn update_instances(&self, instances: HashSet<Instance>) {
        let (lost, listeners, stats) = {
            let mut inner = self.inner.lock();
            let lost: Vec<Instance> = inner.hosts.difference(&instances).cloned().collect();
            inner.hosts = instances;

            let stats = (inner.state == MonitorState::Started && inner.dispatcher_running)
                .then(|| self.snapshot(&inner.hosts));
            let listeners: Vec<Arc<dyn DataHandler>> = inner.listeners.values().cloned().collect();
            (lost, listeners, stats)
        };

        // Listeners run outside the lock
        for host in &lost {
            tracing::info!(cluster = %self.cluster, host = %host, "Host lost");
            for listener in &listeners {
                listener.handle_host_lost(host);
            }
        }
        if let Some(stats) = stats {
            for listener in &listeners {
                listener.handle_data(std::slice::from_ref(&stats));
            }
        }
    }
}
