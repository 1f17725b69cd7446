//! Marathon-backed instance discovery
//!
//! Each call re-reads the marathon URL from the property store, fetches the
//! app list and, for apps carrying the discovery label, their tasks. A failed
//! app-list fetch fails the whole call; a failed detail fetch only drops that
//! app.

use std::collections::HashSet;
use std::sync::Arc;

use turbine_core::properties::{instance_url_suffix_key, DynamicProperties, MARATHON_URL_PROPERTY};

use super::filter::{is_discoverable, is_healthy_task, DISCOVERY_LABEL};
use super::instance::Instance;
use super::marathon::{AppDescriptor, MarathonClient};
use super::naming::cluster_name;
use crate::error::{Error, Result};

/// Discovers monitorable instances and cluster names from marathon
pub struct InstanceDiscovery {
    client: MarathonClient,
    properties: Arc<DynamicProperties>,
}

impl InstanceDiscovery {
    #[must_use]
    pub const fn new(client: MarathonClient, properties: Arc<DynamicProperties>) -> Self {
        Self { client, properties }
    }

    /// Property store this discovery reads from and publishes into
    #[must_use]
    pub const fn properties(&self) -> &Arc<DynamicProperties> {
        &self.properties
    }

    fn base_url(&self) -> Result<String> {
        self.properties
            .get_non_empty(MARATHON_URL_PROPERTY)
            .ok_or_else(|| Error::Configuration("No configured marathon URL".to_string()))
    }

    async fn discoverable_apps(&self, base_url: &str) -> Result<Vec<AppDescriptor>> {
        let apps = self.client.list_apps(base_url).await.map_err(|e| {
            tracing::error!(url = %base_url, error = %e, "Could not get app list from marathon");
            e
        })?;

        Ok(apps
            .into_iter()
            .filter(|app| {
                let discoverable = is_discoverable(app);
                tracing::debug!(app_id = %app.id, discoverable, "Found app");
                discoverable
            })
            .collect())
    }

    /// Current set of healthy instances across all discoverable apps
    pub async fn discover_instances(&self) -> Result<HashSet<Instance>> {
        let base_url = self.base_url()?;
        let apps = self.discoverable_apps(&base_url).await?;

        let mut instances = HashSet::new();
        for app in &apps {
            let app_url = format!("{base_url}{}", app.id);
            match self.instances_for_app(app, &app_url).await {
                Ok(found) => instances.extend(found),
                Err(e) => {
                    tracing::warn!(
                        app_id = %app.id,
                        url = %app_url,
                        error = %e,
                        "Skipping app, could not fetch its tasks"
                    );
                }
            }
        }

        tracing::debug!(
            apps = apps.len(),
            instances = instances.len(),
            "Marathon instance discovery finished"
        );
        Ok(instances)
    }

    async fn instances_for_app(
        &self,
        app: &AppDescriptor,
        app_url: &str,
    ) -> Result<HashSet<Instance>> {
        let detail = self.client.fetch_app_detail(app_url).await?;

        // The detail id names the cluster, not the id from the app list
        let cluster = cluster_name(&detail.id);
        if cluster != cluster_name(&app.id) {
            tracing::warn!(
                list_id = %app.id,
                detail_id = %detail.id,
                cluster = %cluster,
                "App list and app detail disagree on the app id"
            );
        }

        let mut instances = HashSet::new();
        for task in detail.tasks.iter().filter(|task| is_healthy_task(task)) {
            let Some(port) = task.ports.first() else {
                tracing::warn!(cluster = %cluster, host = %task.host, "Healthy task exposes no ports, skipping");
                continue;
            };
            let instance = Instance::from_task(&task.host, *port, cluster.clone(), true);
            tracing::debug!(instance = %instance, "Adding instance");
            instances.insert(instance);
        }

        Ok(instances)
    }

    /// Names of all discoverable clusters, in app-list order without repeats.
    ///
    /// Also publishes each cluster's discovery label value as
    /// `turbine.instanceUrlSuffix.<cluster>` for the aggregation layer.
    pub async fn discover_clusters(&self) -> Result<Vec<String>> {
        let base_url = self.base_url()?;
        let apps = self.discoverable_apps(&base_url).await?;

        let mut seen = HashSet::new();
        let mut clusters = Vec::with_capacity(apps.len());
        for app in apps {
            let cluster = cluster_name(&app.id);

            if let Some(suffix) = app.labels.get(DISCOVERY_LABEL) {
                let key = instance_url_suffix_key(&cluster);
                tracing::info!(property = %key, value = %suffix, "Setting instance URL suffix");
                self.properties.set(key, suffix.clone());
            }

            if seen.insert(cluster.clone()) {
                tracing::info!(cluster = %cluster, app_id = %app.id, "Found app, adding cluster");
                clusters.push(cluster);
            } else {
                tracing::warn!(cluster = %cluster, app_id = %app.id, "Cluster name already claimed by another app");
            }
        }

        Ok(clusters)
    }
}
