//! Cluster names derived from marathon app ids

const SEPARATOR: char = '/';

/// Cluster name for an app id.
///
/// Drops one leading `/` and replaces every other `/` with `_`, so
/// `/payments/api` becomes `payments_api`.
#[must_use]
pub fn cluster_name(app_id: &str) -> String {
    app_id
        .strip_prefix(SEPARATOR)
        .unwrap_or(app_id)
        .replace(SEPARATOR, "_")
}

/// Registry key of the aggregate monitor for a cluster
#[must_use]
pub fn monitor_key(cluster: &str) -> String {
    format!("{cluster}_agg")
}
