//! Discovered instance value type

use std::fmt;

use serde::{Deserialize, Serialize};

/// An addressable member of a cluster.
///
/// Equality and hashing cover every field, so identical instances collapse in
/// a set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Instance {
    /// `host:port`
    pub hostname: String,
    pub cluster: String,
    pub is_up: bool,
}

impl Instance {
    #[must_use]
    pub fn new(hostname: impl Into<String>, cluster: impl Into<String>, is_up: bool) -> Self {
        Self {
            hostname: hostname.into(),
            cluster: cluster.into(),
            is_up,
        }
    }

    /// Build from a task host and port
    #[must_use]
    pub fn from_task(host: &str, port: u16, cluster: impl Into<String>, is_up: bool) -> Self {
        Self::new(format!("{host}:{port}"), cluster, is_up)
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_up { "up" } else { "down" };
        write!(f, "{} ({}, {})", self.hostname, self.cluster, state)
    }
}
