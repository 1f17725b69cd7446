//! Marathon HTTP client
//!
//! Fetches the app list and per-app task detail from the marathon REST API.
//! One attempt per call; retry policy belongs to whoever drives the poll.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Deserializer};
use turbine_core::config::MarathonConfig;

use crate::error::{Error, Result, MAX_RESPONSE_SIZE};

/// One element of the `apps` array
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppDescriptor {
    /// Path-like app id, e.g. `/payments/api`
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: HashMap<String, String>,
}

/// A running task of an app
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDescriptor {
    pub host: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ports: Vec<u16>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub health_check_results: Vec<HealthCheckResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HealthCheckResult {
    #[serde(default)]
    pub alive: bool,
}

/// The `app` object of the detail endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppDetail {
    pub id: String,
    pub tasks: Vec<TaskDescriptor>,
}

#[derive(Debug, Deserialize)]
struct AppsResponse {
    apps: Vec<AppDescriptor>,
}

#[derive(Debug, Deserialize)]
struct AppDetailResponse {
    app: AppDetail,
}

/// Marathon may send `null` where an empty collection is meant
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Marathon REST client
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct MarathonClient {
    client: Client,
}

impl MarathonClient {
    /// Build a client whose requests are bounded by the configured timeouts
    pub fn new(config: &MarathonConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build marathon HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// `GET {base_url}` and parse the `apps` array
    pub async fn list_apps(&self, base_url: &str) -> Result<Vec<AppDescriptor>> {
        let response: AppsResponse = self.get_json(base_url).await?;
        Ok(response.apps)
    }

    /// `GET {app_url}` and parse the `app` object with its tasks
    pub async fn fetch_app_detail(&self, app_url: &str) -> Result<AppDetail> {
        let response: AppDetailResponse = self.get_json(app_url).await?;
        Ok(response.app)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        if url.trim().is_empty() {
            return Err(Error::Configuration("No configured marathon URL".to_string()));
        }

        tracing::debug!(url = %url, "Fetching from marathon");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let response = check_response(response)?;
        json_with_limit(response).await
    }
}

/// Check HTTP response status before processing body.
fn check_response(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_client_error() || status.is_server_error() {
        return Err(Error::Http {
            status,
            url: resp.url().to_string(),
        });
    }
    Ok(resp)
}

/// Read a response body with size limit and deserialize as JSON.
async fn json_with_limit<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    if let Some(cl) = response.content_length() {
        if cl > MAX_RESPONSE_SIZE as u64 {
            return Err(Error::ResponseTooLarge { size: cl });
        }
    }
    let bytes = response.bytes().await?;
    if bytes.len() > MAX_RESPONSE_SIZE {
        return Err(Error::ResponseTooLarge { size: bytes.len() as u64 });
    }
    serde_json::from_slice(&bytes).map_err(Into::into)
}
