//! Discovery against a mocked marathon API
//!
//! Run with: cargo test -p turbine-cluster --test discovery_integration

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use turbine_cluster::discovery::{Instance, InstanceDiscovery, MarathonClient};
use turbine_cluster::monitor::{AggregateClusterMonitor, ClusterMonitor, ClusterMonitorManager, MonitorRegistry};
use turbine_cluster::error::MAX_RESPONSE_SIZE;
use turbine_cluster::Error;
use turbine_core::config::MarathonConfig;
use turbine_core::properties::{DynamicProperties, INSTANCE_URL_SUFFIX_PREFIX, MARATHON_URL_PROPERTY};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_json(server: &MockServer, at: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn discovery_for(server: &MockServer) -> (InstanceDiscovery, Arc<DynamicProperties>) {
    let properties = Arc::new(DynamicProperties::new());
    properties.set(MARATHON_URL_PROPERTY, format!("{}/v2/apps", server.uri()));
    let client = MarathonClient::new(&MarathonConfig::default()).expect("client");
    (InstanceDiscovery::new(client, properties.clone()), properties)
}

fn task(host: &str, ports: &[u16], checks: &[bool]) -> serde_json::Value {
    json!({
        "host": host,
        "ports": ports,
        "healthCheckResults": checks.iter().map(|alive| json!({ "alive": alive })).collect::<Vec<_>>(),
    })
}

#[tokio::test]
async fn test_only_labelled_apps_contribute_instances() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/v2/apps",
        json!({ "apps": [
            { "id": "/web/api", "labels": { "turbineUrl": ":8080/hystrix.stream" } },
            { "id": "/batch", "labels": { "team": "data" } },
        ]}),
    )
    .await;
    mount_json(
        &server,
        "/v2/apps/web/api",
        json!({ "app": { "id": "/web/api", "tasks": [
            task("10.0.0.1", &[31000, 31001], &[true]),
            task("10.0.0.1", &[31000, 31001], &[true, false]),
            task("10.0.0.2", &[31005, 31002], &[true]),
            task("10.0.0.3", &[31000], &[false, true]),
            task("10.0.0.4", &[31000], &[]),
        ]}}),
    )
    .await;
    mount_json(
        &server,
        "/v2/apps/batch",
        json!({ "app": { "id": "/batch", "tasks": [task("10.0.9.9", &[1], &[true])] }}),
    )
    .await;

    let (discovery, _) = discovery_for(&server);
    let instances = discovery.discover_instances().await.unwrap();

    let expected: HashSet<Instance> = [
        Instance::new("10.0.0.1:31000", "web_api", true),
        Instance::new("10.0.0.2:31005", "web_api", true),
    ]
    .into_iter()
    .collect();
    assert_eq!(instances, expected);
}

#[tokio::test]
async fn test_detail_id_names_the_cluster() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/v2/apps",
        json!({ "apps": [{ "id": "/web", "labels": { "turbineUrl": "" } }] }),
    )
    .await;
    mount_json(
        &server,
        "/v2/apps/web",
        json!({ "app": { "id": "/frontend/web", "tasks": [task("h", &[80], &[true])] }}),
    )
    .await;

    let (discovery, _) = discovery_for(&server);
    let instances = discovery.discover_instances().await.unwrap();
    assert_eq!(instances.len(), 1);
    assert!(instances.contains(&Instance::new("h:80", "frontend_web", true)));
}

#[tokio::test]
async fn test_failed_detail_fetch_skips_only_that_app() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/v2/apps",
        json!({ "apps": [
            { "id": "/good", "labels": { "turbineUrl": "/stream" } },
            { "id": "/down", "labels": { "turbineUrl": "/stream" } },
            { "id": "/garbled", "labels": { "turbineUrl": "/stream" } },
        ]}),
    )
    .await;
    mount_json(
        &server,
        "/v2/apps/good",
        json!({ "app": { "id": "/good", "tasks": [task("10.1.0.1", &[8080], &[true])] }}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/v2/apps/down"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/apps/garbled"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let (discovery, _) = discovery_for(&server);
    let instances = discovery.discover_instances().await.unwrap();
    assert_eq!(instances.len(), 1);
    assert!(instances.contains(&Instance::new("10.1.0.1:8080", "good", true)));
}

#[tokio::test]
async fn test_unset_url_fails_with_configuration_error() {
    let client = MarathonClient::new(&MarathonConfig::default()).unwrap();
    let discovery = InstanceDiscovery::new(client, Arc::new(DynamicProperties::new()));

    let err = discovery.discover_instances().await.unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
}

#[tokio::test]
async fn test_app_list_failure_aborts_discovery() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/apps"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let (discovery, _) = discovery_for(&server);
    let err = discovery.discover_instances().await.unwrap_err();
    assert!(matches!(err, Error::Http { .. }));
    assert!(err.is_fetch_failure());
}

#[tokio::test]
async fn test_app_list_without_apps_is_malformed() {
    let server = MockServer::start().await;
    mount_json(&server, "/v2/apps", json!({ "message": "unauthorized" })).await;

    let (discovery, _) = discovery_for(&server);
    let err = discovery.discover_clusters().await.unwrap_err();
    assert!(matches!(err, Error::MalformedResponse(_)));
}

#[tokio::test]
async fn test_unreachable_marathon_is_network_error() {
    // Grab a free port and release it so nothing is listening there
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .expect("free port")
        .port();

    let properties = Arc::new(DynamicProperties::new());
    properties.set(MARATHON_URL_PROPERTY, format!("http://127.0.0.1:{port}/v2/apps"));
    let client = MarathonClient::new(&MarathonConfig::default()).unwrap();
    let discovery = InstanceDiscovery::new(client, properties);

    let err = discovery.discover_instances().await.unwrap_err();
    assert!(matches!(err, Error::Network(_)));
}

#[tokio::test]
async fn test_slow_marathon_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/apps"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "apps": [] }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let properties = Arc::new(DynamicProperties::new());
    properties.set(MARATHON_URL_PROPERTY, format!("{}/v2/apps", server.uri()));
    let config = MarathonConfig {
        request_timeout_seconds: 1,
        ..MarathonConfig::default()
    };
    let client = MarathonClient::new(&config).unwrap();
    let discovery = InstanceDiscovery::new(client, properties);

    let err = discovery.discover_clusters().await.unwrap_err();
    match err {
        Error::Network(message) => assert!(message.contains("timed out"), "{message}"),
        other => panic!("expected network error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_oversized_app_list_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/apps"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b' '; MAX_RESPONSE_SIZE + 1]))
        .mount(&server)
        .await;

    let (discovery, _) = discovery_for(&server);
    let err = discovery.discover_instances().await.unwrap_err();
    assert!(matches!(err, Error::ResponseTooLarge { size } if size > MAX_RESPONSE_SIZE as u64));
}

#[tokio::test]
async fn test_discover_clusters_publishes_url_suffixes() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/v2/apps",
        json!({ "apps": [
            { "id": "/payments/api", "labels": { "turbineUrl": ":8080/hystrix.stream" } },
            { "id": "/internal", "labels": {} },
            { "id": "/search", "labels": { "turbineUrl": "/turbine.stream" } },
            { "id": "/payments_api", "labels": { "turbineUrl": ":9090/hystrix.stream" } },
        ]}),
    )
    .await;

    let (discovery, properties) = discovery_for(&server);
    let clusters = discovery.discover_clusters().await.unwrap();
    assert_eq!(clusters, vec!["payments_api".to_string(), "search".to_string()]);

    let suffixes = properties.with_prefix(INSTANCE_URL_SUFFIX_PREFIX);
    assert_eq!(suffixes.len(), 2);
    assert_eq!(suffixes["search"], "/turbine.stream");
    // Later apps mapping to the same cluster overwrite the suffix
    assert_eq!(suffixes["payments_api"], ":9090/hystrix.stream");
}

#[tokio::test]
async fn test_refresh_instances_feeds_monitors() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/v2/apps",
        json!({ "apps": [{ "id": "/web", "labels": { "turbineUrl": "/stream" } }] }),
    )
    .await;
    mount_json(
        &server,
        "/v2/apps/web",
        json!({ "app": { "id": "/web", "tasks": [
            task("10.0.0.1", &[80], &[true]),
            task("10.0.0.2", &[80], &[true]),
        ]}}),
    )
    .await;

    let created: Arc<Mutex<HashMap<String, Arc<AggregateClusterMonitor>>>> = Arc::default();
    let factory_created = created.clone();
    let registry = Arc::new(MonitorRegistry::new(Box::new(move |cluster: &str| -> Arc<dyn ClusterMonitor> {
        let monitor = Arc::new(AggregateClusterMonitor::new(cluster));
        factory_created
            .lock()
            .unwrap()
            .insert(cluster.to_string(), monitor.clone());
        monitor
    })));

    let (discovery, _) = discovery_for(&server);
    let manager = ClusterMonitorManager::new(Arc::new(discovery), registry);

    manager.init_all().await.unwrap();
    let total = manager.refresh_instances().await.unwrap();
    assert_eq!(total, 2);
    assert!(manager.resolve_monitor("web").unwrap().is_running());
    assert_eq!(created.lock().unwrap()["web"].hosts().len(), 2);

    // A monitor whose cluster left marathon loses its hosts on the next refresh
    let retired = manager.registry().find_or_register("retired");
    retired.update_instances([Instance::new("10.9.9.9:80", "retired", true)].into_iter().collect());
    assert_eq!(created.lock().unwrap()["retired"].hosts().len(), 1);

    manager.refresh_instances().await.unwrap();
    assert!(created.lock().unwrap()["retired"].hosts().is_empty());
    assert_eq!(created.lock().unwrap()["web"].hosts().len(), 2);
}
