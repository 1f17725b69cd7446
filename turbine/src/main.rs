//! Turbine marathon discovery daemon

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};

use turbine_cluster::{ClusterMonitorManager, InstanceDiscovery, MarathonClient, MonitorRegistry};
use turbine_core::{logging, Config, DynamicProperties};

/// Discover marathon apps and keep a turbine aggregate monitor running per cluster
#[derive(Debug, Parser)]
#[command(name = "turbine", version)]
struct Args {
    /// Config file (toml, yaml or json); environment variables override it
    #[arg(short, long, env = "TURBINE_CONFIG")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Load configuration
    let config = Config::load(args.config.as_deref())?;
    if let Err(errors) = config.validate() {
        for e in &errors {
            eprintln!("Config validation error: {e}");
        }
        return Err(anyhow::anyhow!(
            "Configuration validation failed with {} error(s)",
            errors.len()
        ));
    }

    // 2. Initialize logging
    logging::init_logging(&config.logging)?;
    info!("Turbine marathon discovery starting...");
    match config.marathon_url() {
        Some(url) => info!("Marathon URL: {url}"),
        None => warn!("No marathon URL configured, discovery will fail until one is set"),
    }

    // 3. Wire discovery and monitors
    let properties = Arc::new(DynamicProperties::new());
    config.seed_properties(&properties);

    let client = MarathonClient::new(&config.marathon)?;
    let discovery = Arc::new(InstanceDiscovery::new(client, properties));
    let registry = Arc::new(MonitorRegistry::with_aggregate_monitors());
    let manager = ClusterMonitorManager::new(discovery, registry);

    // 4. Poll until interrupted
    let mut timer = tokio::time::interval(Duration::from_secs(config.poll.interval_seconds));
    timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
            _ = timer.tick() => poll_once(&manager).await,
        }
    }

    match manager.shutdown_all().await {
        Ok(outcomes) => info!(clusters = outcomes.len(), "Monitors stopped"),
        Err(e) => error!(error = %e, "Could not get cluster information from marathon during shutdown"),
    }

    info!("Turbine marathon discovery stopped");
    Ok(())
}

/// One discovery pass. Failures are logged; the next tick tries again.
async fn poll_once(manager: &ClusterMonitorManager) {
    match manager.init_all().await {
        Ok(outcomes) => {
            for outcome in outcomes.iter().filter(|o| o.is_failure()) {
                warn!("{outcome}");
            }
        }
        Err(e) => {
            error!(error = %e, "Could not get cluster information from marathon");
            return;
        }
    }

    match manager.refresh_instances().await {
        Ok(count) => info!(instances = count, "Instance set refreshed"),
        Err(e) => error!(error = %e, "Instance discovery failed"),
    }
}
