use anyhow::{Context, Result};
use kube::Client;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info};

use container_resource_exporter::api::{self, AppState};
use container_resource_exporter::config::load_config;
use container_resource_exporter::scope::is_cluster_wide;
use container_resource_exporter::{Collector, KubeGateway};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cfg = load_config()?;
    if is_cluster_wide(&cfg.namespaces) {
        info!("No watch namespace provided, defaulting to cluster level");
    } else {
        info!("namespaces = {:?}", cfg.namespaces);
    }

    // Without a client there is nothing to serve
    let client = Client::try_default()
        .await
        .context("failed to build Kubernetes client")?;

    let collector = Collector::new(
        Arc::new(KubeGateway::new(client)),
        cfg.namespaces.clone(),
        cfg.query_timeout,
    );
    let (fatal_tx, mut fatal_rx) = mpsc::unbounded_channel();
    let state = Arc::new(AppState::new(collector, cfg.scrape_timeout, fatal_tx));

    let listener = TcpListener::bind(cfg.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.listen_addr))?;

    tokio::select! {
        res = api::serve(listener, state) => res?,
        Some(err) = fatal_rx.recv() => {
            error!(error = %err, "stopping: exporter cannot read pod metrics");
            return Err(err.into());
        }
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .try_init();
}
