use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::collector::Collector;
use crate::emitter;
use crate::error::CollectError;
use crate::types::{CycleSnapshot, FailureSource, QueryFailure};

const ROOT_PAGE: &str = r#"<html>
<head><title>CRE</title></head>
<body>
<h1>Container Resource Exporter</h1>
<p><a href='/metrics'>Metrics</a></p>
</body>
</html>"#;

pub const HEALTHZ_BODY: &str = "Running good";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub collector: Collector,
    pub scrape_timeout: Duration,
    /// Fatal cycle errors are handed to `main`, which stops the process.
    pub fatal_tx: mpsc::UnboundedSender<CollectError>,
}

impl AppState {
    pub fn new(
        collector: Collector,
        scrape_timeout: Duration,
        fatal_tx: mpsc::UnboundedSender<CollectError>,
    ) -> Self {
        Self {
            collector,
            scrape_timeout,
            fatal_tx,
        }
    }
}

async fn root() -> Html<&'static str> {
    Html(ROOT_PAGE)
}

async fn healthz() -> &'static str {
    info!("Running healthz check");
    HEALTHZ_BODY
}

/// Runs one collection cycle and answers with its records. A scrape always
/// gets 200 unless encoding fails; on an access-denial error it is never
/// answered at all.
async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    let snapshot = match tokio::time::timeout(state.scrape_timeout, state.collector.collect()).await {
        Ok(Ok(snapshot)) => snapshot,
        Ok(Err(err)) => {
            error!(
                error = %err,
                "The service account running this pod doesn't have a matching RBAC to fetch the Metrics"
            );
            let _ = state.fatal_tx.send(err);
            return std::future::pending::<Response>().await;
        }
        Err(_) => {
            warn!(timeout_secs = state.scrape_timeout.as_secs(), "collection cycle exceeded scrape deadline");
            CycleSnapshot {
                records: Vec::new(),
                failures: vec![QueryFailure {
                    source: FailureSource::Cycle,
                    namespace: String::new(),
                    reason: format!("deadline of {}s exceeded", state.scrape_timeout.as_secs()),
                }],
            }
        }
    };

    match emitter::render(&snapshot) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, emitter::content_type())],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "Failed to encode Prometheus metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics").into_response()
        }
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Serve the API on an already bound listener until the server stops.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);
    info!(addr = %listener.local_addr()?, "Serving metrics");
    axum::serve(listener, app).await?;
    Ok(())
}
