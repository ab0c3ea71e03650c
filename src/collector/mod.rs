// One collection cycle: parallel source queries, per-workload and
// per-sample decomposition tasks, and the namespace tally. All state lives
// inside a single call to `Collector::collect`.

pub mod decompose;
pub mod tally;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::{JoinError, JoinSet};
use tracing::{info, warn};

use crate::error::{CollectError, GatewayError};
use crate::gateway::{is_access_denied, SourceGateway};
use crate::types::{
    CycleSnapshot, FailureSource, MetricRecord, QueryFailure, UsageSample, WorkloadSpec,
};

pub use decompose::{tally_record, usage_records, workload_records};
pub use tally::{NamespaceTally, TallyAccumulator, TallyReporter};

type QueryFuture<T> = Pin<Box<dyn Future<Output = Result<Vec<T>, GatewayError>> + Send>>;

/// Records and failures produced by one half of the cycle.
#[derive(Default)]
struct Partial {
    records: Vec<MetricRecord>,
    failures: Vec<QueryFailure>,
}

#[derive(Clone)]
pub struct Collector {
    gateway: Arc<dyn SourceGateway>,
    namespaces: Vec<String>,
    query_timeout: Duration,
}

impl Collector {
    pub fn new(
        gateway: Arc<dyn SourceGateway>,
        namespaces: Vec<String>,
        query_timeout: Duration,
    ) -> Self {
        Self {
            gateway,
            namespaces,
            query_timeout,
        }
    }

    /// Runs a full cycle. Returns only after every spawned task has finished.
    ///
    /// Transient query failures are reported in the snapshot. The only error
    /// is [`CollectError::AccessDenied`], raised when the usage source refuses
    /// access; in-flight work is aborted in that case.
    pub async fn collect(&self) -> Result<CycleSnapshot, CollectError> {
        let start = Instant::now();
        info!(namespaces = ?self.namespaces, "Scraping core and metrics api for metrics");

        let (workloads, usage) =
            tokio::try_join!(self.collect_workloads(), self.collect_usage())?;

        let mut snapshot = CycleSnapshot::default();
        for part in [workloads, usage] {
            snapshot.records.extend(part.records);
            snapshot.failures.extend(part.failures);
        }

        info!(
            records = snapshot.records.len(),
            failures = snapshot.failures.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Collection cycle finished"
        );
        Ok(snapshot)
    }

    async fn collect_workloads(&self) -> Result<Partial, CollectError> {
        let (workloads, failures) = self
            .fetch::<WorkloadSpec, _>(FailureSource::Workloads, |gateway, namespace| {
                Box::pin(async move { gateway.list_workloads(&namespace).await })
            })
            .await?;
        if workloads.is_empty() {
            info!("No pod was listed to fetch the metrics");
        }

        let mut partial = decompose_workloads(workloads).await;
        partial.failures.extend(failures);
        Ok(partial)
    }

    async fn collect_usage(&self) -> Result<Partial, CollectError> {
        let (samples, failures) = self
            .fetch::<UsageSample, _>(FailureSource::Usage, |gateway, namespace| {
                Box::pin(async move { gateway.list_usage(&namespace).await })
            })
            .await?;

        let mut partial = decompose_usage(samples).await;
        partial.failures.extend(failures);
        Ok(partial)
    }

    /// Issues one query per namespace in scope, in parallel, and concatenates
    /// the results. The cluster-wide sentinel is a single query.
    async fn fetch<T, F>(
        &self,
        source: FailureSource,
        query: F,
    ) -> Result<(Vec<T>, Vec<QueryFailure>), CollectError>
    where
        T: Send + 'static,
        F: Fn(Arc<dyn SourceGateway>, String) -> QueryFuture<T>,
    {
        let mut queries = JoinSet::new();
        for namespace in &self.namespaces {
            let fut = query(Arc::clone(&self.gateway), namespace.clone());
            let namespace = namespace.clone();
            let timeout = self.query_timeout;
            queries.spawn(async move {
                let result = match tokio::time::timeout(timeout, fut).await {
                    Ok(result) => result,
                    Err(_) => Err(GatewayError::new(format!(
                        "timed out after {}s",
                        timeout.as_secs_f64()
                    ))),
                };
                (namespace, result)
            });
        }

        let mut items = Vec::new();
        let mut failures = Vec::new();
        while let Some(joined) = queries.join_next().await {
            match joined {
                Ok((_, Ok(batch))) => items.extend(batch),
                Ok((namespace, Err(err))) => {
                    if source == FailureSource::Usage && is_access_denied(&err) {
                        return Err(CollectError::AccessDenied(err.message));
                    }
                    warn!(source = source.as_str(), namespace = %namespace, error = %err, "source query failed");
                    failures.push(QueryFailure {
                        source,
                        namespace,
                        reason: err.message,
                    });
                }
                Err(err) => failures.push(task_failure(err)),
            }
        }
        Ok((items, failures))
    }
}

/// One task per workload: its request/limit records plus exactly one tally
/// report. Namespace totals are emitted only after every report landed.
async fn decompose_workloads(workloads: Vec<WorkloadSpec>) -> Partial {
    let mut partial = Partial::default();
    let (reporter, tally) = tally::channel();

    let mut tasks = JoinSet::new();
    for workload in workloads {
        let reporter = reporter.clone();
        tasks.spawn(async move {
            // Count first, so a failing decomposition never costs the tally
            reporter.report(&workload.namespace);
            workload_records(&workload)
        });
    }
    // Only task-owned reporters may remain, or the barrier below never opens
    drop(reporter);

    drain(&mut tasks, &mut partial).await;

    let counts = match tally.finish().await {
        Ok(counts) => counts,
        Err(err) => {
            partial.failures.push(task_failure(err));
            return partial;
        }
    };

    let mut emitters = JoinSet::new();
    for (namespace, count) in counts {
        emitters.spawn(async move { vec![tally_record(&namespace, count)] });
    }
    drain(&mut emitters, &mut partial).await;
    partial
}

/// One task per usage sample. No tally involvement.
async fn decompose_usage(samples: Vec<UsageSample>) -> Partial {
    let mut partial = Partial::default();
    let mut tasks = JoinSet::new();
    for sample in samples {
        tasks.spawn(async move { usage_records(&sample) });
    }
    drain(&mut tasks, &mut partial).await;
    partial
}

async fn drain(tasks: &mut JoinSet<Vec<MetricRecord>>, partial: &mut Partial) {
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(records) => partial.records.extend(records),
            Err(err) => partial.failures.push(task_failure(err)),
        }
    }
}

fn task_failure(err: JoinError) -> QueryFailure {
    warn!(error = %err, "collection task failed");
    QueryFailure {
        source: FailureSource::Task,
        namespace: String::new(),
        reason: err.to_string(),
    }
}
