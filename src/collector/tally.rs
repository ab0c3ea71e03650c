use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::warn;

/// Per-namespace workload counts for one cycle.
pub type NamespaceTally = BTreeMap<String, u64>;

/// Handle given to each workload task. Cloning is cheap; every clone feeds
/// the same single aggregation task.
#[derive(Clone)]
pub struct TallyReporter {
    tx: mpsc::UnboundedSender<String>,
}

impl TallyReporter {
    /// Counts one observed workload in `namespace`.
    pub fn report(&self, namespace: &str) {
        if self.tx.send(namespace.to_string()).is_err() {
            warn!(namespace, "tally aggregator is gone, workload not counted");
        }
    }
}

/// The aggregation side of the tally. Increments are applied one at a time
/// by a single task that owns the map, so no two writers ever touch it.
pub struct TallyAccumulator {
    handle: JoinHandle<NamespaceTally>,
}

impl TallyAccumulator {
    /// Waits for every [`TallyReporter`] to be dropped and returns the final
    /// counts. Hangs if a reporter outlives the cycle.
    pub async fn finish(self) -> Result<NamespaceTally, JoinError> {
        self.handle.await
    }
}

/// Starts a cycle-scoped tally.
pub fn channel() -> (TallyReporter, TallyAccumulator) {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let handle = tokio::spawn(async move {
        let mut counts = NamespaceTally::new();
        while let Some(namespace) = rx.recv().await {
            *counts.entry(namespace).or_insert(0) += 1;
        }
        counts
    });
    (TallyReporter { tx }, TallyAccumulator { handle })
}
