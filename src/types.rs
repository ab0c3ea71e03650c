use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Namespaces to query; a single empty string means cluster-wide.
    pub namespaces: Vec<String>,
    pub listen_addr: SocketAddr,
    pub query_timeout: Duration,
    pub scrape_timeout: Duration,
}

/// Raw requested/limit quantity strings for one container.
/// `None` means the quantity is not set on the container.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ContainerSpec {
    pub name: String,
    pub cpu_request: Option<String>,
    pub memory_request: Option<String>,
    pub cpu_limit: Option<String>,
    pub memory_limit: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct WorkloadSpec {
    pub name: String,
    pub namespace: String,
    pub phase: String,
    pub containers: Vec<ContainerSpec>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ContainerUsage {
    pub name: String,
    pub cpu: Option<String>,
    pub memory: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct UsageSample {
    pub name: String,
    pub namespace: String,
    pub containers: Vec<ContainerUsage>,
}

/// The seven exported metric identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricKind {
    CpuRequest,
    MemoryRequest,
    CpuLimit,
    MemoryLimit,
    CpuUsage,
    MemoryUsage,
    TotalPods,
}

impl MetricKind {
    pub fn name(&self) -> &'static str {
        match self {
            MetricKind::CpuRequest => "cpu_request",
            MetricKind::MemoryRequest => "memory_request",
            MetricKind::CpuLimit => "cpu_limit",
            MetricKind::MemoryLimit => "memory_limit",
            MetricKind::CpuUsage => "current_cpu_usage",
            MetricKind::MemoryUsage => "current_memory_usage",
            MetricKind::TotalPods => "total_pod",
        }
    }

    pub fn help(&self) -> &'static str {
        match self {
            MetricKind::CpuRequest => "Requested CPU by deployment",
            MetricKind::MemoryRequest => "Requested Memory by deployment",
            MetricKind::CpuLimit => "CPU Limit by deployment",
            MetricKind::MemoryLimit => "Memory Limit by deployment",
            MetricKind::CpuUsage => "Current CPU Usage as reported by Metrics API",
            MetricKind::MemoryUsage => "Current Memory Usage as reported by Metrics API",
            MetricKind::TotalPods => "Total pod count in given space",
        }
    }

    pub fn label_names(&self) -> &'static [&'static str] {
        match self {
            MetricKind::CpuRequest
            | MetricKind::MemoryRequest
            | MetricKind::CpuLimit
            | MetricKind::MemoryLimit => &["pod", "container", "namespace", "status"],
            MetricKind::CpuUsage | MetricKind::MemoryUsage => &["pod", "container", "namespace"],
            MetricKind::TotalPods => &["namespace"],
        }
    }

    pub fn is_counter(&self) -> bool {
        matches!(self, MetricKind::TotalPods)
    }
}

/// Normalized output unit. Label values are ordered as `kind.label_names()`.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    pub kind: MetricKind,
    pub labels: Vec<String>,
    pub value: f64,
}

impl MetricRecord {
    pub fn new(kind: MetricKind, labels: Vec<String>, value: f64) -> Self {
        debug_assert_eq!(labels.len(), kind.label_names().len());
        Self { kind, labels, value }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.kind
            .label_names()
            .iter()
            .position(|k| *k == key)
            .and_then(|i| self.labels.get(i))
            .map(|s| s.as_str())
    }

    pub fn label_pairs(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.kind
            .label_names()
            .iter()
            .copied()
            .zip(self.labels.iter().map(|s| s.as_str()))
    }
}

/// Which source a cycle-scoped failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FailureSource {
    Workloads,
    Usage,
    Task,
    Cycle,
}

impl FailureSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureSource::Workloads => "workloads",
            FailureSource::Usage => "usage",
            FailureSource::Task => "task",
            FailureSource::Cycle => "cycle",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryFailure {
    pub source: FailureSource,
    pub namespace: String,
    pub reason: String,
}

/// Everything one collection cycle produced.
#[derive(Debug, Default, Clone)]
pub struct CycleSnapshot {
    pub records: Vec<MetricRecord>,
    pub failures: Vec<QueryFailure>,
}

impl CycleSnapshot {
    pub fn records_of(&self, kind: MetricKind) -> impl Iterator<Item = &MetricRecord> {
        self.records.iter().filter(move |r| r.kind == kind)
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
