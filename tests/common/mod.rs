#![allow(dead_code)]

use async_trait::async_trait;
use container_resource_exporter::{
    Collector, ContainerSpec, ContainerUsage, GatewayError, SourceGateway, UsageSample,
    WorkloadSpec,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const FORBIDDEN: &str = "pods.metrics.k8s.io is forbidden: User \"system:serviceaccount:monitoring:cre\" \
cannot list resource \"pods\" in API group \"metrics.k8s.io\" in the namespace \"team-a\": no RBAC policy matched";

/// In-memory gateway keyed by the namespace argument it is queried with.
#[derive(Default)]
pub struct FakeGateway {
    pub workloads: HashMap<String, Result<Vec<WorkloadSpec>, GatewayError>>,
    pub usage: HashMap<String, Result<Vec<UsageSample>, GatewayError>>,
    pub delay: Option<Duration>,
    pub workload_queries: AtomicUsize,
    pub usage_queries: AtomicUsize,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workloads(mut self, namespace: &str, workloads: Vec<WorkloadSpec>) -> Self {
        self.workloads.insert(namespace.to_string(), Ok(workloads));
        self
    }

    pub fn with_usage(mut self, namespace: &str, samples: Vec<UsageSample>) -> Self {
        self.usage.insert(namespace.to_string(), Ok(samples));
        self
    }

    pub fn with_workload_error(mut self, namespace: &str, message: &str) -> Self {
        self.workloads
            .insert(namespace.to_string(), Err(GatewayError::new(message)));
        self
    }

    pub fn with_usage_error(mut self, namespace: &str, message: &str) -> Self {
        self.usage
            .insert(namespace.to_string(), Err(GatewayError::new(message)));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl SourceGateway for FakeGateway {
    async fn list_workloads(&self, namespace: &str) -> Result<Vec<WorkloadSpec>, GatewayError> {
        self.workload_queries.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.workloads.get(namespace).cloned().unwrap_or(Ok(vec![]))
    }

    async fn list_usage(&self, namespace: &str) -> Result<Vec<UsageSample>, GatewayError> {
        self.usage_queries.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.usage.get(namespace).cloned().unwrap_or(Ok(vec![]))
    }
}

pub fn container(name: &str) -> ContainerSpec {
    ContainerSpec {
        name: name.to_string(),
        cpu_request: Some("100m".to_string()),
        memory_request: Some("64Mi".to_string()),
        cpu_limit: Some("500m".to_string()),
        memory_limit: Some("128Mi".to_string()),
    }
}

pub fn pod(name: &str, namespace: &str, containers: Vec<ContainerSpec>) -> WorkloadSpec {
    WorkloadSpec {
        name: name.to_string(),
        namespace: namespace.to_string(),
        phase: "Running".to_string(),
        containers,
    }
}

pub fn usage(name: &str, namespace: &str, containers: &[&str]) -> UsageSample {
    UsageSample {
        name: name.to_string(),
        namespace: namespace.to_string(),
        containers: containers
            .iter()
            .map(|c| ContainerUsage {
                name: c.to_string(),
                cpu: Some("12m".to_string()),
                memory: Some("20Mi".to_string()),
            })
            .collect(),
    }
}

pub fn collector(gateway: FakeGateway, namespaces: &[&str]) -> Collector {
    collector_with_gateway(Arc::new(gateway), namespaces)
}

pub fn collector_with_gateway(gateway: Arc<FakeGateway>, namespaces: &[&str]) -> Collector {
    Collector::new(
        gateway,
        namespaces.iter().map(|s| s.to_string()).collect(),
        Duration::from_secs(5),
    )
}

/// The scenario used across tests: two single-container pods in team-a, one
/// two-container pod in team-b, usage only for team-a.
pub fn team_scenario() -> FakeGateway {
    FakeGateway::new()
        .with_workloads(
            "team-a",
            vec![
                pod("web-1", "team-a", vec![container("web")]),
                pod("web-2", "team-a", vec![container("web")]),
            ],
        )
        .with_workloads(
            "team-b",
            vec![pod("db-1", "team-b", vec![container("db"), container("backup")])],
        )
        .with_usage(
            "team-a",
            vec![usage("web-1", "team-a", &["web"]), usage("web-2", "team-a", &["web"])],
        )
}
