// Workload specs and live usage, scoped by namespace or the cluster-wide sentinel.

pub mod pods;
pub mod usage;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::{api::ListParams, Api, Client};
use regex::Regex;
use std::sync::OnceLock;

use crate::error::GatewayError;
use crate::scope::ALL_NAMESPACES;
use crate::types::{UsageSample, WorkloadSpec};

pub use pods::workload_from_pod;
pub use usage::{list_pod_metrics_http, usage_from_item, PodMetricsItem};

#[async_trait]
pub trait SourceGateway: Send + Sync {
    /// Lists workload specs in `namespace`, or everywhere for [`ALL_NAMESPACES`].
    async fn list_workloads(&self, namespace: &str) -> Result<Vec<WorkloadSpec>, GatewayError>;

    /// Lists live usage samples in `namespace`, or everywhere for [`ALL_NAMESPACES`].
    async fn list_usage(&self, namespace: &str) -> Result<Vec<UsageSample>, GatewayError>;
}

/// Gateway backed by the Kubernetes core and metrics.k8s.io APIs.
#[derive(Clone)]
pub struct KubeGateway {
    client: Client,
}

impl KubeGateway {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceGateway for KubeGateway {
    async fn list_workloads(&self, namespace: &str) -> Result<Vec<WorkloadSpec>, GatewayError> {
        let pod_api: Api<Pod> = if namespace == ALL_NAMESPACES {
            Api::all(self.client.clone())
        } else {
            Api::namespaced(self.client.clone(), namespace)
        };
        let pods = pod_api.list(&ListParams::default()).await?;
        Ok(pods.items.iter().map(workload_from_pod).collect())
    }

    async fn list_usage(&self, namespace: &str) -> Result<Vec<UsageSample>, GatewayError> {
        let items = list_pod_metrics_http(&self.client, namespace).await?;
        Ok(items.into_iter().map(usage_from_item).collect())
    }
}

fn access_denied_signature() -> &'static Regex {
    static SIGNATURE: OnceLock<Regex> = OnceLock::new();
    SIGNATURE.get_or_init(|| {
        Regex::new(r".*.metrics.* is forbidden:.* cannot list.* no RBAC policy matched")
            .expect("access-denial signature is a valid regex")
    })
}

/// True when a usage query failed because the service account may not list
/// pod metrics. This is a deployment misconfiguration, not a transient fault.
pub fn is_access_denied(err: &GatewayError) -> bool {
    access_denied_signature().is_match(&err.message)
}
