use kube::Client;
use serde::Deserialize;
use std::collections::HashMap;

use crate::error::GatewayError;
use crate::scope::ALL_NAMESPACES;
use crate::types::{ContainerUsage, UsageSample};

const METRICS_API: &str = "/apis/metrics.k8s.io/v1beta1";

#[derive(Debug, Default, Deserialize)]
pub struct PodMetricsMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
}

#[derive(Debug, Deserialize)]
pub struct ContainerMetrics {
    pub name: String,
    #[serde(default)]
    pub usage: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct PodMetricsItem {
    #[serde(default)]
    pub metadata: PodMetricsMeta,
    #[serde(default)]
    pub containers: Vec<ContainerMetrics>,
}

#[derive(Debug, Deserialize)]
pub struct PodMetricsList {
    #[serde(default)]
    pub items: Vec<PodMetricsItem>,
}

pub fn pod_metrics_path(namespace: &str) -> String {
    if namespace == ALL_NAMESPACES {
        format!("{}/pods", METRICS_API)
    } else {
        format!("{}/namespaces/{}/pods", METRICS_API, namespace)
    }
}

pub async fn list_pod_metrics_http(
    client: &Client,
    namespace: &str,
) -> Result<Vec<PodMetricsItem>, GatewayError> {
    use http::Request as HttpRequest;
    let req = HttpRequest::builder()
        .method("GET")
        .uri(pod_metrics_path(namespace))
        .body(Vec::new())
        .map_err(|e| GatewayError::new(format!("build request: {}", e)))?;
    let list: PodMetricsList = client.request(req).await?;
    Ok(list.items)
}

pub fn usage_from_item(item: PodMetricsItem) -> UsageSample {
    let containers = item
        .containers
        .into_iter()
        .map(|mut c| ContainerUsage {
            cpu: c.usage.remove("cpu"),
            memory: c.usage.remove("memory"),
            name: c.name,
        })
        .collect();

    UsageSample {
        name: item.metadata.name,
        namespace: item.metadata.namespace,
        containers,
    }
}
