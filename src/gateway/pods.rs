use k8s_openapi::api::core::v1::{Container, Pod};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;

use crate::types::{ContainerSpec, WorkloadSpec};

/// Projects a Pod onto the fields the exporter reports. Init containers are
/// not part of the workload's steady-state footprint and are skipped.
pub fn workload_from_pod(pod: &Pod) -> WorkloadSpec {
    let phase = pod
        .status
        .as_ref()
        .and_then(|s| s.phase.clone())
        .unwrap_or_default();

    let containers = pod
        .spec
        .as_ref()
        .map(|spec| spec.containers.iter().map(container_spec).collect())
        .unwrap_or_default();

    WorkloadSpec {
        name: pod.metadata.name.clone().unwrap_or_default(),
        namespace: pod.metadata.namespace.clone().unwrap_or_default(),
        phase,
        containers,
    }
}

fn container_spec(c: &Container) -> ContainerSpec {
    let requests = c.resources.as_ref().and_then(|r| r.requests.as_ref());
    let limits = c.resources.as_ref().and_then(|r| r.limits.as_ref());

    ContainerSpec {
        name: c.name.clone(),
        cpu_request: quantity(requests, "cpu"),
        memory_request: quantity(requests, "memory"),
        cpu_limit: quantity(limits, "cpu"),
        memory_limit: quantity(limits, "memory"),
    }
}

fn quantity(list: Option<&BTreeMap<String, Quantity>>, key: &str) -> Option<String> {
    list.and_then(|l| l.get(key)).map(|q| q.0.clone())
}
