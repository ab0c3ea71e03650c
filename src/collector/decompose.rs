use tracing::debug;

use crate::parsing::quantity_or_zero;
use crate::types::{MetricKind, MetricRecord, UsageSample, WorkloadSpec};

/// Request/limit records for every container of a workload, labelled
/// `{pod, container, namespace, status}`. A quantity that does not parse
/// drops only its own record.
pub fn workload_records(workload: &WorkloadSpec) -> Vec<MetricRecord> {
    let mut records = Vec::with_capacity(workload.containers.len() * 4);

    for container in &workload.containers {
        let figures = [
            (MetricKind::CpuRequest, container.cpu_request.as_deref()),
            (MetricKind::MemoryRequest, container.memory_request.as_deref()),
            (MetricKind::CpuLimit, container.cpu_limit.as_deref()),
            (MetricKind::MemoryLimit, container.memory_limit.as_deref()),
        ];
        for (kind, quantity) in figures {
            match quantity_or_zero(quantity) {
                Some(value) => records.push(MetricRecord::new(
                    kind,
                    vec![
                        workload.name.clone(),
                        container.name.clone(),
                        workload.namespace.clone(),
                        workload.phase.clone(),
                    ],
                    value,
                )),
                None => debug!(
                    pod = %workload.name,
                    container = %container.name,
                    metric = kind.name(),
                    quantity = ?quantity,
                    "skipping unparsable quantity"
                ),
            }
        }
    }
    records
}

/// Usage records for every container of a sample, labelled
/// `{pod, container, namespace}`.
pub fn usage_records(sample: &UsageSample) -> Vec<MetricRecord> {
    let mut records = Vec::with_capacity(sample.containers.len() * 2);

    for container in &sample.containers {
        let figures = [
            (MetricKind::CpuUsage, container.cpu.as_deref()),
            (MetricKind::MemoryUsage, container.memory.as_deref()),
        ];
        for (kind, quantity) in figures {
            match quantity_or_zero(quantity) {
                Some(value) => records.push(MetricRecord::new(
                    kind,
                    vec![
                        sample.name.clone(),
                        container.name.clone(),
                        sample.namespace.clone(),
                    ],
                    value,
                )),
                None => debug!(
                    pod = %sample.name,
                    container = %container.name,
                    metric = kind.name(),
                    quantity = ?quantity,
                    "skipping unparsable quantity"
                ),
            }
        }
    }
    records
}

pub fn tally_record(namespace: &str, count: u64) -> MetricRecord {
    MetricRecord::new(MetricKind::TotalPods, vec![namespace.to_string()], count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContainerSpec, ContainerUsage};

    fn workload(containers: Vec<ContainerSpec>) -> WorkloadSpec {
        WorkloadSpec {
            name: "api-1".to_string(),
            namespace: "team-a".to_string(),
            phase: "Running".to_string(),
            containers,
        }
    }

    #[test]
    fn test_workload_records_per_container() {
        let w = workload(vec![ContainerSpec {
            name: "app".to_string(),
            cpu_request: Some("250m".to_string()),
            memory_request: Some("64Mi".to_string()),
            cpu_limit: Some("1".to_string()),
            memory_limit: Some("128Mi".to_string()),
        }]);

        let records = workload_records(&w);
        assert_eq!(records.len(), 4);

        let cpu_request = records.iter().find(|r| r.kind == MetricKind::CpuRequest).unwrap();
        assert_eq!(cpu_request.value, 0.25);
        assert_eq!(cpu_request.label("pod"), Some("api-1"));
        assert_eq!(cpu_request.label("container"), Some("app"));
        assert_eq!(cpu_request.label("namespace"), Some("team-a"));
        assert_eq!(cpu_request.label("status"), Some("Running"));

        let mem_limit = records.iter().find(|r| r.kind == MetricKind::MemoryLimit).unwrap();
        assert_eq!(mem_limit.value, 128.0 * 1024.0 * 1024.0);
    }

    #[test]
    fn test_unset_quantities_report_zero() {
        let w = workload(vec![ContainerSpec {
            name: "app".to_string(),
            ..Default::default()
        }]);

        let records = workload_records(&w);
        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|r| r.value == 0.0));
    }

    #[test]
    fn test_unparsable_quantity_drops_one_record() {
        let w = workload(vec![ContainerSpec {
            name: "app".to_string(),
            cpu_request: Some("lots".to_string()),
            memory_request: Some("64Mi".to_string()),
            cpu_limit: Some("1".to_string()),
            memory_limit: Some("128Mi".to_string()),
        }]);

        let records = workload_records(&w);
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.kind != MetricKind::CpuRequest));
    }

    #[test]
    fn test_zero_containers_zero_records() {
        assert!(workload_records(&workload(vec![])).is_empty());
    }

    #[test]
    fn test_usage_records_have_no_status() {
        let sample = UsageSample {
            name: "api-1".to_string(),
            namespace: "team-a".to_string(),
            containers: vec![ContainerUsage {
                name: "app".to_string(),
                cpu: Some("5m".to_string()),
                memory: Some("10Mi".to_string()),
            }],
        };

        let records = usage_records(&sample);
        assert_eq!(records.len(), 2);
        for r in &records {
            assert_eq!(r.label("status"), None);
            assert_eq!(r.label("pod"), Some("api-1"));
        }
        let cpu = records.iter().find(|r| r.kind == MetricKind::CpuUsage).unwrap();
        assert_eq!(cpu.value, 0.005);
    }

    #[test]
    fn test_tally_record() {
        let r = tally_record("team-b", 3);
        assert_eq!(r.name(), "total_pod");
        assert_eq!(r.label("namespace"), Some("team-b"));
        assert_eq!(r.value, 3.0);
    }
}
