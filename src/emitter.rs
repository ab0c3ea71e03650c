// Records are written as-is, one sample per record.

use prometheus::proto::{Counter, Gauge, LabelPair, Metric, MetricFamily, MetricType};
use prometheus::{Encoder, TextEncoder};
use std::collections::BTreeMap;

use crate::types::{CycleSnapshot, MetricKind, MetricRecord, QueryFailure};

pub const SCRAPE_ERRORS: &str = "scrape_errors";
const SCRAPE_ERRORS_HELP: &str = "Source queries or tasks that failed during this scrape";

/// Content type of the rendered body.
pub fn content_type() -> &'static str {
    prometheus::TEXT_FORMAT
}

pub fn render(snapshot: &CycleSnapshot) -> prometheus::Result<Vec<u8>> {
    let families = metric_families(snapshot);
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&families, &mut buffer)?;
    Ok(buffer)
}

/// One family per metric identity that has records, plus `scrape_errors`
/// when the cycle saw failures. Samples are sorted by label values so
/// identical snapshots render identically.
pub fn metric_families(snapshot: &CycleSnapshot) -> Vec<MetricFamily> {
    let mut by_kind: BTreeMap<MetricKind, Vec<&MetricRecord>> = BTreeMap::new();
    for record in &snapshot.records {
        by_kind.entry(record.kind).or_default().push(record);
    }

    let mut families = Vec::with_capacity(by_kind.len() + 1);
    for (kind, mut records) in by_kind {
        records.sort_by(|a, b| a.labels.cmp(&b.labels));
        let field_type = if kind.is_counter() {
            MetricType::COUNTER
        } else {
            MetricType::GAUGE
        };
        let mut family = new_family(kind.name(), kind.help(), field_type);
        for record in records {
            let labels: Vec<(&str, &str)> = record.label_pairs().collect();
            family
                .mut_metric()
                .push(sample(&labels, record.value, kind.is_counter()));
        }
        families.push(family);
    }

    if snapshot.has_failures() {
        families.push(failure_family(&snapshot.failures));
    }
    families
}

fn failure_family(failures: &[QueryFailure]) -> MetricFamily {
    let mut counts: BTreeMap<(&str, &str), u64> = BTreeMap::new();
    for failure in failures {
        *counts
            .entry((failure.source.as_str(), failure.namespace.as_str()))
            .or_insert(0) += 1;
    }

    let mut family = new_family(SCRAPE_ERRORS, SCRAPE_ERRORS_HELP, MetricType::GAUGE);
    for ((source, namespace), count) in counts {
        let labels = [("source", source), ("namespace", namespace)];
        family.mut_metric().push(sample(&labels, count as f64, false));
    }
    family
}

fn new_family(name: &str, help: &str, field_type: MetricType) -> MetricFamily {
    let mut family = MetricFamily::default();
    family.set_name(name.to_string());
    family.set_help(help.to_string());
    family.set_field_type(field_type);
    family
}

fn sample(labels: &[(&str, &str)], value: f64, counter: bool) -> Metric {
    let pairs: Vec<LabelPair> = labels
        .iter()
        .map(|(name, value)| {
            let mut pair = LabelPair::default();
            pair.set_name(name.to_string());
            pair.set_value(value.to_string());
            pair
        })
        .collect();

    let mut metric = Metric::default();
    metric.set_label(pairs.into());
    if counter {
        let mut c = Counter::default();
        c.set_value(value);
        metric.set_counter(c);
    } else {
        let mut g = Gauge::default();
        g.set_value(value);
        metric.set_gauge(g);
    }
    metric
}
