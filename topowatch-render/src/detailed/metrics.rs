use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use topowatch_types::{keys, Metric, MetricTemplate, Node, CONTAINER, HOST, PROCESS};

const PERCENT: &str = "percent";
const FILESIZE: &str = "filesize";
const LOAD: &str = "load";

/// One metric of a node: its latest value plus the retained series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group: String,
    pub value: f64,
    pub metric: Metric,
}

struct Row {
    id: &'static str,
    label: &'static str,
    format: &'static str,
    group: &'static str,
}

impl Row {
    const fn new(
        id: &'static str,
        label: &'static str,
        format: &'static str,
        group: &'static str,
    ) -> Row {
        Row { id, label, format, group }
    }
}

const PROCESS_ROWS: &[Row] = &[
    Row::new(keys::process::CPU_USAGE, "CPU", PERCENT, ""),
    Row::new(keys::process::MEMORY_USAGE, "Memory", FILESIZE, ""),
];

const CONTAINER_ROWS: &[Row] = &[
    Row::new(keys::docker::CPU_TOTAL_USAGE, "CPU", PERCENT, ""),
    Row::new(keys::docker::MEMORY_USAGE, "Memory", FILESIZE, ""),
];

const HOST_ROWS: &[Row] = &[
    Row::new(keys::host::CPU_USAGE, "CPU", PERCENT, ""),
    Row::new(keys::host::MEMORY_USAGE, "Memory", FILESIZE, ""),
    Row::new(keys::host::LOAD1, "Load (1m)", "", LOAD),
    Row::new(keys::host::LOAD5, "Load (5m)", "", LOAD),
    Row::new(keys::host::LOAD15, "Load (15m)", "", LOAD),
];

fn rows(topology: &str) -> &'static [Row] {
    match topology {
        PROCESS => PROCESS_ROWS,
        CONTAINER => CONTAINER_ROWS,
        HOST => HOST_ROWS,
        _ => &[],
    }
}

fn row(node: &Node, id: &str, label: &str, format: &str, group: &str) -> Option<MetricRow> {
    let metric = node.metrics.lookup(id)?;
    Some(MetricRow {
        id: id.to_string(),
        label: label.to_string(),
        format: format.to_string(),
        group: group.to_string(),
        value: metric.last_value()?,
        metric: metric.clone(),
    })
}

/// The metric rows of a node. Metrics without samples are left out.
pub fn node_metrics(node: &Node) -> Vec<MetricRow> {
    rows(&node.topology)
        .iter()
        .filter_map(|r| row(node, r.id, r.label, r.format, r.group))
        .collect()
}

/// The metric rows of a node as described by reporter-supplied templates,
/// in priority order.
pub fn node_metrics_from_templates(
    node: &Node,
    templates: &BTreeMap<String, MetricTemplate>,
) -> Vec<MetricRow> {
    let mut templates: Vec<&MetricTemplate> = templates.values().collect();
    templates.sort_by(|a, b| (a.priority, &a.id).cmp(&(b.priority, &b.id)));
    templates
        .into_iter()
        .filter_map(|t| row(node, &t.id, &t.label, &t.format, &t.group))
        .collect()
}
