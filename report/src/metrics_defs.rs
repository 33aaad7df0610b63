//! Metrics definitions for report generation.

use shared::metrics_defs::{MetricDef, MetricType};

pub const REPORT_RUNS: MetricDef = MetricDef {
    name: "report.runs",
    metric_type: MetricType::Counter,
    description: "Number of report runs. Tagged with outcome.",
};

pub const REPORT_DURATION: MetricDef = MetricDef {
    name: "report.duration",
    metric_type: MetricType::Histogram,
    description: "Time to build and publish a report in seconds. Tagged with outcome.",
};

pub const PUBLISH_ATTEMPTS: MetricDef = MetricDef {
    name: "publish.attempts",
    metric_type: MetricType::Counter,
    description: "Number of upload attempts. Tagged with the response status.",
};

pub const ALL_METRICS: &[MetricDef] = &[REPORT_RUNS, REPORT_DURATION, PUBLISH_ATTEMPTS];
