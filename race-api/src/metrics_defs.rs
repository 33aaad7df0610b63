//! Metrics definitions for the race API client.

use shared::metrics_defs::{MetricDef, MetricType};

pub const UPSTREAM_REQUEST_DURATION: MetricDef = MetricDef {
    name: "upstream.request.duration",
    metric_type: MetricType::Histogram,
    description: "Race API request duration in seconds. Tagged with endpoint, outcome.",
};

pub const ALL_METRICS: &[MetricDef] = &[UPSTREAM_REQUEST_DURATION];
