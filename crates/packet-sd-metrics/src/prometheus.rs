//! Prometheus text exposition format.
//!
//! Renders a metrics snapshot into the Prometheus text exposition format
//! for scraping by a Prometheus server or compatible agent.

use crate::collector::MetricsSnapshot;

const DURATION_METRIC: &str = "prometheus_packet_sd_request_duration_seconds";
const FAILURES_METRIC: &str = "prometheus_packet_sd_request_failures_total";
const BUILD_INFO_METRIC: &str = "prometheus_packet_sd_build_info";

/// Render a metrics snapshot into Prometheus text format.
///
/// Produces the request duration HISTOGRAM, the failure COUNTER and a
/// constant build-info GAUGE carrying `version`.
pub fn render_prometheus(snapshot: &MetricsSnapshot, version: &str) -> String {
    let mut out = String::new();
    let hist = &snapshot.request_duration;

    out.push_str(&format!(
        "# HELP {DURATION_METRIC} Histogram of latencies for requests to the Packet API.\n"
    ));
    out.push_str(&format!("# TYPE {DURATION_METRIC} histogram\n"));
    for (upper, count) in &hist.buckets {
        out.push_str(&format!("{DURATION_METRIC}_bucket{{le=\"{upper}\"}} {count}\n"));
    }
    out.push_str(&format!("{DURATION_METRIC}_bucket{{le=\"+Inf\"}} {}\n", hist.count));
    out.push_str(&format!("{DURATION_METRIC}_sum {}\n", hist.sum));
    out.push_str(&format!("{DURATION_METRIC}_count {}\n", hist.count));

    out.push_str(&format!(
        "# HELP {FAILURES_METRIC} Total number of failed requests to the Packet API.\n"
    ));
    out.push_str(&format!("# TYPE {FAILURES_METRIC} counter\n"));
    out.push_str(&format!("{FAILURES_METRIC} {}\n", snapshot.request_failures));

    out.push_str(&format!(
        "# HELP {BUILD_INFO_METRIC} A metric with a constant '1' value labeled by version.\n"
    ));
    out.push_str(&format!("# TYPE {BUILD_INFO_METRIC} gauge\n"));
    out.push_str(&format!(
        "{BUILD_INFO_METRIC}{{version=\"{}\"}} 1\n",
        escape_label_value(version)
    ));

    out
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
