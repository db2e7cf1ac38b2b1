//! packet-sd-metrics: observability for the discovery agent.
//!
//! Tracks how long Packet API calls take and how many of them fail, and
//! renders both in the Prometheus text exposition format.
//!
//! # Architecture
//!
//! ```text
//! SdMetrics (cheap Clone, shared by fetcher and /metrics handler)
//!   ├── observe_request(duration) ← every API call
//!   ├── inc_failures()           ← every failed API call
//!   └── snapshot() → MetricsSnapshot
//!
//! Prometheus exposition
//!   └── render_prometheus() → text/plain for /metrics endpoint
//! ```
//!
//! There is no process-wide registry: each `SdMetrics` is an independent
//! handle, so tests can assert on counters they own.

pub mod collector;
pub mod prometheus;

pub use collector::{HistogramSnapshot, MetricsSnapshot, SdMetrics, REQUEST_DURATION_BUCKETS};
pub use prometheus::render_prometheus;
