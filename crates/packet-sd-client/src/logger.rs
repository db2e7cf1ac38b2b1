//! Logging capability handed to the API client.

use http::{Method, Uri};
use tracing::{debug, error, info, warn};

/// The small logging surface the client needs.
///
/// Kept as a trait so callers decide where client chatter goes; the
/// default [`TracingLogger`] forwards everything to `tracing`.
pub trait ApiLogger: Send + Sync {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warn(&self, message: &str);

    /// Log an unrecoverable condition and terminate the process.
    fn fatal(&self, message: &str) -> !;

    /// Trace one outgoing HTTP request.
    fn log_http(&self, method: &Method, uri: &Uri);
}

/// [`ApiLogger`] backed by `tracing` events under the `packet_sd::api` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl ApiLogger for TracingLogger {
    fn debug(&self, message: &str) {
        debug!(target: "packet_sd::api", "{message}");
    }

    fn info(&self, message: &str) {
        info!(target: "packet_sd::api", "{message}");
    }

    fn warn(&self, message: &str) {
        warn!(target: "packet_sd::api", "{message}");
    }

    fn fatal(&self, message: &str) -> ! {
        error!(target: "packet_sd::api", "{message}");
        std::process::exit(1)
    }

    fn log_http(&self, method: &Method, uri: &Uri) {
        debug!(target: "packet_sd::api", %method, url = %uri, "HTTP request");
    }
}
