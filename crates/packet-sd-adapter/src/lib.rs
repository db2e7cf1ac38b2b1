//! packet-sd-adapter: the file_sd publisher.
//!
//! Consumes batches from the discovery loop and keeps a Prometheus
//! `file_sd` JSON file in sync with the latest view of every source.
//!
//! ```text
//! Discoverer ──batch──► FileSdAdapter::apply ──► render ──► write (temp + rename)
//! ```

pub mod error;
pub mod file_sd;

pub use error::{AdapterError, AdapterResult};
pub use file_sd::{FileSdAdapter, FileSdGroup};
