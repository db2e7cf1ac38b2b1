//! packet-sd-discovery: turns the Packet inventory into Prometheus targets.
//!
//! Every refresh interval the discoverer lists the devices, maps each one to
//! a [`TargetGroup`](packet_sd_core::TargetGroup), and reconciles the result
//! against the previous cycle so removed devices are announced once as empty
//! groups.
//!
//! # Cycle
//!
//! ```text
//! tick ──► Fetcher::fetch()          list_projects + list_devices (or one project)
//!            │  Err → warn, skip tick (snapshot untouched, nothing published)
//!            ▼
//!          TargetMapper::map()       one group per device
//!            ▼
//!          Snapshot::apply()         live groups + tombstones for vanished sources
//!            ▼
//!          mpsc::Sender::send()      blocks until the publisher takes the batch
//! ```
//!
//! The loop stops when the shutdown watch channel fires. An in-flight cycle
//! always runs to completion first.

pub mod discoverer;
pub mod error;
pub mod fetcher;
pub mod mapper;
pub mod snapshot;

pub use discoverer::Discoverer;
pub use error::FetchError;
pub use fetcher::Fetcher;
pub use mapper::TargetMapper;
pub use snapshot::{Reconciled, Snapshot, reconcile};
