//! packet-sd-client: read-only access to the Packet inventory API.
//!
//! Lists the projects visible to an auth token and the devices inside each
//! project. Pagination is followed transparently, so every call returns a
//! fully materialized list.
//!
//! # Architecture
//!
//! ```text
//! InventoryApi (trait, injected into the fetcher)
//!   ├── list_projects() → Vec<Project>
//!   └── list_devices(project_id) → Vec<Device>
//!
//! PacketClient (hyper + rustls)
//!   ├── X-Auth-Token / X-Consumer-Token headers
//!   ├── meta.next.href pagination
//!   └── ApiLogger::log_http() per request
//! ```

pub mod client;
pub mod error;
pub mod logger;
pub mod model;

pub use client::{ApiFuture, InventoryApi, PacketClient};
pub use error::{ApiError, ApiResult};
pub use logger::{ApiLogger, TracingLogger};
pub use model::*;
