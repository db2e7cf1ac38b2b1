pub mod config;
pub mod labels;
pub mod types;

pub use config::{ConfigError, SdConfig};
pub use types::*;
