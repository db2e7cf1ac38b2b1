//! Command-line flags and their merge onto the config file.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use packet_sd_core::{ConfigError, SdConfig};

#[derive(Parser, Debug)]
#[command(
    name = "packet-sd",
    version,
    about = "Generate Prometheus file_sd target files for Packet devices"
)]
pub struct Cli {
    /// TOML config file. Flags given on the command line override it.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output file for the discovered targets [default: packet.json].
    #[arg(long = "output.file")]
    pub output_file: Option<PathBuf>,

    /// Packet project to discover. Empty means every accessible project.
    #[arg(long = "packet.projectid")]
    pub project_id: Option<String>,

    /// Packet API auth token.
    #[arg(long = "packet.authtoken", env = "PACKET_AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// Packet API base URL.
    #[arg(long = "packet.api-url")]
    pub api_url: Option<String>,

    /// Seconds between target refreshes [default: 30].
    #[arg(long = "target.refresh")]
    pub refresh_interval: Option<u64>,

    /// Port scraped on every device [default: 9100].
    #[arg(long = "target.port")]
    pub target_port: Option<u16>,

    /// Address serving /metrics [default: 0.0.0.0:9465].
    #[arg(long = "web.listen-address")]
    pub listen_address: Option<String>,

    /// Log output format.
    #[arg(long = "log.format", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl Cli {
    /// Load the config file (or defaults), apply flag overrides, and validate.
    pub fn into_config(self) -> Result<SdConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => SdConfig::from_file(path)?,
            None => SdConfig::default(),
        };

        if let Some(output_file) = self.output_file {
            config.output_file = output_file;
        }
        if let Some(project_id) = self.project_id {
            config.project_id = project_id;
        }
        if let Some(auth_token) = self.auth_token {
            config.auth_token = auth_token;
        }
        if let Some(api_url) = self.api_url {
            config.api_url = api_url;
        }
        if let Some(refresh_interval) = self.refresh_interval {
            config.refresh_interval = refresh_interval;
        }
        if let Some(target_port) = self.target_port {
            config.target_port = target_port;
        }
        if let Some(listen_address) = self.listen_address {
            config.listen_address = listen_address;
        }

        config.validate()?;
        Ok(config)
    }
}
