//! packet-sd.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://api.packet.net/";
pub const DEFAULT_TAG_SEPARATOR: &str = ",";

/// Errors raised while loading or validating a config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Runtime settings for the discovery agent.
///
/// Every field has a default so a config file only needs to name what it
/// overrides. The auth token is never written back out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdConfig {
    /// Path of the file_sd JSON file Prometheus watches.
    pub output_file: PathBuf,
    /// Restrict discovery to one project. Empty means every accessible project.
    pub project_id: String,
    #[serde(skip_serializing)]
    pub auth_token: String,
    /// Seconds between discovery cycles.
    pub refresh_interval: u64,
    /// Port appended to each device's private IPv4.
    pub target_port: u16,
    /// Address the `/metrics` endpoint binds to.
    pub listen_address: String,
    pub tag_separator: String,
    pub api_url: String,
}

impl Default for SdConfig {
    fn default() -> Self {
        Self {
            output_file: PathBuf::from("packet.json"),
            project_id: String::new(),
            auth_token: String::new(),
            refresh_interval: 30,
            target_port: 9100,
            listen_address: "0.0.0.0:9465".to_string(),
            tag_separator: DEFAULT_TAG_SEPARATOR.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl SdConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// The project scope, or `None` when every project should be listed.
    pub fn project_scope(&self) -> Option<&str> {
        let id = self.project_id.trim();
        (!id.is_empty()).then_some(id)
    }

    pub fn refresh(&self) -> Duration {
        Duration::from_secs(self.refresh_interval)
    }

    /// Check the settings the discovery loop and client depend on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth_token.trim().is_empty() {
            return Err(ConfigError::Invalid("auth token is required".to_string()));
        }
        if self.refresh_interval == 0 {
            return Err(ConfigError::Invalid(
                "refresh interval must be at least 1 second".to_string(),
            ));
        }
        if self.target_port == 0 {
            return Err(ConfigError::Invalid("target port must be non-zero".to_string()));
        }
        if self.tag_separator.is_empty() {
            return Err(ConfigError::Invalid("tag separator must not be empty".to_string()));
        }
        if self.output_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("output file must be set".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> SdConfig {
        SdConfig {
            auth_token: "secret".to_string(),
            ..SdConfig::default()
        }
    }

    #[test]
    fn defaults_match_documented_flags() {
        let config = SdConfig::default();
        assert_eq!(config.output_file, PathBuf::from("packet.json"));
        assert_eq!(config.refresh_interval, 30);
        assert_eq!(config.target_port, 9100);
        assert_eq!(config.listen_address, "0.0.0.0:9465");
        assert_eq!(config.tag_separator, ",");
        assert!(config.project_scope().is_none());
    }

    #[test]
    fn parse_partial_file() {
        let toml_str = r#"
project_id = "proj-1"
target_port = 9200
refresh_interval = 5
"#;
        let config: SdConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.project_scope(), Some("proj-1"));
        assert_eq!(config.target_port, 9200);
        assert_eq!(config.refresh(), Duration::from_secs(5));
        assert_eq!(config.output_file, PathBuf::from("packet.json"));
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("packet-sd.toml");
        std::fs::write(&path, "output_file = \"/tmp/sd.json\"\n").unwrap();

        let config = SdConfig::from_file(&path).unwrap();
        assert_eq!(config.output_file, PathBuf::from("/tmp/sd.json"));
    }

    #[test]
    fn from_file_missing_is_read_error() {
        let err = SdConfig::from_file(Path::new("/nonexistent/packet-sd.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn token_is_not_serialized() {
        let toml_str = toml::to_string_pretty(&valid()).unwrap();
        assert!(!toml_str.contains("secret"));
        assert!(toml_str.contains("target_port = 9100"));
    }

    #[test]
    fn whitespace_project_id_means_all_projects() {
        let config = SdConfig {
            project_id: "  ".to_string(),
            ..valid()
        };
        assert!(config.project_scope().is_none());
    }

    #[test]
    fn validate_accepts_defaults_with_token() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(SdConfig::default().validate().is_err());

        let zero_refresh = SdConfig { refresh_interval: 0, ..valid() };
        assert!(zero_refresh.validate().is_err());

        let zero_port = SdConfig { target_port: 0, ..valid() };
        assert!(zero_port.validate().is_err());

        let no_sep = SdConfig { tag_separator: String::new(), ..valid() };
        assert!(no_sep.validate().is_err());
    }
}
