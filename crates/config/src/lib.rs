// Configuration Management
//
// This crate handles all configuration loading for the dashboard service.
// It provides:
// - Configuration structs and deserialization
// - File loading logic
// - Default values for every section, so a minimal file works
//
// This keeps configuration concerns separate from domain logic.

use std::path::Path;
use thiserror::Error;

pub mod types;

// Re-export all configuration types
pub use types::*;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found. Tried paths: {paths}")]
    FileNotFound { paths: String },

    #[error("Failed to read configuration file: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {source}")]
    ParseError {
        #[from]
        source: serde_yaml::Error,
    },
}

/// Main configuration loading interface
impl DashboardConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: DashboardConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        // Try different config locations in order
        let config_paths = ["config/config.yaml", "config.yaml", "config/default.yaml"];

        for path in &config_paths {
            if std::path::Path::new(path).exists() {
                return Self::load_from_file(path);
            }
        }

        // If no config file found, fail with descriptive error
        Err(ConfigError::FileNotFound {
            paths: config_paths.join(", "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_yields_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{}}").unwrap();

        let config = DashboardConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.views.first_time_max_orders, 1);
        assert_eq!(config.views.repeat_min_orders, 11);
        assert!(config.views.monthly_revenue_target.is_none());
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "server:\n  port: 8081\nviews:\n  monthly_revenue_target: 25000.0"
        )
        .unwrap();

        let config = DashboardConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.views.monthly_revenue_target, Some(25000.0));
        assert_eq!(config.cache.snapshot_ttl_secs, 60);
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server: [not a mapping").unwrap();

        let err = DashboardConfig::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }
}
