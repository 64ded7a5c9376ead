use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::transport::ConnectionConfig;
use crate::transport::socket::DEFAULT_SCPI_PORT;
use crate::types::InstrumentType;

/// Settings of the `scpi-ctl` tool.
///
/// Sources are layered: built-in defaults, then a TOML file, then environment
/// variables such as `RUSTY_SCPI__INSTRUMENT__HOST=192.168.1.50`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct AppConfig {
    pub instrument: InstrumentConfig,
    pub connection: ConnectionSettings,
    pub logging: LoggingConfig,
    pub recording: RecordingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct InstrumentConfig {
    pub kind: InstrumentType,
    pub host: String,
    pub port: u16,
}

/// Socket timeouts in milliseconds
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ConnectionSettings {
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub write_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    pub log_level: String,
}

/// Periodic measurement recording
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RecordingConfig {
    pub record_path: String,
    pub interval_ms: u64,
    pub buffer_size: usize,
    /// Rewrite the JSONL file as a JSON array when recording stops
    pub final_format_json: bool,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            kind: InstrumentType::PowerSupply,
            host: "127.0.0.1".to_string(),
            port: DEFAULT_SCPI_PORT,
        }
    }
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        let defaults = ConnectionConfig::default();
        Self {
            connect_timeout_ms: defaults.connect_timeout.as_millis() as u64,
            read_timeout_ms: defaults.read_timeout.as_millis() as u64,
            write_timeout_ms: defaults.write_timeout.as_millis() as u64,
        }
    }
}

impl ConnectionSettings {
    pub fn to_connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            read_timeout: Duration::from_millis(self.read_timeout_ms),
            write_timeout: Duration::from_millis(self.write_timeout_ms),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            record_path: "./records/readings".to_string(),
            interval_ms: 1000,
            buffer_size: 20,
            final_format_json: false,
        }
    }
}

/// Load configuration from file with layered fallbacks
pub fn load_config(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

    if let Some(path) = config_path {
        if path.exists() {
            builder = builder.add_source(File::from(path));
        } else {
            return Err(ConfigError::Message(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
    } else {
        for path in ["scpi.toml", "config.toml"] {
            if Path::new(path).exists() {
                builder = builder.add_source(File::with_name(path));
                break;
            }
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("RUSTY_SCPI")
            .separator("__")
            .try_parsing(true),
    );

    builder.build()?.try_deserialize::<AppConfig>()
}

/// Like [`load_config`], falling back to defaults on any error
pub fn load_config_or_default(config_path: Option<&Path>) -> AppConfig {
    match load_config(config_path) {
        Ok(config) => {
            log::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            log::warn!("Failed to load config ({e}), using defaults");
            AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_temp_config(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "rusty_scpi_{}_{name}.toml",
            std::process::id()
        ));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = Path::new("/nonexistent/rusty_scpi.toml");
        assert!(load_config(Some(path)).is_err());
        assert_eq!(load_config_or_default(Some(path)), AppConfig::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = write_temp_config(
            "override",
            r#"
[instrument]
kind = "oscilloscope"
host = "192.168.1.60"

[connection]
read_timeout_ms = 30000
"#,
        );

        let config = load_config(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.instrument.kind, InstrumentType::Oscilloscope);
        assert_eq!(config.instrument.host, "192.168.1.60");
        assert_eq!(config.instrument.port, DEFAULT_SCPI_PORT);
        assert_eq!(config.connection.read_timeout_ms, 30000);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_connection_settings_round_into_durations() {
        let settings = ConnectionSettings::default();
        assert_eq!(settings.to_connection_config(), ConnectionConfig::default());

        let slow = ConnectionSettings {
            read_timeout_ms: 1500,
            ..settings
        };
        assert_eq!(
            slow.to_connection_config().read_timeout,
            Duration::from_millis(1500)
        );
    }
}
