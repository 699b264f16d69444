use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use hestia_core::{SchemaLimits, schema::LimitsError};
use serde::Deserialize;

use crate::registry::NewDeviceType;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid [schema] section: {0}")]
    Limits(#[from] LimitsError),
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub schema: SchemaLimits,
    #[serde(default)]
    pub account: AccountConfig,
    /// Device types registered at startup.
    #[serde(default)]
    pub device_types: Vec<NewDeviceType>,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address for the HTTP server to listen on
    pub http_addr: SocketAddr,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Prepended to an account's activation token to form its activation link.
    pub activation_url_base: String,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            activation_url_base: "https://hestia.example.org/activate/".to_owned(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        config.check()?;
        Ok(config)
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Rejects limits the schema cannot enforce consistently.
    pub fn check(&self) -> Result<(), ConfigError> {
        self.schema.check()?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                http_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080)),
            },
            schema: SchemaLimits::default(),
            account: AccountConfig::default(),
            device_types: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_file() {
        let config = Config::parse(
            r#"
            [server]
            http_addr = "127.0.0.1:3000"

            [schema]
            pseudonym_min = 1000
            pseudonym_max = 1999

            [account]
            activation_url_base = "https://example.org/a/"

            [[device_types]]
            name = "thermostat"
            installation_manual_url = "https://example.org/manuals/thermostat"

            [[device_types.properties]]
            name = "roomTemp"
            unit = "°C"

            [[device_types.properties]]
            name = "isOn"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.http_addr.port(), 3000);
        assert_eq!(config.schema.pseudonym_min, 1000);
        assert_eq!(config.schema.location_max_digits, 9);
        assert_eq!(config.account.activation_url_base, "https://example.org/a/");

        let thermostat = &config.device_types[0];
        assert_eq!(thermostat.properties.len(), 2);
        assert_eq!(thermostat.properties[0].unit.as_deref(), Some("°C"));
        assert_eq!(thermostat.properties[1].unit, None);
        assert!(config.check().is_ok());
    }

    #[test]
    fn optional_sections_default() {
        let config = Config::parse(
            r#"
            [server]
            http_addr = "0.0.0.0:8080"
            "#,
        )
        .unwrap();

        assert_eq!(config.schema, SchemaLimits::default());
        assert!(config.device_types.is_empty());
    }

    #[test]
    fn rejects_inverted_pseudonym_range() {
        let config = Config::parse(
            r#"
            [server]
            http_addr = "0.0.0.0:8080"

            [schema]
            pseudonym_min = 10
            pseudonym_max = 5
            "#,
        )
        .unwrap();

        assert!(matches!(
            config.check(),
            Err(ConfigError::Limits(LimitsError::PseudonymRange { min: 10, max: 5 }))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Config::load(Path::new("/nonexistent/hestia-prime.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/hestia-prime.toml"));
    }
}
