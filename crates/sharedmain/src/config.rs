//! Layered application configuration.
//!
//! Sources, in increasing precedence:
//! 1. built-in defaults
//! 2. `configuration/base.yaml` (optional)
//! 3. `configuration/{environment}.yaml` (optional)
//! 4. `APP_` prefixed environment variables, `__` separating nested keys,
//!    e.g. `APP_SERVER__PORT=9000`

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;
use thiserror::Error;

const APP_ENVIRONMENT_ENV_NAME: &str = "APP_ENVIRONMENT";
const CONFIGURATION_DIR: &str = "configuration";
const BASE_CONFIG_FILE: &str = "base.yaml";
const ENV_PREFIX: &str = "APP";
const ENV_PREFIX_SEPARATOR: &str = "_";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not a supported environment, use `dev`, `staging` or `prod`")]
    UnsupportedEnvironment(String),

    #[error("failed to determine the current directory: {0}")]
    CurrentDir(#[from] std::io::Error),

    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Runtime environment, read from `APP_ENVIRONMENT`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    #[default]
    Prod,
}

impl Environment {
    /// Reads `APP_ENVIRONMENT`, defaulting to [`Environment::Prod`].
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var(APP_ENVIRONMENT_ENV_NAME) {
            Ok(value) => value.parse(),
            Err(_) => Ok(Self::default()),
        }
    }

    /// `true` for production and staging.
    pub fn is_prod(self) -> bool {
        matches!(self, Self::Prod | Self::Staging)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Environment::Dev => "dev",
            Environment::Staging => "staging",
            Environment::Prod => "prod",
        })
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dev" => Ok(Self::Dev),
            "staging" => Ok(Self::Staging),
            "prod" => Ok(Self::Prod),
            other => Err(ConfigError::UnsupportedEnvironment(other.to_string())),
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Worker threads; the actix default (one per core) when unset.
    #[serde(default)]
    pub workers: Option<usize>,
    /// Seconds in-flight requests get to finish on shutdown.
    pub shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub log_format: LogFormat,
    /// OTLP gRPC endpoint; spans are only exported when set.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

/// Settings of a plugin server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Loads the configuration for the environment in `APP_ENVIRONMENT`
    /// from the `configuration` directory under the working directory.
    pub fn load() -> Result<Self, ConfigError> {
        let environment = Environment::load()?;
        let directory = std::env::current_dir()?.join(CONFIGURATION_DIR);
        Self::load_from(&directory, environment)
    }

    /// Loads the configuration with files read from `directory`.
    pub fn load_from(directory: &Path, environment: Environment) -> Result<Self, ConfigError> {
        let settings = defaults(environment)?
            .add_source(config::File::from(directory.join(BASE_CONFIG_FILE)).required(false))
            .add_source(
                config::File::from(directory.join(format!("{environment}.yaml"))).required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_PREFIX_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

fn defaults(environment: Environment) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let log_format = if environment.is_prod() { "json" } else { "pretty" };
    Ok(config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080_i64)?
        .set_default("server.shutdown_timeout_secs", 30_i64)?
        .set_default("telemetry.service_name", "katanomi-plugin")?
        .set_default("telemetry.log_format", log_format)?)
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn from_yaml(environment: Environment, yaml: &str) -> AppConfig {
        defaults(environment)
            .unwrap()
            .add_source(config::File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn parses_environments() {
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Dev);
        assert_eq!(" Staging ".parse::<Environment>().unwrap(), Environment::Staging);
        assert!(matches!(
            "qa".parse::<Environment>(),
            Err(ConfigError::UnsupportedEnvironment(ref e)) if e == "qa"
        ));
        assert!(Environment::Staging.is_prod());
        assert!(!Environment::Dev.is_prod());
    }

    #[test]
    fn defaults_follow_the_environment() {
        let prod = from_yaml(Environment::Prod, "{}");
        assert_eq!(prod.server.host, "0.0.0.0");
        assert_eq!(prod.server.port, 8080);
        assert_eq!(prod.server.workers, None);
        assert_eq!(prod.telemetry.log_format, LogFormat::Json);
        assert_eq!(prod.telemetry.otlp_endpoint, None);

        let dev = from_yaml(Environment::Dev, "{}");
        assert_eq!(dev.telemetry.log_format, LogFormat::Pretty);
    }

    #[test]
    fn files_override_defaults() {
        let config = from_yaml(
            Environment::Dev,
            r#"
server:
  port: 9000
  workers: 2
telemetry:
  service_name: gitlab-plugin
  log_format: json
  otlp_endpoint: http://collector:4317
"#,
        );
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.workers, Some(2));
        assert_eq!(config.server.shutdown_timeout_secs, 30);
        assert_eq!(config.telemetry.service_name, "gitlab-plugin");
        assert_eq!(config.telemetry.log_format, LogFormat::Json);
        assert_eq!(
            config.telemetry.otlp_endpoint.as_deref(),
            Some("http://collector:4317")
        );
    }

    #[test]
    fn missing_files_are_optional() {
        let config =
            AppConfig::load_from(Path::new("/nonexistent/configuration"), Environment::Dev)
                .unwrap();
        assert_eq!(config.telemetry.service_name, "katanomi-plugin");
    }
}
