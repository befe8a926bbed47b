//! Bootstrap for Katanomi plugin servers.
//!
//! A plugin binary loads its [`AppConfig`], installs tracing and hands its
//! plugins to an [`App`]:
//!
//! ```no_run
//! # use apis::Plugin;
//! # struct Gitlab;
//! # impl Plugin for Gitlab { fn path(&self) -> &str { "gitlab" } }
//! # async fn start() -> anyhow::Result<()> {
//! let config = sharedmain::AppConfig::load()?;
//! let _guard = sharedmain::init_tracing(&config.telemetry)?;
//! sharedmain::App::new("gitlab-plugin", config)
//!     .plugin(Gitlab)
//!     .run()
//!     .await
//! # }
//! ```

pub mod app;
pub mod config;
pub mod telemetry;

pub use app::{App, AppError, HEALTH_PATH};
pub use config::{AppConfig, ConfigError, Environment, LogFormat, ServerConfig, TelemetryConfig};
pub use telemetry::{init_tracing, TelemetryError, TelemetryGuard};
