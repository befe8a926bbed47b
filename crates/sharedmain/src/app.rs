//! Plugin server assembly.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use actix_web::dev::Server;
use actix_web::{web, HttpResponse, HttpServer, Responder};
use anyhow::Context;
use apis::{capabilities_of, Plugin, PluginError};
use plugin_route::{configure_plugins, plugin_scope_path};
use thiserror::Error;
use tracing_actix_web::TracingLogger;

use crate::config::AppConfig;

/// Path of the liveness endpoint.
pub const HEALTH_PATH: &str = "/healthz";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("plugin path is empty")]
    EmptyPluginPath,

    #[error("more than one plugin is registered under `{0}`")]
    DuplicatePluginPath(String),

    #[error("setup of plugin `{plugin}` failed: {source}")]
    Setup {
        plugin: String,
        #[source]
        source: PluginError,
    },

    #[error("failed to bind {host}:{port}: {source}")]
    Bind {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },
}

/// A plugin server: a name, its settings and the plugins it serves.
pub struct App {
    name: String,
    config: AppConfig,
    plugins: Vec<Arc<dyn Plugin>>,
}

impl App {
    pub fn new(name: impl Into<String>, config: AppConfig) -> Self {
        Self {
            name: name.into(),
            config,
            plugins: Vec::new(),
        }
    }

    /// Adds a plugin.
    pub fn plugin(self, plugin: impl Plugin) -> Self {
        self.with_plugin(Arc::new(plugin))
    }

    /// Adds an already shared plugin.
    pub fn with_plugin(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Runs each plugin's setup and logs what it serves.
    pub async fn setup(&self) -> Result<(), AppError> {
        for plugin in &self.plugins {
            let started = Instant::now();
            plugin.setup().await.map_err(|source| AppError::Setup {
                plugin: plugin.path().to_string(),
                source,
            })?;

            let capabilities: Vec<&str> = capabilities_of(plugin.as_ref())
                .into_iter()
                .map(|c| c.name())
                .collect();
            tracing::info!(
                plugin = plugin.path(),
                capabilities = ?capabilities,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "plugin ready"
            );
        }
        Ok(())
    }

    /// Binds the server without running it.
    ///
    /// Returns the server future and the bound port, which differs from the
    /// configured one when that is `0`.
    pub fn build(self) -> Result<(Server, u16), AppError> {
        check_plugin_paths(&self.plugins)?;

        let server_config = &self.config.server;
        let plugins = self.plugins;
        let mut server = HttpServer::new(move || {
            let plugins = plugins.clone();
            actix_web::App::new()
                .wrap(TracingLogger::default())
                .route(HEALTH_PATH, web::get().to(health_check))
                .configure(move |cfg| configure_plugins(cfg, &plugins))
        })
        .shutdown_timeout(server_config.shutdown_timeout_secs);
        if let Some(workers) = server_config.workers {
            server = server.workers(workers);
        }

        let server = server
            .bind((server_config.host.as_str(), server_config.port))
            .map_err(|source| AppError::Bind {
                host: server_config.host.clone(),
                port: server_config.port,
                source,
            })?;
        let port = server
            .addrs()
            .first()
            .map_or(server_config.port, |addr| addr.port());

        tracing::info!(app = %self.name, host = %server_config.host, port, "server bound");
        Ok((server.run(), port))
    }

    /// Sets up every plugin, then serves until the process is signalled.
    pub async fn run(self) -> anyhow::Result<()> {
        let name = self.name.clone();
        self.setup().await.context("plugin setup failed")?;
        let (server, port) = self.build()?;

        tracing::info!(app = %name, port, "serving");
        server.await.context("server terminated with an error")?;
        tracing::info!(app = %name, "server stopped");
        Ok(())
    }
}

fn check_plugin_paths(plugins: &[Arc<dyn Plugin>]) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for plugin in plugins {
        if plugin.path().trim_matches('/').is_empty() {
            return Err(AppError::EmptyPluginPath);
        }
        let scope = plugin_scope_path(plugin.path());
        if !seen.insert(scope) {
            return Err(AppError::DuplicatePluginPath(plugin.path().to_string()));
        }
    }
    Ok(())
}

async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl Plugin for Named {
        fn path(&self) -> &str {
            self.0
        }
    }

    fn plugins(paths: &[&'static str]) -> Vec<Arc<dyn Plugin>> {
        paths
            .iter()
            .map(|p| Arc::new(Named(p)) as Arc<dyn Plugin>)
            .collect()
    }

    #[test]
    fn plugin_paths_must_be_unique_and_non_empty() {
        assert!(check_plugin_paths(&plugins(&["gitlab", "github"])).is_ok());
        assert!(matches!(
            check_plugin_paths(&plugins(&["gitlab", "/gitlab/"])),
            Err(AppError::DuplicatePluginPath(ref p)) if p == "/gitlab/"
        ));
        assert!(matches!(
            check_plugin_paths(&plugins(&["/"])),
            Err(AppError::EmptyPluginPath)
        ));
    }
}
