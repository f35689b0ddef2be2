//! HTTP server configuration object and helpers.

use pagebind::outbound::{RewriterConfig, StoreConfig};
use reqwest::Url;

use super::settings::AppSettings;

/// Where tenant records and blobs live.
#[derive(Debug, Clone)]
pub enum StoreBackend {
    /// Process memory; lost on exit.
    Memory,
    /// DynamoDB and S3, real or emulated.
    Aws(StoreConfig),
}

/// Builder-style configuration for creating the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub(crate) bind_host: String,
    pub(crate) port: u16,
    pub(crate) port_attempts: u16,
    pub(crate) await_render: bool,
    pub(crate) stores: StoreBackend,
    pub(crate) rewriter: Option<RewriterConfig>,
    pub(crate) mapping_endpoint: Option<Url>,
}

impl ServerConfig {
    /// Listen on `bind_host:port` against in-memory stores.
    #[cfg(test)]
    #[must_use]
    pub fn new(bind_host: impl Into<String>, port: u16) -> Self {
        Self {
            bind_host: bind_host.into(),
            port,
            port_attempts: 1,
            await_render: false,
            stores: StoreBackend::Memory,
            rewriter: None,
            mapping_endpoint: None,
        }
    }

    /// Resolve the server configuration from loaded settings.
    ///
    /// # Errors
    ///
    /// Returns an error when a configured URL does not parse.
    pub fn from_settings(settings: &AppSettings) -> std::io::Result<Self> {
        let stores = if settings.use_memory_stores() {
            StoreBackend::Memory
        } else {
            StoreBackend::Aws(settings.store_config())
        };
        let rewriter = settings
            .rewriter_config()
            .map_err(|e| std::io::Error::other(format!("invalid rewriter endpoint: {e}")))?;
        let mapping_endpoint = settings
            .mapping_endpoint()
            .map_err(|e| std::io::Error::other(format!("invalid mapping endpoint: {e}")))?;

        Ok(Self {
            bind_host: settings.bind_host().to_owned(),
            port: settings.port(),
            port_attempts: settings.port_attempts(),
            await_render: settings.await_render,
            stores,
            rewriter,
            mapping_endpoint,
        })
    }
}
