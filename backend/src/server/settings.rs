//! Application settings loaded via OrthoConfig.
//!
//! Every field can come from the command line, a config file or a
//! `PAGEBIND_*` environment variable.

use std::time::Duration;

use ortho_config::OrthoConfig;
use pagebind::outbound::{RewriterConfig, StoreConfig};
use reqwest::Url;
use serde::Deserialize;

const DEFAULT_BIND_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_PORT_ATTEMPTS: u16 = 10;
/// Request timeout of the remote mapping service.
pub const MAPPING_TIMEOUT: Duration = Duration::from_secs(30);

/// Server, store and outbound service settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PAGEBIND")]
pub struct AppSettings {
    /// Listen address; `0.0.0.0` when unset.
    pub bind_host: Option<String>,
    /// Listen port; 8080 when unset.
    pub port: Option<u16>,
    /// Following ports tried when the configured one is taken.
    pub port_attempts: Option<u16>,
    pub region: Option<String>,
    /// Talk to the local DynamoDB and S3 emulators.
    #[ortho_config(default = false)]
    pub local: bool,
    pub dynamodb_endpoint: Option<String>,
    pub s3_endpoint: Option<String>,
    #[ortho_config(default = false)]
    pub s3_force_path_style: bool,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub table_name: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_model: Option<String>,
    /// Remote selector mapping service; the in-process mapping otherwise.
    pub mapping_endpoint: Option<String>,
    /// Hold update responses until the re-render finished.
    #[ortho_config(default = false)]
    pub await_render: bool,
    /// Keep records and blobs in process memory instead of AWS.
    #[ortho_config(default = false)]
    pub memory_stores: bool,
}

impl AppSettings {
    /// Listen address.
    #[must_use]
    pub fn bind_host(&self) -> &str {
        self.bind_host.as_deref().unwrap_or(DEFAULT_BIND_HOST)
    }

    /// Listen port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Ports to try, at least one.
    #[must_use]
    pub fn port_attempts(&self) -> u16 {
        self.port_attempts.unwrap_or(DEFAULT_PORT_ATTEMPTS).max(1)
    }

    /// In-process stores are only used when no cloud setting is present.
    #[must_use]
    pub fn use_memory_stores(&self) -> bool {
        self.memory_stores
            && !self.local
            && self.dynamodb_endpoint.is_none()
            && self.s3_endpoint.is_none()
    }

    /// Store settings for the AWS backend.
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            region: self.region.clone(),
            local: self.local,
            dynamodb_endpoint: self.dynamodb_endpoint.clone(),
            s3_endpoint: self.s3_endpoint.clone(),
            s3_force_path_style: self.s3_force_path_style,
            access_key: self.access_key.clone(),
            secret_key: self.secret_key.clone(),
            table_name: self.table_name.clone(),
        }
    }

    /// Rewriter settings, or `None` when no API key is configured.
    pub fn rewriter_config(&self) -> Result<Option<RewriterConfig>, url::ParseError> {
        let Some(api_key) = self.openai_api_key.as_deref() else {
            return Ok(None);
        };
        let config = RewriterConfig::new(api_key)?;
        Ok(Some(match self.openai_model.as_deref() {
            Some(model) => config.with_model(model),
            None => config,
        }))
    }

    /// Remote mapping endpoint, if configured.
    pub fn mapping_endpoint(&self) -> Result<Option<Url>, url::ParseError> {
        self.mapping_endpoint.as_deref().map(Url::parse).transpose()
    }
}
