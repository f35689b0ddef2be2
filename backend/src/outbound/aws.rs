//! Shared AWS SDK configuration for the record and blob store adapters.

use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_dynamodb::config::{Credentials, Region};

/// Default DynamoDB table holding tenant records.
pub const DEFAULT_TABLE_NAME: &str = "NUC";
/// Region used when none is configured.
pub const DEFAULT_REGION: &str = "us-east-1";
/// DynamoDB endpoint of the local emulator.
pub const LOCAL_DYNAMODB_ENDPOINT: &str = "http://localhost:8000";
/// S3 endpoint of the local emulator.
pub const LOCAL_S3_ENDPOINT: &str = "http://localhost:4569";

const STATIC_CREDENTIALS_PROVIDER: &str = "pagebind-settings";
const LOCAL_ACCESS_KEY: &str = "S3RVER";
const LOCAL_SECRET_KEY: &str = "S3RVER";

/// Connection settings for the cloud stores, resolved once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// AWS region; [`DEFAULT_REGION`] when unset.
    pub region: Option<String>,
    /// Use local emulator endpoints and credentials unless overridden.
    pub local: bool,
    /// DynamoDB endpoint override.
    pub dynamodb_endpoint: Option<String>,
    /// S3 endpoint override.
    pub s3_endpoint: Option<String>,
    /// Use path-style S3 addressing.
    pub s3_force_path_style: bool,
    /// Static access key override.
    pub access_key: Option<String>,
    /// Static secret key override.
    pub secret_key: Option<String>,
    /// DynamoDB table name; [`DEFAULT_TABLE_NAME`] when unset.
    pub table_name: Option<String>,
}

impl StoreConfig {
    /// Table name, falling back to [`DEFAULT_TABLE_NAME`].
    #[must_use]
    pub fn table_name(&self) -> &str {
        self.table_name.as_deref().unwrap_or(DEFAULT_TABLE_NAME)
    }

    /// Region, falling back to [`DEFAULT_REGION`].
    #[must_use]
    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    /// DynamoDB endpoint override; the local emulator in local mode.
    #[must_use]
    pub fn dynamodb_endpoint(&self) -> Option<&str> {
        self.dynamodb_endpoint
            .as_deref()
            .or(self.local.then_some(LOCAL_DYNAMODB_ENDPOINT))
    }

    /// S3 endpoint override; the local emulator in local mode.
    #[must_use]
    pub fn s3_endpoint(&self) -> Option<&str> {
        self.s3_endpoint
            .as_deref()
            .or(self.local.then_some(LOCAL_S3_ENDPOINT))
    }

    /// Path-style addressing is forced against emulators.
    #[must_use]
    pub fn s3_force_path_style(&self) -> bool {
        self.s3_force_path_style || self.local
    }

    fn static_credentials(&self) -> Option<Credentials> {
        match (&self.access_key, &self.secret_key) {
            (Some(access), Some(secret)) => Some(Credentials::new(
                access,
                secret,
                None,
                None,
                STATIC_CREDENTIALS_PROVIDER,
            )),
            _ if self.local => Some(Credentials::new(
                LOCAL_ACCESS_KEY,
                LOCAL_SECRET_KEY,
                None,
                None,
                STATIC_CREDENTIALS_PROVIDER,
            )),
            _ => None,
        }
    }
}

/// Load the shared SDK configuration: region and static credentials from
/// `config`, everything else from the default provider chain.
pub async fn load_sdk_config(config: &StoreConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region().to_owned()));
    if let Some(credentials) = config.static_credentials() {
        loader = loader.credentials_provider(credentials);
    }
    loader.load().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_target_the_cloud() {
        let config = StoreConfig::default();
        assert_eq!(config.table_name(), DEFAULT_TABLE_NAME);
        assert_eq!(config.region(), DEFAULT_REGION);
        assert_eq!(config.dynamodb_endpoint(), None);
        assert_eq!(config.s3_endpoint(), None);
        assert!(!config.s3_force_path_style());
        assert!(config.static_credentials().is_none());
    }

    #[rstest]
    fn local_mode_points_at_emulators() {
        let config = StoreConfig {
            local: true,
            ..StoreConfig::default()
        };
        assert_eq!(config.dynamodb_endpoint(), Some(LOCAL_DYNAMODB_ENDPOINT));
        assert_eq!(config.s3_endpoint(), Some(LOCAL_S3_ENDPOINT));
        assert!(config.s3_force_path_style());
        assert!(config.static_credentials().is_some());
    }

    #[rstest]
    fn explicit_endpoints_win_over_local_mode() {
        let config = StoreConfig {
            local: true,
            dynamodb_endpoint: Some("http://dynamo:9000".into()),
            ..StoreConfig::default()
        };
        assert_eq!(config.dynamodb_endpoint(), Some("http://dynamo:9000"));
    }
}
