//! Provision a tenant: table, buckets, default record and base templates.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::Parser;
use pagebind::domain::ports::{BlobStore, HTML_CONTENT_TYPE, TenantRecordStore};
use pagebind::domain::{ArtifactKind, DocumentName, TenantId, TenantRecord};
use pagebind::outbound::{DynamoRecordStore, S3BlobStore, StoreConfig, load_sdk_config};
use tokio::runtime::Builder;

/// `seed-tenant` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "seed-tenant",
    about = "Create the tenant table, buckets and default record, and upload base templates",
    version
)]
struct CliArgs {
    /// Tenant identifier to provision.
    #[arg(long = "client-id", value_name = "id")]
    client_id: u64,
    /// Base template to upload; the file name must be a known document.
    #[arg(long = "template", value_name = "path")]
    templates: Vec<PathBuf>,
    /// Create the table when it does not exist.
    #[arg(long)]
    create_table: bool,
    /// Use the local DynamoDB and S3 emulators.
    #[arg(long)]
    local: bool,
    #[arg(long, value_name = "region")]
    region: Option<String>,
    #[arg(long = "table-name", value_name = "name")]
    table_name: Option<String>,
    #[arg(long = "dynamodb-endpoint", value_name = "url")]
    dynamodb_endpoint: Option<String>,
    #[arg(long = "s3-endpoint", value_name = "url")]
    s3_endpoint: Option<String>,
}

impl CliArgs {
    fn store_config(&self) -> StoreConfig {
        StoreConfig {
            region: self.region.clone(),
            local: self.local,
            dynamodb_endpoint: self.dynamodb_endpoint.clone(),
            s3_endpoint: self.s3_endpoint.clone(),
            table_name: self.table_name.clone(),
            ..StoreConfig::default()
        }
    }
}

fn main() -> io::Result<()> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let tenant_id = TenantId::new(args.client_id);
    let templates = args
        .templates
        .iter()
        .map(|path| document_for(path).map(|document| (path, document)))
        .collect::<io::Result<Vec<_>>>()?;

    let store_config = args.store_config();
    let sdk_config = load_sdk_config(&store_config).await;
    let records = DynamoRecordStore::new(&sdk_config, &store_config);
    let blobs = S3BlobStore::new(&sdk_config, &store_config);
    let mut stdout = io::stdout().lock();

    if args.create_table {
        let created = records
            .ensure_table()
            .await
            .map_err(|error| io::Error::other(format!("create table: {error}")))?;
        writeln!(stdout, "table_created={created}")?;
    }

    for kind in [
        ArtifactKind::BaseTemplate,
        ArtifactKind::WorkingTemplate,
        ArtifactKind::RenderedCopy,
        ArtifactKind::Production,
    ] {
        let bucket = kind.locate(tenant_id, DocumentName::Index);
        let created = blobs
            .ensure_bucket(bucket.bucket())
            .await
            .map_err(|error| io::Error::other(format!("create bucket: {error}")))?;
        writeln!(stdout, "bucket={} created={created}", bucket.bucket())?;
    }

    let created = records
        .create(&TenantRecord::provisioned(
            tenant_id,
            Utc::now().timestamp_millis(),
        ))
        .await
        .map_err(|error| io::Error::other(format!("create tenant record: {error}")))?;
    writeln!(stdout, "tenant={tenant_id} record_created={created}")?;

    for (path, document) in templates {
        let body = std::fs::read(path)?;
        let location = ArtifactKind::BaseTemplate.locate(tenant_id, document);
        blobs
            .put(&location, body, HTML_CONTENT_TYPE)
            .await
            .map_err(|error| io::Error::other(format!("upload {}: {error}", path.display())))?;
        writeln!(stdout, "uploaded={location}")?;
    }

    Ok(())
}

fn document_for(path: &Path) -> io::Result<DocumentName> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| io::Error::other(format!("{} has no file name", path.display())))?;
    name.parse()
        .map_err(|error| io::Error::other(format!("{}: {error}", path.display())))
}
