//! Builders wiring store adapters into the driving ports used by handlers.

use std::sync::Arc;

use actix_web::web;
use tracing::info;

use pagebind::domain::ports::{
    BlobStore, CopyRewriter, SectionMapper, TenantRecordStore, UnconfiguredCopyRewriter,
};
use pagebind::domain::{
    BlobPreviewService, ContentService, LocalSectionMapper, PublishService, RewriteService,
};
use pagebind::inbound::http::state::{HttpState, HttpStatePorts};
use pagebind::outbound::{
    DynamoRecordStore, HttpSectionMapper, InMemoryBlobStore, InMemoryRecordStore, OpenAiRewriter,
    S3BlobStore, load_sdk_config,
};

use super::config::{ServerConfig, StoreBackend};
use super::settings::MAPPING_TIMEOUT;

type Stores = (Arc<dyn TenantRecordStore>, Arc<dyn BlobStore>);

async fn build_stores(backend: &StoreBackend) -> Stores {
    match backend {
        StoreBackend::Memory => {
            info!("using in-memory record and blob stores");
            (
                Arc::new(InMemoryRecordStore::new()),
                Arc::new(InMemoryBlobStore::new()),
            )
        }
        StoreBackend::Aws(store_config) => {
            let sdk_config = load_sdk_config(store_config).await;
            info!(
                table = store_config.table_name(),
                region = store_config.region(),
                local = store_config.local,
                "using DynamoDB and S3 stores"
            );
            (
                Arc::new(DynamoRecordStore::new(&sdk_config, store_config)),
                Arc::new(S3BlobStore::new(&sdk_config, store_config)),
            )
        }
    }
}

fn build_mapper(
    config: &ServerConfig,
    records: &Arc<dyn TenantRecordStore>,
) -> std::io::Result<Arc<dyn SectionMapper>> {
    match &config.mapping_endpoint {
        Some(endpoint) => {
            info!(endpoint = %endpoint, "using remote mapping service");
            let mapper = HttpSectionMapper::new(endpoint.clone(), MAPPING_TIMEOUT)
                .map_err(|e| std::io::Error::other(format!("mapping client: {e}")))?;
            Ok(Arc::new(mapper))
        }
        None => Ok(Arc::new(LocalSectionMapper::new(Arc::clone(records)))),
    }
}

fn build_rewriter(config: &ServerConfig) -> std::io::Result<Arc<dyn CopyRewriter>> {
    match &config.rewriter {
        Some(rewriter) => {
            let client = OpenAiRewriter::new(rewriter.clone())
                .map_err(|e| std::io::Error::other(format!("rewriter client: {e}")))?;
            Ok(Arc::new(client))
        }
        None => {
            info!("no OpenAI key configured; rewrite requests will fail");
            Ok(Arc::new(UnconfiguredCopyRewriter))
        }
    }
}

/// Wire the given stores into handler state.
///
/// # Errors
///
/// Returns an error when an outbound HTTP client cannot be constructed.
pub fn build_http_state_with(
    config: &ServerConfig,
    stores: Stores,
) -> std::io::Result<web::Data<HttpState>> {
    let (records, blobs) = stores;
    let mapper = build_mapper(config, &records)?;
    let content = Arc::new(ContentService::new(
        Arc::clone(&records),
        Arc::clone(&blobs),
        mapper,
    ));
    let ports = HttpStatePorts {
        documents: content.clone(),
        content,
        publisher: Arc::new(PublishService::new(Arc::clone(&records), Arc::clone(&blobs))),
        preview: Arc::new(BlobPreviewService::new(blobs)),
        rewriter: Arc::new(RewriteService::new(build_rewriter(config)?)),
    };
    Ok(web::Data::new(
        HttpState::new(ports).with_await_render(config.await_render),
    ))
}

/// Build handler state from the configured store backend.
///
/// # Errors
///
/// Returns an error when an outbound HTTP client cannot be constructed.
pub async fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let stores = build_stores(&config.stores).await;
    build_http_state_with(config, stores)
}
