//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **dynamo**: tenant records in DynamoDB
//! - **s3**: templates and rendered documents in S3 buckets
//! - **memory**: in-process stores for local runs and tests
//! - **openai**: chat-completions copy rewriter
//! - **mapping_http**: remote selector mapping service
//!
//! Adapters are thin translators between domain types and vendor
//! representations. They contain no pipeline logic.

pub mod aws;
pub mod dynamo;
pub(crate) mod http_support;
pub mod mapping_http;
pub mod memory;
pub mod openai;
pub mod s3;

pub use aws::{StoreConfig, load_sdk_config};
pub use dynamo::DynamoRecordStore;
pub use mapping_http::HttpSectionMapper;
pub use memory::{InMemoryBlobStore, InMemoryRecordStore};
pub use openai::{OpenAiRewriter, RewriterConfig};
pub use s3::S3BlobStore;
