//! pagebind: multi-tenant website content pipeline.
//!
//! Base HTML templates carry binding markers; tenants get a working template
//! with placeholders, structured section content in a record store, and a
//! rendered copy that is promoted to production on publish.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
