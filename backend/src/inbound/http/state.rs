//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend only
//! on driving ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    DocumentCommand, DocumentQuery, PreviewQuery, PublishCommand, RewriteCommand,
};

/// Parameter object bundling the port implementations used by handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Document retrieval.
    pub documents: Arc<dyn DocumentQuery>,
    /// Content updates and establishment.
    pub content: Arc<dyn DocumentCommand>,
    /// Publishing.
    pub publisher: Arc<dyn PublishCommand>,
    /// Raw blob previews.
    pub preview: Arc<dyn PreviewQuery>,
    /// AI copy rewrites.
    pub rewriter: Arc<dyn RewriteCommand>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Document retrieval.
    pub documents: Arc<dyn DocumentQuery>,
    /// Content updates and establishment.
    pub content: Arc<dyn DocumentCommand>,
    /// Publishing.
    pub publisher: Arc<dyn PublishCommand>,
    /// Raw blob previews.
    pub preview: Arc<dyn PreviewQuery>,
    /// AI copy rewrites.
    pub rewriter: Arc<dyn RewriteCommand>,
    /// Hold update responses until the re-render finished.
    pub await_render: bool,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state that answers updates without waiting for the render.
    #[must_use]
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            documents,
            content,
            publisher,
            preview,
            rewriter,
        } = ports;
        Self {
            documents,
            content,
            publisher,
            preview,
            rewriter,
            await_render: false,
        }
    }

    /// Toggle awaiting the background render in update responses.
    #[must_use]
    pub fn with_await_render(mut self, await_render: bool) -> Self {
        self.await_render = await_render;
        self
    }
}
