//! Background re-render after an edit.
//!
//! An update commits its structured edits first and then re-renders the
//! tenant's rendered copy on a separate task. The caller gets a
//! [`RenderHandle`] and decides whether to await the outcome; dropping the
//! handle leaves the render running, and a failure is then only logged.

use std::future::Future;

use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::domain::{Error, TraceId};

/// Result channel of a spawned render.
#[derive(Debug)]
pub struct RenderHandle {
    task: JoinHandle<Result<(), Error>>,
}

impl RenderHandle {
    /// Spawn `render` on the runtime, keeping the caller's trace id in scope.
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn<F>(render: F) -> Self
    where
        F: Future<Output = Result<(), Error>> + Send + 'static,
    {
        let task = tokio::spawn(TraceId::propagate(async move {
            let outcome = render.await;
            match &outcome {
                Ok(()) => debug!("re-render finished"),
                Err(err) => error!(error = %err, code = ?err.code(), "re-render failed"),
            }
            outcome
        }));
        Self { task }
    }

    /// Handle for work that has already finished.
    #[must_use]
    pub fn completed() -> Self {
        Self::spawn(async { Ok(()) })
    }

    /// Wait for the render to finish.
    pub async fn wait(self) -> Result<(), Error> {
        self.task
            .await
            .map_err(|join| Error::internal(format!("render task aborted: {join}")))?
    }

    /// Whether the render already finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
