//! Request correlation id held in tokio task-local storage.
//!
//! The HTTP middleware opens a scope per request; [`Error`](crate::domain::Error)
//! and log events read it from there. Background renders run on their own
//! tokio task, so they carry the id across with [`TraceId::propagate`].

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

task_local! {
    static CURRENT: TraceId;
}

/// UUID identifying one inbound request.
///
/// ```
/// use pagebind::TraceId;
///
/// let id = TraceId::generate();
/// assert_eq!(TraceId::from_header(&id.to_string()), Some(id));
/// assert_eq!(TraceId::from_header("not-a-uuid"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Identifier of the enclosing scope, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Parse a caller-supplied header value, ignoring surrounding whitespace.
    #[must_use]
    pub fn from_header(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }

    /// Underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Run `fut` with `trace_id` as the current identifier.
    pub async fn scope<Fut: Future>(trace_id: Self, fut: Fut) -> Fut::Output {
        CURRENT.scope(trace_id, fut).await
    }

    /// Capture the current identifier for a future that will be spawned.
    pub fn propagate<Fut>(fut: Fut) -> impl Future<Output = Fut::Output> + Send
    where
        Fut: Future + Send,
        Fut::Output: Send,
    {
        let captured = Self::current();
        async move {
            if let Some(trace_id) = captured {
                Self::scope(trace_id, fut).await
            } else {
                fut.await
            }
        }
    }
}

impl From<Uuid> for TraceId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn scope_sets_and_clears_the_current_id() {
        let id = TraceId::generate();

        let inside = TraceId::scope(id, async { TraceId::current() }).await;

        assert_eq!(inside, Some(id));
        assert_eq!(TraceId::current(), None);
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    #[tokio::test]
    async fn spawned_tasks_see_the_captured_id(#[case] scoped: bool) {
        let id = TraceId::generate();
        let spawn = || async { tokio::spawn(TraceId::propagate(async { TraceId::current() })).await };

        let observed = if scoped {
            TraceId::scope(id, spawn()).await
        } else {
            spawn().await
        }
        .expect("task joins");

        assert_eq!(observed, scoped.then_some(id));
    }

    #[rstest]
    #[case(" 7d444840-9dc0-11d1-b245-5ffdce74fad2 ", true)]
    #[case("7d444840", false)]
    #[case("", false)]
    fn header_values_must_be_uuids(#[case] raw: &str, #[case] accepted: bool) {
        assert_eq!(TraceId::from_header(raw).is_some(), accepted);
    }
}
