//! Health checks.
//!
//! ```text
//! GET /health/live   200 while the process serves requests
//! GET /health/ready  200 once stores are wired and the listener is bound
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::http::StatusCode;
use actix_web::http::header::{CacheControl, CacheDirective};
use actix_web::{HttpResponse, get, web};
use serde_json::json;

/// Readiness flag flipped by the server once it is listening.
#[derive(Debug, Default)]
pub struct HealthState {
    ready: AtomicBool,
}

impl HealthState {
    /// State reporting "starting" until [`HealthState::mark_ready`] runs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip readiness once the listener is bound.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Whether [`HealthState::mark_ready`] has run.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

fn report(status: StatusCode, label: &str) -> HttpResponse {
    HttpResponse::build(status)
        .insert_header(CacheControl(vec![CacheDirective::NoStore]))
        .json(json!({ "status": label }))
}

/// Readiness check: 503 until the server has bound its listener.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    responses(
        (status = 200, description = "Accepting traffic"),
        (status = 503, description = "Still starting")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    if state.is_ready() {
        report(StatusCode::OK, "ready")
    } else {
        report(StatusCode::SERVICE_UNAVAILABLE, "starting")
    }
}

/// Liveness check: 200 whenever the process answers.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    responses((status = 200, description = "Process is serving"))
)]
#[get("/health/live")]
pub async fn live() -> HttpResponse {
    report(StatusCode::OK, "live")
}
