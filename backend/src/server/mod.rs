//! Server construction and middleware wiring.

mod config;
pub mod settings;
mod state_builders;

pub use config::{ServerConfig, StoreBackend};
pub use state_builders::{build_http_state, build_http_state_with};

use std::io;
use std::net::TcpListener;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::{info, warn};

use pagebind::Trace;
#[cfg(debug_assertions)]
use pagebind::doc::ApiDoc;
use pagebind::inbound::http::documents::{
    establish_document, publish_document, retrieve_document, section_mapping, update_content,
};
use pagebind::inbound::http::health::{HealthState, live, ready};
use pagebind::inbound::http::preview::preview_blob;
use pagebind::inbound::http::rewrite::rewrite_copy;
use pagebind::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    let api = web::scope("/api/v1")
        .service(retrieve_document)
        .service(update_content)
        .service(publish_document)
        .service(section_mapping)
        .service(establish_document)
        .service(preview_blob)
        .service(rewrite_copy);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Bind the first free port in `port..port + attempts`.
fn bind_with_retry(host: &str, port: u16, attempts: u16) -> io::Result<TcpListener> {
    let mut last_error = None;
    for offset in 0..attempts {
        let Some(candidate) = port.checked_add(offset) else {
            break;
        };
        match TcpListener::bind((host, candidate)) {
            Ok(listener) => return Ok(listener),
            Err(err) if err.kind() == io::ErrorKind::AddrInUse => {
                warn!(port = candidate, "port in use, trying the next one");
                last_error = Some(err);
            }
            Err(err) => return Err(err),
        }
    }
    Err(last_error.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::AddrInUse, format!("no free port from {port}"))
    }))
}

/// Construct an Actix HTTP server around prepared handler state.
///
/// # Errors
/// Propagates [`std::io::Error`] when no port in range can be bound.
pub fn create_server_with_state(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    config: &ServerConfig,
) -> io::Result<Server> {
    let listener = bind_with_retry(&config.bind_host, config.port, config.port_attempts)?;
    info!(address = %listener.local_addr()?, "listening");

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
        })
    })
    .listen(listener)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

/// Construct an Actix HTTP server using the provided health state and
/// configuration.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when wiring adapters or binding fails.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> io::Result<Server> {
    let http_state = build_http_state(&config).await?;
    create_server_with_state(health_state, http_state, &config)
}

#[cfg(test)]
mod tests;
