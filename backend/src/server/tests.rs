//! Tests for server bootstrap: readiness signalling and port retry.

use std::net::TcpListener;

use super::*;
use rstest::{fixture, rstest};

#[fixture]
fn health_state() -> web::Data<HealthState> {
    web::Data::new(HealthState::new())
}

#[rstest]
#[actix_rt::test]
async fn create_server_marks_ready(health_state: web::Data<HealthState>) {
    assert!(!health_state.is_ready(), "state should start unready");

    let _server = create_server(health_state.clone(), ServerConfig::new("127.0.0.1", 0))
        .await
        .expect("server should build with memory stores");

    assert!(
        health_state.is_ready(),
        "server creation should mark readiness"
    );
}

#[rstest]
fn occupied_ports_roll_over_to_the_next_one() {
    let taken = TcpListener::bind(("127.0.0.1", 0)).expect("reserve a port");
    let port = taken.local_addr().expect("address").port();

    match bind_with_retry("127.0.0.1", port, 5) {
        Ok(listener) => {
            let bound = listener.local_addr().expect("address").port();
            assert!(bound > port && bound < port.saturating_add(5));
        }
        // The neighbouring ports may all be busy on a shared host.
        Err(err) => assert_eq!(err.kind(), io::ErrorKind::AddrInUse),
    }
}

#[rstest]
fn a_single_attempt_reports_the_conflict() {
    let taken = TcpListener::bind(("127.0.0.1", 0)).expect("reserve a port");
    let port = taken.local_addr().expect("address").port();

    let err = bind_with_retry("127.0.0.1", port, 1).expect_err("port is taken");
    assert_eq!(err.kind(), io::ErrorKind::AddrInUse);
}

#[rstest]
#[actix_rt::test]
async fn a_taken_port_leaves_the_server_unready(health_state: web::Data<HealthState>) {
    let taken = TcpListener::bind(("127.0.0.1", 0)).expect("reserve a port");
    let port = taken.local_addr().expect("address").port();

    let result = create_server(health_state.clone(), ServerConfig::new("127.0.0.1", port)).await;

    assert!(matches!(result, Err(err) if err.kind() == io::ErrorKind::AddrInUse));
    assert!(!health_state.is_ready());
}
