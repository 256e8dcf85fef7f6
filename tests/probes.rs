//! Probers against local mock services.

use std::time::Duration;

use sre_checker::probe::{HttpProber, Prober, TcpProber};
use url::Url;

mod common;

use common::TcpBehaviour;

const MARKER: &str = "PONG";

fn tcp_prober(addr: std::net::SocketAddr, timeout: Duration) -> TcpProber {
    TcpProber::new(addr.to_string(), "token", "Testing", MARKER, timeout)
}

#[tokio::test]
async fn test_tcp_healthy_exchange() {
    let addr = common::start_tcp_service(TcpBehaviour::Healthy, MARKER).await;
    let outcome = tcp_prober(addr, Duration::from_secs(2)).check().await;
    assert!(outcome.healthy, "{}", outcome.detail);
}

#[tokio::test]
async fn test_tcp_failures_are_false_not_errors() {
    let cases = [
        (TcpBehaviour::RejectAuth, "authentication rejected"),
        (TcpBehaviour::WrongEcho, "unexpected echo reply"),
        (TcpBehaviour::Silent, "timed out"),
    ];

    for (behaviour, expected) in cases {
        let addr = common::start_tcp_service(behaviour, MARKER).await;
        let outcome = tcp_prober(addr, Duration::from_millis(300)).check().await;
        assert!(!outcome.healthy, "{:?} should fail", behaviour);
        assert!(outcome.detail.contains(expected), "{:?}: {}", behaviour, outcome.detail);
    }
}

#[tokio::test]
async fn test_tcp_refused_connection() {
    let addr = common::closed_port().await;
    let outcome = tcp_prober(addr, Duration::from_secs(1)).check().await;
    assert!(!outcome.healthy);
    assert!(outcome.detail.contains("service offline"), "{}", outcome.detail);
}

#[tokio::test]
async fn test_tcp_unresolvable_address() {
    let prober = TcpProber::new("service-without-port", "token", "Testing", MARKER, Duration::from_secs(1));
    let outcome = prober.check().await;
    assert!(!outcome.healthy);
    assert!(outcome.detail.starts_with("wrong address"), "{}", outcome.detail);
}

fn http_prober(addr: std::net::SocketAddr, timeout: Duration) -> HttpProber {
    let url = Url::parse(&format!("http://{}/", addr)).unwrap();
    HttpProber::new(url, "token", MARKER, timeout).unwrap()
}

#[tokio::test]
async fn test_http_healthy_first_line() {
    let addr = common::start_programmable_backend(|head| async move {
        if head.starts_with("GET /?auth=token&buf=testing ") {
            (200, format!("{} service ready\nsecond line", MARKER))
        } else {
            (404, "missing auth".to_string())
        }
    })
    .await;

    let outcome = http_prober(addr, Duration::from_secs(2)).check().await;
    assert!(outcome.healthy, "{}", outcome.detail);
}

#[tokio::test]
async fn test_http_reads_only_first_line_of_large_body() {
    let addr = common::start_programmable_backend(|_| async {
        (200, format!("{}\n{}", MARKER, "x".repeat(1 << 20)))
    })
    .await;
    let outcome = http_prober(addr, Duration::from_secs(2)).check().await;
    assert!(outcome.healthy, "{}", outcome.detail);

    let no_newline = common::start_programmable_backend(|_| async { (200, "y".repeat(1 << 20)) }).await;
    let outcome = http_prober(no_newline, Duration::from_secs(2)).check().await;
    assert!(!outcome.healthy);
    assert!(outcome.detail.starts_with("unexpected response message"), "{}", outcome.detail);
}

#[tokio::test]
async fn test_http_unhealthy_replies() {
    let wrong_status = common::start_programmable_backend(|_| async { (503, MARKER.to_string()) }).await;
    let outcome = http_prober(wrong_status, Duration::from_secs(2)).check().await;
    assert!(!outcome.healthy);
    assert!(outcome.detail.contains("503"), "{}", outcome.detail);

    let wrong_line = common::start_programmable_backend(|_| async {
        (200, format!("maintenance\n{}", MARKER))
    })
    .await;
    let outcome = http_prober(wrong_line, Duration::from_secs(2)).check().await;
    assert!(!outcome.healthy);
    assert!(outcome.detail.contains("maintenance"), "{}", outcome.detail);

    let empty = common::start_programmable_backend(|_| async { (200, String::new()) }).await;
    let outcome = http_prober(empty, Duration::from_secs(2)).check().await;
    assert!(!outcome.healthy);
    assert_eq!(outcome.detail, "empty response body");
}

#[tokio::test]
async fn test_http_timeout_and_refusal() {
    let slow = common::start_programmable_backend(|_| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        (200, MARKER.to_string())
    })
    .await;
    let outcome = http_prober(slow, Duration::from_millis(200)).check().await;
    assert!(!outcome.healthy);

    let closed = common::closed_port().await;
    let outcome = http_prober(closed, Duration::from_secs(1)).check().await;
    assert!(!outcome.healthy);
    assert!(outcome.detail.starts_with("request error"), "{}", outcome.detail);
}
