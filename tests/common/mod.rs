//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use sre_checker::notify::{Notifier, VerdictEvent};
use sre_checker::probe::{ProbeOutcome, Prober};

/// Start a programmable HTTP backend on an ephemeral port.
/// The closure receives the raw request head and returns (status, body).
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let request = read_request(&mut socket).await;
                        let (status, body) = f(request).await;
                        let status_text = match status {
                            200 => "200 OK",
                            204 => "204 No Content",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Read a full HTTP/1.1 request (head plus `Content-Length` body).
async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = socket.read(&mut buf).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);

        let text = String::from_utf8_lossy(&data);
        if let Some(head_end) = text.find("\r\n\r\n") {
            let content_length = text[..head_end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= head_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&data).into_owned()
}

/// Behaviour of the mock TCP protocol server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TcpBehaviour {
    /// Accept auth and echo the marker.
    Healthy,
    /// Reject authentication.
    RejectAuth,
    /// Accept auth but answer the echo without the marker.
    WrongEcho,
    /// Accept the connection and never answer.
    Silent,
}

/// Start a mock auth + echo TCP server on an ephemeral port.
pub async fn start_tcp_service(behaviour: TcpBehaviour, marker: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                if socket.read(&mut buf).await.unwrap_or(0) == 0 {
                    return;
                }
                match behaviour {
                    TcpBehaviour::Silent => {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                        return;
                    }
                    TcpBehaviour::RejectAuth => {
                        let _ = socket.write_all(b"denied").await;
                        return;
                    }
                    _ => {
                        let _ = socket.write_all(b"ok").await;
                    }
                }

                let n = socket.read(&mut buf).await.unwrap_or(0);
                let reply = if behaviour == TcpBehaviour::Healthy {
                    format!("{} {}", marker, String::from_utf8_lossy(&buf[..n]))
                } else {
                    String::from_utf8_lossy(&buf[..n]).into_owned()
                };
                let _ = socket.write_all(reply.as_bytes()).await;
            });
        }
    });

    addr
}

/// Reserve a local port with nothing listening on it.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Prober replaying a fixed script of outcomes; the last entry repeats forever.
pub struct ScriptedProber {
    script: Vec<bool>,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl ScriptedProber {
    pub fn new(script: &[bool]) -> Self {
        assert!(!script.is_empty());
        Self {
            script: script.to_vec(),
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Every check takes `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Shared counter of completed or started checks.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    fn target(&self) -> &str {
        "scripted"
    }

    async fn check(&self) -> ProbeOutcome {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let healthy = self.script[n.min(self.script.len() - 1)];
        if healthy {
            ProbeOutcome::healthy("scripted success")
        } else {
            ProbeOutcome::failed("scripted failure")
        }
    }
}

/// Notifier that records every event it receives.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<VerdictEvent>>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<VerdictEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, event: &VerdictEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
