//! Raw TCP protocol probe.
//!
//! ```text
//! → "auth <token>"     ← reply containing "ok"
//! → <echo payload>     ← reply containing the expected marker
//! ```

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{lookup_host, TcpStream};
use tokio::time;

use crate::probe::{ProbeOutcome, Prober};

const REPLY_BUFFER: usize = 1024;

/// Authenticates against a TCP service and checks its echo reply.
#[derive(Debug, Clone)]
pub struct TcpProber {
    address: String,
    auth_token: String,
    echo_payload: String,
    expect: String,
    timeout: Duration,
}

impl TcpProber {
    pub fn new(
        address: impl Into<String>,
        auth_token: impl Into<String>,
        echo_payload: impl Into<String>,
        expect: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            address: address.into(),
            auth_token: auth_token.into(),
            echo_payload: echo_payload.into(),
            expect: expect.into(),
            timeout,
        }
    }

    async fn exchange(&self) -> ProbeOutcome {
        let addrs: Vec<SocketAddr> = match lookup_host(&self.address).await {
            Ok(addrs) => addrs.collect(),
            Err(e) => return ProbeOutcome::failed(format!("wrong address: {}", e)),
        };
        if addrs.is_empty() {
            return ProbeOutcome::failed(format!("wrong address: {} did not resolve", self.address));
        }

        let mut stream = match TcpStream::connect(&addrs[..]).await {
            Ok(stream) => stream,
            Err(e) => return ProbeOutcome::failed(format!("service offline: {}", e)),
        };

        let auth = format!("auth {}", self.auth_token);
        if let Err(e) = stream.write_all(auth.as_bytes()).await {
            return ProbeOutcome::failed(format!("write authentication failure: {}", e));
        }

        let reply = match read_reply(&mut stream).await {
            Ok(reply) => reply,
            Err(e) => return ProbeOutcome::failed(format!("read error after auth: {}", e)),
        };
        if !reply.contains("ok") {
            return ProbeOutcome::failed(format!("authentication rejected: {:?}", reply.trim()));
        }

        if let Err(e) = stream.write_all(self.echo_payload.as_bytes()).await {
            return ProbeOutcome::failed(format!("write echo failure: {}", e));
        }

        let reply = match read_reply(&mut stream).await {
            Ok(reply) => reply,
            Err(e) => return ProbeOutcome::failed(format!("read error after echo: {}", e)),
        };
        if reply.contains(&self.expect) {
            ProbeOutcome::healthy("echo reply accepted")
        } else {
            ProbeOutcome::failed(format!("unexpected echo reply: {:?}", reply.trim()))
        }
    }
}

async fn read_reply(stream: &mut TcpStream) -> std::io::Result<String> {
    let mut buf = [0u8; REPLY_BUFFER];
    let n = stream.read(&mut buf).await?;
    if n == 0 {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "connection closed by peer",
        ));
    }
    Ok(String::from_utf8_lossy(&buf[..n]).into_owned())
}

#[async_trait]
impl Prober for TcpProber {
    fn target(&self) -> &str {
        &self.address
    }

    async fn check(&self) -> ProbeOutcome {
        let outcome = match time::timeout(self.timeout, self.exchange()).await {
            Ok(outcome) => outcome,
            Err(_) => ProbeOutcome::failed(format!("timed out after {:?}", self.timeout)),
        };

        if !outcome.healthy {
            tracing::warn!(addr = %self.address, detail = %outcome.detail, "TCP probe failed");
        }
        outcome
    }
}
