//! HTTPS endpoint probe.
//!
//! Issues `GET <target>?auth=<token>&buf=testing`; healthy means status 200 and a
//! first body line containing the expected marker.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use url::Url;

use crate::probe::{ProbeOutcome, Prober};

/// Longest first line inspected, in bytes.
const FIRST_LINE_LIMIT: usize = 4096;

/// Polls an HTTP(S) endpoint and inspects the first line of the reply.
#[derive(Debug, Clone)]
pub struct HttpProber {
    target: String,
    url: Url,
    expect: String,
    client: Client,
}

impl HttpProber {
    pub fn new(
        target: Url,
        auth_token: &str,
        expect: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sre-checker/", env!("CARGO_PKG_VERSION")))
            .no_proxy()
            .build()?;

        let mut url = target.clone();
        url.query_pairs_mut()
            .append_pair("auth", auth_token)
            .append_pair("buf", "testing");

        Ok(Self {
            target: target.to_string(),
            url,
            expect: expect.into(),
            client,
        })
    }

    /// The full request URL, including the auth query.
    pub fn request_url(&self) -> &Url {
        &self.url
    }

    async fn fetch(&self) -> ProbeOutcome {
        let response = match self.client.get(self.url.clone()).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return ProbeOutcome::failed("request timed out"),
            Err(e) => return ProbeOutcome::failed(format!("request error: {}", e)),
        };

        let status = response.status();
        if status != StatusCode::OK {
            return ProbeOutcome::failed(format!("unexpected response status: {}", status));
        }

        let line = match read_first_line(response).await {
            Ok(line) => line,
            Err(e) => return ProbeOutcome::failed(format!("body read error: {}", e)),
        };

        match line {
            Some(line) if line.contains(&self.expect) => ProbeOutcome::healthy(format!("status {}", status)),
            Some(line) => ProbeOutcome::failed(format!("unexpected response message: {:?}", line)),
            None => ProbeOutcome::failed("empty response body"),
        }
    }
}

/// Read body chunks until the first newline or [`FIRST_LINE_LIMIT`] bytes.
/// The rest of the body is never downloaded.
async fn read_first_line(mut response: Response) -> Result<Option<String>, reqwest::Error> {
    let mut buf: Vec<u8> = Vec::new();
    let mut received = false;
    while let Some(chunk) = response.chunk().await? {
        received |= !chunk.is_empty();
        match chunk.iter().position(|&b| b == b'\n') {
            Some(end) => {
                buf.extend_from_slice(&chunk[..end]);
                break;
            }
            None => buf.extend_from_slice(&chunk),
        }
        if buf.len() >= FIRST_LINE_LIMIT {
            break;
        }
    }
    Ok(received.then(|| line_text(&buf)))
}

fn line_text(buf: &[u8]) -> String {
    let line = String::from_utf8_lossy(&buf[..buf.len().min(FIRST_LINE_LIMIT)]);
    line.trim_end_matches('\r').to_string()
}

#[async_trait]
impl Prober for HttpProber {
    fn target(&self) -> &str {
        &self.target
    }

    async fn check(&self) -> ProbeOutcome {
        let outcome = self.fetch().await;
        if !outcome.healthy {
            tracing::warn!(url = %self.target, detail = %outcome.detail, "HTTP probe failed");
        }
        outcome
    }
}
