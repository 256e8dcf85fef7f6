//! Status feed HTTP server.
//!
//! # Responsibilities
//! - `GET /rss`: RSS 2.0 view of the status store
//! - `GET /status`: JSON snapshot
//! - Stop accepting on the shutdown signal
//!
//! Handlers only read the store; nothing here mutates a verdict.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{CheckerConfig, FeedConfig};
use crate::feed::rss::{render_rss, FeedMeta};
use crate::health::{StatusRecord, StatusStore};

pub const RSS_CONTENT_TYPE: &str = "application/rss+xml;charset=UTF-8";

/// Read-only view over the status store that renders feeds.
#[derive(Debug)]
pub struct FeedPublisher {
    store: Arc<StatusStore>,
    meta: FeedMeta,
    links: HashMap<String, String>,
}

impl FeedPublisher {
    pub fn new(store: Arc<StatusStore>, meta: FeedMeta, links: HashMap<String, String>) -> Self {
        Self { store, meta, links }
    }

    /// Publisher using the feed metadata and channel links from the config.
    pub fn from_config(store: Arc<StatusStore>, config: &CheckerConfig) -> Self {
        let meta = feed_meta(&config.feed);
        let links = config
            .channels
            .iter()
            .map(|c| (c.name.clone(), c.link().to_string()))
            .collect();
        Self::new(store, meta, links)
    }

    pub fn snapshot(&self) -> StatusRecord {
        self.store.snapshot()
    }

    pub fn render(&self) -> String {
        render_rss(
            &self.meta,
            &self.store.snapshot(),
            |name| self.links.get(name).map(String::as_str),
            Utc::now(),
        )
    }
}

fn feed_meta(config: &FeedConfig) -> FeedMeta {
    FeedMeta {
        title: config.title.clone(),
        description: config.description.clone(),
        link: config.link.clone(),
    }
}

/// Build the feed router.
#[allow(deprecated)]
pub fn router(publisher: Arc<FeedPublisher>, request_timeout: Duration) -> Router {
    Router::new()
        .route("/rss", get(rss_handler))
        .route("/status", get(status_handler))
        .with_state(publisher)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}

async fn rss_handler(State(publisher): State<Arc<FeedPublisher>>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, RSS_CONTENT_TYPE)],
        publisher.render(),
    )
        .into_response()
}

async fn status_handler(State(publisher): State<Arc<FeedPublisher>>) -> Json<StatusRecord> {
    Json(publisher.snapshot())
}

/// Serve the feed until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Feed server starting");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Feed server stopped");
    Ok(())
}
