//! HTTP proxy in front of the NeoWs feed.

mod cache;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::data::neows::NeoWsClient;
use crate::data::FeedConfig;

pub use cache::{policy_from_secs, FeedCache, DEFAULT_MAX_ENTRIES};

/// Shared handler state: one upstream client and one response cache.
#[derive(Clone)]
pub struct ProxyState {
    pub client: NeoWsClient,
    pub cache: Arc<FeedCache>,
}

impl ProxyState {
    pub fn new(config: FeedConfig) -> Self {
        let cache = Arc::new(FeedCache::new(config.cache));
        Self {
            client: NeoWsClient::new(config),
            cache,
        }
    }
}

pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/neo", get(routes::neo_feed))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, config: FeedConfig) -> std::io::Result<()> {
    tracing::info!(
        feed = %config.feed_url,
        cache = ?config.cache,
        "starting neo proxy on http://{addr}"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(ProxyState::new(config))).await
}
