//! Environment parsing and defaults.

use std::net::SocketAddr;

use url::Url;

use crate::data::{CachePolicy, FeedConfig};
use crate::server::policy_from_secs;

pub const DEFAULT_FEED_URL: &str = "https://api.nasa.gov/neo/rest/v1/feed";
pub const DEMO_KEY: &str = "DEMO_KEY";
pub const DEFAULT_PROXY_ADDR: &str = "127.0.0.1:3000";

/// Upstream feed settings from `NASA_API_KEY`, `NEO_FEED_URL`, and
/// `NEO_CACHE_SECS`. Bad values are logged and replaced by defaults.
pub fn feed_config() -> FeedConfig {
    let api_key = std::env::var("NASA_API_KEY")
        .ok()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .unwrap_or_else(|| DEMO_KEY.to_string());

    let feed_url = match std::env::var("NEO_FEED_URL") {
        Ok(raw) => raw.parse::<Url>().unwrap_or_else(|err| {
            tracing::warn!(%err, raw = %raw, "invalid NEO_FEED_URL, using default");
            default_feed_url()
        }),
        Err(_) => default_feed_url(),
    };

    let cache = match std::env::var("NEO_CACHE_SECS") {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) => policy_from_secs(secs),
            Err(err) => {
                tracing::warn!(%err, raw = %raw, "invalid NEO_CACHE_SECS, using default");
                CachePolicy::default()
            }
        },
        Err(_) => CachePolicy::default(),
    };

    FeedConfig {
        api_key,
        feed_url,
        cache,
    }
}

fn default_feed_url() -> Url {
    Url::parse(DEFAULT_FEED_URL).unwrap_or_else(|err| panic!("bad default feed url: {err}"))
}

/// Proxy listen address from `NEO_PROXY_ADDR`.
pub fn bind_addr() -> SocketAddr {
    let fallback = || {
        DEFAULT_PROXY_ADDR
            .parse::<SocketAddr>()
            .unwrap_or_else(|err| panic!("bad default proxy addr: {err}"))
    };
    match std::env::var("NEO_PROXY_ADDR") {
        Ok(raw) => raw.parse::<SocketAddr>().unwrap_or_else(|err| {
            tracing::warn!(%err, raw = %raw, "invalid NEO_PROXY_ADDR, using default");
            fallback()
        }),
        Err(_) => fallback(),
    }
}

/// Base URL of a running proxy, from `NEO_PROXY_URL`.
pub fn proxy_url() -> Option<Url> {
    let raw = std::env::var("NEO_PROXY_URL").ok()?;
    match raw.parse::<Url>() {
        Ok(url) => Some(url),
        Err(err) => {
            tracing::warn!(%err, raw = %raw, "invalid NEO_PROXY_URL, ignoring");
            None
        }
    }
}
