//! Minimal prelude for embedding the tracker.

pub use crate::config::{bind_addr, feed_config, proxy_url};
pub use crate::data::{
    CachePolicy, DateRange, FeedConfig, FeedFetcher, FeedQuery, FeedSource, FetchError,
    NormalizedObject,
};
pub use crate::render::{FieldRenderer, ProceduralRockRenderer};
pub use crate::sdk::TrackerBuilder;
pub use crate::server::{router, serve, ProxyState};
