mod channel;
pub mod fixture;
mod model;
pub mod neows;
mod normalize;
pub mod proxy_client;
pub mod query;

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{Days, NaiveDate};
use url::Url;

pub use channel::{spawn_fetch, FeedResult, FetchHandle};
pub use model::{
    CloseApproach, DayBuckets, DiameterRange, ErrorResponse, EstimatedDiameter, FeedEnvelope,
    FeedResponse, MissDistance, NormalizedObject, RawFeedRecord, RelativeVelocity,
};
pub use normalize::{normalize, normalize_all};
pub use query::FeedQuery;

/// Server-side caching of upstream feed responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CachePolicy {
    /// Serve a stored response until it is older than the interval.
    Revalidate(Duration),
    /// Always go upstream.
    NoStore,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::Revalidate(Duration::from_secs(300))
    }
}

/// Upstream feed configuration, resolved once at startup.
#[derive(Clone, Debug)]
pub struct FeedConfig {
    pub api_key: String,
    pub feed_url: Url,
    pub cache: CachePolicy,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("NASA API {0}")]
    Status(u16),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("malformed feed: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("end date {end} is before start date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("fixture {}: {source}", path.display())]
    Fixture {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{0}")]
    Proxy(String),
    #[error("fetch worker: {0}")]
    Worker(String),
    #[error("fetch cancelled")]
    Cancelled,
}

/// Inclusive calendar date range for one feed request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, FetchError> {
        if end < start {
            return Err(FetchError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Applies the request defaults: start → today, end → start.
    pub fn resolve(
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self, FetchError> {
        let start = start.map_or(Ok(today), parse_date)?;
        let end = end.map_or(Ok(start), parse_date)?;
        Self::new(start, end)
    }

    /// Today through one week later.
    pub fn week_from(today: NaiveDate) -> Self {
        Self {
            start: today,
            end: today.checked_add_days(Days::new(7)).unwrap_or(today),
        }
    }

    /// Client cache key: the full proxy query string.
    pub fn query_key(&self) -> String {
        format!("/api/neo?start={}&end={}", self.start, self.end)
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, FetchError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| FetchError::InvalidDate(raw.to_string()))
}

/// Interface for anything that can produce a normalized object list for a range.
pub trait FeedFetcher: Send + Sync + 'static {
    fn fetch(
        &self,
        range: DateRange,
    ) -> impl Future<Output = Result<Vec<NormalizedObject>, FetchError>> + Send;
}

/// Where the viewer gets its objects from.
#[derive(Clone, Debug)]
pub enum FeedSource {
    /// Straight to the upstream feed, bypassing the proxy.
    Upstream(FeedConfig),
    /// Through a running `/api/neo` proxy.
    Proxy(Url),
    /// A recorded upstream response on disk. The range is ignored.
    Fixture(PathBuf),
}

impl FeedSource {
    pub async fn fetch(&self, range: DateRange) -> Result<Vec<NormalizedObject>, FetchError> {
        match self {
            FeedSource::Upstream(config) => {
                neows::NeoWsClient::new(config.clone()).fetch(range).await
            }
            FeedSource::Proxy(base) => proxy_client::ProxyClient::new(base.clone()).fetch(range).await,
            FeedSource::Fixture(path) => fixture::FixtureFeed::new(path.clone()).fetch(range).await,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            FeedSource::Upstream(config) => format!("upstream {}", config.feed_url),
            FeedSource::Proxy(base) => format!("proxy {base}"),
            FeedSource::Fixture(path) => format!("fixture {}", path.display()),
        }
    }
}
