//! Client for a running `/api/neo` proxy.

use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::data::model::{ErrorResponse, FeedResponse, NormalizedObject};
use crate::data::{DateRange, FeedFetcher, FetchError};

#[derive(Clone)]
pub struct ProxyClient {
    base: Url,
    http: Client,
}

impl ProxyClient {
    pub fn new(base: Url) -> Self {
        Self {
            base,
            http: Client::new(),
        }
    }

    fn endpoint(&self, range: DateRange) -> Url {
        let mut url = self.base.clone();
        url.set_path("/api/neo");
        url.query_pairs_mut()
            .clear()
            .append_pair("start", &range.start.to_string())
            .append_pair("end", &range.end.to_string());
        url
    }
}

impl FeedFetcher for ProxyClient {
    async fn fetch(&self, range: DateRange) -> Result<Vec<NormalizedObject>, FetchError> {
        let url = self.endpoint(range);
        debug!(%url, "requesting proxy feed");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(match serde_json::from_slice::<ErrorResponse>(&body) {
                Ok(err) => FetchError::Proxy(err.error),
                Err(_) => FetchError::Status(status.as_u16()),
            });
        }

        let feed: FeedResponse = serde_json::from_slice(&body)?;
        Ok(feed.items)
    }
}
