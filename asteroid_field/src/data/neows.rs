//! NeoWs feed client: one GET per date range → flattened, normalized objects.

use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::data::model::{FeedEnvelope, NormalizedObject, RawFeedRecord};
use crate::data::normalize::normalize_all;
use crate::data::{DateRange, FeedConfig, FeedFetcher, FetchError};

/// Upstream feed client. No retries; a failure surfaces on the first attempt.
#[derive(Clone)]
pub struct NeoWsClient {
    config: FeedConfig,
    http: Client,
}

impl NeoWsClient {
    pub fn new(config: FeedConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Issue the single feed request and flatten the per-day buckets.
    pub async fn fetch_raw(&self, range: DateRange) -> Result<Vec<RawFeedRecord>, FetchError> {
        let url = feed_request_url(&self.config, range);
        debug!(start = %range.start, end = %range.end, "requesting neo feed");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "neo feed request rejected");
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let envelope: FeedEnvelope = serde_json::from_slice(&body)?;
        let records = envelope.near_earth_objects.flatten();
        info!(
            count = records.len(),
            reported = envelope.element_count,
            "neo feed received"
        );
        Ok(records)
    }
}

impl FeedFetcher for NeoWsClient {
    async fn fetch(&self, range: DateRange) -> Result<Vec<NormalizedObject>, FetchError> {
        let records = self.fetch_raw(range).await?;
        Ok(normalize_all(&records))
    }
}

fn feed_request_url(config: &FeedConfig, range: DateRange) -> Url {
    let mut url = config.feed_url.clone();
    url.query_pairs_mut()
        .append_pair("start_date", &range.start.to_string())
        .append_pair("end_date", &range.end.to_string())
        .append_pair("api_key", &config.api_key);
    url
}
