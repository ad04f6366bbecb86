//! Recorded upstream feed responses replayed from disk.

use std::path::PathBuf;

use tracing::info;

use crate::data::model::{FeedEnvelope, NormalizedObject};
use crate::data::normalize::normalize_all;
use crate::data::{DateRange, FeedFetcher, FetchError};

pub struct FixtureFeed {
    path: PathBuf,
}

impl FixtureFeed {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl FeedFetcher for FixtureFeed {
    async fn fetch(&self, _range: DateRange) -> Result<Vec<NormalizedObject>, FetchError> {
        let json = tokio::fs::read(&self.path)
            .await
            .map_err(|source| FetchError::Fixture {
                path: self.path.clone(),
                source,
            })?;
        let envelope: FeedEnvelope = serde_json::from_slice(&json)?;
        let records = envelope.near_earth_objects.flatten();
        info!(count = records.len(), path = %self.path.display(), "fixture loaded");
        Ok(normalize_all(&records))
    }
}
