//! Client-side feed query: items, error, and loading flags for one date range,
//! backed by a deduplicating stale-while-revalidate cache keyed by query string.

use std::collections::HashMap;
use std::sync::Arc;

use bevy::prelude::Resource;
use crossbeam_channel::TryRecvError;
use tracing::{debug, warn};

use crate::data::channel::{spawn_fetch, FetchHandle};
use crate::data::model::NormalizedObject;
use crate::data::{DateRange, FeedSource, FetchError};

struct InFlight {
    key: String,
    handle: FetchHandle,
}

#[derive(Resource)]
pub struct FeedQuery {
    source: FeedSource,
    range: Option<DateRange>,
    key: Option<String>,
    items: Arc<Vec<NormalizedObject>>,
    has_data: bool,
    error: Option<String>,
    in_flight: Option<InFlight>,
    cache: HashMap<String, Arc<Vec<NormalizedObject>>>,
    generation: u64,
    requests_issued: u64,
}

impl FeedQuery {
    pub fn new(source: FeedSource) -> Self {
        Self {
            source,
            range: None,
            key: None,
            items: Arc::new(Vec::new()),
            has_data: false,
            error: None,
            in_flight: None,
            cache: HashMap::new(),
            generation: 0,
            requests_issued: 0,
        }
    }

    /// Point the query at a range. Identical in-flight or already-loaded keys
    /// do not refetch; a cached key is served immediately and revalidated.
    pub fn request(&mut self, range: DateRange) {
        let key = range.query_key();
        if self.key.as_deref() == Some(key.as_str()) {
            let in_flight = self.in_flight.as_ref().is_some_and(|f| f.key == key);
            if in_flight || (self.has_data && self.error.is_none()) {
                debug!(%key, "feed request deduplicated");
                return;
            }
        }

        self.range = Some(range);
        self.key = Some(key.clone());
        self.error = None;

        match self.cache.get(&key) {
            Some(cached) => {
                if !self.has_data || *self.items != **cached {
                    self.items = cached.clone();
                    self.generation += 1;
                }
                self.has_data = true;
            }
            None => {
                // Nothing to show for this key yet; never serve another key's items.
                self.has_data = false;
                if !self.items.is_empty() {
                    self.items = Arc::new(Vec::new());
                    self.generation += 1;
                }
            }
        }

        self.start_fetch(key, range);
    }

    /// Refetch the current key regardless of cache state.
    pub fn revalidate(&mut self) {
        let (Some(key), Some(range)) = (self.key.clone(), self.range) else {
            return;
        };
        if self.in_flight.as_ref().is_some_and(|f| f.key == key) {
            return;
        }
        self.start_fetch(key, range);
    }

    fn start_fetch(&mut self, key: String, range: DateRange) {
        debug!(%key, source = %self.source.describe(), "starting feed fetch");
        // Replacing the previous handle cancels it.
        self.in_flight = Some(InFlight {
            key,
            handle: spawn_fetch(self.source.clone(), range),
        });
        self.requests_issued += 1;
    }

    /// Drain a finished fetch, if any. Returns true when items or error changed.
    pub fn poll(&mut self) -> bool {
        let Some(in_flight) = self.in_flight.as_ref() else {
            return false;
        };

        let outcome = match in_flight.handle.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                Err(FetchError::Worker("worker exited without a result".into()))
            }
        };
        let Some(InFlight { key, .. }) = self.in_flight.take() else {
            return false;
        };

        // A response for a superseded key only refreshes the cache.
        let is_current = self.key.as_deref() == Some(key.as_str());

        match outcome {
            Ok(items) => {
                let items = Arc::new(items);
                self.cache.insert(key, items.clone());
                if !is_current {
                    return false;
                }
                self.error = None;
                let changed = !self.has_data || *self.items != *items;
                self.items = items;
                self.has_data = true;
                if changed {
                    self.generation += 1;
                }
                true
            }
            Err(err) => {
                if !is_current {
                    return false;
                }
                warn!(%err, "feed fetch failed");
                self.error = Some(err.to_string());
                true
            }
        }
    }

    pub fn items(&self) -> &[NormalizedObject] {
        &self.items
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// In flight with nothing to show for the current key yet.
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some() && !self.has_data
    }

    pub fn is_validating(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn range(&self) -> Option<DateRange> {
        self.range
    }

    /// Bumps every time the visible item list changes.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn requests_issued(&self) -> u64 {
        self.requests_issued
    }

    pub fn source(&self) -> &FeedSource {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::path::PathBuf;
    use std::time::{Duration, Instant};

    const FEED: &str = r#"{
        "near_earth_objects": {
            "2024-01-01": [
                { "id": "1", "name": "(2024 AA)",
                  "estimated_diameter": { "meters": { "estimated_diameter_min": 10, "estimated_diameter_max": 30 } } }
            ]
        }
    }"#;

    fn fixture(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("neo-query-{}-{name}.json", std::process::id()));
        std::fs::write(&path, FEED).unwrap();
        path
    }

    fn range(day: u32) -> DateRange {
        let start = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        DateRange { start, end: start }
    }

    fn wait_for(query: &mut FeedQuery) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !query.poll() {
            assert!(Instant::now() < deadline, "fetch did not complete");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn loads_items_and_clears_loading() {
        let mut query = FeedQuery::new(FeedSource::Fixture(fixture("load")));
        query.request(range(1));

        assert!(query.is_loading());
        wait_for(&mut query);

        assert!(!query.is_loading());
        assert_eq!(query.items().len(), 1);
        assert_eq!(query.items()[0].name, "2024 AA");
        assert_eq!(query.generation(), 1);
        assert!(query.error().is_none());
    }

    #[test]
    fn identical_requests_are_deduplicated() {
        let mut query = FeedQuery::new(FeedSource::Fixture(fixture("dedup")));
        query.request(range(1));
        query.request(range(1));
        assert_eq!(query.requests_issued(), 1);

        wait_for(&mut query);
        query.request(range(1));

        assert_eq!(query.requests_issued(), 1);
    }

    #[test]
    fn cached_key_is_served_immediately_and_revalidated() {
        let mut query = FeedQuery::new(FeedSource::Fixture(fixture("swr")));
        query.request(range(1));
        wait_for(&mut query);
        query.request(range(2));
        wait_for(&mut query);

        query.request(range(1));

        assert!(!query.is_loading());
        assert!(query.is_validating());
        assert_eq!(query.items().len(), 1);
        assert_eq!(query.requests_issued(), 3);
    }

    #[test]
    fn new_key_without_data_shows_nothing_while_loading_or_after_failure() {
        let path = fixture("switch");
        let mut query = FeedQuery::new(FeedSource::Fixture(path.clone()));
        query.request(range(1));
        wait_for(&mut query);
        assert_eq!(query.items().len(), 1);
        std::fs::remove_file(&path).unwrap();

        query.request(range(2));

        assert!(query.is_loading());
        assert!(query.items().is_empty());
        assert_eq!(query.generation(), 2);

        wait_for(&mut query);

        assert!(query.error().is_some());
        assert!(query.items().is_empty());
        assert_eq!(query.range(), Some(range(2)));
    }

    #[test]
    fn failure_sets_error() {
        let mut query = FeedQuery::new(FeedSource::Fixture("/nonexistent/feed.json".into()));
        query.request(range(1));
        wait_for(&mut query);

        assert!(query.error().is_some());
        assert!(query.items().is_empty());
        assert!(!query.is_validating());
    }
}
