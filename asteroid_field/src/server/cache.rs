//! Per-range response cache for the proxy, honoring the configured policy.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::debug;

use crate::data::{CachePolicy, DateRange, NormalizedObject};

/// Distinct ranges kept before the oldest is evicted.
pub const DEFAULT_MAX_ENTRIES: usize = 256;

type Entry = (Instant, Arc<Vec<NormalizedObject>>);

pub struct FeedCache {
    policy: CachePolicy,
    max_entries: usize,
    entries: RwLock<HashMap<DateRange, Entry>>,
}

impl FeedCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self::with_capacity(policy, DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(policy: CachePolicy, max_entries: usize) -> Self {
        Self {
            policy,
            max_entries: max_entries.max(1),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// A stored response younger than the revalidation interval.
    pub fn get(&self, range: &DateRange) -> Option<Arc<Vec<NormalizedObject>>> {
        self.get_at(range, Instant::now())
    }

    fn get_at(&self, range: &DateRange, now: Instant) -> Option<Arc<Vec<NormalizedObject>>> {
        let CachePolicy::Revalidate(ttl) = self.policy else {
            return None;
        };
        let mut entries = self.entries.write();
        match entries.get(range) {
            Some((stored, items)) if now.saturating_duration_since(*stored) < ttl => {
                Some(items.clone())
            }
            Some(_) => {
                entries.remove(range);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, range: DateRange, items: Arc<Vec<NormalizedObject>>) {
        self.insert_at(range, items, Instant::now());
    }

    /// Drops expired entries, then the oldest ones while at capacity.
    fn insert_at(&self, range: DateRange, items: Arc<Vec<NormalizedObject>>, now: Instant) {
        let CachePolicy::Revalidate(ttl) = self.policy else {
            return;
        };
        let mut entries = self.entries.write();
        entries.retain(|_, (stored, _)| now.saturating_duration_since(*stored) < ttl);

        if !entries.contains_key(&range) {
            while entries.len() >= self.max_entries {
                let Some(oldest) = entries
                    .iter()
                    .min_by_key(|(_, (stored, _))| *stored)
                    .map(|(key, _)| *key)
                else {
                    break;
                };
                debug!(start = %oldest.start, end = %oldest.end, "evicting cached range");
                entries.remove(&oldest);
            }
        }
        entries.insert(range, (now, items));
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for FeedCache {
    fn default() -> Self {
        Self::new(CachePolicy::default())
    }
}

/// Convenience for tests and config: seconds to policy, 0 → no store.
pub fn policy_from_secs(secs: u64) -> CachePolicy {
    if secs == 0 {
        CachePolicy::NoStore
    } else {
        CachePolicy::Revalidate(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn range(day: u32) -> DateRange {
        let d = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        DateRange { start: d, end: d }
    }

    #[test]
    fn entries_expire_after_ttl() {
        let cache = FeedCache::new(CachePolicy::Revalidate(Duration::from_secs(300)));
        let t0 = Instant::now();
        cache.insert_at(range(1), Arc::new(Vec::new()), t0);

        assert!(cache.get_at(&range(1), t0 + Duration::from_secs(299)).is_some());
        assert!(cache.get_at(&range(2), t0).is_none());
        assert!(cache.get_at(&range(1), t0 + Duration::from_secs(300)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn insert_sweeps_expired_ranges() {
        let cache = FeedCache::new(CachePolicy::Revalidate(Duration::from_secs(300)));
        let t0 = Instant::now();
        cache.insert_at(range(1), Arc::new(Vec::new()), t0);
        cache.insert_at(range(2), Arc::new(Vec::new()), t0 + Duration::from_secs(100));

        cache.insert_at(range(3), Arc::new(Vec::new()), t0 + Duration::from_secs(301));

        assert_eq!(cache.len(), 2);
        assert!(cache.get_at(&range(1), t0 + Duration::from_secs(301)).is_none());
        assert!(cache.get_at(&range(2), t0 + Duration::from_secs(301)).is_some());
    }

    #[test]
    fn oldest_range_is_evicted_at_capacity() {
        let cache = FeedCache::with_capacity(CachePolicy::Revalidate(Duration::from_secs(300)), 2);
        let t0 = Instant::now();
        cache.insert_at(range(1), Arc::new(Vec::new()), t0);
        cache.insert_at(range(2), Arc::new(Vec::new()), t0 + Duration::from_secs(1));
        cache.insert_at(range(1), Arc::new(Vec::new()), t0 + Duration::from_secs(2));
        assert_eq!(cache.len(), 2);

        cache.insert_at(range(3), Arc::new(Vec::new()), t0 + Duration::from_secs(3));

        let now = t0 + Duration::from_secs(4);
        assert_eq!(cache.len(), 2);
        assert!(cache.get_at(&range(2), now).is_none());
        assert!(cache.get_at(&range(1), now).is_some());
        assert!(cache.get_at(&range(3), now).is_some());
    }

    #[test]
    fn no_store_never_keeps_anything() {
        let cache = FeedCache::new(CachePolicy::NoStore);
        cache.insert(range(1), Arc::new(Vec::new()));

        assert!(cache.get(&range(1)).is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn zero_seconds_disables_caching() {
        assert_eq!(policy_from_secs(0), CachePolicy::NoStore);
        assert_eq!(
            policy_from_secs(60),
            CachePolicy::Revalidate(Duration::from_secs(60))
        );
    }
}
