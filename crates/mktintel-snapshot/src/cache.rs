use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::schema::PriceSeries;
use crate::window::Lookback;

/// One hour.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    prices: PriceSeries,
    fetched_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() >= ttl
    }
}

/// Cleaned price series, keyed by lookback, each kept for `ttl` after it was fetched.
///
/// Clones share the same entries. Two callers filling the same key at once both fetch; the last
/// write wins.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    entries: Arc<RwLock<HashMap<Lookback, CacheEntry>>>,
    ttl: Duration,
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// A fresh entry for `lookback`, if there is one.
    pub async fn get(&self, lookback: Lookback) -> Option<PriceSeries> {
        let entries = self.entries.read().await;
        match entries.get(&lookback) {
            Some(entry) if !entry.is_expired(self.ttl) => {
                trace!("cache hit for {} day lookback", lookback.days());
                Some(entry.prices.clone())
            }
            Some(_) => {
                trace!("cache entry for {} day lookback has expired", lookback.days());
                None
            }
            None => None,
        }
    }

    pub async fn insert(&self, lookback: Lookback, prices: PriceSeries) {
        let mut entries = self.entries.write().await;
        entries.insert(
            lookback,
            CacheEntry {
                prices,
                fetched_at: Instant::now(),
            },
        );
        debug!("cached {} day lookback", lookback.days());
    }

    /// Drop every expired entry.
    pub async fn purge_expired(&self) {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(self.ttl));
        let purged = before - entries.len();
        if purged > 0 {
            debug!("purged {purged} expired cache entries");
        }
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    #[cfg(test)]
    pub(crate) async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Asset;
    use chrono::NaiveDate;

    fn prices() -> PriceSeries {
        PriceSeries {
            assets: vec![Asset::Gold],
            dates: vec![NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()],
            columns: vec![vec![2000.0]],
            missing: vec![],
        }
    }

    #[tokio::test]
    async fn returns_fresh_entries_by_key() {
        let cache = SnapshotCache::default();
        let month = Lookback::new(30).unwrap();
        let week = Lookback::new(7).unwrap();

        cache.insert(month, prices()).await;
        assert_eq!(cache.get(month).await, Some(prices()));
        assert_eq!(cache.get(week).await, None);
    }

    #[tokio::test]
    async fn expired_entries_are_not_served() {
        let cache = SnapshotCache::new(Duration::ZERO);
        let month = Lookback::new(30).unwrap();

        cache.insert(month, prices()).await;
        assert_eq!(cache.get(month).await, None);

        cache.purge_expired().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn clones_share_entries() {
        let cache = SnapshotCache::default();
        let other = cache.clone();
        let month = Lookback::new(30).unwrap();

        other.insert(month, prices()).await;
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get(month).await, Some(prices()));
    }
}
