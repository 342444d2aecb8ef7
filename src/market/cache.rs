use std::{sync::Arc, time::Duration};

use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;
use tokio::{
    sync::{Mutex, RwLock},
    time::Instant,
};
use tracing::{debug, info, warn};

use super::source::{GoldAndFx, MarketSource};
use crate::error::UpstreamError;

/// One fetched-and-merged view of both providers.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    #[serde(with = "time::serde::rfc3339")]
    pub fetched_at: OffsetDateTime,
    pub truncgil: Value,
    pub genelpara: GoldAndFx,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Empty,
    Fresh,
    Stale,
}

struct Slot {
    snapshot: Arc<MarketSnapshot>,
    stored_at: Instant,
}

/// Time-bounded cache in front of the upstream providers.
///
/// Failed refreshes never touch the slot, so a later call retries instead of
/// serving a cached error. Concurrent stale callers queue on `refresh` and
/// reuse whatever the first of them fetched.
pub struct MarketCache {
    source: Arc<dyn MarketSource>,
    ttl: Duration,
    slot: RwLock<Option<Slot>>,
    refresh: Mutex<()>,
}

impl MarketCache {
    pub fn new(source: Arc<dyn MarketSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            slot: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn state(&self) -> CacheState {
        match self.slot.read().await.as_ref() {
            None => CacheState::Empty,
            Some(s) if s.stored_at.elapsed() < self.ttl => CacheState::Fresh,
            Some(_) => CacheState::Stale,
        }
    }

    async fn fresh(&self) -> Option<Arc<MarketSnapshot>> {
        self.slot
            .read()
            .await
            .as_ref()
            .filter(|s| s.stored_at.elapsed() < self.ttl)
            .map(|s| s.snapshot.clone())
    }

    pub async fn get_market(&self) -> Result<Arc<MarketSnapshot>, UpstreamError> {
        if let Some(snapshot) = self.fresh().await {
            debug!("market cache hit");
            return Ok(snapshot);
        }

        let state = self.state().await;
        debug!(?state, "market cache miss");
        let _refreshing = self.refresh.lock().await;
        if let Some(snapshot) = self.fresh().await {
            debug!("market refreshed by concurrent caller");
            return Ok(snapshot);
        }

        let started = Instant::now();
        let fetched = async {
            let truncgil = self.source.rates().await?;
            let genelpara = self.source.gold_and_fx().await?;
            Ok::<_, UpstreamError>((truncgil, genelpara))
        }
        .await;

        let (truncgil, genelpara) = match fetched {
            Ok(parts) => parts,
            Err(e) => {
                warn!(error = %e, "market refresh failed; cache left as is");
                return Err(e);
            }
        };

        let snapshot = Arc::new(MarketSnapshot {
            fetched_at: OffsetDateTime::now_utc(),
            truncgil,
            genelpara,
        });
        *self.slot.write().await = Some(Slot {
            snapshot: snapshot.clone(),
            stored_at: Instant::now(),
        });
        info!(elapsed_ms = started.elapsed().as_millis() as u64, "market refreshed");
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::source::testing::FakeSource;

    fn cache(ttl: Duration) -> (Arc<FakeSource>, MarketCache) {
        let source = Arc::new(FakeSource::default());
        let cache = MarketCache::new(source.clone(), ttl);
        (source, cache)
    }

    #[tokio::test(start_paused = true)]
    async fn calls_within_ttl_share_one_fetch() {
        let (source, cache) = cache(Duration::from_secs(60));
        assert_eq!(cache.state().await, CacheState::Empty);

        let first = cache.get_market().await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;
        let second = cache.get_market().await.unwrap();

        assert_eq!(source.calls(), 1);
        assert_eq!(
            serde_json::to_vec(&*first).unwrap(),
            serde_json::to_vec(&*second).unwrap()
        );
        assert_eq!(cache.state().await, CacheState::Fresh);
    }

    #[tokio::test(start_paused = true)]
    async fn refetches_after_ttl_with_later_timestamp() {
        let (source, cache) = cache(Duration::from_secs(60));
        let first = cache.get_market().await.unwrap();

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(cache.state().await, CacheState::Stale);
        std::thread::sleep(std::time::Duration::from_millis(5));

        let second = cache.get_market().await.unwrap();
        assert_eq!(source.calls(), 2);
        assert!(second.fetched_at > first.fetched_at);
        assert_eq!(cache.state().await, CacheState::Fresh);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_does_not_poison_cache() {
        let (source, cache) = cache(Duration::from_secs(60));
        source.set_failing(true);
        assert!(cache.get_market().await.is_err());
        assert_eq!(cache.state().await, CacheState::Empty);

        source.set_failing(false);
        assert!(cache.get_market().await.is_ok());
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_while_stale_keeps_old_snapshot() {
        let (source, cache) = cache(Duration::from_secs(60));
        let first = cache.get_market().await.unwrap();

        tokio::time::advance(Duration::from_secs(90)).await;
        source.set_failing(true);
        let err = cache.get_market().await.unwrap_err();
        assert!(!err.to_string().is_empty());
        assert_eq!(cache.state().await, CacheState::Stale);

        source.set_failing(false);
        let again = cache.get_market().await.unwrap();
        assert_ne!(again.truncgil, first.truncgil);
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn concurrent_stale_callers_coalesce() {
        let (source, cache) = cache(Duration::from_secs(60));
        let cache = Arc::new(cache);

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let cache = cache.clone();
            tasks.push(tokio::spawn(async move { cache.get_market().await }));
        }
        for t in tasks {
            t.await.unwrap().unwrap();
        }
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn snapshot_wire_shape() {
        let snapshot = MarketSnapshot {
            fetched_at: OffsetDateTime::UNIX_EPOCH,
            truncgil: serde_json::json!({"USD": {}}),
            genelpara: GoldAndFx {
                altin: serde_json::json!({}),
                doviz: serde_json::json!({}),
            },
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["fetchedAt"], "1970-01-01T00:00:00Z");
        assert!(json["genelpara"]["altin"].is_object());
        assert!(json["truncgil"]["USD"].is_object());
    }
}
