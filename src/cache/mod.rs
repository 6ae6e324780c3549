/// Whole-page feed cache backed by Redis
///
/// The main feed is cached as the exact serialized response body, keyed by
/// route and page number. Invalidation is deliberately coarse: keys embed a
/// generation counter, and any post or comment write INCRs the counter so
/// every cached page is orphaned at once. Cache failures degrade to direct
/// database reads and are never fatal to a request.
///
/// The connection manager is established lazily on first use; until Redis
/// is reachable every read is a miss and every write a logged no-op.
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::error::Result;
use crate::metrics::PAGE_CACHE_EVENTS;

const GENERATION_KEY: &str = "feed:generation";

#[derive(Clone)]
pub struct PageCache {
    client: redis::Client,
    manager: Arc<OnceCell<ConnectionManager>>,
    ttl: Duration,
}

fn page_key(generation: u64, route: &str, page: i64) -> String {
    format!("feed:v{}:{}:{}", generation, route, page)
}

impl PageCache {
    pub fn new(client: redis::Client, ttl_secs: u64) -> Self {
        Self {
            client,
            manager: Arc::new(OnceCell::new()),
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    async fn conn(&self) -> redis::RedisResult<ConnectionManager> {
        self.manager
            .get_or_try_init(|| ConnectionManager::new(self.client.clone()))
            .await
            .cloned()
    }

    /// Establish the connection eagerly; startup can use this to log
    /// reachability without making Redis a hard dependency.
    pub async fn ping(&self) -> redis::RedisResult<()> {
        let mut conn = self.conn().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn generation(&self, conn: &mut ConnectionManager) -> redis::RedisResult<u64> {
        let generation: Option<u64> = conn.get(GENERATION_KEY).await?;
        Ok(generation.unwrap_or(0))
    }

    /// Fetch a cached page body. Any Redis failure reads as a miss.
    pub async fn get_page(&self, route: &str, page: i64) -> Option<String> {
        let result: redis::RedisResult<Option<String>> = async {
            let mut conn = self.conn().await?;
            let generation = self.generation(&mut conn).await?;
            conn.get(page_key(generation, route, page)).await
        }
        .await;

        match result {
            Ok(Some(body)) => {
                debug!(route, page, "page cache HIT");
                PAGE_CACHE_EVENTS.with_label_values(&["hit"]).inc();
                Some(body)
            }
            Ok(None) => {
                debug!(route, page, "page cache MISS");
                PAGE_CACHE_EVENTS.with_label_values(&["miss"]).inc();
                None
            }
            Err(e) => {
                warn!(route, page, "page cache read failed: {}", e);
                PAGE_CACHE_EVENTS.with_label_values(&["error"]).inc();
                None
            }
        }
    }

    /// Store a rendered page body. Failures are logged and swallowed.
    pub async fn put_page(&self, route: &str, page: i64, body: &str) {
        // Small TTL jitter so a burst of pages does not expire in lockstep.
        let jitter = (rand::random::<u32>() % 10) as u64;
        let ttl_secs = self.ttl.as_secs() + jitter;

        let result: redis::RedisResult<()> = async {
            let mut conn = self.conn().await?;
            let generation = self.generation(&mut conn).await?;
            conn.set_ex(page_key(generation, route, page), body, ttl_secs)
                .await
        }
        .await;

        if let Err(e) = result {
            warn!(route, page, "page cache write failed: {}", e);
            PAGE_CACHE_EVENTS.with_label_values(&["error"]).inc();
        }
    }

    /// Wholesale invalidation: bump the generation so every cached page key
    /// becomes unreachable. Called on any post create/edit/delete and any
    /// comment create/delete. The attempt is always recorded, so a failed
    /// bump is still observable in the metrics.
    pub async fn invalidate_all(&self) -> Result<()> {
        PAGE_CACHE_EVENTS.with_label_values(&["invalidate"]).inc();

        let result: redis::RedisResult<u64> = async {
            let mut conn = self.conn().await?;
            conn.incr(GENERATION_KEY, 1u64).await
        }
        .await;

        match result {
            Ok(_) => {
                debug!("page cache invalidated (generation bumped)");
                Ok(())
            }
            Err(e) => {
                PAGE_CACHE_EVENTS.with_label_values(&["error"]).inc();
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_cache() -> PageCache {
        let client = redis::Client::open("redis://127.0.0.1:1/").unwrap();
        PageCache::new(client, 20)
    }

    #[test]
    fn keys_embed_generation_route_and_page() {
        assert_eq!(page_key(0, "index", 1), "feed:v0:index:1");
        assert_eq!(page_key(7, "index", 3), "feed:v7:index:3");
    }

    #[test]
    fn generation_bump_changes_every_key() {
        let before = page_key(3, "index", 1);
        let after = page_key(4, "index", 1);
        assert_ne!(before, after);
    }

    #[tokio::test]
    async fn unreachable_redis_degrades_to_misses() {
        let cache = unreachable_cache();
        assert!(cache.get_page("index", 1).await.is_none());
        // Writes are swallowed, invalidation reports its failure.
        cache.put_page("index", 1, "{}").await;
        assert!(cache.invalidate_all().await.is_err());
    }
}
