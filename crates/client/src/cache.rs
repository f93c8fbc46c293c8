//! Tagged query cache.
//!
//! Query responses are kept for a short TTL under the tag of the data they
//! show. Mutations invalidate whole tags.

use std::time::Duration;

use moka::future::Cache;
use serde_json::Value;

/// Data categories used for invalidation.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Tag {
    Product,
    Search,
    Wishlist,
    Cart,
    Checkout,
    Navbar,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub(crate) struct CacheKey {
    pub tag: Tag,
    pub path: String,
}

/// How long an unused response stays cached.
const QUERY_TTL: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub(crate) struct QueryCache {
    entries: Cache<CacheKey, Value>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(500)
                .time_to_live(QUERY_TTL)
                .build(),
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<Value> {
        self.entries.get(key).await
    }

    pub async fn insert(&self, key: CacheKey, value: Value) {
        self.entries.insert(key, value).await;
    }

    pub async fn invalidate_tags(&self, tags: &[Tag]) {
        let stale: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(key, _)| tags.contains(&key.tag))
            .map(|(key, _)| (*key).clone())
            .collect();
        for key in stale {
            self.entries.invalidate(&key).await;
        }
    }

    pub async fn invalidate_all(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks().await;
    }
}
