//! Analysis result caching.
//!
//! The cache is an injected interface, never a process-wide singleton:
//! the serving layer decides whether and what to cache, and derives its own
//! keys (typically a content hash of input text + stance + persona). The
//! engine itself stays cache-free so scoring and orchestration remain free
//! of hidden state.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::graph::ArgumentGraph;

/// Consumed caching contract for finished graphs.
#[async_trait]
pub trait AnalysisCache: Send + Sync {
    /// Look up a cached graph; expired entries behave as absent.
    async fn get(&self, key: &str) -> Option<ArgumentGraph>;

    /// Store a graph under a key with a time-to-live.
    async fn put(&self, key: String, graph: ArgumentGraph, ttl: Duration);
}

struct CacheEntry {
    graph: ArgumentGraph,
    expires_at: Instant,
}

/// In-memory TTL cache.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including not-yet-evicted expired ones
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache holds no entries
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl AnalysisCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<ArgumentGraph> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Some(entry.graph.clone())
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: evict under the write lock
        self.entries.write().await.remove(key);
        None
    }

    async fn put(&self, key: String, graph: ArgumentGraph, ttl: Duration) {
        let entry = CacheEntry {
            graph,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key, entry);
    }
}
