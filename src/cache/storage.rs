use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::cache::GenerationRecord;
use crate::clock::Clock;

#[derive(Debug, Clone)]
struct CacheEntry {
    record: GenerationRecord,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub expired: usize,
}

/// In-memory store of finished generation records keyed by image id.
///
/// Entries expire after their TTL; expired entries are dropped on read and by
/// [`ResultCache::purge_expired`], which the sweeper task runs periodically.
pub struct ResultCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl ResultCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    pub fn set(&self, id: &str, record: GenerationRecord, ttl: Duration) {
        let now = self.clock.now();
        let expires_at = TimeDelta::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.entries
            .lock()
            .insert(id.to_string(), CacheEntry { record, expires_at });
    }

    pub fn get(&self, id: &str) -> Option<GenerationRecord> {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        let entry = entries.get(id)?;
        if entry.is_expired(now) {
            entries.remove(id);
            return None;
        }
        Some(entry.record.clone())
    }

    pub fn has(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn delete(&self, id: &str) {
        self.entries.lock().remove(id);
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let entries = self.entries.lock();
        CacheStats {
            size: entries.len(),
            expired: entries.values().filter(|entry| entry.is_expired(now)).count(),
        }
    }

    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = self.purge_expired();
                if removed > 0 {
                    tracing::debug!(removed, "purged expired cache entries");
                }
            }
        })
    }
}
