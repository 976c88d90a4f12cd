use crate::market::types::{NormalizedRecord, QuoteSnapshot};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub const HISTORY_TTL: Duration = Duration::from_secs(3_600);
pub const QUOTE_TTL: Duration = Duration::from_secs(300);
pub const BROADCAST_TTL: Duration = Duration::from_secs(300);

/// History entries are keyed by the bare symbol; the other kinds carry a
/// prefix so data kinds for the same symbol never collide.
pub fn history_key(symbol: &str) -> String {
    symbol.to_string()
}

pub fn quote_key(symbol: &str) -> String {
    format!("quote:{symbol}")
}

pub fn broadcast_key(symbol: &str) -> String {
    format!("bcast:{symbol}")
}

#[derive(Debug, Clone)]
pub enum CachedPayload {
    History(Vec<NormalizedRecord>),
    Quote(QuoteSnapshot),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: CachedPayload,
    created_at: Instant,
    ttl: Duration,
}

/// Keyed store with per-entry time-to-live. An expired entry behaves as
/// absent on read and is replaced by the next `set`; nothing is evicted
/// proactively, which is fine for a working set bounded by the symbol
/// universe. Reads take the shared lock so lookups on different keys never
/// block each other; a read never errors and never evicts.
#[derive(Debug, Default)]
pub struct TtlCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<CachedPayload> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<CachedPayload> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if now.duration_since(entry.created_at) >= entry.ttl {
            return None;
        }
        Some(entry.payload.clone())
    }

    /// Stores or replaces the entry for `key`, stamping creation time as
    /// now. Same-key writers race as last-writer-wins.
    pub fn set(&self, key: &str, payload: CachedPayload, ttl: Duration) {
        let entry = CacheEntry {
            payload,
            created_at: Instant::now(),
            ttl,
        };
        self.entries.write().insert(key.to_string(), entry);
    }
}
