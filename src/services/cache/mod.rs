//! Result Cache
//!
//! In-memory LRU cache of formatted results with per-entry TTL, tag-based
//! invalidation, optional payload compression, and a background expiry sweep.
//!
//! All state lives behind a single `Mutex` (see the executor cache note on
//! choosing a plain map over an external cache crate for deterministic
//! eviction). Recency is tracked with a monotonically increasing tick per
//! entry and a `BTreeMap<tick, key>` giving O(log n) access to the least
//! recently used key.

pub mod compression;

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::{Duration, Instant};

use result_formatting_core::{CoreError, CoreResult, FormattedResult};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub use compression::{CompressionHook, GzipCompression};

use crate::models::config::CacheConfig;

/// Fraction of `max_entries` evicted when the cache is full.
const EVICTION_FRACTION: f64 = 0.1;

/// Quality score at or above which a result is tagged `quality:high`.
const HIGH_QUALITY: f64 = 0.8;
/// Quality score at or above which a result is tagged `quality:medium`.
const MEDIUM_QUALITY: f64 = 0.5;

// ============================================================================
// Entries
// ============================================================================

enum Payload {
    Plain(FormattedResult),
    Compressed(Vec<u8>),
}

struct CacheEntry {
    payload: Payload,
    tags: Vec<String>,
    expires_at: Option<Instant>,
    last_accessed: Instant,
    access_count: u64,
    /// Approximate in-memory size of the payload
    size_bytes: usize,
    /// Recency tick; larger is more recent
    tick: u64,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map(|at| now > at).unwrap_or(false)
    }
}

/// Cache statistics snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Hit rate in percent (0-100)
    pub hit_rate: f64,
    pub sets: u64,
    pub evictions: u64,
    pub expirations: u64,
    /// Bytes saved by compression across all writes
    pub compression_savings_bytes: u64,
    /// Approximate memory footprint of keys and payloads
    pub memory_bytes: usize,
    pub entries: usize,
    pub max_entries: usize,
}

struct CacheState {
    entries: HashMap<String, CacheEntry>,
    lru: BTreeMap<u64, String>,
    next_tick: u64,
    max_entries: usize,
    default_ttl: Duration,
    compression: Option<Arc<dyn CompressionHook>>,
    hits: u64,
    misses: u64,
    sets: u64,
    evictions: u64,
    expirations: u64,
    compression_savings: u64,
}

impl CacheState {
    fn touch(&mut self, key: &str) {
        let tick = self.next_tick;
        self.next_tick += 1;
        if let Some(entry) = self.entries.get_mut(key) {
            self.lru.remove(&entry.tick);
            entry.tick = tick;
            entry.last_accessed = Instant::now();
            entry.access_count += 1;
            self.lru.insert(tick, key.to_string());
        }
    }

    fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.lru.remove(&entry.tick);
        Some(entry)
    }

    fn evict_oldest(&mut self, count: usize) -> usize {
        let victims: Vec<String> = self.lru.values().take(count).cloned().collect();
        for key in &victims {
            self.remove(key);
            debug!(key = %key, "Evicted cache entry");
        }
        self.evictions += victims.len() as u64;
        victims.len()
    }

    fn purge_expired(&mut self, now: Instant) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, e)| e.is_expired(now))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &expired {
            self.remove(key);
        }
        self.expirations += expired.len() as u64;
        expired.len()
    }

    fn ensure_capacity(&mut self) {
        if self.entries.len() < self.max_entries {
            return;
        }
        self.purge_expired(Instant::now());
        if self.entries.len() < self.max_entries {
            return;
        }
        let batch = ((self.max_entries as f64 * EVICTION_FRACTION).floor() as usize).max(1);
        let evicted = self.evict_oldest(batch);
        debug!(evicted, max_entries = self.max_entries, "Cache full, evicted LRU entries");
    }

    fn decode(&self, payload: &Payload) -> CoreResult<FormattedResult> {
        match payload {
            Payload::Plain(result) => Ok(result.clone()),
            Payload::Compressed(bytes) => {
                let hook = self
                    .compression
                    .as_ref()
                    .ok_or_else(|| CoreError::cache("compressed entry but no compression hook"))?;
                let raw = hook.decompress(bytes)?;
                serde_json::from_slice(&raw)
                    .map_err(|e| CoreError::cache(format!("corrupt cache payload: {}", e)))
            }
        }
    }

    fn encode(&mut self, result: &FormattedResult) -> (Payload, usize) {
        let hook = match &self.compression {
            Some(hook) => hook.clone(),
            None => {
                let size = serde_json::to_vec(result).map(|v| v.len()).unwrap_or(0);
                return (Payload::Plain(result.clone()), size);
            }
        };

        let compressed = serde_json::to_vec(result)
            .map_err(CoreError::from)
            .and_then(|raw| hook.compress(&raw).map(|c| (raw.len(), c)));

        match compressed {
            Ok((raw_len, bytes)) => {
                self.compression_savings += raw_len.saturating_sub(bytes.len()) as u64;
                let size = bytes.len();
                (Payload::Compressed(bytes), size)
            }
            Err(e) => {
                warn!(hook = hook.name(), error = %e, "Compression failed, storing uncompressed");
                let size = serde_json::to_vec(result).map(|v| v.len()).unwrap_or(0);
                (Payload::Plain(result.clone()), size)
            }
        }
    }
}

/// Tags derived from a formatted result.
pub fn result_tags(result: &FormattedResult) -> Vec<String> {
    let mut tags = vec![
        format!("format:{}", result.format),
        format!("success:{}", result.original.success),
    ];
    if let Some(content_type) = result.content_type() {
        tags.push(format!("content:{}", content_type));
    }
    if let Some(score) = result.metadata.quality_score {
        let bucket = if score >= HIGH_QUALITY {
            "high"
        } else if score >= MEDIUM_QUALITY {
            "medium"
        } else {
            "low"
        };
        tags.push(format!("quality:{}", bucket));
    }
    tags
}

// ============================================================================
// ResultCache
// ============================================================================

/// LRU + TTL cache for formatted results.
pub struct ResultCache {
    state: Mutex<CacheState>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl ResultCache {
    /// Create a cache holding at most `max_entries` results for `ttl` each.
    ///
    /// A zero `ttl` disables expiry.
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                lru: BTreeMap::new(),
                next_tick: 0,
                max_entries: max_entries.max(1),
                default_ttl: ttl,
                compression: None,
                hits: 0,
                misses: 0,
                sets: 0,
                evictions: 0,
                expirations: 0,
                compression_savings: 0,
            }),
            sweeper: Mutex::new(None),
        }
    }

    /// Create a cache from configuration. Installs gzip when compression is enabled.
    pub fn from_config(config: &CacheConfig) -> Self {
        let cache = Self::new(config.max_entries, Duration::from_secs(config.ttl_seconds));
        if config.compression_enabled {
            cache.set_compression(Some(Arc::new(GzipCompression::default())));
        }
        cache
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Install or remove the compression hook. Existing entries keep their encoding.
    pub fn set_compression(&self, hook: Option<Arc<dyn CompressionHook>>) {
        let mut state = self.lock();
        if let Some(h) = &hook {
            debug!(hook = h.name(), "Cache compression enabled");
        }
        state.compression = hook;
    }

    pub fn compression_enabled(&self) -> bool {
        self.lock().compression.is_some()
    }

    // ── Reads ───────────────────────────────────────────────────────────

    /// Look up a result. Expired or undecodable entries are removed and count as a miss.
    pub fn get(&self, key: &str) -> Option<FormattedResult> {
        let mut state = self.lock();
        let now = Instant::now();

        let decoded = match state.entries.get(key) {
            None => None,
            Some(entry) if entry.is_expired(now) => {
                state.remove(key);
                state.expirations += 1;
                debug!(key = %key, "Cache entry expired");
                None
            }
            Some(entry) => match state.decode(&entry.payload) {
                Ok(result) => Some(result),
                Err(e) => {
                    error!(key = %key, error = %e, "Dropping undecodable cache entry");
                    state.remove(key);
                    None
                }
            },
        };

        match decoded {
            Some(result) => {
                state.hits += 1;
                state.touch(key);
                Some(result)
            }
            None => {
                state.misses += 1;
                None
            }
        }
    }

    /// Whether a live entry exists. Does not affect recency or statistics.
    pub fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        self.lock()
            .entries
            .get(key)
            .map(|e| !e.is_expired(now))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Keys from least to most recently used.
    pub fn keys(&self) -> Vec<String> {
        self.lock().lru.values().cloned().collect()
    }

    /// Live results carrying `tag`, most recently used first.
    pub fn get_by_tag(&self, tag: &str) -> Vec<FormattedResult> {
        let state = self.lock();
        let now = Instant::now();
        state
            .lru
            .values()
            .rev()
            .filter_map(|key| state.entries.get(key))
            .filter(|e| !e.is_expired(now) && e.tags.iter().any(|t| t == tag))
            .filter_map(|e| state.decode(&e.payload).ok())
            .collect()
    }

    // ── Writes ──────────────────────────────────────────────────────────

    /// Store a result with the default TTL.
    pub fn set(&self, key: &str, result: &FormattedResult) {
        let ttl = self.lock().default_ttl;
        self.set_with_ttl(key, result, ttl);
    }

    /// Store a result with an explicit TTL. A zero TTL never expires.
    pub fn set_with_ttl(&self, key: &str, result: &FormattedResult, ttl: Duration) {
        let mut state = self.lock();

        if let Some(old) = state.remove(key) {
            debug!(key = %key, previous_hits = old.access_count, "Overwriting cache entry");
        } else {
            state.ensure_capacity();
        }

        let now = Instant::now();
        let (payload, size_bytes) = state.encode(result);
        let tick = state.next_tick;
        state.next_tick += 1;

        state.entries.insert(
            key.to_string(),
            CacheEntry {
                payload,
                tags: result_tags(result),
                expires_at: if ttl.is_zero() { None } else { Some(now + ttl) },
                last_accessed: now,
                access_count: 0,
                size_bytes,
                tick,
            },
        );
        state.lru.insert(tick, key.to_string());
        state.sets += 1;
    }

    /// Remove an entry. Returns false if absent.
    pub fn delete(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    /// Remove every entry. Statistics are kept.
    pub fn clear(&self) {
        let mut state = self.lock();
        let count = state.entries.len();
        state.entries.clear();
        state.lru.clear();
        debug!(count, "Cache cleared");
    }

    /// Remove every entry carrying `tag`. Returns the number removed.
    pub fn invalidate_by_tag(&self, tag: &str) -> usize {
        let mut state = self.lock();
        let keys: Vec<String> = state
            .entries
            .iter()
            .filter(|(_, e)| e.tags.iter().any(|t| t == tag))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &keys {
            state.remove(key);
        }
        if !keys.is_empty() {
            info!(tag = %tag, count = keys.len(), "Invalidated cache entries by tag");
        }
        keys.len()
    }

    /// Make room for one more entry, evicting LRU entries if full.
    pub fn ensure_capacity(&self) {
        self.lock().ensure_capacity();
    }

    /// Remove expired entries. Returns the number removed.
    pub fn cleanup_expired(&self) -> usize {
        let removed = self.lock().purge_expired(Instant::now());
        if removed > 0 {
            debug!(removed, "Cache sweep removed expired entries");
        }
        removed
    }

    /// Apply new bounds, evicting LRU entries if the cache is now over capacity.
    pub fn reconfigure(&self, max_entries: usize, ttl: Duration) {
        let mut state = self.lock();
        state.max_entries = max_entries.max(1);
        state.default_ttl = ttl;
        let over = state.entries.len().saturating_sub(state.max_entries);
        if over > 0 {
            state.evict_oldest(over);
        }
        info!(max_entries = state.max_entries, ttl_secs = ttl.as_secs(), "Cache reconfigured");
    }

    /// Statistics snapshot.
    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        let lookups = state.hits + state.misses;
        let hit_rate = if lookups > 0 {
            state.hits as f64 / lookups as f64 * 100.0
        } else {
            0.0
        };
        let memory_bytes = state
            .entries
            .iter()
            .map(|(k, e)| k.len() + e.size_bytes + e.tags.iter().map(String::len).sum::<usize>())
            .sum();

        CacheStats {
            hits: state.hits,
            misses: state.misses,
            hit_rate,
            sets: state.sets,
            evictions: state.evictions,
            expirations: state.expirations,
            compression_savings_bytes: state.compression_savings,
            memory_bytes,
            entries: state.entries.len(),
            max_entries: state.max_entries,
        }
    }

    /// Access count and idle time of an entry, without touching it.
    pub fn entry_info(&self, key: &str) -> Option<(u64, Duration)> {
        self.lock()
            .entries
            .get(key)
            .map(|e| (e.access_count, e.last_accessed.elapsed()))
    }

    // ── Background sweep ────────────────────────────────────────────────

    /// Start the periodic expiry sweep on the current tokio runtime.
    ///
    /// The task holds only a weak reference and exits once the cache is
    /// dropped. Replaces any sweeper already running.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("No tokio runtime available, cache sweeper not started");
                return;
            }
        };
        if interval.is_zero() {
            return;
        }

        let weak: Weak<Self> = Arc::downgrade(self);
        let task = handle.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match weak.upgrade() {
                    Some(cache) => {
                        cache.cleanup_expired();
                    }
                    None => break,
                }
            }
            debug!("Cache sweeper exited");
        });

        let mut slot = self.sweeper.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = slot.replace(task) {
            previous.abort();
        }
    }

    /// Stop the background sweep, if running.
    pub fn stop_sweeper(&self) {
        let mut slot = self.sweeper.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(task) = slot.take() {
            task.abort();
            debug!("Cache sweeper stopped");
        }
    }

    pub fn sweeper_running(&self) -> bool {
        self.sweeper
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|t| !t.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for ResultCache {
    fn drop(&mut self) {
        self.stop_sweeper();
    }
}

// ============================================================================
// Tests
// ============================================================================
