// Cache core
//
// Orchestrates the recency list and the key index under a single
// reader/writer lock, dispatches the policy-specific behaviors of
// set/get/delete, enforces the size bound and the TTL, and emits one
// record per eviction to the optional sink.

use crate::error::{Error, Result};
use crate::list::{Node, RecencyList};
use crate::sweeper::Sweeper;
use crate::types::{CacheEntry, EvictedEntry, EvictionReason, Policy, State};
use chrono::{DateTime, TimeDelta, Utc};
use crossbeam::channel::Sender;
use log::trace;
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

/// Sweeper cadence applied when `gc_interval` is unset or zero
const DEFAULT_GC_INTERVAL: Duration = Duration::from_secs(10);

/// Configuration options for a [`TlruCache`]
#[derive(Debug, Clone)]
pub struct CacheOptions<K, V> {
    /// Upper bound on live entries; `0` disables the bound
    pub max_size: usize,

    /// Maximum age of `last_used_at` before an entry expires; `None`
    /// disables expiry
    pub ttl: Option<Duration>,

    /// Recency policy
    pub policy: Policy,

    /// Expiry sweeper cadence; `None` or zero selects the 10 second default
    pub gc_interval: Option<Duration>,

    /// Optional channel receiving one [`EvictedEntry`] per eviction
    ///
    /// Sends block while the cache lock is held, so a slow consumer
    /// back-pressures writers. Pass the sender of a bounded channel sized
    /// for the expected eviction burst, or of an unbounded channel to keep
    /// writers from ever blocking.
    pub eviction_sink: Option<Sender<EvictedEntry<K, V>>>,
}

impl<K, V> Default for CacheOptions<K, V> {
    fn default() -> Self {
        Self {
            max_size: 0,
            ttl: None,
            policy: Policy::default(),
            gc_interval: None,
            eviction_sink: None,
        }
    }
}

impl<K, V> CacheOptions<K, V> {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create options with a specific recency policy
    pub fn with_policy(policy: Policy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    /// Set the entry bound (chainable)
    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set the time-to-live (chainable)
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Set the recency policy (chainable)
    pub fn policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the sweeper cadence (chainable)
    pub fn gc_interval(mut self, gc_interval: Duration) -> Self {
        self.gc_interval = Some(gc_interval);
        self
    }

    /// Attach an eviction sink (chainable)
    pub fn eviction_sink(mut self, sink: Sender<EvictedEntry<K, V>>) -> Self {
        self.eviction_sink = Some(sink);
        self
    }
}

/// Cache internals guarded by the lock: the recency list, the key index,
/// and the sweeper handle
struct Inner<K, V> {
    list: RecencyList<K, V>,
    index: HashMap<K, usize>,
    sweeper: Option<Sweeper>,
}

/// State shared between cache handles and the sweeper thread
pub(crate) struct Shared<K, V> {
    policy: Policy,
    max_size: usize,
    ttl: TimeDelta,
    gc_interval: Duration,
    sink: Option<Sender<EvictedEntry<K, V>>>,
    inner: RwLock<Inner<K, V>>,
}

impl<K, V> Shared<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn is_expired(&self, last_used_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(last_used_at) > self.ttl
    }

    /// Remove a node from the list and index, then notify the sink
    ///
    /// The send happens while the cache lock is held, so records leave in
    /// the order the eviction decisions committed; a slow consumer
    /// back-pressures writers.
    fn evict(&self, inner: &mut Inner<K, V>, handle: usize, reason: EvictionReason, now: DateTime<Utc>) {
        let Some(node) = inner.list.remove(handle) else {
            return;
        };
        inner.index.remove(&node.key);
        trace!("evicted entry ({reason})");
        if let Some(sink) = &self.sink {
            let record = EvictedEntry {
                key: node.key,
                value: node.value,
                counter: node.counter,
                created_at: node.created_at,
                last_used_at: node.last_used_at,
                evicted_at: now,
                reason,
            };
            // A hung-up consumer discards records instead of failing the
            // cache operation.
            let _ = sink.send(record);
        }
    }

    /// Evict every expired node, examining the whole list from the tail
    fn sweep_locked(&self, inner: &mut Inner<K, V>, now: DateTime<Utc>) -> usize {
        let mut expired = Vec::new();
        for handle in inner.list.handles_back_to_front() {
            if let Some(node) = inner.list.get(handle) {
                if self.is_expired(node.last_used_at, now) {
                    expired.push(handle);
                }
            }
        }
        let count = expired.len();
        for handle in expired {
            self.evict(inner, handle, EvictionReason::Expired, now);
        }
        count
    }

    /// Entry point for the sweeper thread
    pub(crate) fn sweep_expired(&self) -> usize {
        let mut inner = self.inner.write();
        self.sweep_locked(&mut inner, Utc::now())
    }
}

/// Thread-safe time-aware LRU cache
///
/// Entries are bounded in number by `max_size`, expire once their
/// `last_used_at` timestamp ages past the TTL, and on overflow the entry
/// at the cold end of the recency list is evicted. Which operations count
/// as a recency touch depends on the configured [`Policy`].
///
/// Handles are cheaply cloneable and share one cache; all methods take
/// `&self` and are callable from any thread.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tlru::{CacheOptions, TlruCache};
///
/// let options = CacheOptions::new()
///     .max_size(2)
///     .ttl(Duration::from_secs(60));
/// let cache: TlruCache<&str, u32> = TlruCache::with_options(options);
///
/// cache.set("a", 1).unwrap();
/// cache.set("b", 2).unwrap();
///
/// let entry = cache.get(&"a").unwrap();
/// assert_eq!(entry.value, 1);
/// assert_eq!(entry.counter, 1);
/// ```
pub struct TlruCache<K, V> {
    shared: Arc<Shared<K, V>>,
}

impl<K, V> Clone for TlruCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<K, V> TlruCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create an unbounded, never-expiring cache under the default policy
    pub fn new() -> Self {
        Self::with_options(CacheOptions::new())
    }

    /// Create a cache with the given options
    pub fn with_options(options: CacheOptions<K, V>) -> Self {
        let ttl = match options.ttl {
            Some(ttl) => TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            None => TimeDelta::MAX,
        };
        let gc_interval = match options.gc_interval {
            Some(interval) if !interval.is_zero() => interval,
            _ => DEFAULT_GC_INTERVAL,
        };
        Self {
            shared: Arc::new(Shared {
                policy: options.policy,
                max_size: options.max_size,
                ttl,
                gc_interval,
                sink: options.eviction_sink,
                inner: RwLock::new(Inner {
                    list: RecencyList::new(),
                    index: HashMap::new(),
                    sweeper: None,
                }),
            }),
        }
    }

    // ===== Write operations =====

    /// Insert a key-value pair, stamping `last_used_at` with the current
    /// time
    ///
    /// Under LRA an existing key is rejected with [`Error::DuplicateKey`].
    /// Under LRI an existing key has its value replaced, its recency
    /// refreshed, and its counter incremented (unless it had already
    /// expired). When the cache is full the entry at the cold end of the
    /// recency list makes room first.
    pub fn set(&self, key: K, value: V) -> Result<()> {
        self.set_inner(key, value, None)
    }

    /// Insert a key-value pair with an explicit `last_used_at` timestamp
    ///
    /// The timestamp is taken as the absolute last-used instant for expiry
    /// comparison. Backdating is allowed and a timestamp older than the TTL
    /// forces expiry on the next touch or sweep.
    pub fn set_with_timestamp(&self, key: K, value: V, last_used_at: DateTime<Utc>) -> Result<()> {
        self.set_inner(key, value, Some(last_used_at))
    }

    fn set_inner(&self, key: K, value: V, timestamp: Option<DateTime<Utc>>) -> Result<()> {
        let shared = &self.shared;
        let mut inner = shared.inner.write();
        let now = Utc::now();
        let last_used_at = timestamp.unwrap_or(now);

        if inner.sweeper.is_none() {
            inner.sweeper = Some(Sweeper::spawn(Arc::downgrade(shared), shared.gc_interval));
        }

        if let Some(&handle) = inner.index.get(&key) {
            match shared.policy {
                Policy::Lra => return Err(Error::DuplicateKey(format!("{key:?}"))),
                Policy::Lri => {
                    if let Some(node) = inner.list.get_mut(handle) {
                        let was_expired = shared.is_expired(node.last_used_at, now);
                        node.value = value;
                        node.last_used_at = last_used_at;
                        if !was_expired {
                            node.counter += 1;
                        }
                    }
                    inner.list.move_to_front(handle);
                    return Ok(());
                }
            }
        }

        if shared.max_size > 0 {
            while inner.list.len() >= shared.max_size {
                let Some(victim) = inner.list.back() else {
                    break;
                };
                // A victim that already outlived its TTL is reported as
                // Expired rather than Dropped.
                let reason = match inner.list.get(victim) {
                    Some(node) if shared.is_expired(node.last_used_at, now) => {
                        EvictionReason::Expired
                    }
                    _ => EvictionReason::Dropped,
                };
                shared.evict(&mut inner, victim, reason, now);
            }
        }

        let counter = match shared.policy {
            Policy::Lra => 0,
            Policy::Lri => 1,
        };
        let handle = inner
            .list
            .push_front(Node::new(key.clone(), value, counter, now, last_used_at));
        inner.index.insert(key, handle);
        Ok(())
    }

    /// Remove a key, reporting the eviction as `Deleted`
    ///
    /// Returns whether the key was present.
    pub fn delete(&self, key: &K) -> bool {
        let shared = &self.shared;
        let mut inner = shared.inner.write();
        let Some(&handle) = inner.index.get(key) else {
            return false;
        };
        shared.evict(&mut inner, handle, EvictionReason::Deleted, Utc::now());
        true
    }

    /// Drop every entry and stop the expiry sweeper
    ///
    /// No eviction records are emitted. A later `set` starts a fresh
    /// sweeper.
    pub fn clear(&self) {
        let mut inner = self.shared.inner.write();
        inner.list.clear();
        inner.index.clear();
        inner.sweeper = None;
    }

    // ===== Read operations =====

    /// Look up a key, enforcing the TTL
    ///
    /// An expired entry is evicted (reported as `Expired`) and the lookup
    /// comes back empty. Under LRA a hit counts as a touch: the counter
    /// increments, `last_used_at` refreshes, and the entry moves to the
    /// warm end of the recency list. Under LRI a hit is a pure observation.
    pub fn get(&self, key: &K) -> Option<CacheEntry<K, V>> {
        match self.shared.policy {
            Policy::Lra => self.get_touch(key),
            Policy::Lri => self.get_observe(key),
        }
    }

    fn get_touch(&self, key: &K) -> Option<CacheEntry<K, V>> {
        let shared = &self.shared;
        let mut inner = shared.inner.write();
        let now = Utc::now();
        let handle = *inner.index.get(key)?;

        let expired = inner
            .list
            .get(handle)
            .is_some_and(|node| shared.is_expired(node.last_used_at, now));
        if expired {
            shared.evict(&mut inner, handle, EvictionReason::Expired, now);
            return None;
        }

        let node = inner.list.get_mut(handle)?;
        node.counter += 1;
        node.last_used_at = now;
        let entry = snapshot(node);
        inner.list.move_to_front(handle);
        Some(entry)
    }

    fn get_observe(&self, key: &K) -> Option<CacheEntry<K, V>> {
        let shared = &self.shared;
        let inner = shared.inner.upgradable_read();
        let now = Utc::now();
        let handle = *inner.index.get(key)?;

        let expired = inner
            .list
            .get(handle)
            .is_some_and(|node| shared.is_expired(node.last_used_at, now));
        if expired {
            // Upgradable guards exclude writers, so the handle is still
            // valid after the upgrade.
            let mut inner = RwLockUpgradableReadGuard::upgrade(inner);
            shared.evict(&mut inner, handle, EvictionReason::Expired, now);
            return None;
        }
        inner.list.get(handle).map(snapshot)
    }

    /// Check whether a key is cached, without consulting the TTL
    ///
    /// An entry whose TTL has elapsed but which nothing has evicted yet
    /// still reports `true`; use [`get`](TlruCache::get) to skip expired
    /// entries. Never touches recency and never evicts.
    pub fn has(&self, key: &K) -> bool {
        self.shared.inner.read().index.contains_key(key)
    }

    /// Number of live entries, including any not yet swept
    pub fn len(&self) -> usize {
        self.shared.inner.read().list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sweep expired entries, then return the remaining keys
    ///
    /// Order is unspecified.
    pub fn keys(&self) -> Vec<K> {
        let shared = &self.shared;
        let mut inner = shared.inner.write();
        shared.sweep_locked(&mut inner, Utc::now());
        inner.index.keys().cloned().collect()
    }

    /// Sweep expired entries, then return snapshots of the remaining ones
    ///
    /// Order is unspecified.
    pub fn entries(&self) -> Vec<CacheEntry<K, V>> {
        let shared = &self.shared;
        let mut inner = shared.inner.write();
        shared.sweep_locked(&mut inner, Utc::now());
        inner.list.iter().map(snapshot).collect()
    }

    // ===== State export/import =====

    /// Export the cache contents, ordered most-recently-touched first
    pub fn get_state(&self) -> State<K, V> {
        let inner = self.shared.inner.read();
        State {
            policy: self.shared.policy,
            extracted_at: Utc::now(),
            entries: inner.list.iter().map(snapshot).collect(),
        }
    }

    /// Replace the cache contents from an exported state
    ///
    /// Fails with [`Error::PolicyMismatch`] when the state was extracted
    /// under a different policy, leaving the cache untouched. Otherwise the
    /// cache is cleared and rebuilt preserving the state's
    /// most-recent-first order; a state holding more entries than
    /// `max_size` is truncated to its `max_size` most recent ones, so the
    /// size bound holds when this returns. No eviction records are emitted
    /// and the sweeper keeps its current schedule.
    pub fn set_state(&self, state: State<K, V>) -> Result<()> {
        if state.policy != self.shared.policy {
            return Err(Error::PolicyMismatch {
                expected: self.shared.policy,
                found: state.policy,
            });
        }
        let mut entries = state.entries;
        if self.shared.max_size > 0 {
            entries.truncate(self.shared.max_size);
        }
        let mut inner = self.shared.inner.write();
        inner.list.clear();
        inner.index.clear();
        for entry in entries {
            let handle = inner.list.push_back(Node::new(
                entry.key.clone(),
                entry.value,
                entry.counter,
                entry.created_at,
                entry.last_used_at,
            ));
            inner.index.insert(entry.key, handle);
        }
        Ok(())
    }

    // ===== Configuration =====

    pub fn policy(&self) -> Policy {
        self.shared.policy
    }

    pub fn max_size(&self) -> usize {
        self.shared.max_size
    }

    /// The configured TTL, or `None` when entries never expire
    pub fn ttl(&self) -> Option<Duration> {
        if self.shared.ttl == TimeDelta::MAX {
            None
        } else {
            self.shared.ttl.to_std().ok()
        }
    }

    pub fn gc_interval(&self) -> Duration {
        self.shared.gc_interval
    }
}

impl<K, V> Default for TlruCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

fn snapshot<K: Clone, V: Clone>(node: &Node<K, V>) -> CacheEntry<K, V> {
    CacheEntry {
        key: node.key.clone(),
        value: node.value.clone(),
        counter: node.counter,
        created_at: node.created_at,
        last_used_at: node.last_used_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_lra_rejects_duplicate_key_without_mutating() {
        let cache = TlruCache::new();
        cache.set("k", 1).unwrap();

        let err = cache.set("k", 2).unwrap_err();
        assert!(matches!(err, Error::DuplicateKey(_)));

        // The original entry is untouched
        let entry = cache.get(&"k").unwrap();
        assert_eq!(entry.value, 1);
        assert_eq!(entry.counter, 1);
    }

    #[test]
    fn test_max_size_zero_is_unbounded() {
        let cache = TlruCache::with_options(CacheOptions::new().max_size(0));
        for i in 0..1000u32 {
            cache.set(i, i).unwrap();
        }
        assert_eq!(cache.len(), 1000);
    }

    #[test]
    fn test_ttl_zero_expires_on_next_touch() {
        let cache: TlruCache<&str, u32> =
            TlruCache::with_options(CacheOptions::new().ttl(Duration::ZERO));
        cache.set("k", 1).unwrap();
        thread::sleep(Duration::from_millis(2));

        // Still indexed until something touches it
        assert!(cache.has(&"k"));
        assert!(cache.get(&"k").is_none());
        assert!(!cache.has(&"k"));
    }

    #[test]
    fn test_future_dated_timestamp_is_not_expired() {
        let cache: TlruCache<&str, u32> =
            TlruCache::with_options(CacheOptions::new().ttl(Duration::from_millis(50)));
        let future = Utc::now() + TimeDelta::hours(1);
        cache.set_with_timestamp("k", 1, future).unwrap();
        thread::sleep(Duration::from_millis(100));

        assert!(cache.get(&"k").is_some());
    }

    #[test]
    fn test_randomized_ops_keep_index_and_list_consistent() {
        use rand::Rng;

        let mut rng = rand::thread_rng();
        let options = CacheOptions::new()
            .max_size(8)
            .ttl(Duration::from_secs(60))
            .policy(Policy::Lri);
        let cache: TlruCache<u32, u32> = TlruCache::with_options(options);

        for _ in 0..2000 {
            let key = rng.gen_range(0..32u32);
            match rng.gen_range(0..4u8) {
                0 | 1 => cache.set(key, key).unwrap(),
                2 => {
                    cache.get(&key);
                }
                _ => {
                    cache.delete(&key);
                }
            }

            let inner = cache.shared.inner.read();
            assert!(inner.list.len() <= 8);
            assert_eq!(inner.index.len(), inner.list.len());
            for handle in inner.list.handles_back_to_front() {
                let node = inner.list.get(handle).unwrap();
                assert_eq!(inner.index.get(&node.key), Some(&handle));
            }
        }
    }
}
