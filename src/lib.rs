// tlru
//
// A thread-safe, time-aware LRU cache written in Rust.
//
// tlru combines a bounded recency cache with absolute time-to-live expiry:
// - **Two recency policies**: LRA (reads refresh recency) and LRI (writes
//   refresh recency, reads are pure observations)
// - **TTL expiry** against absolute timestamps, including caller-supplied
//   backdated ones
// - **Background sweeper**: a periodic task that evicts expired entries
// - **Eviction notifications**: one record per eviction, delivered over a
//   channel in eviction order
// - **State export/import**: hand the cache contents to the caller and
//   rebuild them later, recency order preserved
//
// Quick Start
//
// ```rust
// use std::time::Duration;
// use tlru::{CacheOptions, Policy, TlruCache};
//
// # fn main() -> tlru::Result<()> {
// let options = CacheOptions::with_policy(Policy::Lra)
//     .max_size(100)
//     .ttl(Duration::from_secs(60));
// let cache: TlruCache<String, u64> = TlruCache::with_options(options);
//
// cache.set("visits:alice".to_string(), 7)?;
//
// if let Some(entry) = cache.get(&"visits:alice".to_string()) {
//     println!("{} = {} (touched {} times)", entry.key, entry.value, entry.counter);
// }
// # Ok(())
// # }
// ```

// Re-export main types
pub use cache::{CacheOptions, TlruCache};
pub use error::{Error, Result};
pub use types::{CacheEntry, EvictedEntry, EvictionReason, Policy, State};

// Re-export the channel primitives used by the eviction sink
pub use crossbeam::channel;

// Core modules
pub mod cache;
pub mod error;
pub mod types;

// Internal modules
pub(crate) mod list;
pub(crate) mod sweeper;
