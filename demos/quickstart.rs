// Quick start example for tlru
//
// This demonstrates basic usage of the cache: construction, the two
// recency policies, TTL expiry, and state export/import.

use std::thread;
use std::time::Duration;
use tlru::{CacheOptions, Policy, Result, TlruCache};

fn main() -> Result<()> {
    println!("=== tlru Quickstart ===\n");

    // A bounded LRA cache: reads refresh recency, re-inserting a key fails
    let options = CacheOptions::with_policy(Policy::Lra)
        .max_size(3)
        .ttl(Duration::from_millis(200));
    let cache: TlruCache<String, String> = TlruCache::with_options(options);

    cache.set("user:1".to_string(), "alice".to_string())?;
    cache.set("user:2".to_string(), "bob".to_string())?;
    cache.set("user:3".to_string(), "carol".to_string())?;
    println!("✓ Inserted 3 entries");

    // Reading touches the entry: counter goes up, recency refreshes
    if let Some(entry) = cache.get(&"user:1".to_string()) {
        println!(
            "✓ Read {} = {} (touched {} times)",
            entry.key, entry.value, entry.counter
        );
    }

    // A fourth insert overflows the bound; user:2 is now the coldest entry
    cache.set("user:4".to_string(), "dave".to_string())?;
    println!(
        "✓ Overflow evicted the coldest entry; user:2 cached: {}",
        cache.has(&"user:2".to_string())
    );

    // Re-inserting an existing key is a usage error under LRA
    match cache.set("user:1".to_string(), "eve".to_string()) {
        Err(err) => println!("✓ Duplicate insert rejected: {err}"),
        Ok(()) => unreachable!(),
    }

    // Entries expire once their last use ages past the TTL
    thread::sleep(Duration::from_millis(300));
    println!(
        "✓ After the TTL elapsed, user:1 reads back: {:?}",
        cache.get(&"user:1".to_string())
    );

    // Export and rebuild
    let lri: TlruCache<String, u64> =
        TlruCache::with_options(CacheOptions::with_policy(Policy::Lri));
    lri.set("a".to_string(), 1)?;
    lri.set("b".to_string(), 2)?;

    let state = lri.get_state();
    let json = state.to_json().expect("state serializes");
    println!("✓ Exported state: {json}");

    lri.clear();
    lri.set_state(tlru::State::from_json(&json).expect("state deserializes"))?;
    println!("✓ Restored {} entries from the snapshot", lri.len());

    println!("\n=== Quickstart Complete ===");
    Ok(())
}
