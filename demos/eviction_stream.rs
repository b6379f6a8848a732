// Eviction stream example for tlru
//
// Attaches an eviction sink and prints every record the cache emits:
// overflow drops, TTL expiries, and explicit deletes.

use std::thread;
use std::time::Duration;
use tlru::channel::unbounded;
use tlru::{CacheOptions, Policy, Result, TlruCache};

fn main() -> Result<()> {
    println!("=== tlru Eviction Stream ===\n");

    let (tx, rx) = unbounded();
    let options = CacheOptions::with_policy(Policy::Lri)
        .max_size(2)
        .ttl(Duration::from_millis(100))
        .gc_interval(Duration::from_millis(50))
        .eviction_sink(tx);
    let cache: TlruCache<String, u64> = TlruCache::with_options(options);

    // Records arrive in the order the eviction decisions committed
    let consumer = thread::spawn(move || {
        let mut count = 0;
        while let Ok(record) = rx.recv() {
            count += 1;
            println!(
                "  [{}] {} = {} ({}, touched {} times)",
                count, record.key, record.value, record.reason, record.counter
            );
        }
        count
    });

    cache.set("a".to_string(), 1)?;
    cache.set("b".to_string(), 2)?;

    // Overflow: "a" is coldest and gets dropped
    cache.set("c".to_string(), 3)?;

    // Explicit delete
    cache.delete(&"b".to_string());

    // Expiry: wait for the sweeper to catch "c" aging past the TTL
    thread::sleep(Duration::from_millis(300));

    // Dropping the cache hangs up the sink and ends the consumer
    drop(cache);
    let delivered = consumer.join().expect("consumer finished");
    println!("\n✓ {delivered} eviction records delivered");

    println!("\n=== Eviction Stream Complete ===");
    Ok(())
}
