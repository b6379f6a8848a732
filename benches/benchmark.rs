use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;
use tlru::{CacheOptions, Policy, TlruCache};

fn set_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_operations");

    group.bench_function("lra_insert", |b| {
        let cache: TlruCache<u64, u64> = TlruCache::with_options(
            CacheOptions::with_policy(Policy::Lra).ttl(Duration::from_secs(60)),
        );
        let mut key = 0u64;
        b.iter(|| {
            key += 1;
            cache.set(key, key).unwrap();
        });
    });

    group.bench_function("lri_update", |b| {
        let cache: TlruCache<u64, u64> = TlruCache::with_options(
            CacheOptions::with_policy(Policy::Lri).ttl(Duration::from_secs(60)),
        );
        cache.set(1, 1).unwrap();
        b.iter(|| {
            cache.set(1, 2).unwrap();
        });
    });

    group.bench_function("bounded_churn", |b| {
        let cache: TlruCache<u64, u64> = TlruCache::with_options(
            CacheOptions::with_policy(Policy::Lri)
                .max_size(1024)
                .ttl(Duration::from_secs(60)),
        );
        let mut key = 0u64;
        b.iter(|| {
            key += 1;
            cache.set(key, key).unwrap();
        });
    });

    group.finish();
}

fn get_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_operations");

    group.bench_function("lra_hit", |b| {
        let cache: TlruCache<u64, u64> = TlruCache::with_options(
            CacheOptions::with_policy(Policy::Lra).ttl(Duration::from_secs(60)),
        );
        for i in 0..1024u64 {
            cache.set(i, i).unwrap();
        }
        let mut idx = 0u64;
        b.iter(|| {
            black_box(cache.get(&(idx % 1024)));
            idx += 1;
        });
    });

    group.bench_function("lri_hit", |b| {
        let cache: TlruCache<u64, u64> = TlruCache::with_options(
            CacheOptions::with_policy(Policy::Lri).ttl(Duration::from_secs(60)),
        );
        for i in 0..1024u64 {
            cache.set(i, i).unwrap();
        }
        let mut idx = 0u64;
        b.iter(|| {
            black_box(cache.get(&(idx % 1024)));
            idx += 1;
        });
    });

    group.bench_function("miss", |b| {
        let cache: TlruCache<u64, u64> = TlruCache::with_options(
            CacheOptions::with_policy(Policy::Lri).ttl(Duration::from_secs(60)),
        );
        for i in 0..1024u64 {
            cache.set(i, i).unwrap();
        }
        b.iter(|| {
            black_box(cache.get(&u64::MAX));
        });
    });

    group.finish();
}

fn maintenance_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("maintenance");

    group.bench_function("keys_with_sweep", |b| {
        let cache: TlruCache<u64, u64> = TlruCache::with_options(
            CacheOptions::with_policy(Policy::Lri).ttl(Duration::from_secs(60)),
        );
        for i in 0..1024u64 {
            cache.set(i, i).unwrap();
        }
        b.iter(|| {
            black_box(cache.keys());
        });
    });

    group.bench_function("state_export", |b| {
        let cache: TlruCache<u64, u64> = TlruCache::with_options(
            CacheOptions::with_policy(Policy::Lri).ttl(Duration::from_secs(60)),
        );
        for i in 0..1024u64 {
            cache.set(i, i).unwrap();
        }
        b.iter(|| {
            black_box(cache.get_state());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    set_benchmarks,
    get_benchmarks,
    maintenance_benchmarks
);
criterion_main!(benches);
