//! Performance benchmarks for the admission and caching hot path.
//!
//! Run with: `cargo bench --bench admission`
//!
//! ## Performance Targets
//!
//! | Operation | Target | Notes |
//! |-----------|--------|-------|
//! | Admission check | <5μs | Window truncation + push |
//! | Fingerprint | <10μs | SHA-256 over both texts |
//! | Cache hit | <5μs | LRU lookup under mutex |

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use taskproof::{
    AdmissionConfig, AdmissionController, CacheConfig, Fingerprint, ResultCache,
    VerificationResult,
};

fn bench_admission(c: &mut Criterion) {
    let mut group = c.benchmark_group("admission");
    group.throughput(Throughput::Elements(1));

    group.bench_function("allow_under_limit", |b| {
        // Short window so the deque stays small across iterations.
        let controller = AdmissionController::new(AdmissionConfig {
            limit: usize::MAX,
            window: Duration::from_millis(1),
        });
        b.iter(|| black_box(controller.allow()));
    });

    group.bench_function("allow_at_limit", |b| {
        let controller = AdmissionController::new(AdmissionConfig {
            limit: 60,
            window: Duration::from_secs(60),
        });
        for _ in 0..60 {
            controller.allow();
        }
        b.iter(|| black_box(controller.allow()));
    });

    group.finish();
}

fn bench_fingerprint(c: &mut Criterion) {
    let description = "Build a responsive login page with password reset".repeat(8);
    let submission = "Here is the implementation with tests attached".repeat(32);

    c.bench_function("fingerprint", |b| {
        b.iter(|| Fingerprint::compute(black_box(&description), black_box(&submission)));
    });
}

fn bench_cache_hit(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");

    let cache = ResultCache::new(CacheConfig {
        capacity: 100,
        ttl: Duration::from_secs(3600),
    });
    let key = Fingerprint::compute("bench task", "bench work");

    runtime.block_on(cache.get_or_compute(key.clone(), || async {
        VerificationResult::failure("seed entry")
    }));

    c.bench_function("cache_hit", |b| {
        b.iter(|| black_box(cache.lookup(&key)));
    });
}

criterion_group!(benches, bench_admission, bench_fingerprint, bench_cache_hit);
criterion_main!(benches);
