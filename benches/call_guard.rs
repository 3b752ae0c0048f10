use call_guard::{ShardedStorage, SubmitGuard, SystemClock, ThrottleRegistry, Throttler};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use std::time::Duration;

/// Benchmark single-threaded throttle decisions
fn bench_throttler(c: &mut Criterion) {
    let mut group = c.benchmark_group("throttler");
    group.throughput(Throughput::Elements(1000));

    // Window never closes: every call after the first is dropped
    group.bench_function("dropped_calls", |b| {
        let throttler = Throttler::new(|n: u64| n)
            .with_limit(Duration::from_secs(3600))
            .with_clock(Arc::new(SystemClock::new()));
        throttler.call(0);

        b.iter(|| {
            for i in 0..1000 {
                black_box(throttler.call(black_box(i)));
            }
        })
    });

    // Zero window: every call runs the target
    group.bench_function("invoked_calls", |b| {
        let throttler = Throttler::new(|n: u64| n)
            .with_limit(Duration::ZERO)
            .with_clock(Arc::new(SystemClock::new()));

        b.iter(|| {
            for i in 0..1000 {
                black_box(throttler.call(black_box(i)));
            }
        })
    });

    group.finish();
}

/// Benchmark keyed throttling with different key diversity
fn bench_registry_keys(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_keys");
    group.throughput(Throughput::Elements(1000));

    for num_keys in [1usize, 10, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::new("check", num_keys),
            num_keys,
            |b, &num_keys| {
                let registry: ThrottleRegistry<usize> = ThrottleRegistry::with_storage(
                    Arc::new(ShardedStorage::new()),
                    Arc::new(SystemClock::new()),
                    Duration::from_secs(3600),
                );

                b.iter(|| {
                    for i in 0..1000 {
                        black_box(registry.check(black_box(i % num_keys)));
                    }
                })
            },
        );
    }

    group.finish();
}

/// Benchmark multi-threaded concurrent registry throughput
fn bench_registry_concurrent(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_concurrent");

    for num_threads in [2, 4, 8].iter() {
        group.throughput(Throughput::Elements((*num_threads as u64) * 1000));

        group.bench_with_input(
            BenchmarkId::new("threads", num_threads),
            num_threads,
            |b, &num_threads| {
                b.iter(|| {
                    let registry: ThrottleRegistry<usize> =
                        ThrottleRegistry::new(Duration::from_secs(3600));

                    let handles: Vec<_> = (0..num_threads)
                        .map(|t| {
                            let registry = registry.clone();
                            std::thread::spawn(move || {
                                // Each thread uses its own keys to avoid contention
                                for i in 0..1000 {
                                    black_box(registry.check(t * 1000 + i % 10));
                                }
                            })
                        })
                        .collect();

                    for handle in handles {
                        handle.join().unwrap();
                    }
                })
            },
        );
    }

    group.finish();
}

/// Benchmark the synchronous accept decision of the submission guard
fn bench_submit_guard(c: &mut Criterion) {
    let mut group = c.benchmark_group("submit_guard");
    group.throughput(Throughput::Elements(1000));

    group.bench_function("rejected", |b| {
        let guard = SubmitGuard::new(|n: u64| std::future::ready(n))
            .with_cooldown(Duration::from_secs(3600))
            .with_clock(Arc::new(SystemClock::new()));
        // Settles on drop, leaving the guard cooling down
        drop(guard.submit(0));

        b.iter(|| {
            for i in 0..1000 {
                black_box(guard.submit(black_box(i)));
            }
        })
    });

    group.bench_function("accepted_and_settled", |b| {
        let guard = SubmitGuard::new(|n: u64| std::future::ready(n))
            .with_cooldown(Duration::ZERO)
            .with_clock(Arc::new(SystemClock::new()));

        b.iter(|| {
            for i in 0..1000 {
                drop(black_box(guard.submit(black_box(i))));
            }
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_throttler,
    bench_registry_keys,
    bench_registry_concurrent,
    bench_submit_guard
);
criterion_main!(benches);
