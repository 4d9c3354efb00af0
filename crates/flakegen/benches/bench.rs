use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use flakegen::{
    CacheStore, ClockSource, DEFAULT_EPOCH, Generator, GeneratorConfig, LockGenerator,
    MemoryCache, MemoryStore, Poll, SystemClock, TimestampStore,
};
use std::{
    sync::{Arc, Barrier},
    thread::scope,
    time::Instant,
};
use tokio::runtime::Builder;

#[derive(Clone, Copy)]
struct FixedMockTime {
    millis: u64,
}

impl ClockSource for FixedMockTime {
    fn now(&self) -> u64 {
        self.millis
    }
}

const FIXED: FixedMockTime = FixedMockTime {
    millis: DEFAULT_EPOCH + 1,
};

// Number of IDs generated per benchmark iteration (per-thread for
// multi-threaded). Matches one millisecond's worth of 12-bit sequence.
const TOTAL_IDS: usize = 4096;

/// Benchmarks the hot path where every poll is `Ready`.
fn bench_generator<S, C>(
    c: &mut Criterion,
    group_name: &str,
    generator_factory: impl Fn() -> Generator<S, C>,
) where
    S: TimestampStore,
    C: ClockSource,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{}", TOTAL_IDS), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let mut generator = generator_factory();
                for _ in 0..TOTAL_IDS {
                    match generator.try_poll_id().unwrap() {
                        Poll::Ready { id } => {
                            black_box(id);
                        }
                        Poll::Pending { .. } => unreachable!(),
                    }
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks a generator on the wall clock, blocking whenever a millisecond
/// runs out of sequence numbers.
fn bench_generator_blocking<S, C>(
    c: &mut Criterion,
    group_name: &str,
    generator_factory: impl Fn() -> Generator<S, C>,
) where
    S: TimestampStore,
    C: ClockSource,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{}", TOTAL_IDS), |b| {
        b.iter_custom(|iters| {
            let mut generator = generator_factory();
            let start = Instant::now();

            for _ in 0..iters {
                for _ in 0..TOTAL_IDS {
                    black_box(generator.next_id().unwrap());
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks one lock-shared generator across threads.
fn bench_generator_contended<S, C>(
    c: &mut Criterion,
    group_name: &str,
    generator_fn: impl Fn() -> LockGenerator<S, C>,
) where
    S: TimestampStore + Send,
    C: ClockSource + Send,
{
    let mut group = c.benchmark_group(group_name);

    for thread_count in [1, 2, 4, 8, 16] {
        let ids_per_thread = TOTAL_IDS / thread_count;

        group.throughput(Throughput::Elements(TOTAL_IDS as u64));
        group.bench_function(
            format!("elems/{}/threads/{}", TOTAL_IDS, thread_count),
            |b| {
                b.iter_custom(|iters| {
                    let start = Instant::now();

                    for _ in 0..iters {
                        let generator = generator_fn();
                        let barrier = Arc::new(Barrier::new(thread_count + 1));
                        scope(|s| {
                            for _ in 0..thread_count {
                                let generator = generator.clone();
                                let barrier = Arc::clone(&barrier);
                                s.spawn(move || {
                                    barrier.wait();
                                    for _ in 0..ids_per_thread {
                                        black_box(generator.next_id().unwrap());
                                    }
                                });
                            }
                            barrier.wait();
                        });
                    }

                    start.elapsed()
                });
            },
        );
    }

    group.finish();
}

/// Benchmarks a single async generator on one Tokio thread.
fn bench_generator_sequential_async_tokio(c: &mut Criterion, group_name: &str) {
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{}", TOTAL_IDS), |b| {
        let rt = Builder::new_multi_thread()
            .enable_all()
            .worker_threads(1)
            .build()
            .unwrap();

        b.to_async(&rt).iter_custom(|iters| async move {
            let mut generator = Generator::new(0).unwrap();
            let start = Instant::now();

            for _ in 0..iters {
                for _ in 0..TOTAL_IDS {
                    black_box(generator.next_id_async().await.unwrap());
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

fn benchmark_mock_sequential_memory(c: &mut Criterion) {
    bench_generator(c, "mock/sequential/memory", || {
        Generator::from_config(&GeneratorConfig::new(0), MemoryStore::new(), FIXED).unwrap()
    });
}

/// Every call goes through a key lookup, a string parse and a write with
/// expiry.
fn benchmark_mock_sequential_cache(c: &mut Criterion) {
    bench_generator(c, "mock/sequential/cache", || {
        let config = GeneratorConfig::new(0).with_datacenter_id(0);
        Generator::from_config(&config, config.cache_store(MemoryCache::new()), FIXED).unwrap()
    });
}

fn benchmark_mock_contended_lock(c: &mut Criterion) {
    bench_generator_contended(c, "mock/contended/lock", || {
        LockGenerator::new(
            Generator::from_config(&GeneratorConfig::new(0), MemoryStore::new(), FIXED).unwrap(),
        )
    });
}

fn benchmark_system_sequential_memory(c: &mut Criterion) {
    bench_generator_blocking(c, "system/sequential/memory", || {
        Generator::new(0).unwrap()
    });
}

fn benchmark_system_sequential_cache(c: &mut Criterion) {
    bench_generator_blocking(c, "system/sequential/cache", || {
        Generator::from_config(
            &GeneratorConfig::new(0),
            CacheStore::new(MemoryCache::new()),
            SystemClock::new(),
        )
        .unwrap()
    });
}

fn benchmark_system_contended_lock(c: &mut Criterion) {
    bench_generator_contended(c, "system/contended/lock", || {
        LockGenerator::new(Generator::new(0).unwrap())
    });
}

fn benchmark_system_sequential_tokio(c: &mut Criterion) {
    bench_generator_sequential_async_tokio(c, "system/sequential/async/tokio");
}

criterion_group!(
    benches,
    // Mock clock
    benchmark_mock_sequential_memory,
    benchmark_mock_sequential_cache,
    benchmark_mock_contended_lock,
    // System clock (blocking on rollover)
    benchmark_system_sequential_memory,
    benchmark_system_sequential_cache,
    benchmark_system_contended_lock,
    // Async
    benchmark_system_sequential_tokio,
);
criterion_main!(benches);
