//! Micro-benchmarks for timers, the cancellation latch and worker lifecycle.
//!
//! Run with: `cargo bench --package pollwork-bench`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use pollwork_bench::Ticker;
use pollwork_lib::{CancellationLatch, Countdown, MonotonicTimeout, PollingWorker, WallClockTimeout};
use std::hint::black_box;
use std::time::Duration;

fn timer_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("has_timed_out");

    let mut monotonic = MonotonicTimeout::new(Duration::from_secs(60));
    monotonic.start();
    group.bench_function("monotonic", |b| {
        b.iter(|| black_box(&monotonic).has_timed_out());
    });

    let mut wall = WallClockTimeout::new(Duration::from_secs(60));
    wall.start();
    group.bench_function("wall_clock", |b| {
        b.iter(|| black_box(&wall).has_timed_out());
    });

    group.finish();
}

fn latch_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("latch");

    let latch = CancellationLatch::new();
    group.bench_function("is_set", |b| {
        b.iter(|| black_box(&latch).is_set());
    });
    group.bench_function("wait_zero", |b| {
        b.iter(|| black_box(&latch).wait_timeout(Duration::ZERO));
    });

    group.finish();
}

fn lifecycle_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("lifecycle");
    group.sample_size(20);

    for millis in [1_u64, 10] {
        let interval = Duration::from_millis(millis);
        group.bench_with_input(
            BenchmarkId::new("start_stop_join", format!("{millis}ms")),
            &interval,
            |b, interval| {
                let mut worker = PollingWorker::new("bench", *interval, Ticker::default());
                b.iter(|| {
                    if worker.start().is_ok() {
                        worker.stop();
                        let _ = worker.join();
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, timer_benchmark, latch_benchmark, lifecycle_benchmark);
criterion_main!(benches);
