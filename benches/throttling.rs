use call_throttle::infrastructure::mocks::{ManualScheduler, MockClock};
use call_throttle::{Gate, Pause, ThrottleBuilder, Throttled};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn counting_throttle(pause: Duration) -> (Throttled<(), u64, ()>, ManualScheduler) {
    let clock = MockClock::new(Instant::now());
    let scheduler = ManualScheduler::new(clock.clone());
    let sum = Arc::new(AtomicU64::new(0));

    let throttled = ThrottleBuilder::new(move |value: u64| {
        sum.fetch_add(value, Ordering::Relaxed);
    })
    .with_pause(pause)
    .with_clock(Arc::new(clock))
    .with_scheduler(Arc::new(scheduler.clone()))
    .build()
    .expect("valid pause");

    (throttled, scheduler)
}

/// Benchmark the pure gate decision
fn bench_gate_decision(c: &mut Criterion) {
    let mut group = c.benchmark_group("gate");
    let start = Instant::now();
    let mut gate = Gate::new(Pause::from_millis(100));
    gate.stamp(start);

    group.bench_function("inside_window", |b| {
        b.iter(|| gate.decide(black_box(start + Duration::from_millis(20))))
    });
    group.bench_function("outside_window", |b| {
        b.iter(|| gate.decide(black_box(start + Duration::from_millis(200))))
    });

    group.finish();
}

/// Benchmark the call path for each kind of invocation
fn bench_call_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("call");
    group.throughput(Throughput::Elements(1));

    group.bench_function("coalesced", |b| {
        let (throttled, _scheduler) = counting_throttle(Duration::from_secs(3600));
        throttled.call(0);
        throttled.call(1);
        b.iter(|| throttled.call(black_box(2)))
    });

    group.bench_function("immediate", |b| {
        let (throttled, scheduler) = counting_throttle(Duration::ZERO);
        b.iter(|| {
            scheduler.clock().advance(Duration::from_nanos(1));
            throttled.call(black_box(1))
        })
    });

    group.bench_function("defer_and_flush", |b| {
        let (throttled, scheduler) = counting_throttle(Duration::from_millis(1));
        throttled.call(0);
        b.iter(|| {
            throttled.call(black_box(1));
            scheduler.advance(Duration::from_millis(1));
        })
    });

    group.finish();
}

/// Benchmark contention on a single shared throttle
fn bench_concurrent_callers(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent");

    for threads in [2, 4, 8] {
        group.throughput(Throughput::Elements(threads * 1_000));
        group.bench_function(format!("{}_threads", threads), |b| {
            let (throttled, _scheduler) = counting_throttle(Duration::from_secs(3600));
            b.iter(|| {
                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let throttled = throttled.clone();
                        thread::spawn(move || {
                            for i in 0..1_000 {
                                throttled.call(black_box(i));
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_gate_decision,
    bench_call_path,
    bench_concurrent_callers
);
criterion_main!(benches);
