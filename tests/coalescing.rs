//! Deterministic coalescing properties, driven by a manual scheduler.

use call_throttle::infrastructure::mocks::{ManualScheduler, MockClock};
use call_throttle::{Clock, Invocation, ThrottleBuilder, Throttled};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

type Runs = Arc<Mutex<Vec<(u32, Instant)>>>;

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn setup(pause_ms: u64) -> (Throttled<(), u32, ()>, ManualScheduler, Runs) {
    let clock = MockClock::new(Instant::now());
    let scheduler = ManualScheduler::new(clock.clone());
    let runs: Runs = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&runs);
    let target_clock = clock.clone();
    let throttled = ThrottleBuilder::new(move |value: u32| {
        sink.lock().unwrap().push((value, target_clock.now()));
    })
    .with_pause(ms(pause_ms))
    .with_clock(Arc::new(clock))
    .with_scheduler(Arc::new(scheduler.clone()))
    .build()
    .unwrap();

    (throttled, scheduler, runs)
}

fn values(runs: &Runs) -> Vec<u32> {
    runs.lock().unwrap().iter().map(|(value, _)| *value).collect()
}

#[test]
fn test_additional_calls_never_arm_second_timer() {
    let (throttled, scheduler, _runs) = setup(100);
    let start = scheduler.clock().now();

    throttled.call(0);
    scheduler.clock().advance(ms(10));
    assert_eq!(throttled.call(1), Invocation::Deferred);
    let due = scheduler.next_due();
    assert_eq!(due, Some(start + ms(100)));

    for value in 2..50 {
        scheduler.clock().advance(ms(1));
        assert_eq!(throttled.call(value), Invocation::Coalesced);
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.next_due(), due);
    }
}

#[test]
fn test_pending_call_at_fire_time_is_delivered() {
    let (throttled, scheduler, runs) = setup(100);

    throttled.call(0);
    for value in 1..=5 {
        scheduler.clock().advance(ms(15));
        throttled.call(value);
    }
    scheduler.advance(ms(100));

    assert_eq!(values(&runs), vec![0, 5]);
}

#[test]
fn test_executions_spaced_by_at_least_pause() {
    let (throttled, scheduler, runs) = setup(50);

    // Calls every 30ms for 600ms
    for value in 0..20 {
        throttled.call(value);
        scheduler.advance(ms(30));
    }
    scheduler.advance(ms(100));

    let instants: Vec<Instant> = runs.lock().unwrap().iter().map(|(_, at)| *at).collect();
    assert!(instants.len() > 2);
    for pair in instants.windows(2) {
        assert!(pair[1] >= pair[0]);
        assert_eq!(pair[1] - pair[0], ms(50));
    }
}

#[test]
fn test_exact_boundary_is_deferred_not_immediate() {
    let (throttled, scheduler, runs) = setup(100);

    throttled.call(1);
    scheduler.clock().advance(ms(100));

    assert_eq!(throttled.call(2), Invocation::Deferred);
    assert_eq!(values(&runs), vec![1]);
    assert_eq!(scheduler.next_due(), Some(scheduler.clock().now()));

    assert_eq!(scheduler.run_due(), 1);
    assert_eq!(values(&runs), vec![1, 2]);
}

#[test]
fn test_just_past_boundary_is_immediate() {
    let (throttled, scheduler, runs) = setup(100);

    throttled.call(1);
    scheduler.clock().advance(ms(100) + Duration::from_nanos(1));

    assert_eq!(throttled.call(2), Invocation::Immediate(()));
    assert_eq!(values(&runs), vec![1, 2]);
    assert_eq!(scheduler.pending(), 0);
}

#[test]
fn test_zero_pause_runs_every_distinct_instant() {
    let (throttled, scheduler, runs) = setup(0);

    assert!(throttled.call(1).is_immediate());
    // Same instant: flushed on the next turn with zero delay
    assert!(throttled.call(2).is_deferred());
    assert_eq!(scheduler.run_due(), 1);

    scheduler.clock().advance(Duration::from_nanos(1));
    assert!(throttled.call(3).is_immediate());
    assert_eq!(values(&runs), vec![1, 2, 3]);
}

#[test]
fn test_state_machine_cycles_idle_and_armed() {
    let (throttled, scheduler, runs) = setup(100);

    for cycle in 0..3u32 {
        let base = cycle * 10;
        // Idle: outside the window
        scheduler.advance(ms(200));
        assert!(!throttled.is_armed());
        assert!(throttled.call(base).is_immediate());

        // Idle -> Armed
        assert!(throttled.call(base + 1).is_deferred());
        assert!(throttled.is_armed());

        // Armed -> Armed
        assert!(throttled.call(base + 2).is_coalesced());
        assert!(throttled.is_armed());

        // Armed -> Idle
        scheduler.advance(ms(100));
        assert!(!throttled.is_armed());
    }

    assert_eq!(values(&runs), vec![0, 2, 10, 12, 20, 22]);
}

#[test]
fn test_concurrent_callers_share_one_window() {
    let (throttled, scheduler, runs) = setup(100);
    let mut handles = vec![];

    for worker in 0..8u32 {
        let throttled = throttled.clone();
        handles.push(thread::spawn(move || {
            for i in 0..1_000 {
                throttled.call(worker * 1_000 + i);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // The clock never moved, so every call landed in the first window
    let snapshot = throttled.metrics().snapshot();
    assert_eq!(snapshot.total_calls(), 8_000);
    assert_eq!(snapshot.immediate_runs, 1);
    assert_eq!(snapshot.deferred_calls, 1);
    assert_eq!(snapshot.coalesced_calls, 7_998);
    assert_eq!(scheduler.pending(), 1);

    scheduler.advance(ms(100));
    assert_eq!(runs.lock().unwrap().len(), 2);
    assert_eq!(throttled.metrics().trailing_runs(), 1);
}

#[test]
fn test_late_timer_coalesces_instead_of_running_early() {
    let (throttled, scheduler, runs) = setup(100);
    let start = scheduler.clock().now();

    throttled.call(0);
    scheduler.clock().advance(ms(10));
    assert_eq!(throttled.call(1), Invocation::Deferred);

    // Past the due time, but the timer has not fired yet
    scheduler.clock().advance(ms(95));
    assert_eq!(throttled.call(2), Invocation::Coalesced);
    assert!(throttled.is_armed());
    assert_eq!(values(&runs), vec![0]);

    assert_eq!(scheduler.run_due(), 1);
    assert_eq!(
        *runs.lock().unwrap(),
        vec![(0, start), (2, start + ms(105))]
    );
    assert!(!throttled.is_armed());

    // The late flush opens the next window
    scheduler.clock().advance(ms(50));
    assert!(throttled.call(3).is_deferred());
    assert_eq!(scheduler.next_due(), Some(start + ms(205)));
}

#[test]
fn test_late_timer_keeps_executions_spaced() {
    let (throttled, scheduler, runs) = setup(50);

    // Every timer fires 20ms late while calls keep arriving every 30ms
    for value in 0..30 {
        throttled.call(value);
        scheduler.clock().advance(ms(30));
        if scheduler
            .next_due()
            .is_some_and(|due| due + ms(20) <= scheduler.clock().now())
        {
            scheduler.run_due();
        }
    }
    scheduler.advance(ms(200));

    let recorded = runs.lock().unwrap().clone();
    assert!(recorded.len() > 2);
    for pair in recorded.windows(2) {
        assert!(pair[1].1 - pair[0].1 >= ms(50));
    }
    assert_eq!(recorded.last().map(|(value, _)| *value), Some(29));
}
