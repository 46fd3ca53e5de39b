// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Sampling Integration Tests
//!
//! - `test_period_*`: shared timer period across registry changes
//! - `test_lifecycle_*`: idle/active transitions and idempotent stop
//! - `test_dispatch_*`: per-tick dispatch, failure isolation, re-entrancy

use std::sync::Arc;
use std::time::Duration;

use simdata_core::{Value, VariableId};
use simdata_sampling::{SamplingScheduler, SchedulerState, MIN_SAMPLING_PERIOD};

use simdata_tests::prelude::*;

fn handle(n: u32) -> simdata_core::MonitoredItemId {
    VariableFixtures::handle(n)
}

fn var(name: &str) -> VariableId {
    VariableId::new(name)
}

fn setup() -> (SamplingScheduler, Arc<CountingGenerator>, Arc<MockSink>) {
    init_test_logging();
    let generator = CountingGenerator::new();
    let sink = MockSink::new();
    let scheduler = ComponentFixtures::scheduler(generator.clone(), sink.clone());
    (scheduler, generator, sink)
}

// =============================================================================
// Period Tests
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_period_follows_fastest_interval() {
    // Start(1, 500), Start(2, 200) -> 200; Stop(2) -> 500.
    let (scheduler, _, _) = setup();

    scheduler.start_monitoring(handle(1), ms(500), var("a"));
    scheduler.start_monitoring(handle(2), ms(200), var("b"));
    assert_eq!(scheduler.effective_period(), Some(ms(200)));

    scheduler.stop_monitoring(handle(2));
    assert_eq!(scheduler.effective_period(), Some(ms(500)));
}

#[tokio::test(start_paused = true)]
async fn test_period_clamped_to_floor() {
    let (scheduler, _, _) = setup();

    scheduler.start_monitoring(handle(1), ms(10), var("a"));
    assert_eq!(scheduler.effective_period(), Some(MIN_SAMPLING_PERIOD));
    assert_eq!(scheduler.effective_period(), Some(ms(100)));
}

#[tokio::test(start_paused = true)]
async fn test_period_is_max_of_floor_and_minimum() {
    let (scheduler, _, _) = setup();

    let sets: [&[u64]; 5] = [
        &[1000],
        &[300, 700, 5000],
        &[99, 101],
        &[250, 250, 250],
        &[0, 40, 2000],
    ];

    for intervals in sets {
        for (n, interval) in intervals.iter().enumerate() {
            scheduler.start_monitoring(handle(n as u32), ms(*interval), var("v"));
        }

        let expected = intervals.iter().copied().min().map(|m| ms(m.max(100)));
        assert_eq!(scheduler.effective_period(), expected, "intervals {:?}", intervals);

        for n in 0..intervals.len() {
            scheduler.stop_monitoring(handle(n as u32));
        }
        assert_eq!(scheduler.effective_period(), None);
    }
}

#[tokio::test(start_paused = true)]
async fn test_period_unchanged_when_slower_entry_removed() {
    let (scheduler, _, _) = setup();

    scheduler.start_monitoring(handle(1), ms(150), var("fast"));
    scheduler.start_monitoring(handle(2), ms(600), var("mid"));
    scheduler.start_monitoring(handle(3), ms(900), var("slow"));
    let rearms = scheduler.stats().timer_rearms;

    scheduler.stop_monitoring(handle(3));
    scheduler.stop_monitoring(handle(2));

    assert_eq!(scheduler.effective_period(), Some(ms(150)));
    assert_eq!(scheduler.stats().timer_rearms, rearms);
}

#[tokio::test(start_paused = true)]
async fn test_period_modify_same_handle() {
    let (scheduler, _, _) = setup();

    scheduler.start_monitoring(handle(1), ms(1000), var("a"));
    scheduler.start_monitoring(handle(2), ms(300), var("b"));

    // Modify handle 2 to a slower interval; handle 1 now governs.
    scheduler.start_monitoring(handle(2), ms(2000), var("b"));
    assert_eq!(scheduler.monitored_count(), 2);
    assert_eq!(scheduler.effective_period(), Some(ms(1000)));
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_lifecycle_idle_active_idle() {
    let (scheduler, _, _) = setup();
    assert_eq!(scheduler.state(), SchedulerState::Idle);
    assert_eq!(scheduler.effective_period(), None);

    scheduler.start_monitoring(handle(1), ms(200), var("a"));
    assert_eq!(scheduler.state(), SchedulerState::Active);

    scheduler.start_monitoring(handle(2), ms(400), var("b"));
    scheduler.stop_monitoring(handle(1));
    assert_eq!(scheduler.state(), SchedulerState::Active);

    scheduler.stop_monitoring(handle(2));
    assert_eq!(scheduler.state(), SchedulerState::Idle);
    assert_eq!(scheduler.effective_period(), None);
}

#[tokio::test(start_paused = true)]
async fn test_lifecycle_stop_unknown_handle_is_noop() {
    let (scheduler, _, _) = setup();

    assert!(!scheduler.stop_monitoring(handle(42)));
    assert_eq!(scheduler.state(), SchedulerState::Idle);

    scheduler.start_monitoring(handle(1), ms(300), var("a"));
    let before = scheduler.stats();

    assert!(!scheduler.stop_monitoring(handle(42)));
    assert_eq!(scheduler.monitored_count(), 1);
    assert_eq!(scheduler.effective_period(), Some(ms(300)));
    assert_eq!(scheduler.stats().timer_rearms, before.timer_rearms);
}

#[tokio::test(start_paused = true)]
async fn test_lifecycle_no_samples_after_idle() {
    let (scheduler, _, sink) = setup();

    scheduler.start_monitoring(handle(1), ms(100), var("a"));
    tokio::time::sleep(ms(350)).await;
    scheduler.stop_monitoring(handle(1));

    let count = sink.count();
    assert!(count >= 3);

    tokio::time::sleep(ms(1000)).await;
    assert_eq!(sink.count(), count);
}

// =============================================================================
// Dispatch Tests
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_dispatch_every_entry_each_tick() {
    let (scheduler, _, sink) = setup();

    for n in 0..5 {
        scheduler.start_monitoring(handle(n), ms(200), var(&format!("v{}", n)));
    }

    // Ticks at 0, 200, 400.
    tokio::time::sleep(ms(450)).await;

    for n in 0..5 {
        assert_eq!(sink.count_for(&format!("v{}", n)), 3);
    }
}

#[tokio::test(start_paused = true)]
async fn test_dispatch_single_variable_in_order() {
    let (scheduler, _, sink) = setup();

    scheduler.start_monitoring(handle(1), ms(100), var("counter"));
    tokio::time::sleep(ms(950)).await;

    let values: Vec<i32> = sink
        .samples_for("counter")
        .iter()
        .filter_map(|s| s.value.as_i32())
        .collect();
    assert!(values.len() >= 9);
    assert!(values.windows(2).all(|w| w[0] < w[1]), "values {:?}", values);
}

#[tokio::test(start_paused = true)]
async fn test_dispatch_generator_panic_isolated() {
    let (scheduler, generator, sink) = setup();
    generator.panic_on("bad");

    scheduler.start_monitoring(handle(1), ms(100), var("good"));
    scheduler.start_monitoring(handle(2), ms(100), var("bad"));
    scheduler.start_monitoring(handle(3), ms(100), var("also-good"));

    tokio::time::sleep(ms(350)).await;

    assert!(sink.count_for("good") >= 3);
    assert!(sink.count_for("also-good") >= 3);
    assert_eq!(sink.count_for("bad"), 0);
    assert!(scheduler.stats().generator_failures >= 3);

    // Timer survives and the recovered variable flows again.
    generator.recover(&var("bad"));
    tokio::time::sleep(ms(200)).await;
    assert!(sink.count_for("bad") >= 1);
}

#[tokio::test(start_paused = true)]
async fn test_dispatch_sink_failures_isolated() {
    let (scheduler, _, sink) = setup();
    sink.reject("rejected");
    sink.panic_on("panicking");

    scheduler.start_monitoring(handle(1), ms(100), var("rejected"));
    scheduler.start_monitoring(handle(2), ms(100), var("panicking"));
    scheduler.start_monitoring(handle(3), ms(100), var("fine"));

    let report = scheduler.sample_now().await;
    assert_eq!(report.entries, 3);
    assert_eq!(report.sink_failures, 2);
    assert!(!report.is_clean());

    tokio::time::sleep(ms(350)).await;
    assert!(sink.count_for("fine") >= 4);
    assert!(sink.failures() >= 8);
    assert_eq!(scheduler.state(), SchedulerState::Active);
}

#[tokio::test(start_paused = true)]
async fn test_dispatch_reentrant_stop() {
    init_test_logging();
    let sink = ReentrantSink::new("trigger", ReentrantAction::Stop(handle(1)));
    let scheduler = Arc::new(ComponentFixtures::scheduler(CountingGenerator::new(), sink.clone()));
    sink.attach(&scheduler);

    scheduler.start_monitoring(handle(1), ms(100), var("trigger"));
    scheduler.start_monitoring(handle(2), ms(100), var("other"));

    tokio::time::timeout(Duration::from_secs(5), tokio::time::sleep(ms(500)))
        .await
        .expect("no deadlock");

    assert!(sink.fired());
    assert!(!scheduler.contains(handle(1)));
    assert!(scheduler.contains(handle(2)));
    assert!(sink.seen() >= 5);
}

#[tokio::test(start_paused = true)]
async fn test_dispatch_reentrant_start() {
    init_test_logging();
    let sink = ReentrantSink::new(
        "trigger",
        ReentrantAction::Start(handle(9), ms(100), var("spawned")),
    );
    let scheduler = Arc::new(ComponentFixtures::scheduler(CountingGenerator::new(), sink.clone()));
    sink.attach(&scheduler);

    scheduler.start_monitoring(handle(1), ms(1000), var("trigger"));
    tokio::time::sleep(ms(50)).await;

    assert!(sink.fired());
    assert_eq!(scheduler.monitored_count(), 2);
    assert_eq!(scheduler.effective_period(), Some(ms(100)));
}

#[tokio::test(start_paused = true)]
async fn test_dispatch_strategy_table_values() {
    init_test_logging();
    let sink = MockSink::new();
    let scheduler = ComponentFixtures::scheduler(Arc::new(VariableFixtures::table()), sink.clone());

    scheduler.start_monitoring(handle(1), ms(100), VariableFixtures::double());
    scheduler.start_monitoring(handle(2), ms(100), VariableFixtures::byte_array());
    scheduler.start_monitoring(handle(3), ms(100), var("ns=2;s=Unknown"));

    scheduler.sample_now().await;

    let double = sink.samples_for("ns=2;s=Scalar.Double");
    let v = double[0].value.as_f64().unwrap();
    assert!((-10.0..=10.0).contains(&v));

    let array = sink.samples_for("ns=2;s=Array.Byte");
    assert_eq!(array[0].value.as_array().map(|a| a.len()), Some(8));

    let unknown = sink.samples_for("ns=2;s=Unknown");
    assert_eq!(unknown[0].value, Value::Null);
    assert!(unknown[0].status.is_good());
}

#[tokio::test(start_paused = true)]
async fn test_dispatch_drop_releases_timer() {
    let (scheduler, generator, _) = setup();

    scheduler.start_monitoring(handle(1), ms(100), var("a"));
    tokio::time::sleep(ms(250)).await;
    drop(scheduler);

    let calls = generator.calls();
    tokio::time::sleep(ms(1000)).await;
    assert_eq!(generator.calls(), calls);
}

#[tokio::test(start_paused = true)]
async fn test_dispatch_many_entries() {
    let (scheduler, _, sink) = setup();

    let variables = VariableFixtures::batch(200);
    for (n, variable) in variables.iter().enumerate() {
        scheduler.start_monitoring(handle(n as u32), ms(100 + n as u64), variable.clone());
    }
    assert_eq!(scheduler.effective_period(), Some(ms(100)));

    tokio::time::sleep(ms(50)).await;
    assert_eq!(sink.count(), 200);
}
