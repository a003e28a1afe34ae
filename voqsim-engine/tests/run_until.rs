// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::cell::Cell;
use std::rc::Rc;

use voqsim_engine::events::once::Once;
use voqsim_engine::test_helpers::start_test;
use voqsim_engine::time::clock::Clock;
use voqsim_engine::traits::Event;
use voqsim_engine::types::SimResult;

async fn count_seconds(clock: Clock, iterations: Rc<Cell<u64>>) -> SimResult {
    loop {
        clock.wait(1.0).await;
        iterations.set(iterations.get() + 1);
    }
}

fn create_once_event_at_delay(
    engine: &mut voqsim_engine::engine::Engine,
    delay_s: f64,
) -> Box<Once<()>> {
    let once = Once::default();
    let clock = engine.clock();
    let spawn_once = once.clone();
    engine.spawn(async move {
        clock.wait(delay_s).await;
        spawn_once.notify()
    });
    Box::new(once)
}

fn spawn_activity(engine: &mut voqsim_engine::engine::Engine) {
    let clock = engine.clock();
    engine.spawn(async move {
        clock.wait(100.0).await;
        Ok(())
    });
}

#[test]
fn run_until_once() {
    let mut engine = start_test(file!());

    let once = create_once_event_at_delay(&mut engine, 5.0);

    spawn_activity(&mut engine);
    engine.run_until(once).unwrap();

    assert_eq!(engine.time_now_s(), 5.0);
}

#[test]
fn run_for_abandons_suspended_processes() {
    let mut engine = start_test(file!());
    let iterations = Rc::new(Cell::new(0u64));

    engine.spawn(count_seconds(engine.clock(), iterations.clone()));

    engine.run_for(50.0).unwrap();

    // The horizon event was scheduled before the looping process reached
    // t=50, so the loop's final resumption is abandoned.
    assert_eq!(engine.time_now_s(), 50.0);
    assert_eq!(iterations.get(), 49);
}

#[test]
fn run_for_with_no_activity_stops_at_the_horizon() {
    let mut engine = start_test(file!());
    engine.run_for(10.0).unwrap();
    assert_eq!(engine.time_now_s(), 10.0);
}

#[test]
fn once_listeners_resume_when_notified() {
    let mut engine = start_test(file!());
    let resumed_at = Rc::new(Cell::new(f64::NAN));

    let once = Once::default();
    {
        let once = once.clone();
        let clock = engine.clock();
        let resumed_at = resumed_at.clone();
        engine.spawn(async move {
            once.listen().await;
            resumed_at.set(clock.time_now_s());
            Ok(())
        });
    }

    {
        let once = once.clone();
        let clock = engine.clock();
        engine.spawn(async move {
            clock.wait(2.5).await;
            once.notify()
        });
    }

    engine.run().unwrap();
    assert!(once.triggered());
    assert_eq!(resumed_at.get(), 2.5);
}

#[test]
fn once_cannot_be_notified_twice() {
    let once: Once<()> = Once::default();
    once.notify().unwrap();
    assert!(once.notify().is_err());
}
