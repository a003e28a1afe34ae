// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use voqsim_engine::test_helpers::start_test;
use voqsim_engine::time::clock::Clock;
use voqsim_engine::types::SimResult;

async fn sample_forever(clock: Clock, samples: Rc<Cell<u64>>) -> SimResult {
    loop {
        clock.wait_or_exit(0.25).await;
        samples.set(samples.get() + 1);
    }
}

#[test]
fn waits_advance_time() {
    let mut engine = start_test(file!());
    let clock = engine.clock();

    engine.spawn(async move {
        clock.wait(2.0).await;
        clock.wait(3.0).await;
        Ok(())
    });

    engine.run().unwrap();
    assert_eq!(engine.time_now_s(), 5.0);
}

#[test]
fn events_fire_in_time_order() {
    let mut engine = start_test(file!());
    let order = Rc::new(RefCell::new(Vec::new()));

    for (label, delay) in [("b", 7.0), ("a", 3.0), ("c", 9.0)] {
        let clock = engine.clock();
        let order = order.clone();
        engine.spawn(async move {
            clock.wait(delay).await;
            order.borrow_mut().push((label, clock.time_now_s()));
            Ok(())
        });
    }

    engine.run().unwrap();
    assert_eq!(
        *order.borrow(),
        vec![("a", 3.0), ("b", 7.0), ("c", 9.0)]
    );
}

#[test]
fn same_time_events_fire_in_schedule_order() {
    let mut engine = start_test(file!());
    let order = Rc::new(RefCell::new(Vec::new()));

    for i in 0..4 {
        let clock = engine.clock();
        let order = order.clone();
        engine.spawn(async move {
            clock.wait(5.0).await;
            order.borrow_mut().push(i);
            Ok(())
        });
    }

    engine.run().unwrap();
    assert_eq!(engine.time_now_s(), 5.0);
    assert_eq!(*order.borrow(), vec![0, 1, 2, 3]);
}

#[test]
fn background_waits_do_not_keep_the_simulation_alive() {
    let mut engine = start_test(file!());
    let samples = Rc::new(Cell::new(0));

    {
        let clock = engine.clock();
        engine.spawn(async move {
            clock.wait(1.0).await;
            Ok(())
        });
    }

    engine.spawn(sample_forever(engine.clock(), samples.clone()));

    engine.run().unwrap();
    assert_eq!(engine.time_now_s(), 1.0);
    assert_eq!(samples.get(), 4);
}

#[test]
fn zero_delay_fires_at_the_current_time() {
    let mut engine = start_test(file!());
    let fired_at = Rc::new(Cell::new(f64::NAN));

    let clock = engine.clock();
    let fired = fired_at.clone();
    engine.spawn(async move {
        clock.wait(1.5).await;
        clock.wait(0.0).await;
        fired.set(clock.time_now_s());
        Ok(())
    });

    engine.run().unwrap();
    assert_eq!(fired_at.get(), 1.5);
}
