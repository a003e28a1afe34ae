// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::cell::RefCell;
use std::rc::Rc;

use voqsim_engine::resource::Resource;
use voqsim_engine::test_helpers::start_test;

#[test]
fn holder_excludes_later_requesters() {
    let mut engine = start_test(file!());
    let resource = Rc::new(Resource::new(engine.top(), "tx"));
    let granted_at = Rc::new(RefCell::new(Vec::new()));

    for i in 0..2 {
        let resource = resource.clone();
        let clock = engine.clock();
        let granted_at = granted_at.clone();
        engine.spawn(async move {
            let guard = resource.request().await;
            granted_at.borrow_mut().push((i, clock.time_now_s()));
            clock.wait(3.0).await;
            drop(guard);
            Ok(())
        });
    }

    engine.run().unwrap();
    assert_eq!(*granted_at.borrow(), vec![(0, 0.0), (1, 3.0)]);
    assert!(!resource.is_occupied());
    assert_eq!(resource.num_waiting(), 0);
}

#[test]
fn waiters_are_granted_in_fifo_order() {
    let mut engine = start_test(file!());
    let resource = Rc::new(Resource::new(engine.top(), "tx"));
    let grant_order = Rc::new(RefCell::new(Vec::new()));

    for i in 0..4 {
        let resource = resource.clone();
        let clock = engine.clock();
        let grant_order = grant_order.clone();
        engine.spawn(async move {
            let _guard = resource.request().await;
            grant_order.borrow_mut().push(i);
            clock.wait(1.0).await;
            Ok(())
        });
    }

    engine.run().unwrap();
    assert_eq!(*grant_order.borrow(), vec![0, 1, 2, 3]);
    assert_eq!(engine.time_now_s(), 4.0);
}

#[test]
fn guard_is_released_when_a_process_completes() {
    let mut engine = start_test(file!());
    let resource = Rc::new(Resource::new(engine.top(), "tx"));

    {
        let resource = resource.clone();
        let clock = engine.clock();
        engine.spawn(async move {
            let _guard = resource.request().await;
            clock.wait(1.0).await;
            // Guard dropped here, without an explicit release
            Ok(())
        });
    }

    engine.run().unwrap();
    assert!(!resource.is_occupied());
}
