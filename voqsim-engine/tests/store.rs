// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::cell::RefCell;
use std::rc::Rc;

use voqsim_engine::store::Store;
use voqsim_engine::test_helpers::start_test;

#[test]
fn get_preserves_fifo_order() {
    let mut engine = start_test(file!());
    let store: Rc<Store<i32>> = Rc::new(Store::new(engine.top(), "store"));
    let seen = Rc::new(RefCell::new(Vec::new()));

    store.put(11).unwrap();
    store.put(22).unwrap();
    store.put(33).unwrap();
    assert_eq!(store.len(), 3);

    {
        let store = store.clone();
        let seen = seen.clone();
        engine.spawn(async move {
            for _ in 0..3 {
                seen.borrow_mut().push(store.get().await);
            }
            Ok(())
        });
    }

    engine.run().unwrap();
    assert_eq!(*seen.borrow(), vec![11, 22, 33]);
    assert!(store.is_empty());
}

#[test]
fn get_waits_for_the_next_put() {
    let mut engine = start_test(file!());
    let store: Rc<Store<i32>> = Rc::new(Store::new(engine.top(), "store"));
    let got_at = Rc::new(RefCell::new(Vec::new()));

    {
        let store = store.clone();
        let clock = engine.clock();
        engine.spawn(async move {
            clock.wait(2.0).await;
            store.put(1)?;
            clock.wait(3.0).await;
            store.put(2)?;
            Ok(())
        });
    }

    {
        let store = store.clone();
        let clock = engine.clock();
        let got_at = got_at.clone();
        engine.spawn(async move {
            for _ in 0..2 {
                let value = store.get().await;
                got_at.borrow_mut().push((value, clock.time_now_s()));
            }
            Ok(())
        });
    }

    engine.run().unwrap();
    assert_eq!(*got_at.borrow(), vec![(1, 2.0), (2, 5.0)]);
}
