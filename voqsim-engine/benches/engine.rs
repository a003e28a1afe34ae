// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use criterion::{Criterion, criterion_group, criterion_main};
use voqsim_engine::engine::Engine;
use voqsim_engine::store::Store;
use voqsim_track::tracker::dev_null_tracker;

fn timed_waits(c: &mut Criterion) {
    c.bench_function("run_1k_timed_waits", |b| {
        b.iter(|| {
            let mut engine = Engine::new(&dev_null_tracker());
            for i in 0..1000u64 {
                let clock = engine.clock();
                engine.spawn(async move {
                    clock.wait((i % 10) as f64 * 0.001).await;
                    Ok(())
                });
            }
            engine.run().unwrap();
        })
    });
}

fn store_handoff(c: &mut Criterion) {
    c.bench_function("store_1k_handoffs", |b| {
        b.iter(|| {
            let mut engine = Engine::new(&dev_null_tracker());
            let store: std::rc::Rc<Store<usize>> =
                std::rc::Rc::new(Store::new(engine.top(), "store"));

            {
                let store = store.clone();
                let clock = engine.clock();
                engine.spawn(async move {
                    for i in 0..1000 {
                        clock.wait(0.001).await;
                        store.put(i)?;
                    }
                    Ok(())
                });
            }

            {
                let store = store.clone();
                engine.spawn(async move {
                    for _ in 0..1000 {
                        store.get().await;
                    }
                    Ok(())
                });
            }

            engine.run().unwrap();
        })
    });
}

criterion_group!(benches, timed_waits, store_handoff);
criterion_main!(benches);
