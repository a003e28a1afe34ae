// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A periodic throughput sampler for the sink.
//!
//! Every sampling interval the monitor records the number of bytes the sink
//! received since the previous sample. The monitor only observes counters,
//! it never perturbs the pipeline, and its waits are background waits so it
//! never keeps the simulation alive on its own.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use voqsim_engine::engine::Engine;
use voqsim_engine::time::clock::Clock;
use voqsim_engine::traits::Runnable;
use voqsim_engine::types::SimResult;
use voqsim_track::entity::Entity;

use crate::sink::PacketSink;
use crate::stats::mean;

pub struct SinkMonitor {
    pub entity: Rc<Entity>,
    clock: Clock,
    sink: Rc<PacketSink>,

    /// Sampling interval in virtual seconds.
    interval: f64,

    /// Bytes received by the sink within each sampling interval.
    samples: RefCell<Vec<f64>>,

    previous: Cell<f64>,
}

impl SinkMonitor {
    #[must_use]
    pub fn new_and_register(
        engine: &Engine,
        parent: &Rc<Entity>,
        name: &str,
        clock: Clock,
        sink: Rc<PacketSink>,
        interval: f64,
    ) -> Rc<Self> {
        let entity = Rc::new(Entity::new(parent, name));
        let rc_self = Rc::new(Self {
            entity,
            clock,
            sink,
            interval,
            samples: RefCell::new(Vec::new()),
            previous: Cell::new(0.0),
        });
        engine.register(rc_self.clone());
        rc_self
    }

    #[must_use]
    pub fn samples(&self) -> Vec<f64> {
        self.samples.borrow().clone()
    }

    /// Estimated mean throughput in bytes per second.
    #[must_use]
    pub fn mean_throughput(&self) -> f64 {
        mean(&self.samples.borrow()) / self.interval
    }
}

#[async_trait(?Send)]
impl Runnable for SinkMonitor {
    async fn run(&self) -> SimResult {
        loop {
            self.clock.wait_or_exit(self.interval).await;
            let total = self.sink.bytes_rec() - self.previous.get();
            self.samples.borrow_mut().push(total);
            self.previous.set(self.sink.bytes_rec());
        }
    }
}
