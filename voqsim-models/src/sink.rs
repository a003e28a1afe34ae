// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The terminal packet sink.
//!
//! The sink is the sole terminal of the pipeline and always accepts. For
//! every received packet it decomposes the end-to-end latency into fixed
//! (lookup + serialization), contention and queueing components and keeps
//! the ordered sample sequences for later summarization.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use voqsim_engine::engine::Engine;
use voqsim_engine::store::Store;
use voqsim_engine::time::clock::Clock;
use voqsim_engine::traits::{Runnable, TotalBytes};
use voqsim_engine::types::SimResult;
use voqsim_track::entity::Entity;
use voqsim_track::trace;

use crate::config::SwitchConfig;
use crate::packet::Packet;

pub struct PacketSink {
    pub entity: Rc<Entity>,
    config: Rc<SwitchConfig>,
    clock: Clock,

    /// The sink's own unbounded queue; there is no drop policy here.
    store: Store<Packet>,

    packets_rec: Cell<u64>,
    bytes_rec: Cell<f64>,

    /// Total wait of each packet, in arrival order.
    waits: RefCell<Vec<f64>>,

    /// Queueing component of each packet's wait, clamped at zero.
    queue_waits: RefCell<Vec<f64>>,

    /// Contention component of each packet's wait.
    contention_waits: RefCell<Vec<f64>>,

    /// Optionally recorded arrival times.
    rec_arrivals: Cell<bool>,
    absolute_arrivals: Cell<bool>,
    arrivals: RefCell<Vec<f64>>,
    last_arrival: Cell<f64>,
}

impl PacketSink {
    #[must_use]
    pub fn new_and_register(
        engine: &Engine,
        parent: &Rc<Entity>,
        name: &str,
        config: Rc<SwitchConfig>,
        clock: Clock,
    ) -> Rc<Self> {
        let entity = Rc::new(Entity::new(parent, name));
        let store = Store::new(&entity, "queue");
        let rc_self = Rc::new(Self {
            entity,
            config,
            clock,
            store,
            packets_rec: Cell::new(0),
            bytes_rec: Cell::new(0.0),
            waits: RefCell::new(Vec::new()),
            queue_waits: RefCell::new(Vec::new()),
            contention_waits: RefCell::new(Vec::new()),
            rec_arrivals: Cell::new(false),
            absolute_arrivals: Cell::new(false),
            arrivals: RefCell::new(Vec::new()),
            last_arrival: Cell::new(0.0),
        });
        engine.register(rc_self.clone());
        rc_self
    }

    /// Record packet arrival times: absolute times, or the gap between
    /// consecutive arrivals.
    pub fn record_arrivals(&self, absolute: bool) {
        self.rec_arrivals.set(true);
        self.absolute_arrivals.set(absolute);
    }

    /// Hand a packet to the sink. Always accepted.
    pub fn put(&self, packet: Packet) -> SimResult {
        self.store.put(packet)
    }

    #[must_use]
    pub fn packets_rec(&self) -> u64 {
        self.packets_rec.get()
    }

    #[must_use]
    pub fn bytes_rec(&self) -> f64 {
        self.bytes_rec.get()
    }

    #[must_use]
    pub fn waits(&self) -> Vec<f64> {
        self.waits.borrow().clone()
    }

    #[must_use]
    pub fn queue_waits(&self) -> Vec<f64> {
        self.queue_waits.borrow().clone()
    }

    #[must_use]
    pub fn contention_waits(&self) -> Vec<f64> {
        self.contention_waits.borrow().clone()
    }

    #[must_use]
    pub fn arrivals(&self) -> Vec<f64> {
        self.arrivals.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Runnable for PacketSink {
    async fn run(&self) -> SimResult {
        loop {
            let packet = self.store.get().await;
            let now = self.clock.time_now_s();

            self.packets_rec.set(self.packets_rec.get() + 1);
            self.bytes_rec.set(self.bytes_rec.get() + packet.total_bytes());

            let total_wait = now - packet.created_at();
            let serialization = self.config.serialization_delay(packet.total_bytes());
            let fixed = serialization + self.config.lookup_delay();
            let contention = packet.contention_delay();

            self.waits.borrow_mut().push(total_wait);
            self.contention_waits.borrow_mut().push(contention);

            // Accumulated fixed delays can make the raw subtraction dip
            // below zero by a floating-point margin; clamp it.
            let queue_wait = total_wait - fixed - contention;
            self.queue_waits.borrow_mut().push(queue_wait.max(0.0));

            if self.rec_arrivals.get() {
                if self.absolute_arrivals.get() {
                    self.arrivals.borrow_mut().push(now);
                } else {
                    self.arrivals.borrow_mut().push(now - self.last_arrival.get());
                    self.last_arrival.set(now);
                }
            }

            trace!(self.entity ; "{packet}");
        }
    }
}
