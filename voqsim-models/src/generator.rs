// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A packet generator.
//!
//! While active, the generator waits a deterministic inter-arrival interval,
//! creates a packet with a uniformly-random destination and hands it to its
//! lookup port. The `put` is fire-and-forget: the generator is never blocked
//! by a full port, the port's drop policy decides what happens next.
//!
//! The destination RNG is seeded from the configuration seed and the input
//! index, so that a fixed seed reproduces the exact same run.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use rand::SeedableRng;
use rand::seq::IteratorRandom;
use rand_xoshiro::Xoshiro256PlusPlus;
use voqsim_engine::engine::Engine;
use voqsim_engine::take_option;
use voqsim_engine::time::clock::Clock;
use voqsim_engine::traits::Runnable;
use voqsim_engine::types::SimResult;
use voqsim_track::entity::Entity;

use crate::config::SwitchConfig;
use crate::lookup::LookupPort;
use crate::packet::Packet;

pub struct PacketGenerator {
    pub entity: Rc<Entity>,
    config: Rc<SwitchConfig>,
    clock: Clock,

    /// Index of the input port this generator feeds.
    input_index: usize,

    /// Inactive generators exist but never produce a packet.
    active: bool,

    /// Generation starts after this delay.
    initial_delay: Cell<f64>,

    /// Stop generating at this time. `None` runs until the horizon.
    finish: Cell<Option<f64>>,

    flow_id: Cell<u64>,

    rng: RefCell<Xoshiro256PlusPlus>,
    out: RefCell<Option<Rc<LookupPort>>>,

    packets_sent: Cell<u64>,
    bytes_sent: Cell<f64>,
}

impl PacketGenerator {
    #[must_use]
    pub fn new_and_register(
        engine: &Engine,
        parent: &Rc<Entity>,
        name: &str,
        config: Rc<SwitchConfig>,
        clock: Clock,
        input_index: usize,
        active: bool,
    ) -> Rc<Self> {
        let entity = Rc::new(Entity::new(parent, name));
        // A local RNG which is different per input port
        let rng = Xoshiro256PlusPlus::seed_from_u64(config.seed() ^ (input_index as u64));
        let rc_self = Rc::new(Self {
            entity,
            config,
            clock,
            input_index,
            active,
            initial_delay: Cell::new(0.0),
            finish: Cell::new(None),
            flow_id: Cell::new(0),
            rng: RefCell::new(rng),
            out: RefCell::new(None),
            packets_sent: Cell::new(0),
            bytes_sent: Cell::new(0.0),
        });
        engine.register(rc_self.clone());
        rc_self
    }

    /// Connect the generator to the lookup port of its input.
    pub fn connect_out(&self, port: Rc<LookupPort>) {
        let mut out = self.out.borrow_mut();
        match *out {
            Some(_) => panic!("{}: out already connected", self.entity),
            None => *out = Some(port),
        }
    }

    pub fn set_initial_delay(&self, initial_delay: f64) {
        self.initial_delay.set(initial_delay);
    }

    pub fn set_finish(&self, finish: f64) {
        self.finish.set(Some(finish));
    }

    pub fn set_flow_id(&self, flow_id: u64) {
        self.flow_id.set(flow_id);
    }

    #[must_use]
    pub fn packets_sent(&self) -> u64 {
        self.packets_sent.get()
    }

    #[must_use]
    pub fn bytes_sent(&self) -> f64 {
        self.bytes_sent.get()
    }
}

#[async_trait(?Send)]
impl Runnable for PacketGenerator {
    async fn run(&self) -> SimResult {
        if !self.active {
            return Ok(());
        }

        let out = take_option!(self.out);
        let interarrival = self.config.interarrival();
        let size_bytes = self.config.mean_packet_size();

        let initial_delay = self.initial_delay.get();
        if initial_delay > 0.0 {
            self.clock.wait(initial_delay).await;
        }

        loop {
            if let Some(finish) = self.finish.get() {
                if self.clock.time_now_s() >= finish {
                    break;
                }
            }

            // Wait for the next transmission
            self.clock.wait(interarrival).await;

            self.packets_sent.set(self.packets_sent.get() + 1);
            let dst = (0..self.config.num_outputs())
                .choose(&mut *self.rng.borrow_mut())
                .unwrap();
            let packet = Packet::new(
                &self.entity,
                self.packets_sent.get(),
                self.input_index,
                dst,
                size_bytes,
                self.clock.time_now_s(),
            )
            .set_flow_id(self.flow_id.get());

            self.bytes_sent.set(self.bytes_sent.get() + size_bytes);
            out.put(packet)?;
        }
        Ok(())
    }
}
