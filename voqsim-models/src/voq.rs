// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A virtual output queue.
//!
//! One instance exists per (input port, destination) pair. The VOQ applies
//! the same reject-on-overflow policy as the lookup stage, then contends for
//! the exclusive output transmitter shared by every VOQ targeting the same
//! destination. The time spent waiting for the transmitter is recorded on
//! the packet as its contention delay.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use voqsim_engine::engine::Engine;
use voqsim_engine::resource::Resource;
use voqsim_engine::store::Store;
use voqsim_engine::take_option;
use voqsim_engine::time::clock::Clock;
use voqsim_engine::traits::{Runnable, TotalBytes};
use voqsim_engine::types::SimResult;
use voqsim_track::entity::Entity;
use voqsim_track::trace;

use crate::config::SwitchConfig;
use crate::packet::Packet;
use crate::sink::PacketSink;

pub struct Voq {
    pub entity: Rc<Entity>,
    config: Rc<SwitchConfig>,
    clock: Clock,

    store: Store<Packet>,

    /// Buffer limit in bytes. `None` is unbounded.
    qlimit: Option<f64>,

    /// Occupancy in bytes of the packets currently buffered. Excludes the
    /// packet in service.
    byte_size: Cell<f64>,

    /// Counts every `put` attempt, accepted or not.
    packets_rec: Cell<u64>,

    packets_drop: Cell<u64>,

    /// The exclusive transmitter of this VOQ's destination, shared with the
    /// same-destination VOQs of all other input ports.
    output: Rc<Resource>,

    out: RefCell<Option<Rc<PacketSink>>>,
}

impl Voq {
    #[must_use]
    pub fn new_and_register(
        engine: &Engine,
        parent: &Rc<Entity>,
        name: &str,
        config: Rc<SwitchConfig>,
        clock: Clock,
        output: Rc<Resource>,
    ) -> Rc<Self> {
        let entity = Rc::new(Entity::new(parent, name));
        let store = Store::new(&entity, "buffer");
        let qlimit = config.qlimit_voq();
        let rc_self = Rc::new(Self {
            entity,
            config,
            clock,
            store,
            qlimit,
            byte_size: Cell::new(0.0),
            packets_rec: Cell::new(0),
            packets_drop: Cell::new(0),
            output,
            out: RefCell::new(None),
        });
        engine.register(rc_self.clone());
        rc_self
    }

    /// Connect the VOQ to the sink.
    pub fn connect_out(&self, sink: Rc<PacketSink>) {
        let mut out = self.out.borrow_mut();
        match *out {
            Some(_) => panic!("{}: out already connected", self.entity),
            None => *out = Some(sink),
        }
    }

    /// Offer a packet to the VOQ buffer.
    ///
    /// Never blocks: the packet is either buffered or dropped on the spot.
    pub fn put(&self, packet: Packet) -> SimResult {
        self.packets_rec.set(self.packets_rec.get() + 1);

        let prospective = self.byte_size.get() + packet.total_bytes();
        if let Some(qlimit) = self.qlimit {
            if prospective >= qlimit {
                self.packets_drop.set(self.packets_drop.get() + 1);
                trace!(self.entity ; "drop {packet}");
                return Ok(());
            }
        }
        self.byte_size.set(prospective);
        self.store.put(packet)
    }

    #[must_use]
    pub fn packets_rec(&self) -> u64 {
        self.packets_rec.get()
    }

    #[must_use]
    pub fn packets_drop(&self) -> u64 {
        self.packets_drop.get()
    }

    #[must_use]
    pub fn byte_size(&self) -> f64 {
        self.byte_size.get()
    }

    #[must_use]
    pub fn buffered(&self) -> usize {
        self.store.len()
    }
}

#[async_trait(?Send)]
impl Runnable for Voq {
    async fn run(&self) -> SimResult {
        let sink = take_option!(self.out);

        loop {
            let mut packet = self.store.get().await;
            self.byte_size.set(self.byte_size.get() - packet.total_bytes());

            let requested_at = self.clock.time_now_s();
            let guard = self.output.request().await;
            packet.set_contention_delay(self.clock.time_now_s() - requested_at);

            self.clock
                .wait(self.config.serialization_delay(packet.total_bytes()))
                .await;

            // The transmitter is free again before the sink handoff
            drop(guard);
            sink.put(packet)?;
        }
    }
}
