// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The lookup stage of an input port.
//!
//! A byte-limited FIFO buffer in front of a fixed-delay forwarding-table
//! lookup. Accepted packets are buffered, then dispatched into the VOQ
//! selected by their destination index after the lookup delay has been paid.
//!
//! The drop policy is reject-on-overflow: a packet is rejected (counted, not
//! buffered) if admitting it would push buffer occupancy to or past the
//! byte limit. With no limit configured every packet is accepted.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use voqsim_engine::engine::Engine;
use voqsim_engine::store::Store;
use voqsim_engine::take_option;
use voqsim_engine::time::clock::Clock;
use voqsim_engine::traits::{Routable, Runnable, TotalBytes};
use voqsim_engine::types::SimResult;
use voqsim_track::entity::Entity;
use voqsim_track::trace;

use crate::config::SwitchConfig;
use crate::packet::Packet;
use crate::voq::Voq;

pub struct LookupPort {
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

    /// One VOQ per destination, connected before the simulation starts.
    outs: RefCell<Option<Vec<Rc<Voq>>>>,
}

impl LookupPort {
    #[must_use]
    pub fn new_and_register(
        engine: &Engine,
        parent: &Rc<Entity>,
        name: &str,
        config: Rc<SwitchConfig>,
        clock: Clock,
    ) -> Rc<Self> {
        let entity = Rc::new(Entity::new(parent, name));
        let store = Store::new(&entity, "buffer");
        let qlimit = config.qlimit_edge();
        let rc_self = Rc::new(Self {
            entity,
            config,
            clock,
            store,
            qlimit,
            byte_size: Cell::new(0.0),
            packets_rec: Cell::new(0),
            packets_drop: Cell::new(0),
            outs: RefCell::new(None),
        });
        engine.register(rc_self.clone());
        rc_self
    }

    /// Connect one VOQ per destination, in destination order.
    pub fn connect_voqs(&self, voqs: Vec<Rc<Voq>>) {
        assert_eq!(voqs.len(), self.config.num_outputs());
        let mut outs = self.outs.borrow_mut();
        match *outs {
            Some(_) => panic!("{}: VOQs already connected", self.entity),
            None => *outs = Some(voqs),
        }
    }

    /// Offer a packet to the lookup buffer.
    ///
    /// Never blocks: the packet is either buffered or dropped on the spot.
    pub fn put(&self, mut packet: Packet) -> SimResult {
        self.packets_rec.set(self.packets_rec.get() + 1);

        // Stamp the buffer entry time; the process loop turns this into the
        // time spent waiting for the lookup.
        packet.set_lookup_wait(self.clock.time_now_s());

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
impl Runnable for LookupPort {
    async fn run(&self) -> SimResult {
        let outs = take_option!(self.outs);
        let lookup_delay = self.config.lookup_delay();

        loop {
            let mut packet = self.store.get().await;
            packet.set_lookup_wait(self.clock.time_now_s() - packet.lookup_wait());
            self.byte_size.set(self.byte_size.get() - packet.total_bytes());

            self.clock.wait(lookup_delay).await;

            let dst = packet.dest();
            outs[dst].put(packet)?;
        }
    }
}
