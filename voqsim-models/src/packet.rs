// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A packet travelling through the switch.
//!
//! The identity fields are fixed at creation; the delay annotations are
//! filled in as the packet traverses the pipeline stages and are read back
//! by the [sink](crate::sink) to decompose the end-to-end latency.
//! The size is a float so that results can be compared against ideal M/M/1
//! queues.

use std::fmt::Display;
use std::rc::Rc;

use voqsim_engine::traits::{Routable, SimObject, TotalBytes};
use voqsim_track::entity::Entity;
use voqsim_track::id::Unique;
use voqsim_track::{Id, create, create_id};

#[derive(Clone, Debug)]
pub struct Packet {
    id: Id,

    /// Per-generator sequence number, counting from 1.
    seq: u64,

    /// Index of the input port the packet arrived on.
    src: usize,

    /// Index of the output port the packet is destined to.
    dst: usize,

    flow_id: u64,

    size_bytes: f64,

    /// Virtual time at which the packet was created.
    created_at: f64,

    /// Time spent buffered in the lookup stage. Written by the lookup port.
    lookup_wait: f64,

    /// Time spent waiting for the shared output transmitter. Written by the
    /// VOQ.
    contention_delay: f64,
}

impl Packet {
    #[must_use]
    pub fn new(
        created_by: &Rc<Entity>,
        seq: u64,
        src: usize,
        dst: usize,
        size_bytes: f64,
        created_at: f64,
    ) -> Self {
        let packet = Self {
            id: create_id!(created_by),
            seq,
            src,
            dst,
            flow_id: 0,
            size_bytes,
            created_at,
            lookup_wait: 0.0,
            contention_delay: 0.0,
        };
        create!(created_by ; packet, packet.size_bytes as usize);
        packet
    }

    #[must_use]
    pub fn set_flow_id(mut self, flow_id: u64) -> Self {
        self.flow_id = flow_id;
        self
    }

    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    #[must_use]
    pub fn src(&self) -> usize {
        self.src
    }

    #[must_use]
    pub fn flow_id(&self) -> u64 {
        self.flow_id
    }

    #[must_use]
    pub fn created_at(&self) -> f64 {
        self.created_at
    }

    #[must_use]
    pub fn lookup_wait(&self) -> f64 {
        self.lookup_wait
    }

    pub fn set_lookup_wait(&mut self, lookup_wait: f64) {
        self.lookup_wait = lookup_wait;
    }

    #[must_use]
    pub fn contention_delay(&self) -> f64 {
        self.contention_delay
    }

    pub fn set_contention_delay(&mut self, contention_delay: f64) {
        self.contention_delay = contention_delay;
    }
}

impl SimObject for Packet {}

impl Display for Packet {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "pkt {} at {:.9}s: {} -> {} ({} bytes)",
            self.seq, self.created_at, self.src, self.dst, self.size_bytes
        )
    }
}

impl TotalBytes for Packet {
    fn total_bytes(&self) -> f64 {
        self.size_bytes
    }
}

impl Unique for Packet {
    fn id(&self) -> Id {
        self.id
    }
}

impl Routable for Packet {
    fn dest(&self) -> usize {
        self.dst
    }
}
