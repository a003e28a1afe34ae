// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The complete input-queued switch.
//!
//! [`Switch::new_and_register`] builds and wires the fixed pipeline for a
//! validated configuration:
//!
//! ```text
//! gen[i] -> port[i] -> voq[i][j] -> output[j] (shared Resource) -> sink
//! ```
//!
//! The wiring mirrors the topology described in the module docs of this
//! crate: one generator and one lookup port per input, one VOQ per (input,
//! output) pair, one exclusive transmitter per output and a single sink with
//! its throughput monitor.

use std::rc::Rc;

use voqsim_engine::engine::Engine;
use voqsim_engine::resource::Resource;
use voqsim_engine::types::SimError;
use voqsim_track::entity::Entity;
use voqsim_track::info;

use crate::config::SwitchConfig;
use crate::generator::PacketGenerator;
use crate::lookup::LookupPort;
use crate::monitor::SinkMonitor;
use crate::sink::PacketSink;
use crate::voq::Voq;

pub struct Switch {
    pub entity: Rc<Entity>,
    config: Rc<SwitchConfig>,

    generators: Vec<Rc<PacketGenerator>>,
    ports: Vec<Rc<LookupPort>>,
    voqs: Vec<Vec<Rc<Voq>>>,
    sink: Rc<PacketSink>,
    monitor: Rc<SinkMonitor>,
}

impl Switch {
    pub fn new_and_register(
        engine: &Engine,
        parent: &Rc<Entity>,
        name: &str,
        config: Rc<SwitchConfig>,
    ) -> Result<Rc<Self>, SimError> {
        let entity = Rc::new(Entity::new(parent, name));
        let clock = engine.clock();

        // One exclusive transmitter per output, shared by the VOQs of every
        // input targeting that output.
        let outputs: Vec<Rc<Resource>> = (0..config.num_outputs())
            .map(|j| Rc::new(Resource::new(&entity, format!("output{j}").as_str())))
            .collect();

        let sink = PacketSink::new_and_register(
            engine,
            &entity,
            "sink",
            config.clone(),
            clock.clone(),
        );
        let monitor = SinkMonitor::new_and_register(
            engine,
            &entity,
            "monitor",
            clock.clone(),
            sink.clone(),
            config.sample_interval(),
        );

        let mut generators = Vec::with_capacity(config.num_inputs());
        let mut ports = Vec::with_capacity(config.num_inputs());
        let mut voqs = Vec::with_capacity(config.num_inputs());

        for i in 0..config.num_inputs() {
            let port = LookupPort::new_and_register(
                engine,
                &entity,
                format!("port{i}").as_str(),
                config.clone(),
                clock.clone(),
            );

            let mut port_voqs = Vec::with_capacity(config.num_outputs());
            for (j, output) in outputs.iter().enumerate() {
                let voq = Voq::new_and_register(
                    engine,
                    &port.entity,
                    format!("voq{j}").as_str(),
                    config.clone(),
                    clock.clone(),
                    output.clone(),
                );
                voq.connect_out(sink.clone());
                port_voqs.push(voq);
            }
            port.connect_voqs(port_voqs.clone());

            let generator = PacketGenerator::new_and_register(
                engine,
                &entity,
                format!("gen{i}").as_str(),
                config.clone(),
                clock.clone(),
                i,
                i < config.num_generators(),
            );
            generator.connect_out(port.clone());

            generators.push(generator);
            ports.push(port);
            voqs.push(port_voqs);
        }

        info!(entity ;
            "Switch with {}/{} active inputs, {} outputs, buffers {:?}/{:?} bytes",
            config.num_generators(),
            config.num_inputs(),
            config.num_outputs(),
            config.qlimit_edge(),
            config.qlimit_voq(),
        );

        Ok(Rc::new(Self {
            entity,
            config,
            generators,
            ports,
            voqs,
            sink,
            monitor,
        }))
    }

    #[must_use]
    pub fn config(&self) -> &Rc<SwitchConfig> {
        &self.config
    }

    #[must_use]
    pub fn generators(&self) -> &[Rc<PacketGenerator>] {
        &self.generators
    }

    #[must_use]
    pub fn ports(&self) -> &[Rc<LookupPort>] {
        &self.ports
    }

    #[must_use]
    pub fn voqs(&self) -> &[Vec<Rc<Voq>>] {
        &self.voqs
    }

    #[must_use]
    pub fn sink(&self) -> &Rc<PacketSink> {
        &self.sink
    }

    #[must_use]
    pub fn monitor(&self) -> &Rc<SinkMonitor> {
        &self.monitor
    }

    /// Total packets created by all generators.
    #[must_use]
    pub fn packets_generated(&self) -> u64 {
        self.generators.iter().map(|g| g.packets_sent()).sum()
    }

    /// Total `put` attempts seen by the lookup stages.
    #[must_use]
    pub fn port_packets_rec(&self) -> u64 {
        self.ports.iter().map(|p| p.packets_rec()).sum()
    }

    /// Total packets dropped by the lookup stages.
    #[must_use]
    pub fn port_packets_drop(&self) -> u64 {
        self.ports.iter().map(|p| p.packets_drop()).sum()
    }

    /// Total `put` attempts seen by the VOQs.
    #[must_use]
    pub fn voq_packets_rec(&self) -> u64 {
        self.voqs
            .iter()
            .flat_map(|per_input| per_input.iter())
            .map(|v| v.packets_rec())
            .sum()
    }

    /// Total packets dropped by the VOQs.
    #[must_use]
    pub fn voq_packets_drop(&self) -> u64 {
        self.voqs
            .iter()
            .flat_map(|per_input| per_input.iter())
            .map(|v| v.packets_drop())
            .sum()
    }

    /// Packets created but neither counted at the sink nor dropped:
    /// buffered or in service somewhere in the pipeline.
    #[must_use]
    pub fn packets_in_flight(&self) -> u64 {
        self.packets_generated()
            - self.sink.packets_rec()
            - self.port_packets_drop()
            - self.voq_packets_drop()
    }
}
