// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Configuration of the simulated switch.
//!
//! One immutable [`SwitchConfig`] value is validated up front and shared by
//! `Rc` between every entity of the simulation. All rates are in bits per
//! second, sizes in bytes and times in virtual seconds.

use voqsim_engine::sim_error;
use voqsim_engine::types::SimError;

/// Configuration structure for an input-queued switch.
pub struct SwitchConfig {
    /// Number of input ports.
    num_inputs: usize,

    /// Number of input ports with an active packet generator.
    num_generators: usize,

    /// Number of output ports. Every input port carries one VOQ per output.
    num_outputs: usize,

    /// Transmission rate of an output port in bits per second. Drives the
    /// serialization delay and the sink's fixed-cost decomposition.
    port_rate: f64,

    /// Rate driving generator inter-arrival timing, in bits per second.
    /// Defaults to `port_rate`.
    gen_rate: f64,

    /// Mean packet size in bytes.
    mean_packet_size: f64,

    /// Buffer limit of an edge (lookup) port in bytes. `None` is unbounded.
    qlimit_edge: Option<f64>,

    /// Buffer limit of a VOQ in bytes. `None` is unbounded.
    qlimit_voq: Option<f64>,

    /// Fixed table-lookup delay in seconds.
    lookup_delay: f64,

    /// Simulation horizon in virtual seconds.
    sim_time: f64,

    /// Sampling interval of the sink monitor in virtual seconds.
    sample_interval: f64,

    /// Seed for the per-generator destination RNGs.
    seed: u64,
}

fn check_positive(value: f64, what: &str) -> Result<(), SimError> {
    if !(value.is_finite() && value > 0.0) {
        return sim_error!(format!("{what} must be positive, got {value}"));
    }
    Ok(())
}

impl SwitchConfig {
    #[expect(clippy::too_many_arguments)]
    pub fn new(
        num_inputs: usize,
        num_generators: usize,
        num_outputs: usize,
        port_rate: f64,
        gen_rate: Option<f64>,
        mean_packet_size: f64,
        qlimit_edge: Option<f64>,
        qlimit_voq: Option<f64>,
        lookup_delay: f64,
        sim_time: f64,
        sample_interval: f64,
        seed: u64,
    ) -> Result<Self, SimError> {
        if num_inputs == 0 {
            return sim_error!("need at least one input port");
        }
        if num_outputs == 0 {
            return sim_error!("need at least one output port");
        }
        if num_generators > num_inputs {
            return sim_error!(format!(
                "{num_generators} generators for {num_inputs} input ports"
            ));
        }
        check_positive(port_rate, "port rate")?;
        let gen_rate = gen_rate.unwrap_or(port_rate);
        check_positive(gen_rate, "generator rate")?;
        check_positive(mean_packet_size, "mean packet size")?;
        if let Some(qlimit) = qlimit_edge {
            check_positive(qlimit, "edge port buffer limit")?;
        }
        if let Some(qlimit) = qlimit_voq {
            check_positive(qlimit, "VOQ buffer limit")?;
        }
        if !(lookup_delay.is_finite() && lookup_delay >= 0.0) {
            return sim_error!(format!("lookup delay must be >= 0, got {lookup_delay}"));
        }
        check_positive(sim_time, "simulation horizon")?;
        check_positive(sample_interval, "monitor sampling interval")?;

        Ok(Self {
            num_inputs,
            num_generators,
            num_outputs,
            port_rate,
            gen_rate,
            mean_packet_size,
            qlimit_edge,
            qlimit_voq,
            lookup_delay,
            sim_time,
            sample_interval,
            seed,
        })
    }

    #[must_use]
    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    #[must_use]
    pub fn num_generators(&self) -> usize {
        self.num_generators
    }

    #[must_use]
    pub fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    #[must_use]
    pub fn port_rate(&self) -> f64 {
        self.port_rate
    }

    #[must_use]
    pub fn gen_rate(&self) -> f64 {
        self.gen_rate
    }

    #[must_use]
    pub fn mean_packet_size(&self) -> f64 {
        self.mean_packet_size
    }

    #[must_use]
    pub fn qlimit_edge(&self) -> Option<f64> {
        self.qlimit_edge
    }

    #[must_use]
    pub fn qlimit_voq(&self) -> Option<f64> {
        self.qlimit_voq
    }

    #[must_use]
    pub fn lookup_delay(&self) -> f64 {
        self.lookup_delay
    }

    #[must_use]
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    #[must_use]
    pub fn sample_interval(&self) -> f64 {
        self.sample_interval
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Deterministic generator inter-arrival interval in seconds.
    #[must_use]
    pub fn interarrival(&self) -> f64 {
        self.mean_packet_size * 8.0 / self.gen_rate
    }

    /// Time to transmit `size_bytes` at the output port rate, in seconds.
    #[must_use]
    pub fn serialization_delay(&self, size_bytes: f64) -> f64 {
        size_bytes * 8.0 / self.port_rate
    }
}

#[test]
fn validation() {
    let ok = SwitchConfig::new(
        4,
        2,
        4,
        1e9,
        None,
        1500.0,
        Some(12000.0),
        Some(4500.0),
        3.575e-7,
        1.0,
        1e-3,
        1,
    );
    let config = ok.unwrap();
    assert_eq!(config.gen_rate(), 1e9);
    assert_eq!(config.interarrival(), 1500.0 * 8.0 / 1e9);

    // More generators than input ports
    assert!(
        SwitchConfig::new(2, 3, 4, 1e9, None, 1500.0, None, None, 0.0, 1.0, 1e-3, 1).is_err()
    );

    // Non-positive rate
    assert!(
        SwitchConfig::new(2, 2, 4, 0.0, None, 1500.0, None, None, 0.0, 1.0, 1e-3, 1).is_err()
    );

    // Non-positive buffer limit where one is given
    assert!(
        SwitchConfig::new(2, 2, 4, 1e9, None, 1500.0, Some(0.0), None, 0.0, 1.0, 1e-3, 1)
            .is_err()
    );

    // Zero ports
    assert!(
        SwitchConfig::new(0, 0, 4, 1e9, None, 1500.0, None, None, 0.0, 1.0, 1e-3, 1).is_err()
    );
}
