// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Closed-form scenarios for the switch pipeline.
//!
//! All rates are scaled down so that one packet serializes in one virtual
//! second: a mean packet of 1250 bytes at 10 kbit/s. That keeps the packet
//! counts small while leaving the arithmetic identical to a full-rate run.

use std::rc::Rc;

use approx::assert_relative_eq;
use voqsim_engine::engine::Engine;
use voqsim_engine::test_helpers::start_test;
use voqsim_models::config::SwitchConfig;
use voqsim_models::switch::Switch;

const MEAN_BYTES: f64 = 1250.0;
const PORT_RATE: f64 = 10_000.0;
const LOOKUP_S: f64 = 0.01;

fn run_to_horizon(config: SwitchConfig) -> (Engine, Rc<Switch>) {
    let mut engine = start_test(file!());
    let horizon = config.sim_time();
    let switch =
        Switch::new_and_register(&engine, engine.top(), "switch", Rc::new(config)).unwrap();
    engine.run_for(horizon).unwrap();
    (engine, switch)
}

/// One generator to one output: no contention, latency is the fixed cost.
#[test]
fn no_contention_latency_is_lookup_plus_serialization() {
    let config = SwitchConfig::new(
        1,
        1,
        1,
        PORT_RATE,
        None,
        MEAN_BYTES,
        None,
        Some(3.0 * MEAN_BYTES),
        LOOKUP_S,
        100.0,
        1.0,
        1,
    )
    .unwrap();
    let (engine, switch) = run_to_horizon(config);
    assert_eq!(engine.time_now_s(), 100.0);

    let sink = switch.sink();
    assert!(sink.packets_rec() > 50);
    assert_eq!(switch.voq_packets_drop(), 0);
    assert_eq!(switch.port_packets_drop(), 0);

    let serialization = MEAN_BYTES * 8.0 / PORT_RATE;
    let mean_wait = voqsim_models::stats::mean(&sink.waits());
    assert_relative_eq!(
        mean_wait,
        LOOKUP_S + serialization,
        max_relative = 0.01
    );

    // No other VOQ contends for the output, so every contention sample is
    // exactly zero.
    assert!(sink.contention_waits().iter().all(|&w| w == 0.0));
}

/// Two generators to one output: the second-served packet pays at least the
/// first packet's serialization delay in contention.
#[test]
fn contention_is_observed_when_two_inputs_share_an_output() {
    let config = SwitchConfig::new(
        2,
        2,
        1,
        PORT_RATE,
        None,
        MEAN_BYTES,
        None,
        None,
        LOOKUP_S,
        10.0,
        1.0,
        1,
    )
    .unwrap();
    let (_engine, switch) = run_to_horizon(config);

    let sink = switch.sink();
    let waits = sink.waits();
    assert!(waits.len() >= 2);

    assert!(sink.contention_waits().iter().any(|&w| w > 0.0));

    let serialization = MEAN_BYTES * 8.0 / PORT_RATE;
    assert!(
        waits[1] >= waits[0] + serialization - 1e-9,
        "second-served wait {} vs first {}",
        waits[1],
        waits[0]
    );
}

/// VOQ fill rate above drain rate with a small buffer: drops accumulate
/// roughly linearly with the horizon.
#[test]
fn overflow_drops_grow_with_the_horizon() {
    let run = |horizon: f64| {
        let config = SwitchConfig::new(
            1,
            1,
            1,
            PORT_RATE,
            Some(2.0 * PORT_RATE),
            MEAN_BYTES,
            None,
            Some(2.0 * MEAN_BYTES),
            0.0,
            horizon,
            1.0,
            1,
        )
        .unwrap();
        let (_engine, switch) = run_to_horizon(config);

        // Occupancy stays within the configured bound
        for per_input in switch.voqs() {
            for voq in per_input {
                assert!(voq.byte_size() >= 0.0);
                assert!(voq.byte_size() < 2.0 * MEAN_BYTES);
            }
        }

        switch.voq_packets_drop()
    };

    let drops_short = run(50.0);
    let drops_long = run(100.0);

    assert!(drops_short > 0);
    assert!(drops_long > drops_short);

    let ratio = drops_long as f64 / drops_short as f64;
    assert!(
        (1.7..=2.3).contains(&ratio),
        "drop growth ratio {ratio} not roughly linear"
    );
}
