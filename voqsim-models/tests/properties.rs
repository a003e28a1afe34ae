// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Cross-cutting properties of the switch pipeline: conservation of
//! packets, determinism for a fixed seed, unbounded buffers and the
//! queueing-wait clamp.

use std::rc::Rc;

use approx::assert_relative_eq;
use voqsim_engine::engine::Engine;
use voqsim_engine::test_helpers::start_test;
use voqsim_models::config::SwitchConfig;
use voqsim_models::switch::Switch;

const MEAN_BYTES: f64 = 1250.0;
const PORT_RATE: f64 = 10_000.0;

fn run_to_horizon(config: SwitchConfig) -> (Engine, Rc<Switch>) {
    let mut engine = start_test(file!());
    let horizon = config.sim_time();
    let switch =
        Switch::new_and_register(&engine, engine.top(), "switch", Rc::new(config)).unwrap();
    engine.run_for(horizon).unwrap();
    (engine, switch)
}

/// Every generated packet is either counted at the sink or dropped at one
/// of the stages, once the pipeline has drained.
#[test]
fn packets_are_conserved() {
    let config = SwitchConfig::new(
        4,
        3,
        4,
        PORT_RATE,
        None,
        MEAN_BYTES,
        Some(2.0 * MEAN_BYTES),
        Some(2.0 * MEAN_BYTES),
        0.01,
        60.0,
        1.0,
        7,
    )
    .unwrap();

    let mut engine = start_test(file!());
    let switch =
        Switch::new_and_register(&engine, engine.top(), "switch", Rc::new(config)).unwrap();

    // Stagger the generators and stop generating early enough that
    // everything still buffered can drain before the horizon.
    for (i, generator) in switch.generators().iter().enumerate() {
        generator.set_initial_delay(0.25 * i as f64);
        generator.set_finish(10.0);
    }

    engine.run_for(60.0).unwrap();

    assert!(switch.packets_generated() > 0);
    assert_eq!(switch.packets_in_flight(), 0);
    assert_eq!(
        switch.packets_generated(),
        switch.sink().packets_rec() + switch.port_packets_drop() + switch.voq_packets_drop()
    );

    // The lookup stages saw every generated packet as an attempt
    assert_eq!(switch.port_packets_rec(), switch.packets_generated());

    // All buffers have fully drained
    for port in switch.ports() {
        assert_eq!(port.byte_size(), 0.0);
        assert_eq!(port.buffered(), 0);
    }
    for per_input in switch.voqs() {
        for voq in per_input {
            assert_eq!(voq.byte_size(), 0.0);
            assert_eq!(voq.buffered(), 0);
        }
    }
}

/// Two runs with identical seed and parameters produce identical counters
/// and identical wait-sample sequences, element for element.
#[test]
fn runs_are_deterministic_for_a_fixed_seed() {
    let run = || {
        let config = SwitchConfig::new(
            4,
            4,
            4,
            PORT_RATE,
            None,
            MEAN_BYTES,
            Some(4.0 * MEAN_BYTES),
            Some(2.0 * MEAN_BYTES),
            0.01,
            30.0,
            1.0,
            3,
        )
        .unwrap();
        let (_engine, switch) = run_to_horizon(config);
        let sink = switch.sink();
        (
            switch.packets_generated(),
            switch.port_packets_drop(),
            switch.voq_packets_drop(),
            sink.packets_rec(),
            sink.waits(),
            sink.queue_waits(),
            sink.contention_waits(),
            switch.monitor().samples(),
        )
    };

    let first = run();
    let second = run();
    assert_eq!(first, second);
}

/// An unset buffer limit never drops, regardless of offered load.
#[test]
fn unbounded_buffers_never_drop() {
    let config = SwitchConfig::new(
        2,
        2,
        1,
        PORT_RATE,
        Some(4.0 * PORT_RATE),
        MEAN_BYTES,
        None,
        None,
        0.01,
        30.0,
        1.0,
        5,
    )
    .unwrap();
    let (_engine, switch) = run_to_horizon(config);

    assert!(switch.packets_generated() > 100);
    assert_eq!(switch.port_packets_drop(), 0);
    assert_eq!(switch.voq_packets_drop(), 0);

    // Occupancy is never negative even while heavily backlogged
    for port in switch.ports() {
        assert!(port.byte_size() >= 0.0);
    }
    for per_input in switch.voqs() {
        for voq in per_input {
            assert!(voq.byte_size() >= 0.0);
        }
    }
}

/// Queueing-wait samples are clamped at zero even when the raw subtraction
/// underflows by a floating-point margin.
#[test]
fn queue_waits_are_never_negative() {
    let config = SwitchConfig::new(
        1,
        1,
        1,
        PORT_RATE,
        None,
        MEAN_BYTES,
        None,
        None,
        0.01,
        50.0,
        1.0,
        1,
    )
    .unwrap();
    let (_engine, switch) = run_to_horizon(config);

    let queue_waits = switch.sink().queue_waits();
    assert!(!queue_waits.is_empty());
    assert!(queue_waits.iter().all(|&w| w >= 0.0));
}

/// Optional arrival recording keeps one gap sample per received packet.
#[test]
fn sink_records_arrival_gaps_when_enabled() {
    let config = SwitchConfig::new(
        1,
        1,
        1,
        PORT_RATE,
        None,
        MEAN_BYTES,
        None,
        None,
        0.01,
        10.0,
        1.0,
        1,
    )
    .unwrap();

    let mut engine = start_test(file!());
    let switch =
        Switch::new_and_register(&engine, engine.top(), "switch", Rc::new(config)).unwrap();
    switch.sink().record_arrivals(false);

    engine.run_for(10.0).unwrap();

    let sink = switch.sink();
    let arrivals = sink.arrivals();
    assert_eq!(arrivals.len() as u64, sink.packets_rec());
    assert!(arrivals.len() > 2);

    // With a deterministic generator the steady-state gap is exactly the
    // inter-arrival interval.
    let interarrival = MEAN_BYTES * 8.0 / PORT_RATE;
    for gap in &arrivals[1..] {
        assert_relative_eq!(*gap, interarrival, max_relative = 1e-9);
    }
}
