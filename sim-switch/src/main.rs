// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Simulate an input-queued switch with virtual output queues.
//!
//! This is a batch compute-then-report tool: it builds the pipeline
//! described by the command-line parameters, runs the simulation to the
//! configured horizon and prints the aggregate counters and delay/throughput
//! estimates.

use std::rc::Rc;

use byte_unit::{AdjustedByte, Byte, UnitType};
use clap::Parser;
use indicatif::ProgressBar;
use voqsim_engine::engine::Engine;
use voqsim_engine::executor::Spawner;
use voqsim_engine::time::clock::Clock;
use voqsim_engine::types::{SimError, SimResult};
use voqsim_models::config::SwitchConfig;
use voqsim_models::stats::mean;
use voqsim_models::switch::Switch;
use voqsim_track::builder::{TrackerConfig, setup_tracker};
use voqsim_track::{Track, Tracker, info};

/// Command-line arguments.
#[derive(Parser)]
#[command(about = "Input-queued switch evaluation application")]
struct Cli {
    /// Enable logging to the console.
    #[arg(long, default_value = "false")]
    stdout: bool,

    /// Level of log message to display.
    #[arg(long, default_value = "Info")]
    stdout_level: log::Level,

    /// Set a regular expression for which entities should have logging level
    /// set to `--stdout-level`. Others will have level set to `Error`.
    #[arg(long, default_value = "")]
    stdout_filter_regex: String,

    /// The number of input ports.
    #[arg(long, default_value = "16")]
    num_inputs: usize,

    /// Number of active packet generators (chosen from the first inputs).
    /// Defaults to all input ports.
    #[clap(long)]
    num_generators: Option<usize>,

    /// The number of output ports (= VOQs per input port). Defaults to the
    /// number of input ports.
    #[clap(long)]
    num_outputs: Option<usize>,

    /// Output port transmission rate in bits per second.
    #[arg(long, default_value = "10e9")]
    port_rate: f64,

    /// Rate driving generator inter-arrival timing, in bits per second.
    /// Defaults to the port rate.
    #[clap(long)]
    gen_rate: Option<f64>,

    /// Mean packet size in bytes.
    #[arg(long, default_value = "1500")]
    mean_packet_size: f64,

    /// Edge-port buffer limit in bytes. Unbounded when not given.
    #[clap(long)]
    qlimit_edge: Option<f64>,

    /// VOQ buffer limit in bytes. Unbounded when not given.
    #[clap(long)]
    qlimit_voq: Option<f64>,

    /// Fixed table-lookup delay in seconds.
    #[arg(long, default_value = "3.575e-7")]
    lookup_delay: f64,

    /// Simulation horizon in virtual seconds.
    #[arg(long, default_value = "1e-3")]
    sim_time: f64,

    /// Sampling interval of the throughput monitor in virtual seconds.
    /// Defaults to a hundredth of the horizon.
    #[clap(long)]
    sample_interval: Option<f64>,

    /// Seed for the destination random number generators.
    #[clap(long, default_value = "1")]
    seed: u64,

    /// Show a progress bar while the simulation runs.
    #[arg(long)]
    progress: bool,
}

fn setup_all_tracking(args: &Cli) -> Result<Tracker, SimError> {
    let config = TrackerConfig {
        enable: args.stdout,
        level: args.stdout_level,
        filter_regex: &args.stdout_filter_regex,
    };
    setup_tracker(&config).map_err(|e| SimError(e.0))
}

fn create_config(args: &Cli) -> Result<Rc<SwitchConfig>, SimError> {
    let num_generators = args.num_generators.unwrap_or(args.num_inputs);
    let num_outputs = args.num_outputs.unwrap_or(args.num_inputs);
    let sample_interval = args.sample_interval.unwrap_or(args.sim_time / 100.0);

    let config = SwitchConfig::new(
        args.num_inputs,
        num_generators,
        num_outputs,
        args.port_rate,
        args.gen_rate,
        args.mean_packet_size,
        args.qlimit_edge,
        args.qlimit_voq,
        args.lookup_delay,
        args.sim_time,
        sample_interval,
        args.seed,
    )?;
    Ok(Rc::new(config))
}

/// Spawn a background task advancing the progress bar as virtual time
/// passes.
fn start_progress(spawner: &Spawner, clock: Clock, sim_time: f64, progress_bar: ProgressBar) {
    let tick = sim_time / 100.0;
    spawner.spawn(async move {
        loop {
            // A background wait: the progress bar alone must not keep the
            // simulation alive.
            clock.wait_or_exit(tick).await;
            progress_bar.inc(1);
            if clock.time_now_s() >= sim_time {
                break;
            }
        }
        Ok(())
    });
}

fn main() -> SimResult {
    let args = Cli::parse();
    let tracker = setup_all_tracking(&args)?;

    let mut engine = Engine::new(&tracker);
    let spawner = engine.spawner();
    let clock = engine.clock();

    let config = create_config(&args)?;
    let top = engine.top().clone();
    let switch = Switch::new_and_register(&engine, &top, "switch", config.clone())?;

    info!(top ; "Switch built and connected, running to {}s", config.sim_time());

    let progress_bar = ProgressBar::new(100);
    if args.progress {
        start_progress(&spawner, clock.clone(), config.sim_time(), progress_bar.clone());
    }

    engine.run_for(config.sim_time())?;

    if args.progress {
        progress_bar.finish();
    }
    tracker.shutdown();

    print_report(&config, &switch, clock.time_now_s());
    Ok(())
}

fn print_report(config: &SwitchConfig, switch: &Switch, time_now_s: f64) {
    let sink = switch.sink();

    let buffer_packets = |qlimit: Option<f64>| match qlimit {
        Some(qlimit) => format!("{} packets", (qlimit / config.mean_packet_size()) as u64),
        None => String::from("unbounded"),
    };

    println!("List of parameters:");
    println!(
        "\tActive input ports = {} of {}",
        config.num_generators(),
        config.num_inputs()
    );
    println!("\tOutput ports = {}", config.num_outputs());
    println!("\tPort rate = {} bit/s", config.port_rate());
    println!("\tGenerator rate = {} bit/s", config.gen_rate());
    println!("\tMean packet size = {} bytes", config.mean_packet_size());
    println!("\t1st level buffer size = {}", buffer_packets(config.qlimit_edge()));
    println!("\tVOQ buffer size = {}", buffer_packets(config.qlimit_voq()));
    println!("\tLookup delay = {:.3e} s", config.lookup_delay());
    println!("\tSimulated time = {time_now_s:.6} s");

    println!("Results:");
    println!("\tTotal packets generated = {}", switch.packets_generated());
    println!(
        "\tTotal packets received and dropped across all input ports = {}, {}",
        switch.port_packets_rec(),
        switch.port_packets_drop()
    );
    println!(
        "\tTotal packets received and dropped across all VOQs = {}, {}",
        switch.voq_packets_rec(),
        switch.voq_packets_drop()
    );
    println!("\tTotal packets received at sink = {}", sink.packets_rec());
    println!(
        "\tMean port-to-port latency = {:.4e} s",
        mean(&sink.waits())
    );
    println!(
        "\tMean queueing delay = {:.4e} s",
        mean(&sink.queue_waits())
    );
    println!(
        "\tMean contention delay = {:.4e} s",
        mean(&sink.contention_waits())
    );

    let throughput_bytes_s = switch.monitor().mean_throughput();
    println!(
        "\tMean throughput = {:.2}/s ({:.3e} bit/s)",
        adjusted_bytes(throughput_bytes_s),
        throughput_bytes_s * 8.0
    );
}

fn adjusted_bytes(num_bytes: f64) -> AdjustedByte {
    // Convert to a binary-only unit (KiB, MiB, etc)
    Byte::from_f64(num_bytes.max(0.0))
        .unwrap()
        .get_appropriate_unit(UnitType::Binary)
}
