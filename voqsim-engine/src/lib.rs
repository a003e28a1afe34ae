// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

#![doc(test(attr(warn(unused))))]

//! `VOQSIM` - Virtual Output Queue Simulator
//!
//! This library provides the core of the [VOQSIM Engine](crate::engine) which
//! executes the event driven asynchronous simulation processes of an
//! input-queued switch model.
//!
//! The engine is deliberately small: it owns a single virtual
//! [clock](crate::time::clock) measured in seconds, a cooperative
//! single-threaded [executor](crate::executor) and the two handoff
//! primitives every pipeline stage is built from - the unbounded FIFO
//! [`Store`](crate::store::Store) and the capacity-one
//! [`Resource`](crate::resource::Resource).
//!
//! # Simple Application
//!
//! A very simple application would look like:
//!
//! ```rust
//! use voqsim_engine::engine::Engine;
//! use voqsim_engine::run_simulation;
//!
//! let mut engine = Engine::default();
//! let clock = engine.clock();
//! engine.spawn(async move {
//!     clock.wait(1.5).await;
//!     Ok(())
//! });
//! run_simulation!(engine);
//! assert_eq!(engine.time_now_s(), 1.5);
//! ```
//!
//! Processes suspend only at three points: a timed
//! [wait](crate::time::clock::Clock::wait), a blocking
//! [`Store::get`](crate::store::Store::get) and a
//! [`Resource::request`](crate::resource::Resource::request). Exactly one
//! process continuation runs between any two suspension points, so all
//! mutation of shared entities is race-free by construction. Events
//! scheduled for the same virtual time fire in the order they were
//! scheduled, which makes runs fully reproducible for a fixed seed.

pub mod engine;
pub mod events;
pub mod executor;
pub mod resource;
pub mod store;
pub mod test_helpers;
pub mod time;
pub mod traits;
pub mod types;

#[macro_export]
/// Run the simulation, checking for the expected outcome.
macro_rules! run_simulation {
    ($engine:ident) => {
        $engine.run().unwrap();
    };
    ($engine:ident, $expect:expr) => {
        match $engine.run() {
            Ok(()) => panic!("Expected an error!"),
            Err(e) => assert_eq!(format!("{e}").as_str(), $expect),
        }
    };
}

#[macro_export]
/// Take a variable out of a `RefCell<Option<>>`.
macro_rules! take_option {
    ($var:expr) => {
        $var.borrow_mut().take().unwrap()
    };
}
