// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Models of an input-queued switch with virtual output queues.
//!
//! The pipeline simulated by these models is fixed:
//!
//! ```text
//! generator -> lookup port -> VOQ -> shared output resource -> sink
//! ```
//!
//! Each input port has one [packet generator](crate::generator), one
//! byte-limited [lookup stage](crate::lookup) and one
//! [VOQ](crate::voq) per output port. All VOQs targeting the same output
//! contend for that output's exclusive transmitter, modelled by a
//! capacity-one [`Resource`](voqsim_engine::resource::Resource). The
//! [sink](crate::sink) decomposes each packet's latency into queueing,
//! contention and fixed (lookup + serialization) components, and the
//! [monitor](crate::monitor) samples sink byte counts to estimate
//! throughput.
//!
//! Use [`Switch`](crate::switch::Switch) to build and wire the whole
//! pipeline from a validated [`SwitchConfig`](crate::config::SwitchConfig).

pub mod config;
pub mod generator;
pub mod lookup;
pub mod monitor;
pub mod packet;
pub mod sink;
pub mod stats;
pub mod switch;
pub mod voq;
