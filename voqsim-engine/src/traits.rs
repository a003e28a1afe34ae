// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A set of common traits used across the VOQSIM Engine.

use core::mem::size_of;
use std::fmt::{Debug, Display};
use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use voqsim_track::id::Unique;

use crate::types::SimResult;

/// The `TotalBytes` trait is used to determine how many bytes an object
/// represents
///
/// This trait is used to determine how much time an object will take to be
/// serialized onto a link.
pub trait TotalBytes {
    fn total_bytes(&self) -> f64;
}

/// The `Routable` trait provides an interface to an object to enable it to be
/// steered to the right destination queue
pub trait Routable {
    fn dest(&self) -> usize;
}

/// A super-trait that objects that are passed around the simulation have to
/// implement
///
///  - Clone:       It would be nice to use `Copy` instead, but given that
///    things like `Vec` are not `Copy` we have to use `Clone` instead to allow
///    the application to keep copies of objects sent around.
///  - Debug:       In order to print "{:?}" objects have to at least implement
///    Debug.
///  - Routable:    Allows destination queue selection.
///  - TotalBytes:  Allows serialization/drop-policy accounting.
///  - Unique:      Allows for simple logging.
///  - 'static:     Due to the way that futures are implemented, the lifetimes
///    need to be `static.
pub trait SimObject: Clone + Debug + Display + Routable + TotalBytes + Unique + 'static {}

// Implementations for basic types that can be sent around the simulation for
// testing

// i32
impl TotalBytes for i32 {
    fn total_bytes(&self) -> f64 {
        size_of::<i32>() as f64
    }
}

impl Routable for i32 {
    fn dest(&self) -> usize {
        *self as usize
    }
}

impl SimObject for i32 {}

// usize
impl TotalBytes for usize {
    fn total_bytes(&self) -> f64 {
        size_of::<usize>() as f64
    }
}

impl Routable for usize {
    fn dest(&self) -> usize {
        *self
    }
}

impl SimObject for usize {}

/// The `Event` trait defines an object that can be used as an Event
///
/// This is a trait that defines the `listen` function that returns a future
/// so that it can be used in `async` code.
pub trait Event<T> {
    #[must_use = "Futures do nothing unless you `.await` or otherwise use them"]
    fn listen(&self) -> BoxFuture<'static, T>;

    /// Allow cloning of boxed events.
    fn clone_dyn(&self) -> Box<dyn Event<T>>;
}

/// Provide Clone implementation for boxed Event
impl<T> Clone for Box<dyn Event<T>> {
    fn clone(self: &Box<dyn Event<T>>) -> Box<dyn Event<T>> {
        self.clone_dyn()
    }
}

/// An active simulation entity that is started once and runs until the
/// simulation ends.
#[async_trait(?Send)]
pub trait Runnable {
    async fn run(&self) -> SimResult;
}

pub type BoxFuture<'a, T> = Pin<std::boxed::Box<dyn Future<Output = T> + 'a>>;
