// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering::Release;

use voqsim_track::Tracker;
use voqsim_track::entity::{Entity, toplevel};
use voqsim_track::tracker::stdout_tracker;

use crate::executor::{self, Executor, Spawner};
use crate::time::clock::Clock;
use crate::traits::{Event, Runnable};
use crate::types::{Eventable, SimResult};

pub struct Engine {
    pub executor: Executor,
    pub spawner: Spawner,
    toplevel: Rc<Entity>,
    tracker: Tracker,

    /// Components registered with `register()` and spawned when the
    /// simulation is run.
    runnables: RefCell<Vec<Rc<dyn Runnable>>>,
}

impl Engine {
    /// Create a standalone engine.
    pub fn new(tracker: &Tracker) -> Self {
        let toplevel = toplevel(tracker, "top");
        let (executor, spawner) = executor::new_executor_and_spawner(&toplevel);
        Self {
            executor,
            spawner,
            toplevel,
            tracker: tracker.clone(),
            runnables: RefCell::new(Vec::new()),
        }
    }

    /// Register a component whose `run()` should be spawned when the
    /// simulation starts.
    pub fn register(&self, runnable: Rc<dyn Runnable>) {
        self.runnables.borrow_mut().push(runnable);
    }

    fn spawn_registered(&self) {
        for runnable in self.runnables.borrow_mut().drain(..) {
            self.executor
                .spawn(async move { runnable.run().await });
        }
    }

    /// Run the simulation until no event that must run remains.
    pub fn run(&mut self) -> SimResult {
        // Pass an atomic bool that will never be set to true
        let finished = Rc::new(AtomicBool::new(false));
        self.spawn_registered();
        self.executor.run(finished)
    }

    /// Run the simulation until the given event fires.
    pub fn run_until<T: Default + Copy + 'static>(&mut self, event: Eventable<T>) -> SimResult {
        // Create an atomic bool that is set to true as soon as the event
        // fires.
        let finished = Rc::new(AtomicBool::new(false));
        {
            let finished = finished.clone();
            self.executor.spawn(async move {
                event.listen().await;
                finished.store(true, Release);
                Ok(())
            });
        }

        self.spawn_registered();
        self.executor.run(finished)
    }

    /// Run the simulation for `horizon_s` virtual seconds.
    ///
    /// When the horizon is reached the executor stops draining its event
    /// queue; processes still suspended are abandoned without any cleanup
    /// callbacks.
    pub fn run_for(&mut self, horizon_s: f64) -> SimResult {
        let clock = self.clock();
        let finished = Rc::new(AtomicBool::new(false));
        {
            let finished = finished.clone();
            self.executor.spawn(async move {
                clock.wait(horizon_s).await;
                finished.store(true, Release);
                Ok(())
            });
        }

        self.spawn_registered();
        self.executor.run(finished)
    }

    pub fn spawn(&self, future: impl Future<Output = SimResult> + 'static) {
        self.executor.spawn(future);
    }

    #[must_use]
    pub fn spawner(&self) -> Spawner {
        self.spawner.clone()
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.executor.clock()
    }

    #[must_use]
    pub fn time_now_s(&self) -> f64 {
        self.executor.time_now_s()
    }

    #[must_use]
    pub fn top(&self) -> &Rc<Entity> {
        &self.toplevel
    }

    #[must_use]
    pub fn tracker(&self) -> Tracker {
        self.tracker.clone()
    }
}

/// Create a default engine that sends track events to stdout.
///
/// This is provided to keep documentation examples simple with fewer
/// concepts to have to consider at once.
impl Default for Engine {
    fn default() -> Self {
        let tracker = stdout_tracker(log::Level::Warn);
        Self::new(&tracker)
    }
}
