// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The virtual clock of a simulation.
//!
//! The clock owns the time-ordered queue of pending resumptions. Processes
//! suspend on [`Clock::wait`] futures; the [executor](crate::executor) asks
//! the clock to [advance](Clock::advance) whenever no task is runnable.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use voqsim_track::entity::Entity;
use voqsim_track::set_time;

/// The waker for a task that has been scheduled at a future point in time.
pub struct TaskWaker {
    /// The Waker to use to make the task active again.
    pub waker: Waker,

    /// When a task is scheduled in the future it may be a background task
    /// that will simply run forever, in which case it will set `can_exit` to
    /// true so that it does not keep the simulation alive on its own.
    pub can_exit: bool,
}

/// Shared state between futures using a Clock and the Clock itself.
pub struct ClockState {
    now: RefCell<f64>,

    /// Queue of futures waiting for the right time, one slot per distinct
    /// time. Wakers within a slot are in scheduling order, which is what
    /// makes same-time events fire deterministically.
    pub waiting: RefCell<Vec<Vec<TaskWaker>>>,

    /// Queue of times at which those futures are to be woken. This is kept
    /// sorted descending so that the last entry is the next to be woken.
    pub waiting_times: RefCell<Vec<f64>>,
}

impl ClockState {
    fn schedule(&self, schedule_time: f64, cx: &mut Context<'_>, can_exit: bool) {
        let now = *self.now.borrow();
        if schedule_time < now {
            panic!("schedule at {schedule_time}s which is before the current time {now}s");
        }

        let mut waiting_times = self.waiting_times.borrow_mut();
        let mut waiting = self.waiting.borrow_mut();
        if let Some(index) = waiting_times.iter().position(|&x| x == schedule_time) {
            // Time already exists, add this task
            waiting[index].push(TaskWaker {
                waker: cx.waker().clone(),
                can_exit,
            });
        } else {
            // Time not found, insert at the correct location
            match waiting_times.iter().position(|&x| x < schedule_time) {
                Some(index) => {
                    waiting_times.insert(index, schedule_time);
                    waiting.insert(
                        index,
                        vec![TaskWaker {
                            waker: cx.waker().clone(),
                            can_exit,
                        }],
                    );
                }
                None => {
                    // Earliest time seen so far
                    waiting_times.push(schedule_time);
                    waiting.push(vec![TaskWaker {
                        waker: cx.waker().clone(),
                        can_exit,
                    }]);
                }
            };
        }
    }

    fn advance_time(&self, to_time: f64) {
        if to_time != *self.now.borrow() {
            assert!(
                to_time >= *self.now.borrow(),
                "Time moving backwards: {}s to {}s",
                self.now.borrow(),
                to_time
            );
            *self.now.borrow_mut() = to_time;
        }
    }
}

/// State representing the virtual clock.
#[derive(Clone)]
pub struct Clock {
    pub entity: Rc<Entity>,

    pub shared_state: Rc<ClockState>,
}

impl Clock {
    /// Create a new [Clock] starting at time zero.
    #[must_use]
    pub fn new(parent: &Rc<Entity>) -> Self {
        let shared_state = Rc::new(ClockState {
            now: RefCell::new(0.0),
            waiting: RefCell::new(Vec::new()),
            waiting_times: RefCell::new(Vec::new()),
        });

        Self {
            entity: Rc::new(Entity::new(parent, "time")),
            shared_state,
        }
    }

    /// Returns the current time in virtual seconds.
    #[must_use]
    pub fn time_now_s(&self) -> f64 {
        *self.shared_state.now.borrow()
    }

    /// Returns the time of the next pending resumption, if any.
    #[must_use]
    pub fn time_of_next(&self) -> Option<f64> {
        self.shared_state.waiting_times.borrow().last().copied()
    }

    /// Returns a [ClockDelay] future which must be `await`ed to delay the
    /// specified number of virtual seconds.
    ///
    /// **Panics** if `delay_s` is negative or not finite: that is a
    /// scheduler invariant violation, not an expected outcome.
    #[must_use = "Futures do nothing unless you `.await` or otherwise use them"]
    pub fn wait(&self, delay_s: f64) -> ClockDelay {
        self.delay(delay_s, false)
    }

    /// Returns a [ClockDelay] future which must be `await`ed to delay the
    /// specified number of virtual seconds. However, if the remainder of the
    /// simulation completes then this future is allowed to not complete.
    /// This allows the user to create tasks that run continuously as long as
    /// the rest of the simulation continues to run.
    #[must_use = "Futures do nothing unless you `.await` or otherwise use them"]
    pub fn wait_or_exit(&self, delay_s: f64) -> ClockDelay {
        self.delay(delay_s, true)
    }

    fn delay(&self, delay_s: f64, can_exit: bool) -> ClockDelay {
        let now = self.time_now_s();
        if !(delay_s.is_finite() && delay_s >= 0.0) {
            panic!("{}: invalid delay {delay_s}s requested at {now}s", self.entity);
        }
        ClockDelay {
            shared_state: self.shared_state.clone(),
            until: now + delay_s,
            state: ClockDelayState::Pending,
            can_exit,
        }
    }

    /// The simulation can exit if all scheduled tasks can exit.
    #[must_use]
    pub fn can_exit(&self) -> bool {
        for waiting in self.shared_state.waiting.borrow().iter() {
            for task_waker in waiting {
                if !task_waker.can_exit {
                    // Found one task that must be completed
                    return false;
                }
            }
        }
        true
    }

    /// Advance to the earliest pending time and return the wakers scheduled
    /// for it, in scheduling order.
    ///
    /// Returns `None` when nothing remains that must run, which is how the
    /// executor knows the simulation has finished.
    pub fn advance(&self) -> Option<Vec<TaskWaker>> {
        if self.can_exit() {
            // Only background tasks remain (or nothing at all)
            return None;
        }

        let next_time = self.shared_state.waiting_times.borrow_mut().pop()?;
        let previous = self.time_now_s();
        self.shared_state.advance_time(next_time);
        if previous != next_time {
            set_time!(self.entity ; next_time);
        }
        self.shared_state.waiting.borrow_mut().pop()
    }
}

/// Possible states of a ClockDelay.
enum ClockDelayState {
    Pending,
    Running,
}

/// Future returned by the clock to manage advancing time using async
/// functions.
pub struct ClockDelay {
    shared_state: Rc<ClockState>,
    until: f64,
    state: ClockDelayState,
    can_exit: bool,
}

impl Future for ClockDelay {
    type Output = ();
    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.state {
            ClockDelayState::Pending => {
                self.shared_state.schedule(self.until, cx, self.can_exit);
                self.state = ClockDelayState::Running;
                Poll::Pending
            }
            ClockDelayState::Running => {
                self.shared_state.advance_time(self.until);
                Poll::Ready(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use voqsim_track::entity::toplevel;
    use voqsim_track::tracker::dev_null_tracker;

    use super::*;

    #[test]
    fn starts_at_zero() {
        let top = toplevel(&dev_null_tracker(), "top");
        let clock = Clock::new(&top);
        assert_eq!(clock.time_now_s(), 0.0);
        assert_eq!(clock.time_of_next(), None);
    }

    #[test]
    #[should_panic(expected = "invalid delay")]
    fn negative_delay_panics() {
        let top = toplevel(&dev_null_tracker(), "top");
        let clock = Clock::new(&top);
        let _ = clock.wait(-1.0);
    }
}
