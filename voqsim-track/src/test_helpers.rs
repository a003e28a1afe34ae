// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! This module provides helper functions for testing logging output
//!
//! The aim of this module is to provide commonly-used functions that enable
//! the testing of the output that should appear from the logging macros.

use std::cell::RefCell;

use regex::Regex;

use crate::tracker::Track;
use crate::{Id, Tracker};

/// A tracker that keeps track events in memory.
pub struct TestTracker {
    events: RefCell<Vec<String>>,

    unique_id: RefCell<u64>,
}

impl TestTracker {
    /// Create a new [`Tracker`](crate::Tracker) for the tests.
    ///
    /// This keeps the track events in memory for checking later.
    #[must_use]
    pub fn new(initial_id: u64) -> Self {
        Self {
            events: RefCell::new(Vec::new()),
            unique_id: RefCell::new(initial_id),
        }
    }

    fn add_event(&self, event: String) {
        println!("{event}");
        self.events.borrow_mut().push(event);
    }
}

impl Track for TestTracker {
    fn unique_id(&self) -> Id {
        let mut guard = self.unique_id.borrow_mut();
        let id = *guard;
        *guard += 1;
        Id(id)
    }

    fn is_entity_enabled(&self, _id: Id, _level: log::Level) -> bool {
        true
    }

    fn add_entity(&self, _id: Id, _entity_name: &str) {
        // Do nothing
    }

    fn enter(&self, id: Id, item: Id) {
        self.add_event(format!("{id}: {item} entered"));
    }

    fn exit(&self, id: Id, item: Id) {
        self.add_event(format!("{id}: {item} exited"));
    }

    fn create(&self, created_by: Id, id: Id, num_bytes: usize, name: &str) {
        self.add_event(format!("{created_by}: created {id}, {name}, {num_bytes} bytes"));
    }

    fn destroy(&self, destroyed_by: Id, id: Id) {
        self.add_event(format!("{destroyed_by}: destroyed {id}"));
    }

    fn log(&self, id: Id, level: log::Level, msg: std::fmt::Arguments) {
        self.add_event(format!("{id}:{level}: {msg}"));
    }

    fn time(&self, set_by: Id, time_s: f64) {
        self.add_event(format!("{set_by}: set time {time_s:.9}s"));
    }

    fn shutdown(&self) {
        // Do nothing
    }
}

/// Create a [`Tracker`] for a test.
///
/// Track events go to `stdout` where `cargo test` captures them per test, so
/// they are only shown for failing tests.
#[must_use]
pub fn create_tracker(_test_filepath: &str) -> Tracker {
    crate::tracker::stdout_tracker(log::Level::Warn)
}

/// Initialise the tracking system for tests
///
/// Installs a [`TestTracker`] that records all _track_ events to an in-memory
/// list for checking with [`check_and_clear`].
///
/// # Arguments
///
/// * `start_id` - The ID value to be set as the starting value
#[macro_export]
macro_rules! test_init {
    ($start_id:expr) => {{
        let test_tracker = std::rc::Rc::new($crate::test_helpers::TestTracker::new($start_id));
        let tracker: $crate::Tracker = test_tracker.clone();
        (test_tracker, tracker)
    }};
}

/// Check and clear the _trace_ and _log_ output
///
/// This function asserts that the track events seen since the start or the
/// last time this function was called match the expected regular expressions,
/// then clears the recorded events.
pub fn check_and_clear(tracker: &TestTracker, expected: &[&str]) {
    let mut events = tracker.events.borrow_mut();

    assert_eq!(
        expected.len(),
        events.len(),
        "expected {expected:?}, seen {events:?}"
    );

    for (i, log_expect) in expected.iter().enumerate() {
        let re = Regex::new(log_expect).unwrap();
        let actual = events[i].as_str();
        assert!(re.is_match(actual), "{i}: {log_expect:?} vs {actual:?}");
    }

    events.clear();
}
