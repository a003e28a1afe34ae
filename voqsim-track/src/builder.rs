// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Library functions to build trackers as defined by the user.

use std::io;
use std::rc::Rc;

use crate::tracker::{EntityManager, TextTracker, TrackConfigError};
use crate::{Tracker, tracker};

/// Configuration options for the tracker.
pub struct TrackerConfig<'a> {
    /// Enable the stdout tracker.
    pub enable: bool,

    /// Set the level at which the tracker should be enabled.
    pub level: log::Level,

    /// A regular expression to match which entities should have this level
    /// applied.
    pub filter_regex: &'a str,
}

impl Default for TrackerConfig<'_> {
    fn default() -> Self {
        Self {
            enable: false,
            level: log::Level::Warn,
            filter_regex: "",
        }
    }
}

/// Create a tracker that prints to stdout.
///
/// The user can pass a filter regular expression which will set the level only
/// for matching Entities and set all other Entities to only emit errors.
fn build_stdout_tracker(config: &TrackerConfig) -> Result<Tracker, TrackConfigError> {
    let default_level = if config.filter_regex.is_empty() {
        config.level
    } else {
        log::Level::Error
    };

    let mut entity_manager = EntityManager::new(default_level);
    if !config.filter_regex.is_empty() {
        entity_manager.add_entity_level_filter(config.filter_regex, config.level)?;
    }

    let stdout_writer = Box::new(std::io::BufWriter::new(io::stdout()));
    Ok(Rc::new(TextTracker::new(entity_manager, stdout_writer)))
}

/// Set up the tracker according to the command-line arguments.
///
/// When console logging is disabled an error-level stdout tracker is still
/// installed so that fatal messages are not lost.
pub fn setup_tracker(config: &TrackerConfig) -> Result<Tracker, TrackConfigError> {
    if config.enable {
        build_stdout_tracker(config)
    } else {
        Ok(tracker::stdout_tracker(log::Level::Error))
    }
}
