// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use voqsim_track::entity::{Entity, toplevel};
use voqsim_track::test_helpers::check_and_clear;
use voqsim_track::{Id, create_id, enter, exit, info, test_init, trace};

#[test]
fn entity_creation() {
    let (test_tracker, tracker) = test_init!(10);

    let top = toplevel(&tracker, "top");
    check_and_clear(&test_tracker, &["0: created 10, top, 0 bytes"]);

    let child = Entity::new(&top, "child");
    check_and_clear(&test_tracker, &["10: created 11, top::child, 0 bytes"]);

    assert_eq!(child.full_name(), "top::child");
    drop(child);
    check_and_clear(&test_tracker, &["11: destroyed 10"]);
}

#[test]
fn log_macros() {
    let (test_tracker, tracker) = test_init!(20);

    let top = toplevel(&tracker, "top");
    check_and_clear(&test_tracker, &["0: created 20, top, 0 bytes"]);

    info!(top ; "hello {}", 42);
    check_and_clear(&test_tracker, &["20:INFO: hello 42"]);

    trace!(top ; "in detail");
    check_and_clear(&test_tracker, &["20:TRACE: in detail"]);
}

#[test]
fn enter_exit() {
    let (test_tracker, tracker) = test_init!(30);

    let top = toplevel(&tracker, "top");
    check_and_clear(&test_tracker, &["0: created 30, top, 0 bytes"]);

    let object: Id = create_id!(top);
    enter!(top ; object);
    exit!(top ; object);
    check_and_clear(&test_tracker, &["30: 31 entered", "30: 31 exited"]);
}
