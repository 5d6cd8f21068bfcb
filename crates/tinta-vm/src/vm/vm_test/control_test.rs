// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Control flow through the full machine.

use super::{expect_int, expect_stack, operands, run};
use crate::object::{Object, Payload};

#[test]
fn if_and_ifelse() {
    expect_int("true { 1 } if", 1);
    expect_stack("false { 1 } if", &[]);
    expect_int("true { 1 } { 2 } ifelse", 1);
    expect_int("false { 1 } { 2 } ifelse", 2);
}

#[test]
fn procedures_are_data_until_invoked() {
    // A procedure inside a procedure lands on the operand stack.
    let ctx = run("true { {42} } if");
    let stack = operands(&ctx);
    assert_eq!(stack.len(), 1);
    assert!(stack[0].is_proc());

    // exec invokes it.
    expect_int("true { {42} } if exec", 42);
}

#[test]
fn exec_of_literals_pushes_them() {
    expect_int("42 exec", 42);
    let ctx = run("/name exec");
    let stack = operands(&ctx);
    assert_eq!(stack.len(), 1);
    assert!(matches!(stack[0].payload(), Payload::Name { .. }));
    assert!(!stack[0].is_executable());
}

#[test]
fn exec_of_executable_strings_scans_them() {
    expect_int("(1 2 add) cvx exec", 3);
}

#[test]
fn bare_executable_strings_are_data() {
    let ctx = run("(abc) cvx");
    let stack = operands(&ctx);
    assert_eq!(stack.len(), 1);
    assert!(matches!(stack[0].payload(), Payload::String(_)));
}

#[test]
fn for_counts_up_and_down() {
    expect_stack(
        "0 1 4 { } for",
        &[
            Object::integer(0),
            Object::integer(1),
            Object::integer(2),
            Object::integer(3),
            Object::integer(4),
        ],
    );
    expect_int("0 1 10 { add } for", 55);
    expect_stack(
        "3 -1 1 { } for",
        &[Object::integer(3), Object::integer(2), Object::integer(1)],
    );
    // Real increments produce reals.
    let ctx = run("0 0.5 1 { } for");
    assert_eq!(operands(&ctx).len(), 3);
}

#[test]
fn for_with_no_iterations() {
    expect_stack("1 1 0 { 99 } for", &[]);
}

#[test]
fn repeat_runs_n_times() {
    expect_int("0 5 { 1 add } repeat", 5);
    expect_stack("0 { 99 } repeat", &[]);
}

#[test]
fn loop_runs_until_exit() {
    expect_int("0 { 1 add dup 5 eq { exit } if } loop", 5);
}

#[test]
fn exit_leaves_outer_loops_running() {
    // The inner repeat is cut by exit; the outer for keeps counting.
    expect_stack(
        "1 1 3 { 10 20 { exit } repeat pop } for",
        &[Object::integer(1), Object::integer(2), Object::integer(3)],
    );
}

#[test]
fn forall_over_arrays() {
    expect_int("0 [1 2 3] { add } forall", 6);
    expect_stack(
        "[1 2] { } forall",
        &[Object::integer(1), Object::integer(2)],
    );
}

#[test]
fn forall_over_strings() {
    expect_int("0 (abc) { add } forall", 294);
}

#[test]
fn forall_over_dicts() {
    // One pair: key and value are pushed.
    let ctx = run("<< /a 7 >> { } forall");
    let stack = operands(&ctx);
    assert_eq!(stack.len(), 2);
    assert!(matches!(stack[0].payload(), Payload::Name { .. }));
    assert_eq!(stack[1], Object::integer(7));
}

#[test]
fn forall_with_exit() {
    expect_int("0 [1 2 3 4] { add dup 3 ge { exit } if } forall", 3);
}

#[test]
fn stopped_catches_stop() {
    expect_stack("{ 1 2 stop 3 } stopped", &[
        Object::integer(1),
        Object::integer(2),
        Object::boolean(true),
    ]);
    expect_stack("{ 4 } stopped", &[Object::integer(4), Object::boolean(false)]);
}

#[test]
fn stopped_on_literals_is_false() {
    expect_stack("42 stopped", &[Object::integer(42), Object::boolean(false)]);
}

#[test]
fn nested_stopped() {
    expect_stack(
        "{ { stop } stopped 7 } stopped",
        &[
            Object::boolean(true),
            Object::integer(7),
            Object::boolean(false),
        ],
    );
}

#[test]
fn countexecstack_counts() {
    let ctx = run("countexecstack");
    // At least the program file is pending.
    assert!(operands(&ctx)[0].as_integer().unwrap() >= 1);
}

#[test]
fn quit_ends_the_program() {
    expect_stack("1 quit 2", &[Object::integer(1)]);
}
