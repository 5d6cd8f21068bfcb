// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Stack operators through the full machine.

use super::{expect_int, expect_stack, operands, run};
use crate::object::{Object, Payload};

#[test]
fn pop_exch_dup() {
    expect_stack("1 2 pop", &[Object::integer(1)]);
    expect_stack("1 2 exch", &[Object::integer(2), Object::integer(1)]);
    expect_stack("7 dup", &[Object::integer(7), Object::integer(7)]);
}

#[test]
fn copy_duplicates_the_top_n() {
    expect_stack(
        "1 2 3 2 copy",
        &[
            Object::integer(1),
            Object::integer(2),
            Object::integer(3),
            Object::integer(2),
            Object::integer(3),
        ],
    );
    expect_stack("1 2 0 copy", &[Object::integer(1), Object::integer(2)]);
}

#[test]
fn index_and_roll() {
    expect_stack(
        "10 20 30 1 index",
        &[
            Object::integer(10),
            Object::integer(20),
            Object::integer(30),
            Object::integer(20),
        ],
    );
    expect_stack(
        "1 2 3 3 1 roll",
        &[Object::integer(3), Object::integer(1), Object::integer(2)],
    );
    expect_stack(
        "1 2 3 3 -1 roll",
        &[Object::integer(2), Object::integer(3), Object::integer(1)],
    );
}

#[test]
fn clear_and_count() {
    expect_stack("1 2 3 clear", &[]);
    expect_stack(
        "5 6 count",
        &[Object::integer(5), Object::integer(6), Object::integer(2)],
    );
}

#[test]
fn marks_and_cleartomark() {
    expect_stack("1 mark 2 3 cleartomark", &[Object::integer(1)]);
    expect_stack(
        "mark 9 8 counttomark",
        &[
            Object::mark(),
            Object::integer(9),
            Object::integer(8),
            Object::integer(2),
        ],
    );
}

#[test]
fn array_literals() {
    let ctx = run("[1 2 3]");
    let stack = operands(&ctx);
    assert_eq!(stack.len(), 1);
    assert!(matches!(stack[0].payload(), Payload::Array(_)));
    assert!(!stack[0].is_executable());
    let elems = crate::composite::array::elements(&ctx, stack[0]).unwrap();
    assert_eq!(
        elems,
        vec![Object::integer(1), Object::integer(2), Object::integer(3)]
    );
}

#[test]
fn empty_array_literal() {
    let ctx = run("[]");
    let stack = operands(&ctx);
    assert_eq!(crate::composite::array::length(stack[0]).unwrap(), 0);
}

#[test]
fn nested_array_literals() {
    let ctx = run("[1 [2 3] 4]");
    let outer = operands(&ctx)[0];
    let elems = crate::composite::array::elements(&ctx, outer).unwrap();
    assert_eq!(elems.len(), 3);
    assert!(matches!(elems[1].payload(), Payload::Array(_)));
}

#[test]
fn array_operators() {
    expect_int("[5 6 7] 1 get", 6);
    expect_int("3 array length", 3);
    expect_stack(
        "[1 2 3] aload pop",
        &[Object::integer(1), Object::integer(2), Object::integer(3)],
    );
    expect_int("1 2 3 3 array astore 2 get", 3);
    expect_int("[1 2 3 4 5] 1 3 getinterval length", 3);
    expect_int("[9 9] dup 0 7 put 0 get", 7);
}

#[test]
fn unmatched_mark_is_an_error() {
    let ctx = run("errordict /unmatchedmark { pop pop (um) } put cleartomark");
    let stack = operands(&ctx);
    assert!(stack.iter().any(|obj| {
        matches!(obj.payload(), Payload::String(_))
            && crate::composite::string::bytes(&ctx, *obj).unwrap() == b"um"
    }));
}
