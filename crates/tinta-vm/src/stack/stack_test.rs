// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for segmented stacks.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::{SEGMENT_CAPACITY, depth, get, init, peek, pop, push, segments, truncate};
use crate::mem::Mem;
use crate::object::{Bank, Object};

#[test]
fn push_pop_lifo() {
    let mut mem = Mem::create(Bank::Local, 64 * 1024);
    let stack = init(&mut mem).unwrap();
    push(&mut mem, stack, Object::integer(1)).unwrap();
    push(&mut mem, stack, Object::integer(2)).unwrap();
    push(&mut mem, stack, Object::integer(3)).unwrap();
    assert_eq!(depth(&mem, stack).unwrap(), 3);
    assert_eq!(pop(&mut mem, stack).unwrap(), Some(Object::integer(3)));
    assert_eq!(pop(&mut mem, stack).unwrap(), Some(Object::integer(2)));
    assert_eq!(pop(&mut mem, stack).unwrap(), Some(Object::integer(1)));
    assert_eq!(pop(&mut mem, stack).unwrap(), None);
}

#[test]
fn peek_and_get() {
    let mut mem = Mem::create(Bank::Local, 64 * 1024);
    let stack = init(&mut mem).unwrap();
    for n in 0..5 {
        push(&mut mem, stack, Object::integer(n)).unwrap();
    }
    assert_eq!(peek(&mem, stack, 0).unwrap(), Some(Object::integer(4)));
    assert_eq!(peek(&mem, stack, 4).unwrap(), Some(Object::integer(0)));
    assert_eq!(peek(&mem, stack, 5).unwrap(), None);
    assert_eq!(get(&mem, stack, 0).unwrap(), Some(Object::integer(0)));
    assert_eq!(get(&mem, stack, 4).unwrap(), Some(Object::integer(4)));
}

#[test]
fn segment_boundary_preserves_data() {
    let mut mem = Mem::create(Bank::Local, 256 * 1024);
    let stack = init(&mut mem).unwrap();
    let count = SEGMENT_CAPACITY * 2 + 10;
    for n in 0..count {
        push(&mut mem, stack, Object::integer(n as i32)).unwrap();
    }
    assert_eq!(depth(&mem, stack).unwrap(), count);
    assert_eq!(segments(&mem, stack).unwrap().len(), 3);
    for n in (0..count).rev() {
        assert_eq!(
            pop(&mut mem, stack).unwrap(),
            Some(Object::integer(n as i32)),
            "object {n} lost at a segment boundary"
        );
    }
    assert_eq!(depth(&mem, stack).unwrap(), 0);
    // The chain is retained for reuse.
    assert_eq!(segments(&mem, stack).unwrap().len(), 3);
}

#[test]
fn truncate_to_depth() {
    let mut mem = Mem::create(Bank::Local, 256 * 1024);
    let stack = init(&mut mem).unwrap();
    for n in 0..(SEGMENT_CAPACITY + 20) {
        push(&mut mem, stack, Object::integer(n as i32)).unwrap();
    }
    truncate(&mut mem, stack, 5).unwrap();
    assert_eq!(depth(&mem, stack).unwrap(), 5);
    assert_eq!(peek(&mem, stack, 0).unwrap(), Some(Object::integer(4)));
    // Push after truncation lands where the old top segment left off.
    push(&mut mem, stack, Object::integer(99)).unwrap();
    assert_eq!(peek(&mem, stack, 0).unwrap(), Some(Object::integer(99)));
    assert_eq!(depth(&mem, stack).unwrap(), 6);
}
