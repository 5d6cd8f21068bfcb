// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! String operators through the full machine.

use super::{expect_int, expect_stack, operands, run};
use crate::composite::string;
use crate::object::Object;

#[test]
fn length_of_a_literal() {
    // The canonical scenario: (hello) length leaves 5.
    expect_int("(hello) length", 5);
    expect_int("() length", 0);
    expect_int("/abc length", 3);
}

#[test]
fn get_and_put() {
    expect_int("(abc) 1 get", 98);
    let ctx = run("(abc) dup 0 88 put");
    let s = operands(&ctx)[0];
    assert_eq!(string::bytes(&ctx, s).unwrap(), b"Xbc");
}

#[test]
fn intervals_share_storage() {
    let ctx = run("(hello world) 6 5 getinterval");
    let s = operands(&ctx)[0];
    assert_eq!(string::bytes(&ctx, s).unwrap(), b"world");

    let ctx = run("(xxxxx) dup 1 (abc) putinterval");
    let s = operands(&ctx)[0];
    assert_eq!(string::bytes(&ctx, s).unwrap(), b"xabcx");
}

#[test]
fn string_allocates_zeroed() {
    let ctx = run("4 string");
    let s = operands(&ctx)[0];
    assert_eq!(string::bytes(&ctx, s).unwrap(), &[0, 0, 0, 0]);
}

#[test]
fn search_splits_matches() {
    let ctx = run("(abcdef) (cd) search");
    let stack = operands(&ctx);
    assert_eq!(stack.len(), 4);
    assert_eq!(string::bytes(&ctx, stack[0]).unwrap(), b"ef");
    assert_eq!(string::bytes(&ctx, stack[1]).unwrap(), b"cd");
    assert_eq!(string::bytes(&ctx, stack[2]).unwrap(), b"ab");
    assert_eq!(stack[3], Object::boolean(true));

    let ctx = run("(abcdef) (zz) search");
    let stack = operands(&ctx);
    assert_eq!(stack.len(), 2);
    assert_eq!(string::bytes(&ctx, stack[0]).unwrap(), b"abcdef");
    assert_eq!(stack[1], Object::boolean(false));
}

#[test]
fn anchorsearch_matches_prefixes_only() {
    let ctx = run("(abcdef) (ab) anchorsearch");
    let stack = operands(&ctx);
    assert_eq!(stack.len(), 3);
    assert_eq!(string::bytes(&ctx, stack[0]).unwrap(), b"cdef");
    assert_eq!(string::bytes(&ctx, stack[1]).unwrap(), b"ab");
    assert_eq!(stack[2], Object::boolean(true));

    expect_stack(
        "(abcdef) (cd) anchorsearch exch pop",
        &[Object::boolean(false)],
    );
}

#[test]
fn copy_returns_the_filled_prefix() {
    let ctx = run("(ab) (xyzw) copy");
    let s = operands(&ctx)[0];
    assert_eq!(string::bytes(&ctx, s).unwrap(), b"ab");
}

#[test]
fn hex_strings_execute_like_strings() {
    expect_int("<414243> length", 3);
    expect_int("<41> 0 get", 65);
}
