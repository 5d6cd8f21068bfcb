// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for string objects.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::string;
use crate::context::{Context, Options};
use crate::error::PsError;
use crate::object::Bank;

fn ctx() -> Context {
    Context::bare(Options::default()).unwrap()
}

#[test]
fn cons_and_bytes() {
    let mut ctx = ctx();
    let s = string::cons_from(&mut ctx, Bank::Local, b"hello").unwrap();
    assert_eq!(string::bytes(&ctx, s).unwrap(), b"hello");
    assert_eq!(string::get(&ctx, s, 0).unwrap(), b'h');
    assert_eq!(string::get(&ctx, s, 4).unwrap(), b'o');
}

#[test]
fn put_and_bounds() {
    let mut ctx = ctx();
    let s = string::cons_in(&mut ctx, Bank::Local, 3).unwrap();
    string::put(&mut ctx, s, 0, b'a').unwrap();
    string::put(&mut ctx, s, 2, b'c').unwrap();
    assert_eq!(string::bytes(&ctx, s).unwrap(), b"a\0c");
    assert_eq!(string::put(&mut ctx, s, 3, b'x'), Err(PsError::RangeCheck));
    assert_eq!(string::get(&ctx, s, 3), Err(PsError::RangeCheck));
}

#[test]
fn substrings_share_the_entity() {
    let mut ctx = ctx();
    let s = string::cons_from(&mut ctx, Bank::Local, b"hello world").unwrap();
    let sub = string::getinterval(s, 6, 5).unwrap();
    assert_eq!(string::bytes(&ctx, sub).unwrap(), b"world");

    // Writing through the substring is visible through the whole string.
    string::put(&mut ctx, sub, 0, b'W').unwrap();
    assert_eq!(string::bytes(&ctx, s).unwrap(), b"hello World");

    // Same span compares equal, different span does not.
    assert_eq!(sub, string::getinterval(s, 6, 5).unwrap());
    assert_ne!(sub, string::getinterval(s, 5, 5).unwrap());
}

#[test]
fn putinterval_copies() {
    let mut ctx = ctx();
    let dst = string::cons_from(&mut ctx, Bank::Local, b"xxxxxxxx").unwrap();
    let src = string::cons_from(&mut ctx, Bank::Local, b"abc").unwrap();
    string::putinterval(&mut ctx, dst, 2, src).unwrap();
    assert_eq!(string::bytes(&ctx, dst).unwrap(), b"xxabcxxx");
    assert_eq!(
        string::putinterval(&mut ctx, dst, 7, src),
        Err(PsError::RangeCheck)
    );
}

#[test]
fn access_is_enforced() {
    let mut ctx = ctx();
    let s = string::cons_from(&mut ctx, Bank::Local, b"data").unwrap();
    let ro = s.readonly();
    assert_eq!(string::put(&mut ctx, ro, 0, b'x'), Err(PsError::InvalidAccess));
    assert!(string::bytes(&ctx, ro).is_ok());
    let na = s.noaccess();
    assert_eq!(string::bytes(&ctx, na), Err(PsError::InvalidAccess));
}

#[test]
fn banks_are_independent() {
    let mut ctx = ctx();
    let local = string::cons_from(&mut ctx, Bank::Local, b"local").unwrap();
    let global = string::cons_from(&mut ctx, Bank::Global, b"global").unwrap();
    assert_eq!(string::bytes(&ctx, local).unwrap(), b"local");
    assert_eq!(string::bytes(&ctx, global).unwrap(), b"global");
}
