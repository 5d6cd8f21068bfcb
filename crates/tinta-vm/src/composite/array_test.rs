// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for array objects.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::array;
use crate::context::{Context, Options};
use crate::error::PsError;
use crate::object::{Bank, Object, Payload};

fn ctx() -> Context {
    Context::bare(Options::default()).unwrap()
}

#[test]
fn cons_is_null_filled() {
    let mut ctx = ctx();
    let a = array::cons_in(&mut ctx, Bank::Local, 4).unwrap();
    assert_eq!(array::length(a).unwrap(), 4);
    for index in 0..4 {
        assert!(matches!(
            array::get(&ctx, a, index).unwrap().payload(),
            Payload::Null
        ));
    }
}

#[test]
fn put_get_round_trip() {
    let mut ctx = ctx();
    let a = array::cons_in(&mut ctx, Bank::Local, 3).unwrap();
    array::put(&mut ctx, a, 0, Object::integer(10)).unwrap();
    array::put(&mut ctx, a, 1, Object::real(2.5)).unwrap();
    array::put(&mut ctx, a, 2, Object::boolean(true)).unwrap();
    assert_eq!(array::get(&ctx, a, 0).unwrap(), Object::integer(10));
    assert_eq!(array::get(&ctx, a, 1).unwrap(), Object::real(2.5));
    assert_eq!(array::get(&ctx, a, 2).unwrap(), Object::boolean(true));
    assert_eq!(
        array::put(&mut ctx, a, 3, Object::null()),
        Err(PsError::RangeCheck)
    );
}

#[test]
fn arrays_nest() {
    let mut ctx = ctx();
    let inner = array::cons_from(&mut ctx, Bank::Local, &[Object::integer(1)]).unwrap();
    let outer = array::cons_from(&mut ctx, Bank::Local, &[inner, Object::integer(2)]).unwrap();
    let read_back = array::get(&ctx, outer, 0).unwrap();
    assert_eq!(read_back, inner);
    assert_eq!(array::get(&ctx, read_back, 0).unwrap(), Object::integer(1));
}

#[test]
fn subarrays_share_the_entity() {
    let mut ctx = ctx();
    let elems: Vec<_> = (0..6).map(Object::integer).collect();
    let a = array::cons_from(&mut ctx, Bank::Local, &elems).unwrap();
    let sub = array::getinterval(a, 2, 3).unwrap();
    assert_eq!(array::length(sub).unwrap(), 3);
    assert_eq!(array::get(&ctx, sub, 0).unwrap(), Object::integer(2));

    array::put(&mut ctx, sub, 1, Object::integer(99)).unwrap();
    assert_eq!(array::get(&ctx, a, 3).unwrap(), Object::integer(99));
}

#[test]
fn putinterval_copies() {
    let mut ctx = ctx();
    let dst = array::cons_in(&mut ctx, Bank::Local, 5).unwrap();
    let src =
        array::cons_from(&mut ctx, Bank::Local, &[Object::integer(7), Object::integer(8)]).unwrap();
    array::putinterval(&mut ctx, dst, 3, src).unwrap();
    assert_eq!(array::get(&ctx, dst, 3).unwrap(), Object::integer(7));
    assert_eq!(array::get(&ctx, dst, 4).unwrap(), Object::integer(8));
    assert_eq!(
        array::putinterval(&mut ctx, dst, 4, src),
        Err(PsError::RangeCheck)
    );
}

#[test]
fn executable_arrays_are_procedures() {
    let mut ctx = ctx();
    let a = array::cons_in(&mut ctx, Bank::Local, 1).unwrap();
    assert!(!a.is_proc());
    let proc = a.executable();
    assert!(proc.is_proc());
    // Element access ignores the execute-only attribute for the loop.
    let xo = proc.executeonly();
    assert!(array::get(&ctx, xo, 0).is_err());
    assert!(array::get_nocheck(&ctx, xo, 0).is_ok());
}
