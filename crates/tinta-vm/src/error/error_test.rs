// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the error system.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::{PsError, handle};
use crate::composite::dict;
use crate::context::{Context, Options};
use crate::mem::MemError;
use crate::names::sysname;
use crate::object::{Bank, Object};

#[test]
fn taxonomy_is_stable() {
    assert_eq!(PsError::all().len(), 27);
    assert_eq!(PsError::TypeCheck.name(), "typecheck");
    assert_eq!(PsError::VmError.name(), "VMerror");
    assert_eq!(PsError::StackUnderflow.name(), "stackunderflow");
    assert_eq!(PsError::Undefined.name(), "undefined");
    // Display matches the PostScript name.
    assert_eq!(format!("{}", PsError::DictFull), "dictfull");
    // Names are pairwise distinct.
    let mut names: Vec<_> = PsError::all().iter().map(|e| e.name()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), 27);
}

#[test]
fn mem_errors_map_to_vm_and_rangecheck() {
    assert_eq!(PsError::from(MemError::BadEntity(3)), PsError::VmError);
    assert_eq!(PsError::from(MemError::Exhausted), PsError::VmError);
    assert_eq!(
        PsError::from(MemError::Bounds { off: 1, len: 2, sz: 1 }),
        PsError::RangeCheck
    );
}

#[test]
fn errordict_has_an_entry_per_error() {
    let mut ctx = Context::create(Options::default()).unwrap();
    for err in PsError::all() {
        let name = ctx.name_object_global(err.name().as_bytes()).unwrap();
        let errordict = ctx.errordict;
        let entry = dict::get(&mut ctx, errordict, name).unwrap();
        let proc = entry.unwrap_or_else(|| panic!("no handler for {}", err.name()));
        assert!(proc.is_proc(), "{} handler is not a procedure", err.name());
    }
}

#[test]
fn handle_fills_dollar_error_and_schedules_the_handler() {
    let mut ctx = Context::create(Options::default()).unwrap();
    ctx.push(Object::integer(11)).unwrap();

    let command = ctx.name_object_global(b"witness").unwrap().executable();
    handle(&mut ctx, PsError::TypeCheck, command);
    assert!(!ctx.dead);

    // $error carries the record.
    let dollar = ctx.dollar_error;
    let newerror = dict::get_normalized(
        &ctx,
        dollar,
        Object::name(sysname::NEWERROR, Bank::Global),
    )
    .unwrap();
    assert_eq!(newerror, Some(Object::boolean(true)));
    let errorname = dict::get_normalized(
        &ctx,
        dollar,
        Object::name(sysname::ERRORNAME, Bank::Global),
    )
    .unwrap()
    .unwrap();
    assert_eq!(ctx.name_bytes(errorname).unwrap(), b"typecheck");
    let recorded = dict::get_normalized(
        &ctx,
        dollar,
        Object::name(sysname::COMMAND, Bank::Global),
    )
    .unwrap()
    .unwrap();
    assert_eq!(recorded, command);

    // The ostack snapshot was taken before command/errname were pushed.
    let ostack = dict::get_normalized(&ctx, dollar, Object::name(sysname::OSTACK, Bank::Global))
        .unwrap()
        .unwrap();
    assert_eq!(crate::composite::array::length(ostack).unwrap(), 1);

    // The handler procedure is scheduled, command and name are pushed.
    assert_eq!(ctx.es_depth().unwrap(), 1);
    assert_eq!(ctx.os_depth().unwrap(), 3);
    assert_eq!(ctx.pop().unwrap(), errorname);
    assert_eq!(ctx.pop().unwrap(), command);
}
