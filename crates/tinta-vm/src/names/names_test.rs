// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for name interning.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;

use super::{NameTable, SYSTEM_NAMES, cons, sysname};
use crate::mem::Mem;
use crate::object::{Bank, Object};

fn tables() -> (NameTable, NameTable, Mem, Mem) {
    (
        NameTable::new(Bank::Global),
        NameTable::new(Bank::Local),
        Mem::create(Bank::Global, 4096),
        Mem::create(Bank::Local, 4096),
    )
}

#[test]
fn interning_is_idempotent() {
    let (mut table, _, mut mem, _) = tables();
    let a = table.cons(&mut mem, b"moveto").unwrap();
    let b = table.cons(&mut mem, b"moveto").unwrap();
    assert_eq!(a, b);
    assert_eq!(table.len(), 1);
    assert_eq!(table.bytes(&mem, a).unwrap(), b"moveto");
}

#[test]
fn distinct_bytes_distinct_ids() {
    let (mut table, _, mut mem, _) = tables();
    let a = table.cons(&mut mem, b"add").unwrap();
    let b = table.cons(&mut mem, b"sub").unwrap();
    assert_ne!(a, b);
}

#[test]
fn system_name_ids_are_stable() {
    let (mut table, _, mut mem, _) = tables();
    for name in SYSTEM_NAMES {
        table.cons(&mut mem, name.as_bytes()).unwrap();
    }
    assert_eq!(table.find(b"Private"), Some(sysname::PRIVATE));
    assert_eq!(table.find(b"width"), Some(sysname::WIDTH));
    assert_eq!(table.find(b"height"), Some(sysname::HEIGHT));
    assert_eq!(table.find(b"DeviceRGB"), Some(sysname::DEVICE_RGB));
    assert_eq!(table.find(b"Emit"), Some(sysname::EMIT));
    assert_eq!(table.find(b"ImgData"), Some(sysname::IMG_DATA));
    assert_eq!(table.find(b"DEVICE"), Some(sysname::DEVICE));
    assert_eq!(table.len(), SYSTEM_NAMES.len());
}

#[test]
fn global_table_is_canonical() {
    let (mut global, mut local, mut gmem, mut lmem) = tables();
    let id = global.cons(&mut gmem, b"add").unwrap();

    // Local-mode consing of a globally known name resolves globally.
    let obj = cons(&mut global, &mut local, &mut gmem, &mut lmem, b"add", false).unwrap();
    assert_eq!(obj, Object::name(id, Bank::Global));
    assert_eq!(local.len(), 0);

    // Unknown names in local mode land in the local table.
    let obj = cons(&mut global, &mut local, &mut gmem, &mut lmem, b"mine", false).unwrap();
    assert_eq!(obj, Object::name(0, Bank::Local));

    // Once local, the same bytes keep resolving locally, not globally.
    let again = cons(&mut global, &mut local, &mut gmem, &mut lmem, b"mine", false).unwrap();
    assert_eq!(obj, again);
}

proptest! {
    #[test]
    fn cons_cons_yields_same_id(bytes in proptest::collection::vec(any::<u8>(), 1..32)) {
        let (mut table, _, mut mem, _) = tables();
        let a = table.cons(&mut mem, &bytes).unwrap();
        let b = table.cons(&mut mem, &bytes).unwrap();
        prop_assert_eq!(a, b);
        prop_assert_eq!(table.bytes(&mem, a).unwrap(), bytes);
    }

    #[test]
    fn id_equality_iff_byte_equality(
        a in proptest::collection::vec(any::<u8>(), 1..16),
        b in proptest::collection::vec(any::<u8>(), 1..16),
    ) {
        let (mut table, _, mut mem, _) = tables();
        let ia = table.cons(&mut mem, &a).unwrap();
        let ib = table.cons(&mut mem, &b).unwrap();
        prop_assert_eq!(ia == ib, a == b);
    }
}
