// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for memory files and entity tables.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::{EntityFlags, Mem, MemError};
use crate::object::{Bank, Object};

#[test]
fn create_and_alloc() {
    let mut mem = Mem::create(Bank::Local, 1024);
    assert_eq!(mem.used(), 0);
    let a = mem.alloc_entity(100).unwrap();
    let b = mem.alloc_entity(50).unwrap();
    assert_ne!(a, b);
    assert_eq!(mem.used(), 150);
    assert_eq!(mem.entity_size(a).unwrap(), 100);
    assert_eq!(mem.entity_size(b).unwrap(), 50);
}

#[test]
fn byte_round_trip() {
    let mut mem = Mem::create(Bank::Local, 1024);
    let ent = mem.alloc_entity(16).unwrap();
    mem.put_bytes(ent, 4, b"hello").unwrap();
    let mut out = [0u8; 5];
    mem.get_bytes(ent, 4, &mut out).unwrap();
    assert_eq!(&out, b"hello");
}

#[test]
fn bounds_are_enforced() {
    let mut mem = Mem::create(Bank::Local, 1024);
    let ent = mem.alloc_entity(8).unwrap();
    let err = mem.put_bytes(ent, 6, b"xyz").unwrap_err();
    assert!(matches!(err, MemError::Bounds { .. }));
    let mut out = [0u8; 9];
    assert!(mem.get_bytes(ent, 0, &mut out).is_err());
}

#[test]
fn growth_preserves_entities() {
    let mut mem = Mem::create(Bank::Local, 64);
    let ent = mem.alloc_entity(32).unwrap();
    mem.put_bytes(ent, 0, &[0xAB; 32]).unwrap();

    // Force several doublings.
    let big = mem.alloc_entity(4096).unwrap();
    assert!(mem.capacity() >= 4096 + 32);

    let mut out = [0u8; 32];
    mem.get_bytes(ent, 0, &mut out).unwrap();
    assert_eq!(out, [0xAB; 32]);
    // New entity is zero-filled and readable.
    let mut zeros = [0xFFu8; 16];
    mem.get_bytes(big, 4080, &mut zeros).unwrap();
    assert_eq!(zeros, [0u8; 16]);
}

#[test]
fn object_round_trip() {
    let mut mem = Mem::create(Bank::Global, 1024);
    let ent = mem.alloc_entity(crate::object::OBJECT_SIZE * 4).unwrap();
    mem.write_obj(ent, 0, Object::integer(42)).unwrap();
    mem.write_obj(ent, 3, Object::real(1.5).executable()).unwrap();
    assert_eq!(mem.read_obj(ent, 0).unwrap(), Object::integer(42));
    let real = mem.read_obj(ent, 3).unwrap();
    assert_eq!(real, Object::real(1.5));
    assert!(real.is_executable());
    // One past the last slot is out of range.
    assert!(mem.read_obj(ent, 4).is_err());
}

#[test]
fn freed_entities_are_dead() {
    let mut mem = Mem::create(Bank::Local, 256);
    let ent = mem.alloc_entity(8).unwrap();
    mem.free_entity(ent).unwrap();
    assert!(matches!(mem.entity(ent), Err(MemError::BadEntity(_))));
    assert!(mem.get_bytes(ent, 0, &mut [0u8; 1]).is_err());
}

#[test]
fn realloc_preserves_prefix() {
    let mut mem = Mem::create(Bank::Local, 256);
    let ent = mem.alloc_entity(8).unwrap();
    mem.put_bytes(ent, 0, b"abcdefgh").unwrap();
    mem.realloc_entity(ent, 32).unwrap();
    let mut out = [0u8; 8];
    mem.get_bytes(ent, 0, &mut out).unwrap();
    assert_eq!(&out, b"abcdefgh");
    let mut tail = [0xFFu8; 8];
    mem.get_bytes(ent, 24, &mut tail).unwrap();
    assert_eq!(tail, [0u8; 8]);
}

#[test]
fn undo_bookkeeping() {
    let mut mem = Mem::create(Bank::Local, 256);
    let old = mem.alloc_entity(8).unwrap();
    mem.set_save_level(1);
    let young = mem.alloc_entity(8).unwrap();

    assert!(mem.needs_undo(old, 1));
    assert!(!mem.needs_undo(young, 1));

    let snap = mem.snapshot_entity(old).unwrap();
    mem.mark_saved(old, 1);
    assert!(!mem.needs_undo(old, 1));

    mem.put_bytes(old, 0, b"mutated!").unwrap();
    mem.restore_entity(old, &snap).unwrap();
    let mut out = [0u8; 8];
    mem.get_bytes(old, 0, &mut out).unwrap();
    assert_eq!(out, [0u8; 8]);
}

#[test]
fn reclaim_drops_young_entities_but_keeps_stacks() {
    let mut mem = Mem::create(Bank::Local, 1024);
    let old = mem.alloc_entity(8).unwrap();
    let cut = mem.table_len();
    let used_before = mem.used();

    let young = mem.alloc_entity(8).unwrap();
    let seg = mem
        .alloc_entity_flagged(64, EntityFlags::STACK)
        .unwrap();
    let younger = mem.alloc_entity(8).unwrap();

    assert!(mem.survives_reclaim(old, cut));
    assert!(mem.survives_reclaim(seg, cut));
    assert!(!mem.survives_reclaim(young, cut));

    mem.reclaim_from(cut);
    assert!(mem.entity(old).is_ok());
    assert!(mem.entity(seg).is_ok());
    assert!(mem.entity(young).is_err());
    assert!(mem.entity(younger).is_err());
    // The tail past the stack segment was handed back to the bump pointer.
    assert!(mem.used() > used_before);
    assert!(mem.table_len() > cut);
}

#[test]
fn reclaim_without_stacks_truncates_fully() {
    let mut mem = Mem::create(Bank::Local, 1024);
    let _old = mem.alloc_entity(8).unwrap();
    let cut = mem.table_len();
    let used = mem.used();
    let _young_a = mem.alloc_entity(8).unwrap();
    let _young_b = mem.alloc_entity(8).unwrap();
    mem.reclaim_from(cut);
    assert_eq!(mem.table_len(), cut);
    assert_eq!(mem.used(), used);
}
