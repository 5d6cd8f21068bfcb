// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Dictionary objects.
//!
//! A dict entity holds `2 * (capacity + 1)` objects: a header pair
//! (current size, capacity) followed by open-addressed (key, value) slot
//! pairs. An empty slot carries a null key (null is not a legal key, so
//! the encoding is unambiguous). Probing is linear with wraparound; a put
//! of a new key into a full dict is `dictfull`.
//!
//! Key semantics: name keys compare by interned id and bank; integer and
//! real keys compare numerically (an integral real hashes like the
//! integer); string keys are interned to names on the way in.

use crate::context::Context;
use crate::error::PsError;
use crate::object::{Bank, EntityId, OBJECT_SIZE, Object, Payload};

const fn header_slot(index: usize) -> usize {
    index
}

const fn key_slot(pair: usize) -> usize {
    2 + 2 * pair
}

const fn value_slot(pair: usize) -> usize {
    2 + 2 * pair + 1
}

fn ids(d: Object) -> Result<(Bank, EntityId), PsError> {
    match d.payload() {
        Payload::Dict { bank, ent } => Ok((bank, ent)),
        _ => Err(PsError::TypeCheck),
    }
}

/// Allocate an empty dict with room for `capacity` pairs in `bank`.
pub fn cons_in(ctx: &mut Context, bank: Bank, capacity: usize) -> Result<Object, PsError> {
    let capacity = capacity.max(1);
    if capacity > usize::from(u16::MAX) {
        return Err(PsError::LimitCheck);
    }
    let slots = 2 * (capacity + 1);
    let ent = ctx.mem_mut(bank).alloc_entity(slots * OBJECT_SIZE)?;
    let mem = ctx.mem_mut(bank);
    mem.write_obj(ent, header_slot(0), Object::integer(0))?;
    mem.write_obj(ent, header_slot(1), Object::integer(capacity as i32))?;
    for pair in 0..capacity {
        mem.write_obj(ent, key_slot(pair), Object::null())?;
        mem.write_obj(ent, value_slot(pair), Object::null())?;
    }
    Ok(Object::dict(bank, ent))
}

/// Allocate a dict in the current allocation bank.
pub fn cons(ctx: &mut Context, capacity: usize) -> Result<Object, PsError> {
    let bank = ctx.current_bank();
    cons_in(ctx, bank, capacity)
}

/// Current number of bindings.
pub fn length(ctx: &Context, d: Object) -> Result<usize, PsError> {
    let (bank, ent) = ids(d)?;
    let size = ctx.mem(bank).read_obj(ent, header_slot(0))?;
    size.as_integer()
        .map(|n| n as usize)
        .ok_or(PsError::VmError)
}

/// Capacity in pairs.
pub fn maxlength(ctx: &Context, d: Object) -> Result<usize, PsError> {
    let (bank, ent) = ids(d)?;
    let cap = ctx.mem(bank).read_obj(ent, header_slot(1))?;
    cap.as_integer()
        .map(|n| n as usize)
        .ok_or(PsError::VmError)
}

/// Canonical key: strings intern to names, anything else passes through
/// as a literal. Null cannot key a binding.
fn normalize_key(ctx: &mut Context, key: Object) -> Result<Object, PsError> {
    match key.payload() {
        Payload::Null | Payload::Invalid => Err(PsError::TypeCheck),
        Payload::String(_) => {
            let bytes = super::string::bytes(ctx, key)?;
            ctx.name_object(&bytes)
        }
        _ => Ok(key.literal()),
    }
}

/// The canonical form a key takes inside a dict (`load`, `where`,
/// `known` need it for their own dictionary-stack searches).
pub fn canonical(ctx: &mut Context, key: Object) -> Result<Object, PsError> {
    normalize_key(ctx, key)
}

fn key_hash(key: Object) -> u32 {
    match key.payload() {
        Payload::Name { id, bank } => id.wrapping_mul(2_654_435_761) ^ (bank as u32),
        Payload::Integer(n) => (n as u32).wrapping_mul(2_654_435_761),
        Payload::Real(r) => {
            // Integral reals must collide with their integer twin.
            if r.fract() == 0.0 && r >= i32::MIN as f32 && r <= i32::MAX as f32 {
                (r as i32 as u32).wrapping_mul(2_654_435_761)
            } else {
                r.to_bits()
            }
        }
        Payload::Boolean(b) => u32::from(b),
        Payload::Operator(op) => u32::from(op) ^ 0x5151_5151,
        Payload::Mark => 3,
        Payload::Save(level) => level ^ 0x7373_7373,
        Payload::Array(c) | Payload::String(c) => {
            c.ent ^ (u32::from(c.off) << 16) ^ u32::from(c.len)
        }
        Payload::Dict { ent, .. } => ent,
        Payload::File(id) => id,
        Payload::Null | Payload::Invalid => 0,
    }
}

enum Probe {
    Found(usize),
    Empty(usize),
    Full,
}

fn probe(ctx: &Context, d: Object, key: Object) -> Result<Probe, PsError> {
    let (bank, ent) = ids(d)?;
    let cap = maxlength(ctx, d)?;
    let start = key_hash(key) as usize % cap;
    let mem = ctx.mem(bank);
    for step in 0..cap {
        let pair = (start + step) % cap;
        let slot_key = mem.read_obj(ent, key_slot(pair))?;
        if matches!(slot_key.payload(), Payload::Null) {
            return Ok(Probe::Empty(pair));
        }
        if slot_key == key {
            return Ok(Probe::Found(pair));
        }
    }
    Ok(Probe::Full)
}

/// Insert or replace a binding.
pub fn put(ctx: &mut Context, d: Object, key: Object, value: Object) -> Result<(), PsError> {
    if !d.is_writable() {
        return Err(PsError::InvalidAccess);
    }
    let (bank, ent) = ids(d)?;
    let key = normalize_key(ctx, key)?;
    match probe(ctx, d, key)? {
        Probe::Found(pair) => {
            ctx.touch(bank, ent);
            ctx.mem_mut(bank).write_obj(ent, value_slot(pair), value)?;
        }
        Probe::Empty(pair) => {
            let size = length(ctx, d)?;
            ctx.touch(bank, ent);
            let mem = ctx.mem_mut(bank);
            mem.write_obj(ent, key_slot(pair), key)?;
            mem.write_obj(ent, value_slot(pair), value)?;
            mem.write_obj(ent, header_slot(0), Object::integer(size as i32 + 1))?;
        }
        Probe::Full => return Err(PsError::DictFull),
    }
    Ok(())
}

/// Look up a binding.
pub fn get(ctx: &mut Context, d: Object, key: Object) -> Result<Option<Object>, PsError> {
    if !d.is_readable() {
        return Err(PsError::InvalidAccess);
    }
    let key = normalize_key(ctx, key)?;
    get_normalized(ctx, d, key)
}

/// Look up a key that is already canonical (hot path: name keys).
pub fn get_normalized(ctx: &Context, d: Object, key: Object) -> Result<Option<Object>, PsError> {
    let (bank, ent) = ids(d)?;
    match probe(ctx, d, key.literal())? {
        Probe::Found(pair) => Ok(Some(ctx.mem(bank).read_obj(ent, value_slot(pair))?)),
        Probe::Empty(_) | Probe::Full => Ok(None),
    }
}

/// Whether a binding exists.
pub fn known(ctx: &mut Context, d: Object, key: Object) -> Result<bool, PsError> {
    Ok(get(ctx, d, key)?.is_some())
}

/// The pair in slot `pair`, if occupied (`forall`, copying, printing).
pub fn nth_pair(ctx: &Context, d: Object, pair: usize) -> Result<Option<(Object, Object)>, PsError> {
    let (bank, ent) = ids(d)?;
    let cap = maxlength(ctx, d)?;
    if pair >= cap {
        return Err(PsError::RangeCheck);
    }
    let mem = ctx.mem(bank);
    let key = mem.read_obj(ent, key_slot(pair))?;
    if matches!(key.payload(), Payload::Null) {
        return Ok(None);
    }
    let value = mem.read_obj(ent, value_slot(pair))?;
    Ok(Some((key, value)))
}

/// Copy every binding of `src` into `dst` (device class instantiation).
pub fn copy_fill(ctx: &mut Context, src: Object, dst: Object) -> Result<(), PsError> {
    let cap = maxlength(ctx, src)?;
    for pair in 0..cap {
        if let Some((key, value)) = nth_pair(ctx, src, pair)? {
            put(ctx, dst, key, value)?;
        }
    }
    Ok(())
}
