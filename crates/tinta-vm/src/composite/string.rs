// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! String objects: byte entities with shared-substring references.

use crate::context::Context;
use crate::error::PsError;
use crate::object::{Bank, Composite, Object, Payload};

/// Allocate a zero-filled string of `len` bytes in `bank`.
pub fn cons_in(ctx: &mut Context, bank: Bank, len: usize) -> Result<Object, PsError> {
    if len > usize::from(u16::MAX) {
        return Err(PsError::LimitCheck);
    }
    let ent = ctx.mem_mut(bank).alloc_entity(len)?;
    Ok(Object::string(Composite {
        bank,
        ent,
        off: 0,
        len: len as u16,
    }))
}

/// Allocate a string in the current allocation bank.
pub fn cons(ctx: &mut Context, len: usize) -> Result<Object, PsError> {
    let bank = ctx.current_bank();
    cons_in(ctx, bank, len)
}

/// Allocate a string holding a copy of `bytes`.
pub fn cons_from(ctx: &mut Context, bank: Bank, bytes: &[u8]) -> Result<Object, PsError> {
    let obj = cons_in(ctx, bank, bytes.len())?;
    let span = span(obj)?;
    ctx.mem_mut(bank).put_bytes(span.ent, 0, bytes)?;
    Ok(obj)
}

fn span(s: Object) -> Result<Composite, PsError> {
    match s.payload() {
        Payload::String(c) => Ok(c),
        _ => Err(PsError::TypeCheck),
    }
}

/// Byte at `index` within the string span.
pub fn get(ctx: &Context, s: Object, index: usize) -> Result<u8, PsError> {
    if !s.is_readable() {
        return Err(PsError::InvalidAccess);
    }
    let c = span(s)?;
    if index >= usize::from(c.len) {
        return Err(PsError::RangeCheck);
    }
    let mut byte = [0u8];
    ctx.mem(c.bank)
        .get_bytes(c.ent, usize::from(c.off) + index, &mut byte)?;
    Ok(byte[0])
}

/// Overwrite the byte at `index` within the string span.
pub fn put(ctx: &mut Context, s: Object, index: usize, byte: u8) -> Result<(), PsError> {
    if !s.is_writable() {
        return Err(PsError::InvalidAccess);
    }
    let c = span(s)?;
    if index >= usize::from(c.len) {
        return Err(PsError::RangeCheck);
    }
    ctx.touch(c.bank, c.ent);
    ctx.mem_mut(c.bank)
        .put_bytes(c.ent, usize::from(c.off) + index, &[byte])?;
    Ok(())
}

/// Copy of the string's bytes.
pub fn bytes(ctx: &Context, s: Object) -> Result<Vec<u8>, PsError> {
    if !s.is_readable() {
        return Err(PsError::InvalidAccess);
    }
    let c = span(s)?;
    let mut out = vec![0; usize::from(c.len)];
    ctx.mem(c.bank).get_bytes(c.ent, usize::from(c.off), &mut out)?;
    Ok(out)
}

/// Subrange sharing the entity: `getinterval`.
pub fn getinterval(s: Object, index: usize, count: usize) -> Result<Object, PsError> {
    let c = span(s)?;
    if !s.is_readable() {
        return Err(PsError::InvalidAccess);
    }
    let end = index.checked_add(count).ok_or(PsError::RangeCheck)?;
    if end > usize::from(c.len) {
        return Err(PsError::RangeCheck);
    }
    let sub = Object::string(Composite {
        off: c.off + index as u16,
        len: count as u16,
        ..c
    });
    Ok(Object::new(s.flags(), sub.payload()))
}

/// Write raw bytes into a string (`cvs`, `cvrs`, device records).
pub fn put_bytes(ctx: &mut Context, dst: Object, index: usize, data: &[u8]) -> Result<(), PsError> {
    if !dst.is_writable() {
        return Err(PsError::InvalidAccess);
    }
    let d = span(dst)?;
    let end = index.checked_add(data.len()).ok_or(PsError::RangeCheck)?;
    if end > usize::from(d.len) {
        return Err(PsError::RangeCheck);
    }
    ctx.touch(d.bank, d.ent);
    ctx.mem_mut(d.bank)
        .put_bytes(d.ent, usize::from(d.off) + index, data)?;
    Ok(())
}

/// Copy `src`'s bytes into `dst` starting at `index`: `putinterval`.
pub fn putinterval(ctx: &mut Context, dst: Object, index: usize, src: Object) -> Result<(), PsError> {
    if !dst.is_writable() {
        return Err(PsError::InvalidAccess);
    }
    let d = span(dst)?;
    let data = bytes(ctx, src)?;
    let end = index.checked_add(data.len()).ok_or(PsError::RangeCheck)?;
    if end > usize::from(d.len) {
        return Err(PsError::RangeCheck);
    }
    ctx.touch(d.bank, d.ent);
    ctx.mem_mut(d.bank)
        .put_bytes(d.ent, usize::from(d.off) + index, &data)?;
    Ok(())
}
