// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Array objects: object entities with shared-subarray references.
//!
//! An executable array is a procedure; the layout is the same.

use crate::context::Context;
use crate::error::PsError;
use crate::object::{Bank, Composite, OBJECT_SIZE, Object, Payload};

/// Allocate a null-filled array of `len` objects in `bank`.
pub fn cons_in(ctx: &mut Context, bank: Bank, len: usize) -> Result<Object, PsError> {
    if len > usize::from(u16::MAX) {
        return Err(PsError::LimitCheck);
    }
    let ent = ctx.mem_mut(bank).alloc_entity(len * OBJECT_SIZE)?;
    // Slots must be valid objects before anything reads them; zeroed
    // arena bytes are not a valid tagged value.
    for index in 0..len {
        ctx.mem_mut(bank).write_obj(ent, index, Object::null())?;
    }
    Ok(Object::array(Composite {
        bank,
        ent,
        off: 0,
        len: len as u16,
    }))
}

/// Allocate an array in the current allocation bank.
pub fn cons(ctx: &mut Context, len: usize) -> Result<Object, PsError> {
    let bank = ctx.current_bank();
    cons_in(ctx, bank, len)
}

/// Allocate an array holding a copy of `elems`.
pub fn cons_from(ctx: &mut Context, bank: Bank, elems: &[Object]) -> Result<Object, PsError> {
    let obj = cons_in(ctx, bank, elems.len())?;
    let c = span(obj)?;
    for (index, elem) in elems.iter().enumerate() {
        ctx.mem_mut(bank).write_obj(c.ent, index, *elem)?;
    }
    Ok(obj)
}

fn span(a: Object) -> Result<Composite, PsError> {
    match a.payload() {
        Payload::Array(c) => Ok(c),
        _ => Err(PsError::TypeCheck),
    }
}

/// Element at `index` within the array span.
pub fn get(ctx: &Context, a: Object, index: usize) -> Result<Object, PsError> {
    if !a.is_readable() {
        return Err(PsError::InvalidAccess);
    }
    let c = span(a)?;
    if index >= usize::from(c.len) {
        return Err(PsError::RangeCheck);
    }
    Ok(ctx.mem(c.bank).read_obj(c.ent, usize::from(c.off) + index)?)
}

/// Overwrite the element at `index` within the array span.
pub fn put(ctx: &mut Context, a: Object, index: usize, value: Object) -> Result<(), PsError> {
    if !a.is_writable() {
        return Err(PsError::InvalidAccess);
    }
    let c = span(a)?;
    if index >= usize::from(c.len) {
        return Err(PsError::RangeCheck);
    }
    ctx.touch(c.bank, c.ent);
    ctx.mem_mut(c.bank)
        .write_obj(c.ent, usize::from(c.off) + index, value)?;
    Ok(())
}

/// Length of the array span.
pub fn length(a: Object) -> Result<usize, PsError> {
    Ok(usize::from(span(a)?.len))
}

/// Subrange sharing the entity: `getinterval`.
pub fn getinterval(a: Object, index: usize, count: usize) -> Result<Object, PsError> {
    if !a.is_readable() {
        return Err(PsError::InvalidAccess);
    }
    let c = span(a)?;
    let end = index.checked_add(count).ok_or(PsError::RangeCheck)?;
    if end > usize::from(c.len) {
        return Err(PsError::RangeCheck);
    }
    let sub = Object::array(Composite {
        off: c.off + index as u16,
        len: count as u16,
        ..c
    });
    Ok(Object::new(a.flags(), sub.payload()))
}

/// Copy `src`'s elements into `dst` starting at `index`: `putinterval`.
pub fn putinterval(ctx: &mut Context, dst: Object, index: usize, src: Object) -> Result<(), PsError> {
    if !dst.is_writable() {
        return Err(PsError::InvalidAccess);
    }
    let d = span(dst)?;
    let count = length(src)?;
    let end = index.checked_add(count).ok_or(PsError::RangeCheck)?;
    if end > usize::from(d.len) {
        return Err(PsError::RangeCheck);
    }
    for offset in 0..count {
        let elem = get(ctx, src, offset)?;
        ctx.touch(d.bank, d.ent);
        ctx.mem_mut(d.bank)
            .write_obj(d.ent, usize::from(d.off) + index + offset, elem)?;
    }
    Ok(())
}

/// Element access without the read-access check.
///
/// The execution loop steps through execute-only procedures; access
/// attributes restrict programs, not the interpreter itself.
pub fn get_nocheck(ctx: &Context, a: Object, index: usize) -> Result<Object, PsError> {
    let c = span(a)?;
    if index >= usize::from(c.len) {
        return Err(PsError::RangeCheck);
    }
    Ok(ctx.mem(c.bank).read_obj(c.ent, usize::from(c.off) + index)?)
}

/// Subrange without the read-access check (procedure stepping).
pub fn getinterval_nocheck(a: Object, index: usize, count: usize) -> Result<Object, PsError> {
    let c = span(a)?;
    let end = index.checked_add(count).ok_or(PsError::RangeCheck)?;
    if end > usize::from(c.len) {
        return Err(PsError::RangeCheck);
    }
    let sub = Object::array(Composite {
        off: c.off + index as u16,
        len: count as u16,
        ..c
    });
    Ok(Object::new(a.flags(), sub.payload()))
}

/// Copy the whole span into a `Vec` (continuation staging, printing).
pub fn elements(ctx: &Context, a: Object) -> Result<Vec<Object>, PsError> {
    let count = length(a)?;
    let mut out = Vec::with_capacity(count);
    for index in 0..count {
        out.push(get_nocheck(ctx, a, index)?);
    }
    Ok(out)
}
