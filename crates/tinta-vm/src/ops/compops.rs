// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Composite access operators.
//!
//! `get`, `put`, `getinterval`, `putinterval` and `length` are
//! polymorphic over arrays, dictionaries and strings; the signature list
//! carries the polymorphism.

use crate::composite::{array, dict, string};
use crate::context::Context;
use crate::error::PsError;
use crate::object::{Object, Payload};
use crate::operator::{TypePattern as T, def_op, sig};

fn want_index(obj: Object) -> Result<usize, PsError> {
    let n = obj.as_integer().ok_or(PsError::TypeCheck)?;
    usize::try_from(n).map_err(|_| PsError::RangeCheck)
}

fn op_array(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let len = args[0].as_integer().ok_or(PsError::TypeCheck)?;
    if len < 0 {
        return Err(PsError::RangeCheck);
    }
    let arr = array::cons(ctx, len as usize)?;
    ctx.push(arr)
}

fn op_string(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let len = args[0].as_integer().ok_or(PsError::TypeCheck)?;
    if len < 0 {
        return Err(PsError::RangeCheck);
    }
    let s = string::cons(ctx, len as usize)?;
    ctx.push(s)
}

fn op_get_arr(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let value = array::get(ctx, args[0], want_index(args[1])?)?;
    ctx.push(value)
}

fn op_get_dict(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let value = dict::get(ctx, args[0], args[1])?.ok_or(PsError::Undefined)?;
    ctx.push(value)
}

fn op_get_str(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let byte = string::get(ctx, args[0], want_index(args[1])?)?;
    ctx.push(Object::integer(i32::from(byte)))
}

fn op_put_arr(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    array::put(ctx, args[0], want_index(args[1])?, args[2])
}

fn op_put_dict(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    dict::put(ctx, args[0], args[1], args[2])
}

fn op_put_str(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let byte = args[2].as_integer().ok_or(PsError::TypeCheck)?;
    if !(0..=255).contains(&byte) {
        return Err(PsError::RangeCheck);
    }
    string::put(ctx, args[0], want_index(args[1])?, byte as u8)
}

fn op_getinterval_arr(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let sub = array::getinterval(args[0], want_index(args[1])?, want_index(args[2])?)?;
    ctx.push(sub)
}

fn op_getinterval_str(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let sub = string::getinterval(args[0], want_index(args[1])?, want_index(args[2])?)?;
    ctx.push(sub)
}

fn op_putinterval_arr(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    array::putinterval(ctx, args[0], want_index(args[1])?, args[2])
}

fn op_putinterval_str(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    string::putinterval(ctx, args[0], want_index(args[1])?, args[2])
}

fn op_length(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let len = match args[0].payload() {
        Payload::Array(c) | Payload::String(c) => usize::from(c.len),
        Payload::Dict { .. } => dict::length(ctx, args[0])?,
        Payload::Name { .. } => ctx.name_bytes(args[0])?.len(),
        _ => return Err(PsError::TypeCheck),
    };
    ctx.push(Object::integer(len as i32))
}

fn op_aload(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    for elem in array::elements(ctx, args[0])? {
        ctx.push(elem)?;
    }
    ctx.push(args[0])
}

fn op_astore(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let len = array::length(args[0])?;
    let mut elems = Vec::with_capacity(len);
    for slot in 0..len {
        elems.push(ctx.top(len - 1 - slot)?);
    }
    let depth = ctx.os_depth()?;
    crate::stack::truncate(&mut ctx.lo, ctx.os, depth - len)?;
    for (index, elem) in elems.into_iter().enumerate() {
        array::put(ctx, args[0], index, elem)?;
    }
    ctx.push(args[0])
}

fn search_split(
    ctx: &mut Context,
    haystack: Object,
    position: usize,
    needle_len: usize,
) -> Result<(), PsError> {
    let hay_len = string::bytes(ctx, haystack)?.len();
    let post = string::getinterval(haystack, position + needle_len, hay_len - position - needle_len)?;
    let matched = string::getinterval(haystack, position, needle_len)?;
    let pre = string::getinterval(haystack, 0, position)?;
    ctx.push(post)?;
    ctx.push(matched)?;
    ctx.push(pre)?;
    ctx.push(Object::boolean(true))
}

fn op_search(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let hay = string::bytes(ctx, args[0])?;
    let needle = string::bytes(ctx, args[1])?;
    if needle.len() <= hay.len() {
        if let Some(position) = hay
            .windows(needle.len().max(1))
            .position(|window| window == needle.as_slice())
        {
            return search_split(ctx, args[0], position, needle.len());
        }
    }
    ctx.push(args[0])?;
    ctx.push(Object::boolean(false))
}

fn op_anchorsearch(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let hay = string::bytes(ctx, args[0])?;
    let needle = string::bytes(ctx, args[1])?;
    if needle.len() <= hay.len() && hay[..needle.len()] == needle[..] {
        let post = string::getinterval(args[0], needle.len(), hay.len() - needle.len())?;
        let matched = string::getinterval(args[0], 0, needle.len())?;
        ctx.push(post)?;
        ctx.push(matched)?;
        return ctx.push(Object::boolean(true));
    }
    ctx.push(args[0])?;
    ctx.push(Object::boolean(false))
}

/// Register the composite access operators.
pub fn install(ctx: &mut Context) -> Result<(), PsError> {
    def_op(ctx, "array", vec![sig(op_array, 1, &[T::Integer])])?;
    def_op(ctx, "string", vec![sig(op_string, 1, &[T::Integer])])?;
    def_op(
        ctx,
        "get",
        vec![
            sig(op_get_arr, 1, &[T::Array, T::Integer]),
            sig(op_get_dict, 1, &[T::Dict, T::Any]),
            sig(op_get_str, 1, &[T::String, T::Integer]),
        ],
    )?;
    def_op(
        ctx,
        "put",
        vec![
            sig(op_put_arr, 0, &[T::Array, T::Integer, T::Any]),
            sig(op_put_dict, 0, &[T::Dict, T::Any, T::Any]),
            sig(op_put_str, 0, &[T::String, T::Integer, T::Integer]),
        ],
    )?;
    def_op(
        ctx,
        "getinterval",
        vec![
            sig(op_getinterval_arr, 1, &[T::Array, T::Integer, T::Integer]),
            sig(op_getinterval_str, 1, &[T::String, T::Integer, T::Integer]),
        ],
    )?;
    def_op(
        ctx,
        "putinterval",
        vec![
            sig(op_putinterval_arr, 0, &[T::Array, T::Integer, T::Array]),
            sig(op_putinterval_str, 0, &[T::String, T::Integer, T::String]),
        ],
    )?;
    def_op(ctx, "length", vec![sig(op_length, 1, &[T::Any])])?;
    def_op(ctx, "aload", vec![sig(op_aload, 1, &[T::Array])])?;
    def_op(ctx, "astore", vec![sig(op_astore, 1, &[T::Array])])?;
    def_op(ctx, "search", vec![sig(op_search, 2, &[T::String, T::String])])?;
    def_op(
        ctx,
        "anchorsearch",
        vec![sig(op_anchorsearch, 2, &[T::String, T::String])],
    )?;
    Ok(())
}
