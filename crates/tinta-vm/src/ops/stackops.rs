// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Operand stack operators.

use crate::composite::{array, dict, string};
use crate::context::Context;
use crate::error::PsError;
use crate::object::{Object, Payload};
use crate::operator::{TypePattern as T, def_op, sig};
use crate::stack;

fn op_pop(_ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    Ok(())
}

fn op_exch(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    ctx.push(args[1])?;
    ctx.push(args[0])
}

fn op_dup(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    ctx.push(args[0])?;
    ctx.push(args[0])
}

fn op_copy_n(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let n = args[0].as_integer().ok_or(PsError::TypeCheck)?;
    if n < 0 {
        return Err(PsError::RangeCheck);
    }
    let n = n as usize;
    let mut objs = Vec::with_capacity(n);
    for slot in 0..n {
        objs.push(ctx.top(n - 1 - slot)?);
    }
    for obj in objs {
        ctx.push(obj)?;
    }
    Ok(())
}

fn op_copy_arr(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let count = array::length(args[0])?;
    array::putinterval(ctx, args[1], 0, args[0])?;
    ctx.push(array::getinterval(args[1], 0, count)?)
}

fn op_copy_str(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let data = string::bytes(ctx, args[0])?;
    string::putinterval(ctx, args[1], 0, args[0])?;
    ctx.push(string::getinterval(args[1], 0, data.len())?)
}

fn op_copy_dict(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    dict::copy_fill(ctx, args[0], args[1])?;
    ctx.push(args[1])
}

fn op_index(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let n = args[0].as_integer().ok_or(PsError::TypeCheck)?;
    if n < 0 {
        return Err(PsError::RangeCheck);
    }
    let obj = ctx.top(n as usize)?;
    ctx.push(obj)
}

fn op_roll(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let n = args[0].as_integer().ok_or(PsError::TypeCheck)?;
    let j = args[1].as_integer().ok_or(PsError::TypeCheck)?;
    if n < 0 {
        return Err(PsError::RangeCheck);
    }
    let n = n as usize;
    if n == 0 {
        return Ok(());
    }
    let mut objs = Vec::with_capacity(n);
    for slot in 0..n {
        objs.push(ctx.top(n - 1 - slot)?);
    }
    let depth = ctx.os_depth()?;
    stack::truncate(&mut ctx.lo, ctx.os, depth - n)?;
    let shift = (j.rem_euclid(n as i32)) as usize;
    objs.rotate_right(shift);
    for obj in objs {
        ctx.push(obj)?;
    }
    Ok(())
}

fn op_clear(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    stack::truncate(&mut ctx.lo, ctx.os, 0)?;
    Ok(())
}

fn op_count(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    let depth = ctx.os_depth()?;
    ctx.push(Object::integer(depth as i32))
}

fn op_mark(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    ctx.push(Object::mark())
}

/// Index from the top of the topmost mark.
fn find_mark(ctx: &Context) -> Result<usize, PsError> {
    let depth = ctx.os_depth()?;
    for n in 0..depth {
        if matches!(ctx.top(n)?.payload(), Payload::Mark) {
            return Ok(n);
        }
    }
    Err(PsError::UnmatchedMark)
}

fn op_cleartomark(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    let n = find_mark(ctx)?;
    let depth = ctx.os_depth()?;
    stack::truncate(&mut ctx.lo, ctx.os, depth - n - 1)?;
    Ok(())
}

fn op_counttomark(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    let n = find_mark(ctx)?;
    ctx.push(Object::integer(n as i32))
}

/// `]`: gather everything above the topmost mark into a literal array.
fn op_endarray(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    let n = find_mark(ctx)?;
    let mut objs = Vec::with_capacity(n);
    for slot in 0..n {
        objs.push(ctx.top(n - 1 - slot)?);
    }
    let depth = ctx.os_depth()?;
    stack::truncate(&mut ctx.lo, ctx.os, depth - n - 1)?;
    let bank = ctx.current_bank();
    let arr = array::cons_from(ctx, bank, &objs)?;
    ctx.push(arr)
}

/// `>>`: gather key/value pairs above the topmost mark into a dict.
fn op_enddict(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    let n = find_mark(ctx)?;
    if n % 2 != 0 {
        return Err(PsError::RangeCheck);
    }
    let mut objs = Vec::with_capacity(n);
    for slot in 0..n {
        objs.push(ctx.top(n - 1 - slot)?);
    }
    let depth = ctx.os_depth()?;
    stack::truncate(&mut ctx.lo, ctx.os, depth - n - 1)?;
    let d = dict::cons(ctx, (n / 2).max(1))?;
    for pair in objs.chunks_exact(2) {
        dict::put(ctx, d, pair[0], pair[1])?;
    }
    ctx.push(d)
}

/// Register the stack operators.
pub fn install(ctx: &mut Context) -> Result<(), PsError> {
    def_op(ctx, "pop", vec![sig(op_pop, 0, &[T::Any])])?;
    def_op(ctx, "exch", vec![sig(op_exch, 2, &[T::Any, T::Any])])?;
    def_op(ctx, "dup", vec![sig(op_dup, 2, &[T::Any])])?;
    def_op(
        ctx,
        "copy",
        vec![
            sig(op_copy_n, 0, &[T::Integer]),
            sig(op_copy_arr, 1, &[T::Array, T::Array]),
            sig(op_copy_str, 1, &[T::String, T::String]),
            sig(op_copy_dict, 1, &[T::Dict, T::Dict]),
        ],
    )?;
    def_op(ctx, "index", vec![sig(op_index, 1, &[T::Integer])])?;
    def_op(ctx, "roll", vec![sig(op_roll, 0, &[T::Integer, T::Integer])])?;
    def_op(ctx, "clear", vec![sig(op_clear, 0, &[])])?;
    def_op(ctx, "count", vec![sig(op_count, 1, &[])])?;
    def_op(ctx, "mark", vec![sig(op_mark, 1, &[])])?;
    def_op(ctx, "[", vec![sig(op_mark, 1, &[])])?;
    def_op(ctx, "<<", vec![sig(op_mark, 1, &[])])?;
    def_op(ctx, "cleartomark", vec![sig(op_cleartomark, 0, &[])])?;
    def_op(ctx, "counttomark", vec![sig(op_counttomark, 1, &[])])?;
    def_op(ctx, "]", vec![sig(op_endarray, 1, &[])])?;
    def_op(ctx, ">>", vec![sig(op_enddict, 1, &[])])?;
    Ok(())
}
