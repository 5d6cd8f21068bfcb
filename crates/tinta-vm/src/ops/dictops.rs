// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Dictionary operators.

use crate::composite::dict;
use crate::context::Context;
use crate::error::PsError;
use crate::object::Object;
use crate::operator::{TypePattern as T, def_op, sig};

fn op_dict(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let capacity = args[0].as_integer().ok_or(PsError::TypeCheck)?;
    if capacity < 0 {
        return Err(PsError::RangeCheck);
    }
    let d = dict::cons(ctx, capacity as usize)?;
    ctx.push(d)
}

fn op_maxlength(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let cap = dict::maxlength(ctx, args[0])?;
    ctx.push(Object::integer(cap as i32))
}

fn op_begin(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    ctx.ds_push(args[0])
}

fn op_end(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    ctx.ds_pop()?;
    Ok(())
}

fn op_def(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    ctx.def(args[0], args[1])
}

fn op_load(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let key = dict::canonical(ctx, args[0])?;
    let value = ctx.lookup(key)?.ok_or(PsError::Undefined)?;
    ctx.push(value)
}

fn op_store(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let key = dict::canonical(ctx, args[0])?;
    let target = match ctx.lookup_dict(key)? {
        Some(d) => d,
        None => ctx.currentdict()?,
    };
    dict::put(ctx, target, key, args[1])
}

fn op_known(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let known = dict::known(ctx, args[0], args[1])?;
    ctx.push(Object::boolean(known))
}

fn op_where(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let key = dict::canonical(ctx, args[0])?;
    match ctx.lookup_dict(key)? {
        Some(d) => {
            ctx.push(d)?;
            ctx.push(Object::boolean(true))
        }
        None => ctx.push(Object::boolean(false)),
    }
}

fn op_currentdict(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    let d = ctx.currentdict()?;
    ctx.push(d)
}

fn op_countdictstack(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    let depth = ctx.ds_depth()?;
    ctx.push(Object::integer(depth as i32))
}

/// Register the dictionary operators.
pub fn install(ctx: &mut Context) -> Result<(), PsError> {
    def_op(ctx, "dict", vec![sig(op_dict, 1, &[T::Integer])])?;
    def_op(ctx, "maxlength", vec![sig(op_maxlength, 1, &[T::Dict])])?;
    def_op(ctx, "begin", vec![sig(op_begin, 0, &[T::Dict])])?;
    def_op(ctx, "end", vec![sig(op_end, 0, &[])])?;
    def_op(ctx, "def", vec![sig(op_def, 0, &[T::Any, T::Any])])?;
    def_op(ctx, "load", vec![sig(op_load, 1, &[T::Any])])?;
    def_op(ctx, "store", vec![sig(op_store, 0, &[T::Any, T::Any])])?;
    def_op(ctx, "known", vec![sig(op_known, 1, &[T::Dict, T::Any])])?;
    def_op(ctx, "where", vec![sig(op_where, 2, &[T::Any])])?;
    def_op(ctx, "currentdict", vec![sig(op_currentdict, 1, &[])])?;
    def_op(ctx, "countdictstack", vec![sig(op_countdictstack, 1, &[])])?;
    Ok(())
}
