// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Virtual memory operators: save/restore and bank selection.

use crate::context::Context;
use crate::error::PsError;
use crate::object::{Bank, Object, Payload};
use crate::operator::{TypePattern as T, def_op, sig};

fn op_save(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    let stamp = ctx.do_save()?;
    ctx.push(stamp)
}

fn op_restore(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    ctx.do_restore(args[0])
}

fn op_vmstatus(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    ctx.push(Object::integer(ctx.save_depth() as i32))?;
    ctx.push(Object::integer(ctx.lo.used() as i32))?;
    ctx.push(Object::integer(ctx.lo.capacity() as i32))
}

fn op_setglobal(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    ctx.vm_global = args[0].as_boolean().ok_or(PsError::TypeCheck)?;
    Ok(())
}

fn op_currentglobal(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    ctx.push(Object::boolean(ctx.vm_global))
}

fn op_gcheck(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let global = match args[0].payload() {
        Payload::String(c) | Payload::Array(c) => c.bank == Bank::Global,
        Payload::Dict { bank, .. } | Payload::Name { bank, .. } => bank == Bank::Global,
        _ => true,
    };
    ctx.push(Object::boolean(global))
}

/// Register the VM operators.
pub fn install(ctx: &mut Context) -> Result<(), PsError> {
    def_op(ctx, "save", vec![sig(op_save, 1, &[])])?;
    def_op(ctx, "restore", vec![sig(op_restore, 0, &[T::Save])])?;
    def_op(ctx, "vmstatus", vec![sig(op_vmstatus, 3, &[])])?;
    def_op(ctx, "setglobal", vec![sig(op_setglobal, 0, &[T::Boolean])])?;
    def_op(ctx, "currentglobal", vec![sig(op_currentglobal, 1, &[])])?;
    def_op(ctx, "gcheck", vec![sig(op_gcheck, 1, &[T::Any])])?;
    Ok(())
}
