// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Output operators.

use std::io::Write;

use crate::composite::string;
use crate::context::Context;
use crate::error::PsError;
use crate::object::Object;
use crate::operator::{TypePattern as T, def_op, sig};
use crate::printer;

fn write_stdout(bytes: &[u8]) -> Result<(), PsError> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(bytes).map_err(|_| PsError::IoError)
}

fn op_print(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let bytes = string::bytes(ctx, args[0])?;
    write_stdout(&bytes)
}

fn op_eq_print(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let mut text = printer::simple(ctx, args[0])?;
    text.push('\n');
    write_stdout(text.as_bytes())
}

fn op_eqeq_print(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let mut text = printer::repr(ctx, args[0])?;
    text.push('\n');
    write_stdout(text.as_bytes())
}

fn dump_stack(ctx: &mut Context, f: fn(&Context, Object) -> Result<String, PsError>) -> Result<(), PsError> {
    let depth = ctx.os_depth()?;
    for n in 0..depth {
        let obj = ctx.top(n)?;
        let mut text = f(ctx, obj)?;
        text.push('\n');
        write_stdout(text.as_bytes())?;
    }
    Ok(())
}

fn op_stack(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    dump_stack(ctx, printer::simple)
}

fn op_pstack(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    dump_stack(ctx, printer::repr)
}

fn op_flush(_ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    std::io::stdout().flush().map_err(|_| PsError::IoError)
}

/// Register the output operators.
pub fn install(ctx: &mut Context) -> Result<(), PsError> {
    def_op(ctx, "print", vec![sig(op_print, 0, &[T::String])])?;
    def_op(ctx, "=", vec![sig(op_eq_print, 0, &[T::Any])])?;
    def_op(ctx, "==", vec![sig(op_eqeq_print, 0, &[T::Any])])?;
    def_op(ctx, "stack", vec![sig(op_stack, 0, &[])])?;
    def_op(ctx, "pstack", vec![sig(op_pstack, 0, &[])])?;
    def_op(ctx, "flush", vec![sig(op_flush, 0, &[])])?;
    Ok(())
}
