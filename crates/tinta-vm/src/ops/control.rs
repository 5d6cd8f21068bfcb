// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Control flow operators.
//!
//! Loops never recurse into the host: each cycle schedules itself on the
//! execution stack. The continuation opcode goes deepest, the loop state
//! rides above it as literal objects, and the body procedure sits on top.
//! When the body finishes, the execution loop ferries the state literals
//! to the operand stack, where the continuation operator picks them up
//! and schedules the next cycle:
//!
//! ```text
//! execution stack (top first), one `for` cycle:
//!   proc        <- runs now (executable array)
//!   next        <- literal state, moves to the operand stack
//!   increment
//!   limit
//!   proc'       <- the body again, staged as a literal
//!   .forcont    <- picks the four up and schedules the next cycle
//! ```
//!
//! `exit` cuts the execution stack down through the nearest continuation
//! opcode; `stop` cuts down through the nearest `stopped` barrier.

use std::rc::Rc;
use tracing::error;

use crate::composite::{array, dict, string};
use crate::context::Context;
use crate::error::PsError;
use crate::names::sysname;
use crate::object::{Bank, Object, Opcode, Payload};
use crate::operator::{TypePattern as T, def_op, def_op_hidden, sig};
use crate::printer;
use crate::stack;

fn op_exec(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let obj = args[0];
    // An executable string is a token source, not a value.
    if obj.is_executable() && matches!(obj.payload(), Payload::String(_)) {
        let bytes = string::bytes(ctx, obj)?;
        let id = ctx.file_open(Rc::from(bytes.as_slice()), "%exec");
        return ctx.es_push(Object::file(id));
    }
    ctx.es_push(obj)
}

fn op_if(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let cond = args[0].as_boolean().ok_or(PsError::TypeCheck)?;
    if cond {
        ctx.es_push(args[1])?;
    }
    Ok(())
}

fn op_ifelse(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let cond = args[0].as_boolean().ok_or(PsError::TypeCheck)?;
    ctx.es_push(if cond { args[1] } else { args[2] })
}

/// Numeric add that stays integral for two integers.
fn step_add(a: Object, b: Object) -> Result<Object, PsError> {
    match (a.payload(), b.payload()) {
        (Payload::Integer(x), Payload::Integer(y)) => {
            match x.checked_add(y) {
                Some(sum) => Ok(Object::integer(sum)),
                None => Ok(Object::real(x as f32 + y as f32)),
            }
        }
        _ => {
            let x = a.as_number().ok_or(PsError::TypeCheck)?;
            let y = b.as_number().ok_or(PsError::TypeCheck)?;
            Ok(Object::real((x + y) as f32))
        }
    }
}

fn for_cycle(
    ctx: &mut Context,
    current: Object,
    incr: Object,
    limit: Object,
    proc: Object,
) -> Result<(), PsError> {
    let c = current.as_number().ok_or(PsError::TypeCheck)?;
    let i = incr.as_number().ok_or(PsError::TypeCheck)?;
    let l = limit.as_number().ok_or(PsError::TypeCheck)?;
    if (i >= 0.0 && c > l) || (i < 0.0 && c < l) {
        return Ok(());
    }
    let opcode = ctx.known.forcont.ok_or(PsError::Unregistered)?;
    ctx.push(current)?;
    ctx.es_push(Object::operator(opcode))?;
    ctx.es_push(proc.literal())?;
    ctx.es_push(limit)?;
    ctx.es_push(incr)?;
    ctx.es_push(step_add(current, incr)?)?;
    ctx.es_push(proc.executable())?;
    Ok(())
}

fn op_for(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    for_cycle(ctx, args[0], args[1], args[2], args[3])
}

fn op_forcont(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    for_cycle(ctx, args[0], args[1], args[2], args[3])
}

fn repeat_cycle(ctx: &mut Context, count: i32, proc: Object) -> Result<(), PsError> {
    if count <= 0 {
        return Ok(());
    }
    let opcode = ctx.known.repeatcont.ok_or(PsError::Unregistered)?;
    ctx.es_push(Object::operator(opcode))?;
    ctx.es_push(proc.literal())?;
    ctx.es_push(Object::integer(count - 1))?;
    ctx.es_push(proc.executable())?;
    Ok(())
}

fn op_repeat(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let count = args[0].as_integer().ok_or(PsError::TypeCheck)?;
    if count < 0 {
        return Err(PsError::RangeCheck);
    }
    repeat_cycle(ctx, count, args[1])
}

fn op_repeatcont(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let count = args[0].as_integer().ok_or(PsError::TypeCheck)?;
    repeat_cycle(ctx, count, args[1])
}

fn loop_cycle(ctx: &mut Context, proc: Object) -> Result<(), PsError> {
    let opcode = ctx.known.loopcont.ok_or(PsError::Unregistered)?;
    ctx.es_push(Object::operator(opcode))?;
    ctx.es_push(proc.literal())?;
    ctx.es_push(proc.executable())?;
    Ok(())
}

fn op_loop(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    loop_cycle(ctx, args[0])
}

fn op_loopcont(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    loop_cycle(ctx, args[0])
}

fn forall_array_cycle(
    ctx: &mut Context,
    container: Object,
    index: i32,
    proc: Object,
) -> Result<(), PsError> {
    let len = array::length(container)?;
    if index as usize >= len {
        return Ok(());
    }
    let elem = array::get_nocheck(ctx, container, index as usize)?;
    let opcode = ctx.known.forallarr.ok_or(PsError::Unregistered)?;
    ctx.push(elem)?;
    ctx.es_push(Object::operator(opcode))?;
    ctx.es_push(proc.literal())?;
    ctx.es_push(Object::integer(index + 1))?;
    ctx.es_push(container.literal())?;
    ctx.es_push(proc.executable())?;
    Ok(())
}

fn forall_dict_cycle(
    ctx: &mut Context,
    container: Object,
    slot: i32,
    proc: Object,
) -> Result<(), PsError> {
    let cap = dict::maxlength(ctx, container)?;
    let mut slot = slot as usize;
    while slot < cap {
        if let Some((key, value)) = dict::nth_pair(ctx, container, slot)? {
            let opcode = ctx.known.foralldict.ok_or(PsError::Unregistered)?;
            ctx.push(key)?;
            ctx.push(value)?;
            ctx.es_push(Object::operator(opcode))?;
            ctx.es_push(proc.literal())?;
            ctx.es_push(Object::integer(slot as i32 + 1))?;
            ctx.es_push(container)?;
            ctx.es_push(proc.executable())?;
            return Ok(());
        }
        slot += 1;
    }
    Ok(())
}

fn forall_string_cycle(
    ctx: &mut Context,
    container: Object,
    index: i32,
    proc: Object,
) -> Result<(), PsError> {
    let data = string::bytes(ctx, container)?;
    let Some(byte) = data.get(index as usize).copied() else {
        return Ok(());
    };
    let opcode = ctx.known.forallstr.ok_or(PsError::Unregistered)?;
    ctx.push(Object::integer(i32::from(byte)))?;
    ctx.es_push(Object::operator(opcode))?;
    ctx.es_push(proc.literal())?;
    ctx.es_push(Object::integer(index + 1))?;
    ctx.es_push(container.literal())?;
    ctx.es_push(proc.executable())?;
    Ok(())
}

fn op_forall_arr(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    forall_array_cycle(ctx, args[0], 0, args[1])
}

fn op_forall_dict(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    forall_dict_cycle(ctx, args[0], 0, args[1])
}

fn op_forall_str(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    forall_string_cycle(ctx, args[0], 0, args[1])
}

fn op_forallarr_cont(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let index = args[1].as_integer().ok_or(PsError::TypeCheck)?;
    forall_array_cycle(ctx, args[0], index, args[2])
}

fn op_foralldict_cont(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let slot = args[1].as_integer().ok_or(PsError::TypeCheck)?;
    forall_dict_cycle(ctx, args[0], slot, args[2])
}

fn op_forallstr_cont(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let index = args[1].as_integer().ok_or(PsError::TypeCheck)?;
    forall_string_cycle(ctx, args[0], index, args[2])
}

fn is_loop_cont(ctx: &Context, opcode: Opcode) -> bool {
    [
        ctx.known.forcont,
        ctx.known.repeatcont,
        ctx.known.loopcont,
        ctx.known.forallarr,
        ctx.known.foralldict,
        ctx.known.forallstr,
    ]
    .iter()
    .any(|known| *known == Some(opcode))
}

fn op_exit(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    let depth = ctx.es_depth()?;
    for n in 0..depth {
        let Some(obj) = stack::peek(&ctx.lo, ctx.es, n)? else {
            break;
        };
        if let Payload::Operator(opcode) = obj.payload() {
            if ctx.known.stopfalse == Some(opcode) {
                // A stopped barrier shields its caller from exit.
                return Err(PsError::InvalidExit);
            }
            if is_loop_cont(ctx, opcode) {
                stack::truncate(&mut ctx.lo, ctx.es, depth - n - 1)?;
                return Ok(());
            }
        }
    }
    Err(PsError::InvalidExit)
}

/// Unwind to the nearest `stopped` barrier; `true` on the operand stack
/// tells `stopped` that a stop happened. Without a barrier the program
/// terminates.
pub fn unwind_stop(ctx: &mut Context) -> Result<(), PsError> {
    let depth = ctx.es_depth()?;
    for n in 0..depth {
        let Some(obj) = stack::peek(&ctx.lo, ctx.es, n)? else {
            break;
        };
        if let Payload::Operator(opcode) = obj.payload() {
            if ctx.known.stopfalse == Some(opcode) {
                stack::truncate(&mut ctx.lo, ctx.es, depth - n - 1)?;
                return ctx.push(Object::boolean(true));
            }
        }
    }
    ctx.quit = true;
    Ok(())
}

fn op_stop(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    unwind_stop(ctx)
}

fn op_stopped(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let opcode = ctx.known.stopfalse.ok_or(PsError::Unregistered)?;
    ctx.es_push(Object::operator(opcode))?;
    ctx.es_push(args[0])
}

fn op_stopfalse(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    ctx.push(Object::boolean(false))
}

fn op_countexecstack(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    let depth = ctx.es_depth()?;
    ctx.push(Object::integer(depth as i32))
}

fn op_quit(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    ctx.quit = true;
    Ok(())
}

/// The default errordict entry: report and stop.
fn op_defaulterror(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let command = args[0];
    let errname = args[1];
    if ctx.options.messages >= crate::context::MessageLevel::Verbose {
        let name = printer::repr(ctx, errname).unwrap_or_else(|_| "?".into());
        let cmd = printer::repr(ctx, command).unwrap_or_else(|_| "?".into());
        let mut dump = String::new();
        if let Ok(depth) = ctx.os_depth() {
            for n in (0..depth).rev() {
                if let Ok(obj) = ctx.top(n) {
                    if !dump.is_empty() {
                        dump.push(' ');
                    }
                    dump.push_str(&printer::repr(ctx, obj).unwrap_or_else(|_| "?".into()));
                }
            }
        }
        error!("%%[ Error: {name}; OffendingCommand: {cmd} ]%%");
        error!("operand stack: {dump}");
    }
    let dollar = ctx.dollar_error;
    dict::put(
        ctx,
        dollar,
        Object::name(sysname::NEWERROR, Bank::Global),
        Object::boolean(false),
    )?;
    unwind_stop(ctx)
}

/// Register the control operators and their continuations.
pub fn install(ctx: &mut Context) -> Result<(), PsError> {
    let nnn: &[T] = &[T::Number, T::Number, T::Number, T::Array];
    ctx.known.forcont = Some(def_op_hidden(ctx, ".forcont", vec![sig(op_forcont, 0, nnn)])?);
    ctx.known.repeatcont = Some(def_op_hidden(
        ctx,
        ".repeatcont",
        vec![sig(op_repeatcont, 0, &[T::Integer, T::Array])],
    )?);
    ctx.known.loopcont = Some(def_op_hidden(
        ctx,
        ".loopcont",
        vec![sig(op_loopcont, 0, &[T::Array])],
    )?);
    ctx.known.forallarr = Some(def_op_hidden(
        ctx,
        ".forallarrcont",
        vec![sig(op_forallarr_cont, 0, &[T::Array, T::Integer, T::Array])],
    )?);
    ctx.known.foralldict = Some(def_op_hidden(
        ctx,
        ".foralldictcont",
        vec![sig(op_foralldict_cont, 0, &[T::Dict, T::Integer, T::Array])],
    )?);
    ctx.known.forallstr = Some(def_op_hidden(
        ctx,
        ".forallstrcont",
        vec![sig(op_forallstr_cont, 0, &[T::String, T::Integer, T::Array])],
    )?);
    ctx.known.stopfalse = Some(def_op_hidden(ctx, ".stopfalse", vec![sig(op_stopfalse, 1, &[])])?);
    ctx.known.defaulterror = Some(def_op_hidden(
        ctx,
        ".defaulterror",
        vec![sig(op_defaulterror, 0, &[T::Any, T::Any])],
    )?);

    def_op(ctx, "exec", vec![sig(op_exec, 0, &[T::Any])])?;
    def_op(ctx, "if", vec![sig(op_if, 0, &[T::Boolean, T::Proc])])?;
    def_op(
        ctx,
        "ifelse",
        vec![sig(op_ifelse, 0, &[T::Boolean, T::Proc, T::Proc])],
    )?;
    def_op(
        ctx,
        "for",
        vec![sig(op_for, 0, &[T::Number, T::Number, T::Number, T::Proc])],
    )?;
    def_op(ctx, "repeat", vec![sig(op_repeat, 0, &[T::Integer, T::Proc])])?;
    def_op(ctx, "loop", vec![sig(op_loop, 0, &[T::Proc])])?;
    def_op(
        ctx,
        "forall",
        vec![
            sig(op_forall_arr, 0, &[T::Array, T::Proc]),
            sig(op_forall_dict, 0, &[T::Dict, T::Proc]),
            sig(op_forall_str, 0, &[T::String, T::Proc]),
        ],
    )?;
    def_op(ctx, "exit", vec![sig(op_exit, 0, &[])])?;
    def_op(ctx, "stop", vec![sig(op_stop, 0, &[])])?;
    def_op(ctx, "stopped", vec![sig(op_stopped, 1, &[T::Any])])?;
    def_op(ctx, "countexecstack", vec![sig(op_countexecstack, 1, &[])])?;
    def_op(ctx, "quit", vec![sig(op_quit, 0, &[])])?;
    Ok(())
}
