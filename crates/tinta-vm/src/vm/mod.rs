// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The execution loop.
//!
//! The interpreter is driven entirely by the execution stack: one step
//! pops an object, classifies it by type and executable flag, and acts.
//! Literal objects move to the operand stack; executable names resolve
//! through the dictionary stack and come back for reclassification;
//! procedures execute element-wise (the remainder is pushed back as a
//! shared subarray, so tail position costs nothing); operators dispatch
//! through the table; files scan one token at a time and stay behind it.
//!
//! The loop is a continuation-passing machine: control operators stage
//! their follow-up work on the execution stack instead of recursing into
//! the host, which keeps `stop`, `exit` and error unwinding a matter of
//! cutting that stack.

#[cfg(test)]
mod vm_test;

use tracing::trace;

use crate::composite::array;
use crate::context::{Context, ContextError, MessageLevel, RunOutcome};
use crate::error::{self, PsError};
use crate::object::{Object, Payload};
use crate::operator;
use crate::reader;
use crate::stack;

/// Drive the execution stack until it drains, the program quits, or a
/// showpage yields.
pub fn run(ctx: &mut Context) -> Result<RunOutcome, ContextError> {
    loop {
        if ctx.dead {
            return Err(ContextError::Dead);
        }
        if ctx.quit {
            ctx.quit = false;
            stack::truncate(&mut ctx.lo, ctx.es, 0).map_err(PsError::from)?;
            return Ok(RunOutcome::Finished);
        }
        if ctx.yield_request {
            ctx.yield_request = false;
            return Ok(RunOutcome::Yielded);
        }
        let Some(x) = ctx.es_pop()? else {
            return Ok(RunOutcome::Finished);
        };
        if let Err(err) = step(ctx, x) {
            error::handle(ctx, err, x);
        }
        if ctx.take_interrupt() {
            error::handle(ctx, PsError::Interrupt, Object::null());
        }
    }
}

/// One classification step for an object popped from the execution stack.
fn step(ctx: &mut Context, x: Object) -> Result<(), PsError> {
    if ctx.options.messages >= MessageLevel::Tracing {
        trace!(kind = x.type_name(), executable = x.is_executable(), "step");
    }
    if !x.is_executable() {
        return ctx.push(x);
    }
    match x.payload() {
        Payload::Name { .. } => {
            let resolved = ctx.lookup(x.literal())?.ok_or(PsError::Undefined)?;
            ctx.es_push(resolved)
        }
        Payload::Array(_) => step_proc(ctx, x),
        Payload::Operator(opcode) => operator::exec(ctx, opcode),
        Payload::File(id) => step_file(ctx, x, id),
        // Executable simples, dicts and strings behave as literals here;
        // executable strings are scanned only through `exec`.
        _ => ctx.push(x),
    }
}

/// Execute the first element of a procedure and reschedule the rest.
fn step_proc(ctx: &mut Context, proc: Object) -> Result<(), PsError> {
    let len = array::length(proc)?;
    if len == 0 {
        return Ok(());
    }
    let elem = array::get_nocheck(ctx, proc, 0)?;
    if len > 1 {
        ctx.es_push(array::getinterval_nocheck(proc, 1, len - 1)?)?;
    }
    // A procedure element that is itself a procedure is data: it executes
    // only when invoked by name, `exec`, or a control operator.
    if elem.is_proc() {
        ctx.push(elem)
    } else {
        ctx.es_push(elem)
    }
}

/// Scan one token from a file and keep the file behind it.
fn step_file(ctx: &mut Context, file_obj: Object, id: crate::object::FileId) -> Result<(), PsError> {
    match reader::scan(ctx, id) {
        Ok(Some(token)) => {
            ctx.es_push(file_obj)?;
            if token.is_proc() {
                ctx.push(token)
            } else {
                ctx.es_push(token)
            }
        }
        Ok(None) => {
            ctx.file_mut(id)?.closed = true;
            Ok(())
        }
        Err(err) => {
            // The file stays scheduled so an error handler may resume it.
            ctx.es_push(file_obj)?;
            Err(err)
        }
    }
}
