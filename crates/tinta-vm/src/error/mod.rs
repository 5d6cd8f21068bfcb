// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The PostScript error system.
//!
//! Errors are identified by a fixed set of names. An operator body
//! signals by returning `Err(PsError)`; the dispatcher restores the
//! operand stack, and [`handle`] records the fault in `$error`, pushes
//! the offending command and the error name, and transfers control to
//! the handler procedure bound in `errordict`. Errors never unwind the
//! host call stack.

#[cfg(test)]
mod error_test;

use thiserror::Error;
use tracing::error;

use crate::composite::{array, dict};
use crate::context::{Context, ContextError, MessageLevel};
use crate::mem::MemError;
use crate::names::sysname;
use crate::object::{Bank, Object};
use crate::stack;

/// The stable error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PsError {
    /// A new key does not fit the dictionary.
    #[error("dictfull")]
    DictFull,
    /// Dictionary stack cannot grow.
    #[error("dictstackoverflow")]
    DictStackOverflow,
    /// `end` below the three standard dictionaries.
    #[error("dictstackunderflow")]
    DictStackUnderflow,
    /// Execution stack cannot grow.
    #[error("execstackoverflow")]
    ExecStackOverflow,
    /// Failure inside the error reporter itself.
    #[error("handleerror")]
    HandleError,
    /// The embedder raised the interrupt flag.
    #[error("interrupt")]
    Interrupt,
    /// Access attribute forbids the operation.
    #[error("invalidaccess")]
    InvalidAccess,
    /// `exit` crossed a stopped barrier or found no loop.
    #[error("invalidexit")]
    InvalidExit,
    /// File operation not permitted.
    #[error("invalidfileaccess")]
    InvalidFileAccess,
    /// Font dictionary is malformed.
    #[error("invalidfont")]
    InvalidFont,
    /// Restore would strand live references.
    #[error("invalidrestore")]
    InvalidRestore,
    /// Input/output failure.
    #[error("ioerror")]
    IoError,
    /// Implementation limit exceeded.
    #[error("limitcheck")]
    LimitCheck,
    /// Path operation with no current point.
    #[error("nocurrentpoint")]
    NoCurrentPoint,
    /// Operand outside the operator's domain.
    #[error("rangecheck")]
    RangeCheck,
    /// Operand stack cannot grow.
    #[error("stackoverflow")]
    StackOverflow,
    /// Too few operands.
    #[error("stackunderflow")]
    StackUnderflow,
    /// Scanner rejected the input.
    #[error("syntaxerror")]
    SyntaxError,
    /// Timeout elapsed.
    #[error("timeout")]
    Timeout,
    /// Operand of the wrong type.
    #[error("typecheck")]
    TypeCheck,
    /// Name has no binding in the dictionary stack.
    #[error("undefined")]
    Undefined,
    /// Named file does not exist.
    #[error("undefinedfilename")]
    UndefinedFilename,
    /// Named resource does not exist.
    #[error("undefinedresource")]
    UndefinedResource,
    /// Arithmetic result cannot be represented.
    #[error("undefinedresult")]
    UndefinedResult,
    /// No mark on the operand stack.
    #[error("unmatchedmark")]
    UnmatchedMark,
    /// Internal inconsistency.
    #[error("unregistered")]
    Unregistered,
    /// Memory file exhausted or corrupt.
    #[error("VMerror")]
    VmError,
}

impl PsError {
    /// The PostScript name of this error.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DictFull => "dictfull",
            Self::DictStackOverflow => "dictstackoverflow",
            Self::DictStackUnderflow => "dictstackunderflow",
            Self::ExecStackOverflow => "execstackoverflow",
            Self::HandleError => "handleerror",
            Self::Interrupt => "interrupt",
            Self::InvalidAccess => "invalidaccess",
            Self::InvalidExit => "invalidexit",
            Self::InvalidFileAccess => "invalidfileaccess",
            Self::InvalidFont => "invalidfont",
            Self::InvalidRestore => "invalidrestore",
            Self::IoError => "ioerror",
            Self::LimitCheck => "limitcheck",
            Self::NoCurrentPoint => "nocurrentpoint",
            Self::RangeCheck => "rangecheck",
            Self::StackOverflow => "stackoverflow",
            Self::StackUnderflow => "stackunderflow",
            Self::SyntaxError => "syntaxerror",
            Self::Timeout => "timeout",
            Self::TypeCheck => "typecheck",
            Self::Undefined => "undefined",
            Self::UndefinedFilename => "undefinedfilename",
            Self::UndefinedResource => "undefinedresource",
            Self::UndefinedResult => "undefinedresult",
            Self::UnmatchedMark => "unmatchedmark",
            Self::Unregistered => "unregistered",
            Self::VmError => "VMerror",
        }
    }

    /// Every error, for errordict installation.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::DictFull,
            Self::DictStackOverflow,
            Self::DictStackUnderflow,
            Self::ExecStackOverflow,
            Self::HandleError,
            Self::Interrupt,
            Self::InvalidAccess,
            Self::InvalidExit,
            Self::InvalidFileAccess,
            Self::InvalidFont,
            Self::InvalidRestore,
            Self::IoError,
            Self::LimitCheck,
            Self::NoCurrentPoint,
            Self::RangeCheck,
            Self::StackOverflow,
            Self::StackUnderflow,
            Self::SyntaxError,
            Self::Timeout,
            Self::TypeCheck,
            Self::Undefined,
            Self::UndefinedFilename,
            Self::UndefinedResource,
            Self::UndefinedResult,
            Self::UnmatchedMark,
            Self::Unregistered,
            Self::VmError,
        ]
    }
}

impl From<MemError> for PsError {
    fn from(e: MemError) -> Self {
        match e {
            MemError::BadEntity(_) | MemError::Exhausted => Self::VmError,
            MemError::Bounds { .. } => Self::RangeCheck,
        }
    }
}

/// Bind the default handler procedure to every error name.
///
/// Each entry is a one-element procedure wrapping the native reporter, so
/// programs can replace individual entries with their own procedures.
pub fn install_errordict(ctx: &mut Context) -> Result<(), ContextError> {
    let opcode = ctx.known.defaulterror.ok_or(PsError::Unregistered)?;
    for err in PsError::all() {
        let name = ctx.name_object_global(err.name().as_bytes())?;
        let proc = array::cons_from(ctx, Bank::Global, &[Object::operator(opcode)])?.executable();
        let errordict = ctx.errordict;
        dict::put(ctx, errordict, name, proc)?;
    }
    Ok(())
}

/// Snapshot a stack into a fresh local array.
fn snapshot_stack(ctx: &mut Context, head: crate::object::EntityId) -> Result<Object, PsError> {
    let depth = stack::depth(&ctx.lo, head)?;
    let snap = array::cons_in(ctx, Bank::Local, depth.min(usize::from(u16::MAX)))?;
    for index in 0..depth.min(usize::from(u16::MAX)) {
        if let Some(obj) = stack::get(&ctx.lo, head, index)? {
            array::put(ctx, snap, index, obj)?;
        }
    }
    Ok(snap.readonly())
}

/// Transfer control to the error path.
///
/// Fills `$error`, pushes the offending command and the error name onto
/// the operand stack, and schedules the errordict handler procedure. A
/// failure inside this function marks the context dead.
pub fn handle(ctx: &mut Context, err: PsError, command: Object) {
    if let Err(fault) = handle_inner(ctx, err, command) {
        error!(error = %fault, "unrecoverable fault during error handling");
        ctx.dead = true;
    }
}

fn handle_inner(ctx: &mut Context, err: PsError, command: Object) -> Result<(), PsError> {
    if ctx.options.messages >= MessageLevel::Tracing {
        error!(error = err.name(), "error raised");
    }

    let errname = ctx.name_object_global(err.name().as_bytes())?;

    let ostack = snapshot_stack(ctx, ctx.os)?;
    let estack = snapshot_stack(ctx, ctx.es)?;
    let dstack = snapshot_stack(ctx, ctx.ds)?;

    let dollar = ctx.dollar_error;
    let entries = [
        (sysname::NEWERROR, Object::boolean(true)),
        (sysname::ERRORNAME, errname),
        (sysname::COMMAND, command),
        (sysname::OSTACK, ostack),
        (sysname::ESTACK, estack),
        (sysname::DSTACK, dstack),
    ];
    for (id, value) in entries {
        dict::put(ctx, dollar, Object::name(id, Bank::Global), value)?;
    }

    let errordict = ctx.errordict;
    let handler = dict::get_normalized(ctx, errordict, errname)?;
    match handler {
        Some(proc) => {
            ctx.push(command)?;
            ctx.push(errname)?;
            ctx.es_push(proc)?;
        }
        None => {
            // No handler installed at all: report and stop the program.
            error!(error = err.name(), "unhandled error, terminating program");
            ctx.quit = true;
        }
    }
    Ok(())
}
