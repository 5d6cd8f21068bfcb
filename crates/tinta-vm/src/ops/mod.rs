// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Built-in operators.
//!
//! Operators are grouped the way they act on the machine: stack shuffling,
//! arithmetic and relations, control flow (with its continuation
//! opcodes), type and attribute conversion, dictionaries, composite
//! access, virtual memory, and output. Each group installs its operators
//! into the table and binds them in systemdict.

pub mod compops;
pub mod control;
pub mod dictops;
pub mod ioops;
pub mod math;
pub mod stackops;
pub mod typeops;
pub mod vmops;


use crate::context::{Context, ContextError};

/// Register the whole operator set.
pub fn install(ctx: &mut Context) -> Result<(), ContextError> {
    stackops::install(ctx)?;
    math::install(ctx)?;
    control::install(ctx)?;
    typeops::install(ctx)?;
    dictops::install(ctx)?;
    compops::install(ctx)?;
    vmops::install(ctx)?;
    ioops::install(ctx)?;
    Ok(())
}
