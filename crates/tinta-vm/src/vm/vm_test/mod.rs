// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! End-to-end execution tests.
//!
//! Each file runs source programs through a full context and inspects
//! the operand stack afterwards.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod binding_test;
mod control_test;
mod error_recovery_test;
mod stackops_test;
mod string_test;

use crate::context::{Context, Input, Options, RunOutcome};
use crate::object::Object;

/// A full interpreter context with the operator set installed.
pub fn interp() -> Context {
    Context::create(Options::default()).unwrap()
}

/// Run one program to completion and hand back the context.
pub fn run(program: &str) -> Context {
    let mut ctx = interp();
    let outcome = ctx.run(Input::String(program)).unwrap();
    assert_eq!(outcome, RunOutcome::Finished, "program did not finish: {program:?}");
    ctx
}

/// The operand stack, bottom first.
pub fn operands(ctx: &Context) -> Vec<Object> {
    let depth = ctx.os_depth().unwrap();
    let mut out = Vec::with_capacity(depth);
    for index in 0..depth {
        out.push(crate::stack::get(&ctx.lo, ctx.os, index).unwrap().unwrap());
    }
    out
}

/// Run a program and expect a single integer result.
pub fn expect_int(program: &str, value: i32) {
    let ctx = run(program);
    assert_eq!(
        operands(&ctx),
        vec![Object::integer(value)],
        "program: {program:?}"
    );
}

/// Run a program and expect exactly these operands.
pub fn expect_stack(program: &str, expected: &[Object]) {
    let ctx = run(program);
    assert_eq!(operands(&ctx), expected, "program: {program:?}");
}
