// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Error recovery through errordict.

use super::{interp, operands, run};
use crate::composite::dict;
use crate::context::{Input, RunOutcome};
use crate::names::sysname;
use crate::object::{Bank, Object, Payload};

#[test]
fn replaced_handler_runs_and_depth_is_preserved() {
    // The handler pops the command and the error name, so the operand
    // stack ends at its pre-error depth (plus the handler's own pushes).
    let ctx = run(
        "errordict /undefined { pop pop (caught) } put 5 zzz",
    );
    let stack = operands(&ctx);
    assert_eq!(stack.len(), 2);
    assert_eq!(stack[0], Object::integer(5));
    assert!(matches!(stack[1].payload(), Payload::String(_)));
    assert_eq!(
        crate::composite::string::bytes(&ctx, stack[1]).unwrap(),
        b"caught"
    );
}

#[test]
fn execution_continues_after_a_handled_error() {
    let ctx = run("errordict /undefined { pop pop } put zzz 1 2 add");
    assert_eq!(operands(&ctx), vec![Object::integer(3)]);
}

#[test]
fn handler_receives_command_and_errorname() {
    let ctx = run("errordict /undefined { } put zzz");
    // Unpopped handler arguments remain: command below, error name on top.
    let stack = operands(&ctx);
    assert_eq!(stack.len(), 2);
    assert_eq!(ctx.name_bytes(stack[0]).unwrap(), b"zzz");
    assert_eq!(ctx.name_bytes(stack[1]).unwrap(), b"undefined");

    // $error records the same fault.
    let dollar = ctx.dollar_error;
    let errorname = dict::get_normalized(
        &ctx,
        dollar,
        Object::name(sysname::ERRORNAME, Bank::Global),
    )
    .unwrap()
    .unwrap();
    assert_eq!(ctx.name_bytes(errorname).unwrap(), b"undefined");
    let newerror = dict::get_normalized(
        &ctx,
        dollar,
        Object::name(sysname::NEWERROR, Bank::Global),
    )
    .unwrap();
    assert_eq!(newerror, Some(Object::boolean(true)));
}

#[test]
fn default_handler_stops_the_program() {
    // Quiet context: the default handler reports nothing but still stops.
    let ctx = run("1 2 3 undefinedname 99");
    // The program never reaches 99; the pre-error operands survive.
    let stack = operands(&ctx);
    assert!(!stack.contains(&Object::integer(99)));
}

#[test]
fn stopped_guards_catch_errors() {
    let ctx = run("{ 1 0 idiv } stopped");
    let stack = operands(&ctx);
    assert_eq!(stack.last(), Some(&Object::boolean(true)));
}

#[test]
fn typecheck_reports_through_errordict() {
    let ctx = run("errordict /typecheck { pop pop (tc) } put 1 (s) add");
    let stack = operands(&ctx);
    // The failed operator restored its operands before the handler ran.
    assert_eq!(stack.len(), 3);
    assert_eq!(stack[0], Object::integer(1));
    assert!(matches!(stack[1].payload(), Payload::String(_)));
    assert_eq!(
        crate::composite::string::bytes(&ctx, stack[2]).unwrap(),
        b"tc"
    );
}

#[test]
fn stackunderflow_reports_through_errordict() {
    let ctx = run("errordict /stackunderflow { pop pop (under) } put add");
    let stack = operands(&ctx);
    assert_eq!(stack.len(), 1);
    assert_eq!(
        crate::composite::string::bytes(&ctx, stack[0]).unwrap(),
        b"under"
    );
}

#[test]
fn interrupt_flag_raises_the_interrupt_error() {
    let mut ctx = interp();
    ctx.run(Input::String("errordict /interrupt { pop pop (irq) } put"))
        .unwrap();
    ctx.interrupt_handle()
        .store(true, std::sync::atomic::Ordering::Relaxed);
    let outcome = ctx.run(Input::String("1 2 add")).unwrap();
    assert_eq!(outcome, RunOutcome::Finished);
    let stack = operands(&ctx);
    assert!(stack.iter().any(|obj| {
        matches!(obj.payload(), Payload::String(_))
            && crate::composite::string::bytes(&ctx, *obj).unwrap() == b"irq"
    }));
}

#[test]
fn syntax_errors_are_recoverable_faults() {
    let ctx = run("errordict /syntaxerror { pop pop (syn) } put (unterminated");
    let stack = operands(&ctx);
    assert!(stack.iter().any(|obj| {
        matches!(obj.payload(), Payload::String(_))
            && crate::composite::string::bytes(&ctx, *obj).unwrap() == b"syn"
    }));
}
