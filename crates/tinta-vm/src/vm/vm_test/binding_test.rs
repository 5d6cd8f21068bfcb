// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Name binding and dictionary operators through the full machine.

use super::{expect_int, expect_stack, interp, operands, run};
use crate::composite::dict;
use crate::context::Input;
use crate::object::{Object, Payload};

#[test]
fn def_binds_and_names_resolve() {
    // `/x 42 def x` leaves 42; currentdict holds the binding.
    let mut ctx = run("/x 42 def x");
    assert_eq!(operands(&ctx), vec![Object::integer(42)]);
    let key = ctx.name_object(b"x").unwrap();
    let userdict = ctx.userdict;
    assert_eq!(
        dict::get(&mut ctx, userdict, key).unwrap(),
        Some(Object::integer(42))
    );
}

#[test]
fn procedures_execute_when_invoked_by_name() {
    expect_int("/double { 2 mul } def 21 double", 42);
    expect_int("/a { b } def /b { 5 } def a", 5);
}

#[test]
fn lookup_is_top_down() {
    expect_int(
        "/x 1 def 5 dict begin /x 2 def x end",
        2,
    );
    expect_int("/x 1 def 5 dict begin x end", 1);
}

#[test]
fn load_and_store() {
    expect_int("/x 7 def /x load", 7);
    // store rebinds where the key already lives.
    expect_int("/x 1 def 5 dict begin /x 2 store x end pop x", 2);
    expect_stack("/y 3 store y", &[Object::integer(3)]);
}

#[test]
fn where_and_known() {
    let ctx = run("/x 1 def /x where");
    let stack = operands(&ctx);
    assert_eq!(stack.len(), 2);
    assert_eq!(stack[0], ctx.userdict);
    assert_eq!(stack[1], Object::boolean(true));

    expect_stack("/nosuchkey where", &[Object::boolean(false)]);
    expect_stack("currentdict /x known", &[Object::boolean(false)]);
    expect_stack("/x 1 def currentdict /x known", &[Object::boolean(true)]);
}

#[test]
fn begin_end_manage_the_dict_stack() {
    expect_int("countdictstack", 3);
    expect_int("5 dict begin countdictstack end", 4);
}

#[test]
fn dict_literals() {
    let ctx = run("<< /a 1 /b 2 >>");
    let stack = operands(&ctx);
    assert_eq!(stack.len(), 1);
    assert!(matches!(stack[0].payload(), Payload::Dict { .. }));
    let mut ctx = ctx;
    let key = ctx.name_object(b"b").unwrap();
    assert_eq!(
        dict::get(&mut ctx, stack[0], key).unwrap(),
        Some(Object::integer(2))
    );
}

#[test]
fn dict_get_put_through_operators() {
    expect_int("5 dict dup /k 9 put /k get", 9);
    expect_int("<< /a 1 >> length", 1);
    expect_int("8 dict maxlength", 8);
}

#[test]
fn bind_replaces_operator_names() {
    let mut ctx = interp();
    ctx.run(Input::String("/p { 1 2 add } bind def /p load"))
        .unwrap();
    let stack = operands(&ctx);
    let proc = stack[0];
    let elems = crate::composite::array::elements(&ctx, proc).unwrap();
    assert!(matches!(elems[2].payload(), Payload::Operator(_)));
    // The bound procedure still runs.
    ctx.run(Input::String("p")).unwrap();
    let stack = operands(&ctx);
    assert_eq!(stack.last(), Some(&Object::integer(3)));
}

#[test]
fn type_operator() {
    let ctx = run("42 type");
    let ctx_ref = &ctx;
    let name = operands(ctx_ref)[0];
    assert_eq!(ctx.name_bytes(name).unwrap(), b"integertype");
    assert!(name.is_executable());
}

#[test]
fn conversions() {
    expect_int("3.7 cvi", 3);
    expect_int("(42) cvi", 42);
    expect_stack("3 cvr", &[Object::real(3.0)]);
    let ctx = run("(add) cvn");
    let name = operands(&ctx)[0];
    assert!(matches!(name.payload(), Payload::Name { .. }));
    assert!(!name.is_executable());
}

#[test]
fn cvs_writes_into_the_string() {
    let ctx = run("42 10 string cvs");
    let s = operands(&ctx)[0];
    assert_eq!(crate::composite::string::bytes(&ctx, s).unwrap(), b"42");
}

#[test]
fn cvrs_radix() {
    let ctx = run("255 16 5 string cvrs");
    let s = operands(&ctx)[0];
    assert_eq!(crate::composite::string::bytes(&ctx, s).unwrap(), b"FF");
}

#[test]
fn access_operators() {
    expect_stack("(x) readonly wcheck", &[Object::boolean(false)]);
    expect_stack("(x) rcheck", &[Object::boolean(true)]);
    expect_stack("{1} executeonly rcheck", &[Object::boolean(false)]);
    expect_stack("(x) cvx xcheck", &[Object::boolean(true)]);
    expect_stack("(x) cvx cvlit xcheck", &[Object::boolean(false)]);
}
