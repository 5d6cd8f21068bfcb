// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Arithmetic, relational and bitwise operators.
//!
//! Two-integer arithmetic stays integral unless the result leaves the
//! 32-bit range, in which case it becomes a real; mixed operands always
//! produce reals. Angles are in degrees throughout.

use crate::context::Context;
use crate::error::PsError;
use crate::object::{Object, Payload};
use crate::operator::{TypePattern as T, def_op, sig};

fn both_integers(a: Object, b: Object) -> Option<(i64, i64)> {
    match (a.payload(), b.payload()) {
        (Payload::Integer(x), Payload::Integer(y)) => Some((i64::from(x), i64::from(y))),
        _ => None,
    }
}

fn number(obj: Object) -> Result<f64, PsError> {
    obj.as_number().ok_or(PsError::TypeCheck)
}

/// Push an i64 result, widening to real outside the 32-bit range.
fn push_int_result(ctx: &mut Context, value: i64) -> Result<(), PsError> {
    match i32::try_from(value) {
        Ok(n) => ctx.push(Object::integer(n)),
        Err(_) => ctx.push(Object::real(value as f32)),
    }
}

fn push_real_result(ctx: &mut Context, value: f64) -> Result<(), PsError> {
    if value.is_nan() {
        return Err(PsError::UndefinedResult);
    }
    ctx.push(Object::real(value as f32))
}

fn op_add(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    if let Some((a, b)) = both_integers(args[0], args[1]) {
        return push_int_result(ctx, a + b);
    }
    push_real_result(ctx, number(args[0])? + number(args[1])?)
}

fn op_sub(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    if let Some((a, b)) = both_integers(args[0], args[1]) {
        return push_int_result(ctx, a - b);
    }
    push_real_result(ctx, number(args[0])? - number(args[1])?)
}

fn op_mul(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    if let Some((a, b)) = both_integers(args[0], args[1]) {
        return push_int_result(ctx, a * b);
    }
    push_real_result(ctx, number(args[0])? * number(args[1])?)
}

fn op_div(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let b = number(args[1])?;
    if b == 0.0 {
        return Err(PsError::UndefinedResult);
    }
    push_real_result(ctx, number(args[0])? / b)
}

fn op_idiv(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let (a, b) = both_integers(args[0], args[1]).ok_or(PsError::TypeCheck)?;
    if b == 0 {
        return Err(PsError::UndefinedResult);
    }
    push_int_result(ctx, a / b)
}

fn op_mod(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let (a, b) = both_integers(args[0], args[1]).ok_or(PsError::TypeCheck)?;
    if b == 0 {
        return Err(PsError::UndefinedResult);
    }
    push_int_result(ctx, a % b)
}

fn op_neg(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    match args[0].payload() {
        Payload::Integer(n) => push_int_result(ctx, -i64::from(n)),
        Payload::Real(r) => ctx.push(Object::real(-r)),
        _ => Err(PsError::TypeCheck),
    }
}

fn op_abs(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    match args[0].payload() {
        Payload::Integer(n) => push_int_result(ctx, i64::from(n).abs()),
        Payload::Real(r) => ctx.push(Object::real(r.abs())),
        _ => Err(PsError::TypeCheck),
    }
}

fn op_sqrt(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let r = number(args[0])?;
    if r < 0.0 {
        return Err(PsError::RangeCheck);
    }
    push_real_result(ctx, r.sqrt())
}

fn op_sin(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    push_real_result(ctx, number(args[0])?.to_radians().sin())
}

fn op_cos(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    push_real_result(ctx, number(args[0])?.to_radians().cos())
}

fn op_atan(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let num = number(args[0])?;
    let den = number(args[1])?;
    if num == 0.0 && den == 0.0 {
        return Err(PsError::UndefinedResult);
    }
    let degrees = num.atan2(den).to_degrees();
    push_real_result(ctx, if degrees < 0.0 { degrees + 360.0 } else { degrees })
}

fn op_exp(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    push_real_result(ctx, number(args[0])?.powf(number(args[1])?))
}

fn op_ln(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let r = number(args[0])?;
    if r <= 0.0 {
        return Err(PsError::RangeCheck);
    }
    push_real_result(ctx, r.ln())
}

fn op_log(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let r = number(args[0])?;
    if r <= 0.0 {
        return Err(PsError::RangeCheck);
    }
    push_real_result(ctx, r.log10())
}

/// Rounding family: integers pass through, reals stay real.
fn rounding(
    ctx: &mut Context,
    arg: Object,
    f: fn(f32) -> f32,
) -> Result<(), PsError> {
    match arg.payload() {
        Payload::Integer(_) => ctx.push(arg),
        Payload::Real(r) => ctx.push(Object::real(f(r))),
        _ => Err(PsError::TypeCheck),
    }
}

fn op_round(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    // Halfway cases round toward positive infinity.
    rounding(ctx, args[0], |r| (r + 0.5).floor())
}

fn op_truncate(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    rounding(ctx, args[0], f32::trunc)
}

fn op_floor(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    rounding(ctx, args[0], f32::floor)
}

fn op_ceiling(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    rounding(ctx, args[0], f32::ceil)
}

fn op_rand(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    ctx.rng = ctx.rng.wrapping_mul(1_103_515_245).wrapping_add(12_345);
    ctx.push(Object::integer((ctx.rng >> 1) as i32))
}

fn op_srand(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    ctx.rng = args[0].as_integer().ok_or(PsError::TypeCheck)? as u32;
    Ok(())
}

fn op_rrand(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    ctx.push(Object::integer(ctx.rng as i32))
}

fn op_bitshift(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let value = args[0].as_integer().ok_or(PsError::TypeCheck)?;
    let shift = args[1].as_integer().ok_or(PsError::TypeCheck)?;
    let result = if shift >= 32 || shift <= -32 {
        0
    } else if shift >= 0 {
        ((value as u32) << shift) as i32
    } else {
        ((value as u32) >> -shift) as i32
    };
    ctx.push(Object::integer(result))
}

fn op_eq(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    ctx.push(Object::boolean(args[0] == args[1]))
}

fn op_ne(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    ctx.push(Object::boolean(args[0] != args[1]))
}

fn compare_numbers(ctx: &mut Context, args: &[Object], f: fn(f64, f64) -> bool) -> Result<(), PsError> {
    let a = number(args[0])?;
    let b = number(args[1])?;
    ctx.push(Object::boolean(f(a, b)))
}

fn compare_strings(ctx: &mut Context, args: &[Object], f: fn(&[u8], &[u8]) -> bool) -> Result<(), PsError> {
    let a = crate::composite::string::bytes(ctx, args[0])?;
    let b = crate::composite::string::bytes(ctx, args[1])?;
    ctx.push(Object::boolean(f(&a, &b)))
}

fn op_gt_num(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    compare_numbers(ctx, args, |a, b| a > b)
}

fn op_ge_num(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    compare_numbers(ctx, args, |a, b| a >= b)
}

fn op_lt_num(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    compare_numbers(ctx, args, |a, b| a < b)
}

fn op_le_num(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    compare_numbers(ctx, args, |a, b| a <= b)
}

fn op_gt_str(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    compare_strings(ctx, args, |a, b| a > b)
}

fn op_ge_str(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    compare_strings(ctx, args, |a, b| a >= b)
}

fn op_lt_str(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    compare_strings(ctx, args, |a, b| a < b)
}

fn op_le_str(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    compare_strings(ctx, args, |a, b| a <= b)
}

fn op_and(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    match (args[0].payload(), args[1].payload()) {
        (Payload::Boolean(a), Payload::Boolean(b)) => ctx.push(Object::boolean(a && b)),
        (Payload::Integer(a), Payload::Integer(b)) => ctx.push(Object::integer(a & b)),
        _ => Err(PsError::TypeCheck),
    }
}

fn op_or(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    match (args[0].payload(), args[1].payload()) {
        (Payload::Boolean(a), Payload::Boolean(b)) => ctx.push(Object::boolean(a || b)),
        (Payload::Integer(a), Payload::Integer(b)) => ctx.push(Object::integer(a | b)),
        _ => Err(PsError::TypeCheck),
    }
}

fn op_xor(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    match (args[0].payload(), args[1].payload()) {
        (Payload::Boolean(a), Payload::Boolean(b)) => ctx.push(Object::boolean(a != b)),
        (Payload::Integer(a), Payload::Integer(b)) => ctx.push(Object::integer(a ^ b)),
        _ => Err(PsError::TypeCheck),
    }
}

fn op_not(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    match args[0].payload() {
        Payload::Boolean(b) => ctx.push(Object::boolean(!b)),
        Payload::Integer(n) => ctx.push(Object::integer(!n)),
        _ => Err(PsError::TypeCheck),
    }
}

fn op_true(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    ctx.push(Object::boolean(true))
}

fn op_false(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    ctx.push(Object::boolean(false))
}

/// Register the arithmetic, relational and bitwise operators.
pub fn install(ctx: &mut Context) -> Result<(), PsError> {
    let nn: &[T] = &[T::Number, T::Number];
    def_op(ctx, "add", vec![sig(op_add, 1, nn)])?;
    def_op(ctx, "sub", vec![sig(op_sub, 1, nn)])?;
    def_op(ctx, "mul", vec![sig(op_mul, 1, nn)])?;
    def_op(ctx, "div", vec![sig(op_div, 1, nn)])?;
    def_op(ctx, "idiv", vec![sig(op_idiv, 1, &[T::Integer, T::Integer])])?;
    def_op(ctx, "mod", vec![sig(op_mod, 1, &[T::Integer, T::Integer])])?;
    def_op(ctx, "neg", vec![sig(op_neg, 1, &[T::Number])])?;
    def_op(ctx, "abs", vec![sig(op_abs, 1, &[T::Number])])?;
    def_op(ctx, "sqrt", vec![sig(op_sqrt, 1, &[T::Float])])?;
    def_op(ctx, "sin", vec![sig(op_sin, 1, &[T::Float])])?;
    def_op(ctx, "cos", vec![sig(op_cos, 1, &[T::Float])])?;
    def_op(ctx, "atan", vec![sig(op_atan, 1, &[T::Float, T::Float])])?;
    def_op(ctx, "exp", vec![sig(op_exp, 1, &[T::Float, T::Float])])?;
    def_op(ctx, "ln", vec![sig(op_ln, 1, &[T::Float])])?;
    def_op(ctx, "log", vec![sig(op_log, 1, &[T::Float])])?;
    def_op(ctx, "round", vec![sig(op_round, 1, &[T::Number])])?;
    def_op(ctx, "truncate", vec![sig(op_truncate, 1, &[T::Number])])?;
    def_op(ctx, "floor", vec![sig(op_floor, 1, &[T::Number])])?;
    def_op(ctx, "ceiling", vec![sig(op_ceiling, 1, &[T::Number])])?;
    def_op(ctx, "rand", vec![sig(op_rand, 1, &[])])?;
    def_op(ctx, "srand", vec![sig(op_srand, 0, &[T::Integer])])?;
    def_op(ctx, "rrand", vec![sig(op_rrand, 1, &[])])?;
    def_op(ctx, "bitshift", vec![sig(op_bitshift, 1, &[T::Integer, T::Integer])])?;
    def_op(ctx, "eq", vec![sig(op_eq, 1, &[T::Any, T::Any])])?;
    def_op(ctx, "ne", vec![sig(op_ne, 1, &[T::Any, T::Any])])?;
    def_op(
        ctx,
        "gt",
        vec![sig(op_gt_num, 1, nn), sig(op_gt_str, 1, &[T::String, T::String])],
    )?;
    def_op(
        ctx,
        "ge",
        vec![sig(op_ge_num, 1, nn), sig(op_ge_str, 1, &[T::String, T::String])],
    )?;
    def_op(
        ctx,
        "lt",
        vec![sig(op_lt_num, 1, nn), sig(op_lt_str, 1, &[T::String, T::String])],
    )?;
    def_op(
        ctx,
        "le",
        vec![sig(op_le_num, 1, nn), sig(op_le_str, 1, &[T::String, T::String])],
    )?;
    def_op(
        ctx,
        "and",
        vec![
            sig(op_and, 1, &[T::Boolean, T::Boolean]),
            sig(op_and, 1, &[T::Integer, T::Integer]),
        ],
    )?;
    def_op(
        ctx,
        "or",
        vec![
            sig(op_or, 1, &[T::Boolean, T::Boolean]),
            sig(op_or, 1, &[T::Integer, T::Integer]),
        ],
    )?;
    def_op(
        ctx,
        "xor",
        vec![
            sig(op_xor, 1, &[T::Boolean, T::Boolean]),
            sig(op_xor, 1, &[T::Integer, T::Integer]),
        ],
    )?;
    def_op(
        ctx,
        "not",
        vec![sig(op_not, 1, &[T::Boolean]), sig(op_not, 1, &[T::Integer])],
    )?;
    def_op(ctx, "true", vec![sig(op_true, 1, &[])])?;
    def_op(ctx, "false", vec![sig(op_false, 1, &[])])?;
    Ok(())
}
