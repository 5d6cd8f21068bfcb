// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Type, attribute and conversion operators.

use crate::composite::{array, string};
use crate::context::Context;
use crate::error::PsError;
use crate::object::{Object, Payload};
use crate::operator::{TypePattern as T, def_op, sig};
use crate::printer;
use crate::reader;

fn op_type(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let name = ctx.name_object_global(args[0].type_name().as_bytes())?;
    ctx.push(name.executable())
}

fn op_cvlit(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    ctx.push(args[0].literal())
}

fn op_cvx(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    ctx.push(args[0].executable())
}

fn op_xcheck(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    ctx.push(Object::boolean(args[0].is_executable()))
}

fn op_cvi(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let value = match args[0].payload() {
        Payload::Integer(n) => n,
        Payload::Real(r) => {
            let t = r.trunc();
            if t < i32::MIN as f32 || t > i32::MAX as f32 {
                return Err(PsError::RangeCheck);
            }
            t as i32
        }
        Payload::String(_) => {
            let bytes = string::bytes(ctx, args[0])?;
            match reader::parse_number(&bytes).map(|obj| obj.payload()) {
                Some(Payload::Integer(n)) => n,
                Some(Payload::Real(r)) => r.trunc() as i32,
                _ => return Err(PsError::TypeCheck),
            }
        }
        _ => return Err(PsError::TypeCheck),
    };
    ctx.push(Object::integer(value))
}

fn op_cvr(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let value = match args[0].payload() {
        Payload::Integer(n) => n as f32,
        Payload::Real(r) => r,
        Payload::String(_) => {
            let bytes = string::bytes(ctx, args[0])?;
            match reader::parse_number(&bytes).map(|obj| obj.payload()) {
                Some(Payload::Integer(n)) => n as f32,
                Some(Payload::Real(r)) => r,
                _ => return Err(PsError::TypeCheck),
            }
        }
        _ => return Err(PsError::TypeCheck),
    };
    ctx.push(Object::real(value))
}

fn op_cvn(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let bytes = string::bytes(ctx, args[0])?;
    let name = ctx.name_object(&bytes)?;
    ctx.push(if args[0].is_executable() {
        name.executable()
    } else {
        name
    })
}

fn op_cvs(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let text = printer::simple(ctx, args[0])?;
    string::put_bytes(ctx, args[1], 0, text.as_bytes())?;
    ctx.push(string::getinterval(args[1], 0, text.len())?)
}

fn op_cvrs(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let radix = args[1].as_integer().ok_or(PsError::TypeCheck)?;
    if !(2..=36).contains(&radix) {
        return Err(PsError::RangeCheck);
    }
    let text = if radix == 10 {
        printer::simple(ctx, args[0])?
    } else {
        // Non-decimal radices print the 32-bit two's-complement value.
        let value = match args[0].payload() {
            Payload::Integer(n) => n as u32,
            Payload::Real(r) => r.trunc() as i32 as u32,
            _ => return Err(PsError::TypeCheck),
        };
        to_radix(value, radix as u32)
    };
    string::put_bytes(ctx, args[2], 0, text.as_bytes())?;
    ctx.push(string::getinterval(args[2], 0, text.len())?)
}

fn to_radix(mut value: u32, radix: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if value == 0 {
        return "0".into();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % radix) as usize]);
        value /= radix;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

fn op_readonly(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    ctx.push(args[0].readonly())
}

fn op_executeonly(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    ctx.push(args[0].executeonly())
}

fn op_noaccess(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    ctx.push(args[0].noaccess())
}

fn op_rcheck(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    ctx.push(Object::boolean(args[0].is_readable()))
}

fn op_wcheck(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    ctx.push(Object::boolean(args[0].is_writable()))
}

fn op_null(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    ctx.push(Object::null())
}

fn op_version(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    let bank = ctx.current_bank();
    let s = string::cons_from(ctx, bank, env!("CARGO_PKG_VERSION").as_bytes())?;
    ctx.push(s.readonly())
}

fn bind_proc(ctx: &mut Context, proc: Object) -> Result<(), PsError> {
    let len = array::length(proc)?;
    for index in 0..len {
        let elem = array::get_nocheck(ctx, proc, index)?;
        match elem.payload() {
            Payload::Name { .. } if elem.is_executable() => {
                if let Some(value) = ctx.lookup(elem.literal())? {
                    if matches!(value.payload(), Payload::Operator(_)) && proc.is_writable() {
                        array::put(ctx, proc, index, value)?;
                    }
                }
            }
            Payload::Array(_) if elem.is_executable() => {
                bind_proc(ctx, elem)?;
            }
            _ => {}
        }
    }
    Ok(())
}

fn op_bind(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    bind_proc(ctx, args[0])?;
    ctx.push(args[0])
}

/// Register the type and attribute operators.
pub fn install(ctx: &mut Context) -> Result<(), PsError> {
    def_op(ctx, "type", vec![sig(op_type, 1, &[T::Any])])?;
    def_op(ctx, "cvlit", vec![sig(op_cvlit, 1, &[T::Any])])?;
    def_op(ctx, "cvx", vec![sig(op_cvx, 1, &[T::Any])])?;
    def_op(ctx, "xcheck", vec![sig(op_xcheck, 1, &[T::Any])])?;
    def_op(ctx, "cvi", vec![sig(op_cvi, 1, &[T::Any])])?;
    def_op(ctx, "cvr", vec![sig(op_cvr, 1, &[T::Any])])?;
    def_op(ctx, "cvn", vec![sig(op_cvn, 1, &[T::String])])?;
    def_op(ctx, "cvs", vec![sig(op_cvs, 1, &[T::Any, T::String])])?;
    def_op(
        ctx,
        "cvrs",
        vec![sig(op_cvrs, 1, &[T::Number, T::Integer, T::String])],
    )?;
    def_op(ctx, "readonly", vec![sig(op_readonly, 1, &[T::Any])])?;
    def_op(ctx, "executeonly", vec![sig(op_executeonly, 1, &[T::Any])])?;
    def_op(ctx, "noaccess", vec![sig(op_noaccess, 1, &[T::Any])])?;
    def_op(ctx, "rcheck", vec![sig(op_rcheck, 1, &[T::Any])])?;
    def_op(ctx, "wcheck", vec![sig(op_wcheck, 1, &[T::Any])])?;
    def_op(ctx, "null", vec![sig(op_null, 1, &[])])?;
    def_op(ctx, "version", vec![sig(op_version, 1, &[])])?;
    def_op(ctx, "bind", vec![sig(op_bind, 1, &[T::Proc])])?;
    Ok(())
}
