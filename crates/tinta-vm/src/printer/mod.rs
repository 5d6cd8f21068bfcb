// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Printing objects back to source text.
//!
//! [`repr`] is the syntactic form used by `==`: scanning the result of
//! `repr` yields an equal object for integers, reals, booleans, names,
//! strings, and procedure bodies. [`simple`] is the plain form used by
//! `=` and `cvs`, where types without a text form print as
//! `--nostringval--`.


use crate::composite::{array, string};
use crate::context::Context;
use crate::error::PsError;
use crate::object::{Object, Payload};
use crate::operator;

/// Format a real so it scans back as a real.
fn format_real(r: f32) -> String {
    let text = format!("{r}");
    if text.bytes().any(|b| matches!(b, b'.' | b'e' | b'E' | b'n' | b'i')) {
        text
    } else {
        format!("{text}.0")
    }
}

fn name_text(ctx: &Context, obj: Object) -> Result<String, PsError> {
    let bytes = ctx.name_bytes(obj)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// The `=`/`cvs` text form.
pub fn simple(ctx: &Context, obj: Object) -> Result<String, PsError> {
    Ok(match obj.payload() {
        Payload::Integer(n) => format!("{n}"),
        Payload::Real(r) => format_real(r),
        Payload::Boolean(b) => format!("{b}"),
        Payload::Name { .. } => name_text(ctx, obj)?,
        Payload::String(_) => String::from_utf8_lossy(&string::bytes(ctx, obj)?).into_owned(),
        _ => "--nostringval--".into(),
    })
}

/// The `==` text form.
pub fn repr(ctx: &Context, obj: Object) -> Result<String, PsError> {
    Ok(match obj.payload() {
        Payload::Null => "null".into(),
        Payload::Mark => "-mark-".into(),
        Payload::Invalid => "-invalid-".into(),
        Payload::Integer(n) => format!("{n}"),
        Payload::Real(r) => format_real(r),
        Payload::Boolean(b) => format!("{b}"),
        Payload::Save(_) => "-save-".into(),
        Payload::File(_) => "-file-".into(),
        Payload::Dict { .. } => "-dict-".into(),
        Payload::Operator(opcode) => {
            let name = operator::name_of(ctx, opcode)
                .map_or_else(|| "?".into(), |bytes| String::from_utf8_lossy(&bytes).into_owned());
            format!("--{name}--")
        }
        Payload::Name { .. } => {
            let text = name_text(ctx, obj)?;
            if obj.is_executable() {
                text
            } else {
                format!("/{text}")
            }
        }
        Payload::String(_) => {
            let mut out = String::from("(");
            for byte in string::bytes(ctx, obj)? {
                match byte {
                    b'(' => out.push_str("\\("),
                    b')' => out.push_str("\\)"),
                    b'\\' => out.push_str("\\\\"),
                    b'\n' => out.push_str("\\n"),
                    b'\r' => out.push_str("\\r"),
                    b'\t' => out.push_str("\\t"),
                    0x20..=0x7e => out.push(byte as char),
                    other => out.push_str(&format!("\\{other:03o}")),
                }
            }
            out.push(')');
            out
        }
        Payload::Array(_) => {
            let (open, close) = if obj.is_executable() { ("{", "}") } else { ("[", "]") };
            let mut out = String::from(open);
            let elems = array::elements(ctx, obj)?;
            for (index, elem) in elems.iter().enumerate() {
                if index > 0 {
                    out.push(' ');
                }
                out.push_str(&repr(ctx, *elem)?);
            }
            out.push_str(close);
            out
        }
    })
}
