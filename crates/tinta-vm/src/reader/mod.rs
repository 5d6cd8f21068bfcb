// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The scanner: PostScript source text to objects.
//!
//! [`scan`] reads one token from a file record and builds the object it
//! denotes: numbers (decimal integer, real, radix), names (executable,
//! `/literal`, `//immediate`), `(...)` and `<...>` strings, and `{...}`
//! procedure bodies (allocated as executable arrays). `[ ] << >>` are
//! self-delimiting executable names resolved through systemdict like any
//! other operator name.


use std::rc::Rc;

use crate::composite::{array, string};
use crate::context::Context;
use crate::error::PsError;
use crate::object::{FileId, Object};

/// Whitespace per the language reference.
const fn is_white(byte: u8) -> bool {
    matches!(byte, b'\0' | b'\t' | b'\n' | b'\x0c' | b'\r' | b' ')
}

/// Characters that terminate a regular token.
const fn is_delimiter(byte: u8) -> bool {
    matches!(
        byte,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

struct Cursor {
    data: Rc<[u8]>,
    pos: usize,
}

impl Cursor {
    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.data.get(self.pos + ahead).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    fn skip_white_and_comments(&mut self) {
        while let Some(byte) = self.peek() {
            if is_white(byte) {
                self.pos += 1;
            } else if byte == b'%' {
                while let Some(b) = self.bump() {
                    if b == b'\n' || b == b'\r' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }
}

enum Token {
    Obj(Object),
    ProcOpen,
    ProcClose,
    Eof,
}

/// Scan one object from a file record.
///
/// Returns `None` at end of input. Procedure bodies are consumed whole.
pub fn scan(ctx: &mut Context, file: FileId) -> Result<Option<Object>, PsError> {
    let (data, pos) = {
        let rec = ctx.file(file)?;
        if rec.closed {
            return Ok(None);
        }
        (Rc::clone(&rec.data), rec.pos)
    };
    let mut cursor = Cursor { data, pos };
    let result = scan_value(ctx, &mut cursor, 0);
    ctx.file_mut(file)?.pos = cursor.pos;
    result
}

/// Scan a whole source as one run of objects (tests, `cvx exec` strings
/// are handled through file records instead).
pub fn scan_all(ctx: &mut Context, source: &[u8]) -> Result<Vec<Object>, PsError> {
    let id = ctx.file_open(Rc::from(source), "%scan");
    let mut out = Vec::new();
    while let Some(obj) = scan(ctx, id)? {
        out.push(obj);
    }
    Ok(out)
}

fn scan_value(
    ctx: &mut Context,
    cursor: &mut Cursor,
    proc_depth: usize,
) -> Result<Option<Object>, PsError> {
    match next_token(ctx, cursor, proc_depth)? {
        Token::Obj(obj) => Ok(Some(obj)),
        Token::Eof => Ok(None),
        Token::ProcOpen => Ok(Some(scan_proc(ctx, cursor, proc_depth + 1)?)),
        Token::ProcClose => Err(PsError::SyntaxError),
    }
}

fn scan_proc(ctx: &mut Context, cursor: &mut Cursor, proc_depth: usize) -> Result<Object, PsError> {
    let mut body = Vec::new();
    loop {
        match next_token(ctx, cursor, proc_depth)? {
            Token::Obj(obj) => body.push(obj),
            Token::ProcOpen => body.push(scan_proc(ctx, cursor, proc_depth + 1)?),
            Token::ProcClose => break,
            Token::Eof => return Err(PsError::SyntaxError),
        }
    }
    let bank = ctx.current_bank();
    Ok(array::cons_from(ctx, bank, &body)?.executable())
}

fn next_token(
    ctx: &mut Context,
    cursor: &mut Cursor,
    proc_depth: usize,
) -> Result<Token, PsError> {
    cursor.skip_white_and_comments();
    let Some(byte) = cursor.peek() else {
        return Ok(Token::Eof);
    };
    match byte {
        b'{' => {
            cursor.pos += 1;
            Ok(Token::ProcOpen)
        }
        b'}' => {
            if proc_depth == 0 {
                return Err(PsError::SyntaxError);
            }
            cursor.pos += 1;
            Ok(Token::ProcClose)
        }
        b'(' => {
            cursor.pos += 1;
            let bytes = scan_paren_string(cursor)?;
            let bank = ctx.current_bank();
            Ok(Token::Obj(string::cons_from(ctx, bank, &bytes)?))
        }
        b')' => Err(PsError::SyntaxError),
        b'<' => {
            if cursor.peek_at(1) == Some(b'<') {
                cursor.pos += 2;
                Ok(Token::Obj(ctx.name_object(b"<<")?.executable()))
            } else {
                cursor.pos += 1;
                let bytes = scan_hex_string(cursor)?;
                let bank = ctx.current_bank();
                Ok(Token::Obj(string::cons_from(ctx, bank, &bytes)?))
            }
        }
        b'>' => {
            if cursor.peek_at(1) == Some(b'>') {
                cursor.pos += 2;
                Ok(Token::Obj(ctx.name_object(b">>")?.executable()))
            } else {
                Err(PsError::SyntaxError)
            }
        }
        b'[' | b']' => {
            cursor.pos += 1;
            Ok(Token::Obj(ctx.name_object(&[byte])?.executable()))
        }
        b'/' => {
            cursor.pos += 1;
            if cursor.peek() == Some(b'/') {
                cursor.pos += 1;
                let bytes = scan_regular(cursor);
                let name = ctx.name_object(&bytes)?;
                // Immediate substitution: the binding replaces the name
                // at scan time.
                ctx.lookup(name)?.map_or(Err(PsError::Undefined), |value| {
                    Ok(Token::Obj(value))
                })
            } else {
                let bytes = scan_regular(cursor);
                Ok(Token::Obj(ctx.name_object(&bytes)?))
            }
        }
        _ => {
            let bytes = scan_regular(cursor);
            if bytes.is_empty() {
                // A stray delimiter we do not handle above.
                cursor.pos += 1;
                return Err(PsError::SyntaxError);
            }
            if let Some(number) = parse_number(&bytes) {
                Ok(Token::Obj(number))
            } else {
                Ok(Token::Obj(ctx.name_object(&bytes)?.executable()))
            }
        }
    }
}

/// Consume a run of regular characters.
fn scan_regular(cursor: &mut Cursor) -> Vec<u8> {
    let mut out = Vec::new();
    while let Some(byte) = cursor.peek() {
        if is_white(byte) || is_delimiter(byte) {
            break;
        }
        out.push(byte);
        cursor.pos += 1;
    }
    out
}

/// Body of a `(...)` string; the opening paren is already consumed.
fn scan_paren_string(cursor: &mut Cursor) -> Result<Vec<u8>, PsError> {
    let mut out = Vec::new();
    let mut depth = 1usize;
    loop {
        let Some(byte) = cursor.bump() else {
            return Err(PsError::SyntaxError);
        };
        match byte {
            b'(' => {
                depth += 1;
                out.push(byte);
            }
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(out);
                }
                out.push(byte);
            }
            b'\\' => {
                let Some(escape) = cursor.bump() else {
                    return Err(PsError::SyntaxError);
                };
                match escape {
                    b'n' => out.push(b'\n'),
                    b'r' => out.push(b'\r'),
                    b't' => out.push(b'\t'),
                    b'b' => out.push(0x08),
                    b'f' => out.push(0x0c),
                    b'\\' | b'(' | b')' => out.push(escape),
                    b'\n' => {}
                    b'\r' => {
                        if cursor.peek() == Some(b'\n') {
                            cursor.pos += 1;
                        }
                    }
                    b'0'..=b'7' => {
                        let mut value = u32::from(escape - b'0');
                        for _ in 0..2 {
                            match cursor.peek() {
                                Some(digit @ b'0'..=b'7') => {
                                    value = value * 8 + u32::from(digit - b'0');
                                    cursor.pos += 1;
                                }
                                _ => break,
                            }
                        }
                        out.push(value as u8);
                    }
                    other => out.push(other),
                }
            }
            _ => out.push(byte),
        }
    }
}

/// Body of a `<...>` hex string; the opening bracket is already consumed.
fn scan_hex_string(cursor: &mut Cursor) -> Result<Vec<u8>, PsError> {
    let mut out = Vec::new();
    let mut pending: Option<u8> = None;
    loop {
        let Some(byte) = cursor.bump() else {
            return Err(PsError::SyntaxError);
        };
        if byte == b'>' {
            if let Some(high) = pending {
                out.push(high << 4);
            }
            return Ok(out);
        }
        if is_white(byte) {
            continue;
        }
        let digit = match byte {
            b'0'..=b'9' => byte - b'0',
            b'a'..=b'f' => byte - b'a' + 10,
            b'A'..=b'F' => byte - b'A' + 10,
            _ => return Err(PsError::SyntaxError),
        };
        match pending.take() {
            Some(high) => out.push((high << 4) | digit),
            None => pending = Some(digit),
        }
    }
}

/// Parse a numeric token: decimal integer, real, or `base#digits`.
///
/// Decimal integers that overflow 32 bits become reals, as the language
/// reference requires.
#[must_use]
pub fn parse_number(bytes: &[u8]) -> Option<Object> {
    let text = core::str::from_utf8(bytes).ok()?;
    if let Some((base, digits)) = text.split_once('#') {
        let base: u32 = base.parse().ok()?;
        if !(2..=36).contains(&base) || digits.is_empty() {
            return None;
        }
        let mut value: u32 = 0;
        for ch in digits.chars() {
            let digit = ch.to_digit(36)?;
            if digit >= base {
                return None;
            }
            value = value.wrapping_mul(base).wrapping_add(digit);
        }
        return Some(Object::integer(value as i32));
    }
    if !text.bytes().any(|b| b.is_ascii_digit()) {
        // ".", "-", "e" alone are names, not numbers.
        return None;
    }
    if text.bytes().all(|b| b.is_ascii_digit() || b == b'+' || b == b'-') {
        if text.bytes().skip(1).any(|b| b == b'+' || b == b'-') {
            return None;
        }
        return match text.parse::<i32>() {
            Ok(n) => Some(Object::integer(n)),
            // Too wide for an integer: fall back to a real.
            Err(_) => text.parse::<f32>().ok().map(Object::real),
        };
    }
    if text
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return text.parse::<f32>().ok().map(Object::real);
    }
    None
}
