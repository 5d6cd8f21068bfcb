// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Graphics state.
//!
//! The current graphics state is a dictionary on top of the graphics
//! stack: color, current point, transformation matrix, stub font, and
//! the current path. `gsave` pushes a deep copy, `grestore` pops back to
//! the previous one. The path is a flat array of `(tag, x, y)` triples
//! in device coordinates; the matrix is applied when points enter the
//! path, so the rasterizer never sees user space.


use tinta_vm::composite::{array, dict};
use tinta_vm::context::Context;
use tinta_vm::error::PsError;
use tinta_vm::object::{Bank, Object};
use tinta_vm::stack;

/// Path segment starting a subpath.
pub const PATH_MOVE: i32 = 0;
/// Path segment continuing a subpath.
pub const PATH_LINE: i32 = 1;

/// Initial path capacity in triples.
const PATH_CAPACITY: usize = 64;

/// A 2D affine transform: `[a b c d tx ty]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix {
    /// x scale.
    pub a: f32,
    /// y shear.
    pub b: f32,
    /// x shear.
    pub c: f32,
    /// y scale.
    pub d: f32,
    /// x translation.
    pub tx: f32,
    /// y translation.
    pub ty: f32,
}

impl Matrix {
    /// The identity transform.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Apply to a point.
    #[must_use]
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.tx,
            self.b * x + self.d * y + self.ty,
        )
    }

    /// Compose with an inner transform: the result applies `inner`
    /// first, then `self`.
    #[must_use]
    pub fn compose(&self, inner: &Self) -> Self {
        Self {
            a: self.a * inner.a + self.c * inner.b,
            b: self.b * inner.a + self.d * inner.b,
            c: self.a * inner.c + self.c * inner.d,
            d: self.b * inner.c + self.d * inner.d,
            tx: self.a * inner.tx + self.c * inner.ty + self.tx,
            ty: self.b * inner.tx + self.d * inner.ty + self.ty,
        }
    }

    /// Translation transform.
    #[must_use]
    pub const fn translation(tx: f32, ty: f32) -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            tx,
            ty,
        }
    }

    /// Scaling transform.
    #[must_use]
    pub const fn scaling(sx: f32, sy: f32) -> Self {
        Self {
            a: sx,
            b: 0.0,
            c: 0.0,
            d: sy,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Rotation transform, angle in degrees.
    #[must_use]
    pub fn rotation(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            tx: 0.0,
            ty: 0.0,
        }
    }
}

fn key(ctx: &mut Context, name: &str) -> Result<Object, PsError> {
    ctx.name_object_global(name.as_bytes())
}

/// Build a fresh default graphics state dictionary.
fn new_gstate(ctx: &mut Context) -> Result<Object, PsError> {
    let g = dict::cons_in(ctx, Bank::Local, 16)?;
    let rgb = array::cons_in(ctx, Bank::Local, 3)?;
    for slot in 0..3 {
        array::put(ctx, rgb, slot, Object::real(0.0))?;
    }
    let ctm = array::cons_in(ctx, Bank::Local, 6)?;
    write_matrix(ctx, ctm, &Matrix::identity())?;
    let path = array::cons_in(ctx, Bank::Local, PATH_CAPACITY * 3)?;

    for (name, value) in [
        ("rgb", rgb),
        ("ctm", ctm),
        ("path", path),
        ("pathlen", Object::integer(0)),
        ("posx", Object::real(0.0)),
        ("posy", Object::real(0.0)),
        ("haspos", Object::boolean(false)),
        ("fontsize", Object::real(0.0)),
    ] {
        let k = key(ctx, name)?;
        dict::put(ctx, g, k, value)?;
    }
    Ok(g)
}

/// Push the initial graphics state onto the graphics stack.
pub fn init(ctx: &mut Context) -> Result<(), PsError> {
    let g = new_gstate(ctx)?;
    stack::push(&mut ctx.lo, ctx.gs, g).map_err(PsError::from)
}

/// The current graphics state (top of the graphics stack).
pub fn current(ctx: &Context) -> Result<Object, PsError> {
    stack::peek(&ctx.lo, ctx.gs, 0)?.ok_or(PsError::Unregistered)
}

/// `gsave`: push a deep copy of the current state.
pub fn gsave(ctx: &mut Context) -> Result<(), PsError> {
    let old = current(ctx)?;
    let copy = new_gstate(ctx)?;
    // Scalars copy over; the arrays need fresh storage.
    for name in ["pathlen", "posx", "posy", "haspos", "fontsize", "fontname"] {
        let k = key(ctx, name)?;
        if let Some(value) = dict::get_normalized(ctx, old, k)? {
            dict::put(ctx, copy, k, value)?;
        }
    }
    for name in ["rgb", "ctm"] {
        let k = key(ctx, name)?;
        let src = dict::get_normalized(ctx, old, k)?.ok_or(PsError::Unregistered)?;
        let dst = dict::get_normalized(ctx, copy, k)?.ok_or(PsError::Unregistered)?;
        array::putinterval(ctx, dst, 0, src)?;
    }
    // The path is copied up to its fill level.
    let k = key(ctx, "path")?;
    let src = dict::get_normalized(ctx, old, k)?.ok_or(PsError::Unregistered)?;
    let used = triples(ctx, old)? * 3;
    if used > 0 {
        let mut dst = dict::get_normalized(ctx, copy, k)?.ok_or(PsError::Unregistered)?;
        if used > array::length(dst)? {
            dst = array::cons_in(ctx, Bank::Local, used)?;
            dict::put(ctx, copy, k, dst)?;
        }
        let src_used = array::getinterval(src, 0, used)?;
        array::putinterval(ctx, dst, 0, src_used)?;
    }
    // The copy becomes current; the old state sits below it.
    stack::push(&mut ctx.lo, ctx.gs, copy).map_err(PsError::from)
}

/// `grestore`: pop back to the previous state (the bottom one stays).
pub fn grestore(ctx: &mut Context) -> Result<(), PsError> {
    if stack::depth(&ctx.lo, ctx.gs)? > 1 {
        stack::pop(&mut ctx.lo, ctx.gs)?;
    }
    Ok(())
}

/// Read a dictionary entry of the current state.
pub fn entry(ctx: &mut Context, name: &str) -> Result<Object, PsError> {
    let g = current(ctx)?;
    let k = key(ctx, name)?;
    dict::get_normalized(ctx, g, k)?.ok_or(PsError::Unregistered)
}

/// Write a dictionary entry of the current state.
pub fn set_entry(ctx: &mut Context, name: &str, value: Object) -> Result<(), PsError> {
    let g = current(ctx)?;
    let k = key(ctx, name)?;
    dict::put(ctx, g, k, value)
}

/// The current color as `(r, g, b)` in 0..=1.
pub fn color(ctx: &mut Context) -> Result<(f32, f32, f32), PsError> {
    let rgb = entry(ctx, "rgb")?;
    let read = |ctx: &Context, slot: usize| -> Result<f32, PsError> {
        Ok(array::get(ctx, rgb, slot)?
            .as_number()
            .ok_or(PsError::TypeCheck)? as f32)
    };
    Ok((read(ctx, 0)?, read(ctx, 1)?, read(ctx, 2)?))
}

/// Set the current color, clamped to 0..=1.
pub fn set_color(ctx: &mut Context, r: f32, g: f32, b: f32) -> Result<(), PsError> {
    let rgb = entry(ctx, "rgb")?;
    for (slot, value) in [r, g, b].into_iter().enumerate() {
        array::put(ctx, rgb, slot, Object::real(value.clamp(0.0, 1.0)))?;
    }
    Ok(())
}

/// The current transformation matrix.
pub fn ctm(ctx: &mut Context) -> Result<Matrix, PsError> {
    let arr = entry(ctx, "ctm")?;
    let read = |ctx: &Context, slot: usize| -> Result<f32, PsError> {
        Ok(array::get(ctx, arr, slot)?
            .as_number()
            .ok_or(PsError::TypeCheck)? as f32)
    };
    Ok(Matrix {
        a: read(ctx, 0)?,
        b: read(ctx, 1)?,
        c: read(ctx, 2)?,
        d: read(ctx, 3)?,
        tx: read(ctx, 4)?,
        ty: read(ctx, 5)?,
    })
}

fn write_matrix(ctx: &mut Context, arr: Object, m: &Matrix) -> Result<(), PsError> {
    for (slot, value) in [m.a, m.b, m.c, m.d, m.tx, m.ty].into_iter().enumerate() {
        array::put(ctx, arr, slot, Object::real(value))?;
    }
    Ok(())
}

/// Replace the current transformation matrix.
pub fn set_ctm(ctx: &mut Context, m: &Matrix) -> Result<(), PsError> {
    let arr = entry(ctx, "ctm")?;
    write_matrix(ctx, arr, m)
}

/// Compose `inner` into the current matrix (translate/scale/rotate).
pub fn concat_ctm(ctx: &mut Context, inner: &Matrix) -> Result<(), PsError> {
    let current_matrix = ctm(ctx)?;
    set_ctm(ctx, &current_matrix.compose(inner))
}

/// The current point in user space, if any.
pub fn currentpoint(ctx: &mut Context) -> Result<Option<(f32, f32)>, PsError> {
    let has = entry(ctx, "haspos")?.as_boolean().unwrap_or(false);
    if !has {
        return Ok(None);
    }
    let x = entry(ctx, "posx")?.as_number().ok_or(PsError::TypeCheck)? as f32;
    let y = entry(ctx, "posy")?.as_number().ok_or(PsError::TypeCheck)? as f32;
    Ok(Some((x, y)))
}

/// Set the current point (user space).
pub fn set_currentpoint(ctx: &mut Context, x: f32, y: f32) -> Result<(), PsError> {
    set_entry(ctx, "posx", Object::real(x))?;
    set_entry(ctx, "posy", Object::real(y))?;
    set_entry(ctx, "haspos", Object::boolean(true))
}

/// Forget the current point.
pub fn clear_currentpoint(ctx: &mut Context) -> Result<(), PsError> {
    set_entry(ctx, "haspos", Object::boolean(false))
}

/// Number of path triples in the current path.
pub fn triples(ctx: &mut Context, g: Object) -> Result<usize, PsError> {
    let k = key(ctx, "pathlen")?;
    Ok(dict::get_normalized(ctx, g, k)?
        .and_then(|obj| obj.as_integer())
        .unwrap_or(0) as usize)
}

/// Append a `(tag, x, y)` triple in device coordinates, growing the
/// path array as needed.
pub fn path_append(ctx: &mut Context, tag: i32, x: f32, y: f32) -> Result<(), PsError> {
    let g = current(ctx)?;
    let used = triples(ctx, g)?;
    let path_key = key(ctx, "path")?;
    let mut path = dict::get_normalized(ctx, g, path_key)?.ok_or(PsError::Unregistered)?;
    let capacity = array::length(path)? / 3;
    if used == capacity {
        let grown = array::cons_in(ctx, Bank::Local, capacity * 3 * 2)?;
        let old = array::getinterval(path, 0, used * 3)?;
        array::putinterval(ctx, grown, 0, old)?;
        dict::put(ctx, g, path_key, grown)?;
        path = grown;
    }
    array::put(ctx, path, used * 3, Object::integer(tag))?;
    array::put(ctx, path, used * 3 + 1, Object::real(x))?;
    array::put(ctx, path, used * 3 + 2, Object::real(y))?;
    set_entry(ctx, "pathlen", Object::integer(used as i32 + 1))
}

/// The path triples in device coordinates.
pub fn path_triples(ctx: &mut Context) -> Result<Vec<(i32, f32, f32)>, PsError> {
    let g = current(ctx)?;
    let used = triples(ctx, g)?;
    let path_key = key(ctx, "path")?;
    let path = dict::get_normalized(ctx, g, path_key)?.ok_or(PsError::Unregistered)?;
    let mut out = Vec::with_capacity(used);
    for index in 0..used {
        let tag = array::get(ctx, path, index * 3)?
            .as_integer()
            .ok_or(PsError::TypeCheck)?;
        let x = array::get(ctx, path, index * 3 + 1)?
            .as_number()
            .ok_or(PsError::TypeCheck)? as f32;
        let y = array::get(ctx, path, index * 3 + 2)?
            .as_number()
            .ok_or(PsError::TypeCheck)? as f32;
        out.push((tag, x, y));
    }
    Ok(out)
}

/// Drop the current path and current point (`newpath`, after painting).
pub fn clear_path(ctx: &mut Context) -> Result<(), PsError> {
    set_entry(ctx, "pathlen", Object::integer(0))?;
    clear_currentpoint(ctx)
}
