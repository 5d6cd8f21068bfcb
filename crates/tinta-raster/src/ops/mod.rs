// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Graphics operators.
//!
//! Path construction applies the current matrix on entry, painting
//! rasterizes into the page image and clears the path. Fonts carry stub
//! metrics only: `show` advances the current point without marking the
//! page.

use tinta_vm::composite::dict;
use tinta_vm::context::Context;
use tinta_vm::error::PsError;
use tinta_vm::object::{Object, Payload};
use tinta_vm::operator::{TypePattern as T, def_op, sig};

use crate::gstate::{self, Matrix, PATH_LINE, PATH_MOVE};
use crate::raster;

/// Advance width per character, as a fraction of the font size.
const STUB_ADVANCE: f32 = 0.6;

fn want_real(obj: Object) -> Result<f32, PsError> {
    obj.as_number().map(|v| v as f32).ok_or(PsError::TypeCheck)
}

fn op_setrgbcolor(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    gstate::set_color(
        ctx,
        want_real(args[0])?,
        want_real(args[1])?,
        want_real(args[2])?,
    )
}

fn op_setgray(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let v = want_real(args[0])?;
    gstate::set_color(ctx, v, v, v)
}

fn op_currentrgbcolor(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    let (r, g, b) = gstate::color(ctx)?;
    ctx.push(Object::real(r))?;
    ctx.push(Object::real(g))?;
    ctx.push(Object::real(b))
}

fn op_newpath(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    gstate::clear_path(ctx)
}

fn move_or_line(ctx: &mut Context, tag: i32, x: f32, y: f32) -> Result<(), PsError> {
    let matrix = gstate::ctm(ctx)?;
    let (dx, dy) = matrix.apply(x, y);
    gstate::path_append(ctx, tag, dx, dy)?;
    gstate::set_currentpoint(ctx, x, y)
}

fn op_moveto(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    move_or_line(ctx, PATH_MOVE, want_real(args[0])?, want_real(args[1])?)
}

fn op_lineto(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    if gstate::currentpoint(ctx)?.is_none() {
        return Err(PsError::NoCurrentPoint);
    }
    move_or_line(ctx, PATH_LINE, want_real(args[0])?, want_real(args[1])?)
}

fn op_rmoveto(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let (x, y) = gstate::currentpoint(ctx)?.ok_or(PsError::NoCurrentPoint)?;
    move_or_line(ctx, PATH_MOVE, x + want_real(args[0])?, y + want_real(args[1])?)
}

fn op_rlineto(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let (x, y) = gstate::currentpoint(ctx)?.ok_or(PsError::NoCurrentPoint)?;
    move_or_line(ctx, PATH_LINE, x + want_real(args[0])?, y + want_real(args[1])?)
}

fn op_closepath(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    // Subpaths are treated as closed by the rasterizer; closepath only
    // needs to restore the current point to the subpath start.
    let triples = gstate::path_triples(ctx)?;
    let start = triples.iter().rev().find(|(tag, _, _)| *tag == PATH_MOVE);
    if let Some(&(_, x, y)) = start {
        gstate::path_append(ctx, PATH_LINE, x, y)?;
    }
    Ok(())
}

fn op_currentpoint(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    let (x, y) = gstate::currentpoint(ctx)?.ok_or(PsError::NoCurrentPoint)?;
    ctx.push(Object::real(x))?;
    ctx.push(Object::real(y))
}

fn op_translate(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    gstate::concat_ctm(
        ctx,
        &Matrix::translation(want_real(args[0])?, want_real(args[1])?),
    )
}

fn op_scale(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    gstate::concat_ctm(
        ctx,
        &Matrix::scaling(want_real(args[0])?, want_real(args[1])?),
    )
}

fn op_rotate(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    gstate::concat_ctm(ctx, &Matrix::rotation(want_real(args[0])?))
}

/// `x y r ang1 ang2 arc`: append a counterclockwise arc, flattened to
/// line segments.
fn op_arc(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let cx = want_real(args[0])?;
    let cy = want_real(args[1])?;
    let radius = want_real(args[2])?;
    let ang1 = want_real(args[3])?;
    let mut ang2 = want_real(args[4])?;
    if radius < 0.0 {
        return Err(PsError::RangeCheck);
    }
    while ang2 < ang1 {
        ang2 += 360.0;
    }
    let sweep = ang2 - ang1;
    let steps = ((sweep / 6.0).ceil() as usize).clamp(8, 360);

    let point_at = |ang: f32| {
        let rad = ang.to_radians();
        (cx + radius * rad.cos(), cy + radius * rad.sin())
    };

    let (sx, sy) = point_at(ang1);
    // With a current point the arc start is connected to it; otherwise
    // the arc begins a fresh subpath.
    if gstate::currentpoint(ctx)?.is_some() {
        move_or_line(ctx, PATH_LINE, sx, sy)?;
    } else {
        move_or_line(ctx, PATH_MOVE, sx, sy)?;
    }
    for step in 1..=steps {
        let ang = ang1 + sweep * (step as f32) / (steps as f32);
        let (x, y) = point_at(ang);
        move_or_line(ctx, PATH_LINE, x, y)?;
    }
    Ok(())
}

fn op_fill(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    let (r, g, b) = gstate::color(ctx)?;
    raster::fill_path(ctx, raster::pack_rgb(r, g, b))?;
    gstate::clear_path(ctx)
}

fn op_stroke(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    let (r, g, b) = gstate::color(ctx)?;
    raster::stroke_path(ctx, raster::pack_rgb(r, g, b))?;
    gstate::clear_path(ctx)
}

fn op_gsave(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    gstate::gsave(ctx)
}

fn op_grestore(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    gstate::grestore(ctx)
}

// --- stub fonts --------------------------------------------------------

/// `findfont`: a minimal font dictionary carrying only its name.
fn op_findfont(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let font = dict::cons(ctx, 4)?;
    let name_key = ctx.name_object_global(b"FontName")?;
    dict::put(ctx, font, name_key, args[0])?;
    let size_key = ctx.name_object_global(b"FontSize")?;
    dict::put(ctx, font, size_key, Object::real(1.0))?;
    ctx.push(font)
}

fn op_scalefont(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let factor = want_real(args[1])?;
    let size_key = ctx.name_object_global(b"FontSize")?;
    let size = dict::get_normalized(ctx, args[0], size_key)?
        .and_then(|obj| obj.as_number())
        .unwrap_or(1.0) as f32;
    let scaled = dict::cons(ctx, 4)?;
    dict::copy_fill(ctx, args[0], scaled)?;
    dict::put(ctx, scaled, size_key, Object::real(size * factor))?;
    ctx.push(scaled)
}

fn op_setfont(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let size_key = ctx.name_object_global(b"FontSize")?;
    let size = dict::get_normalized(ctx, args[0], size_key)?
        .and_then(|obj| obj.as_number())
        .ok_or(PsError::InvalidFont)? as f32;
    gstate::set_entry(ctx, "fontsize", Object::real(size))
}

/// `key scale selectfont`: findfont + scalefont + setfont in one step.
fn op_selectfont(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    if !matches!(args[0].payload(), Payload::Name { .. }) {
        return Err(PsError::TypeCheck);
    }
    gstate::set_entry(ctx, "fontsize", Object::real(want_real(args[1])?))
}

/// Stub metric: the advance of `text` at the current font size.
fn stub_width(ctx: &mut Context, text_len: usize) -> Result<f32, PsError> {
    let size = gstate::entry(ctx, "fontsize")?
        .as_number()
        .unwrap_or(0.0) as f32;
    Ok(STUB_ADVANCE * size * text_len as f32)
}

/// `show`: advance the current point by the stub metrics. Glyph
/// rasterization is out of scope; the page is not marked.
fn op_show(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let (x, y) = gstate::currentpoint(ctx)?.ok_or(PsError::NoCurrentPoint)?;
    let text = tinta_vm::composite::string::bytes(ctx, args[0])?;
    let advance = stub_width(ctx, text.len())?;
    gstate::set_currentpoint(ctx, x + advance, y)
}

fn op_stringwidth(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let text = tinta_vm::composite::string::bytes(ctx, args[0])?;
    let advance = stub_width(ctx, text.len())?;
    ctx.push(Object::real(advance))?;
    ctx.push(Object::real(0.0))
}

/// Register the graphics operators.
pub fn install(ctx: &mut Context) -> Result<(), PsError> {
    let f1: &[T] = &[T::Float];
    let f2: &[T] = &[T::Float, T::Float];
    def_op(ctx, "setrgbcolor", vec![sig(op_setrgbcolor, 0, &[T::Float, T::Float, T::Float])])?;
    def_op(ctx, "setgray", vec![sig(op_setgray, 0, f1)])?;
    def_op(ctx, "currentrgbcolor", vec![sig(op_currentrgbcolor, 3, &[])])?;
    def_op(ctx, "newpath", vec![sig(op_newpath, 0, &[])])?;
    def_op(ctx, "moveto", vec![sig(op_moveto, 0, f2)])?;
    def_op(ctx, "lineto", vec![sig(op_lineto, 0, f2)])?;
    def_op(ctx, "rmoveto", vec![sig(op_rmoveto, 0, f2)])?;
    def_op(ctx, "rlineto", vec![sig(op_rlineto, 0, f2)])?;
    def_op(ctx, "closepath", vec![sig(op_closepath, 0, &[])])?;
    def_op(ctx, "currentpoint", vec![sig(op_currentpoint, 2, &[])])?;
    def_op(ctx, "translate", vec![sig(op_translate, 0, f2)])?;
    def_op(ctx, "scale", vec![sig(op_scale, 0, f2)])?;
    def_op(ctx, "rotate", vec![sig(op_rotate, 0, f1)])?;
    def_op(
        ctx,
        "arc",
        vec![sig(op_arc, 0, &[T::Float, T::Float, T::Float, T::Float, T::Float])],
    )?;
    def_op(ctx, "fill", vec![sig(op_fill, 0, &[])])?;
    def_op(ctx, "stroke", vec![sig(op_stroke, 0, &[])])?;
    def_op(ctx, "gsave", vec![sig(op_gsave, 0, &[])])?;
    def_op(ctx, "grestore", vec![sig(op_grestore, 0, &[])])?;
    def_op(ctx, "findfont", vec![sig(op_findfont, 1, &[T::Any])])?;
    def_op(ctx, "scalefont", vec![sig(op_scalefont, 1, &[T::Dict, T::Float])])?;
    def_op(ctx, "setfont", vec![sig(op_setfont, 0, &[T::Dict])])?;
    def_op(ctx, "selectfont", vec![sig(op_selectfont, 0, &[T::Any, T::Float])])?;
    def_op(ctx, "show", vec![sig(op_show, 0, &[T::String])])?;
    def_op(ctx, "stringwidth", vec![sig(op_stringwidth, 2, &[T::String])])?;
    Ok(())
}
