// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Rasterization into the page image.
//!
//! The page image is the device's `ImgData`: one row array per scanline,
//! top row first, each pixel a packed `0xRRGGBB` integer. PostScript
//! device space has its origin at the bottom left, so the row index is
//! flipped on every write. Filling is even-odd scanline polygon filling
//! over the flattened path; stroking draws one-pixel segments.

#[cfg(test)]
mod raster_test;

use tinta_vm::composite::{array, dict};
use tinta_vm::context::Context;
use tinta_vm::error::PsError;
use tinta_vm::names::sysname;
use tinta_vm::object::{Bank, Object};

use crate::device::{self, PrivateData};
use crate::gstate::{PATH_MOVE, path_triples};

/// Pack a color into a page image pixel.
#[must_use]
pub fn pack_rgb(r: f32, g: f32, b: f32) -> i32 {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as i32;
    (channel(r) << 16) | (channel(g) << 8) | channel(b)
}

struct Page {
    img: Object,
    width: i32,
    height: i32,
}

fn page(ctx: &mut Context) -> Result<Page, PsError> {
    let devdict = device::current_device(ctx)?;
    let PrivateData { width, height, .. } = device::private_data(ctx, devdict)?;
    let img = dict::get_normalized(ctx, devdict, Object::name(sysname::IMG_DATA, Bank::Global))?
        .ok_or(PsError::Unregistered)?;
    Ok(Page {
        img,
        width: width as i32,
        height: height as i32,
    })
}

fn put_pixel(ctx: &mut Context, page: &Page, x: i32, y: i32, packed: i32) -> Result<(), PsError> {
    if x < 0 || y < 0 || x >= page.width || y >= page.height {
        return Ok(());
    }
    // Device origin is bottom left; the image stores the top row first.
    let row_index = (page.height - 1 - y) as usize;
    let row = array::get(ctx, page.img, row_index)?;
    array::put(ctx, row, x as usize, Object::integer(packed))
}

/// The path as closed polygons (device coordinates).
fn polygons(triples: &[(i32, f32, f32)]) -> Vec<Vec<(f32, f32)>> {
    let mut polys = Vec::new();
    let mut current: Vec<(f32, f32)> = Vec::new();
    for &(tag, x, y) in triples {
        if tag == PATH_MOVE {
            if current.len() > 1 {
                polys.push(core::mem::take(&mut current));
            } else {
                current.clear();
            }
        }
        current.push((x, y));
    }
    if current.len() > 1 {
        polys.push(current);
    }
    polys
}

/// Fill the current path with `packed`, even-odd rule.
pub fn fill_path(ctx: &mut Context, packed: i32) -> Result<(), PsError> {
    let triples = path_triples(ctx)?;
    let polys = polygons(&triples);
    if polys.is_empty() {
        return Ok(());
    }
    let page = page(ctx)?;

    let mut y_min = f32::MAX;
    let mut y_max = f32::MIN;
    for point in polys.iter().flatten() {
        y_min = y_min.min(point.1);
        y_max = y_max.max(point.1);
    }
    let y_lo = (y_min.floor() as i32).max(0);
    let y_hi = (y_max.ceil() as i32).min(page.height - 1);

    for y in y_lo..=y_hi {
        let scan = y as f32 + 0.5;
        let mut crossings = Vec::new();
        for poly in &polys {
            let n = poly.len();
            for i in 0..n {
                let (x0, y0) = poly[i];
                let (x1, y1) = poly[(i + 1) % n];
                if (y0 <= scan && y1 > scan) || (y1 <= scan && y0 > scan) {
                    let t = (scan - y0) / (y1 - y0);
                    crossings.push(x0 + t * (x1 - x0));
                }
            }
        }
        crossings.sort_by(|a, b| a.partial_cmp(b).unwrap_or(core::cmp::Ordering::Equal));
        for pair in crossings.chunks_exact(2) {
            let x_lo = (pair[0].ceil() as i32).max(0);
            let x_hi = (pair[1].floor() as i32).min(page.width - 1);
            for x in x_lo..=x_hi {
                put_pixel(ctx, &page, x, y, packed)?;
            }
        }
    }
    Ok(())
}

/// Stroke the current path with `packed`, one pixel wide.
pub fn stroke_path(ctx: &mut Context, packed: i32) -> Result<(), PsError> {
    let triples = path_triples(ctx)?;
    let page = page(ctx)?;
    let mut previous: Option<(f32, f32)> = None;
    for (tag, x, y) in triples {
        if tag != PATH_MOVE {
            if let Some((x0, y0)) = previous {
                draw_line(ctx, &page, x0, y0, x, y, packed)?;
            }
        }
        previous = Some((x, y));
    }
    Ok(())
}

/// Bresenham over device coordinates.
fn draw_line(
    ctx: &mut Context,
    page: &Page,
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    packed: i32,
) -> Result<(), PsError> {
    let mut x = x0.round() as i32;
    let mut y = y0.round() as i32;
    let xe = x1.round() as i32;
    let ye = y1.round() as i32;
    let dx = (xe - x).abs();
    let dy = -(ye - y).abs();
    let sx = if x < xe { 1 } else { -1 };
    let sy = if y < ye { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_pixel(ctx, page, x, y, packed)?;
        if x == xe && y == ye {
            return Ok(());
        }
        let doubled = 2 * err;
        if doubled >= dy {
            err += dy;
            x += sx;
        }
        if doubled <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Read one pixel back (tests, devices).
pub fn get_pixel(ctx: &mut Context, x: i32, y: i32) -> Result<i32, PsError> {
    let page = page(ctx)?;
    if x < 0 || y < 0 || x >= page.width || y >= page.height {
        return Err(PsError::RangeCheck);
    }
    let row_index = (page.height - 1 - y) as usize;
    let row = array::get(ctx, page.img, row_index)?;
    array::get(ctx, row, x as usize)?
        .as_integer()
        .ok_or(PsError::TypeCheck)
}
