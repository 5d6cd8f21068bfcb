// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The raster page device.
//!
//! The device instance is a dictionary. `Create` runs by continuation:
//! the native half pushes its follow-up opcode onto the execution stack
//! before the work that must precede it, so the instance dictionary is
//! finished by the execution loop rather than by host recursion. The
//! native record (width, height, pixel mode) is serialized into the
//! `Private` string entry the way the C-level struct of the original
//! device would be.

#[cfg(test)]
mod device_test;

use std::io::Write;

use tracing::{debug, info};

use tinta_vm::composite::{array, dict, string};
use tinta_vm::context::{Context, Output, ShowpageMode};
use tinta_vm::error::PsError;
use tinta_vm::names::sysname;
use tinta_vm::object::{Bank, Object, Payload};
use tinta_vm::operator::{TypePattern as T, def_op, def_op_hidden, sig};
use tinta_vm::vm;

use crate::InstallError;

/// Background color of a fresh page.
pub const WHITE: i32 = 0x00ff_ffff;

/// Pixel layout of the emitted buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PixelMode {
    /// 3 bytes per pixel: R, G, B.
    Rgb = 0,
    /// 4 bytes per pixel: A, R, G, B.
    Argb = 1,
    /// 3 bytes per pixel: B, G, R.
    Bgr = 2,
    /// 4 bytes per pixel: B, G, R, A.
    Bgra = 3,
}

impl PixelMode {
    /// Bytes per pixel.
    #[must_use]
    pub const fn stride(self) -> usize {
        match self {
            Self::Rgb | Self::Bgr => 3,
            Self::Argb | Self::Bgra => 4,
        }
    }

    const fn from_tag(tag: u8) -> Self {
        match tag {
            1 => Self::Argb,
            2 => Self::Bgr,
            3 => Self::Bgra,
            _ => Self::Rgb,
        }
    }
}

/// A parsed device spec: family name plus `:`-suffixed pixel mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceSpec {
    /// In-memory raster, emitted as a pixel buffer or PPM file.
    Raster(PixelMode),
    /// Raster with PPM file output.
    Ppm,
}

impl DeviceSpec {
    /// Parse a device spec string.
    pub fn parse(spec: &str) -> Result<Self, InstallError> {
        let (family, mode) = match spec.split_once(':') {
            Some((family, mode)) => (family, Some(mode)),
            None => (spec, None),
        };
        match (family, mode) {
            ("raster", None | Some("rgb")) => Ok(Self::Raster(PixelMode::Rgb)),
            ("raster", Some("argb")) => Ok(Self::Raster(PixelMode::Argb)),
            ("raster", Some("bgr")) => Ok(Self::Raster(PixelMode::Bgr)),
            ("raster", Some("bgra")) => Ok(Self::Raster(PixelMode::Bgra)),
            ("ppm", None) => Ok(Self::Ppm),
            ("png", _) => Err(InstallError::Unavailable("png".into())),
            _ => Err(InstallError::UnknownDevice(spec.into())),
        }
    }

    const fn mode(self) -> PixelMode {
        match self {
            Self::Raster(mode) => mode,
            Self::Ppm => PixelMode::Rgb,
        }
    }
}

/// The native device record stashed in the `Private` string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrivateData {
    /// Page width in pixels.
    pub width: u32,
    /// Page height in pixels.
    pub height: u32,
    /// Emitted pixel layout.
    pub mode: PixelMode,
}

impl PrivateData {
    /// Serialized size in bytes.
    pub const SIZE: usize = 9;

    /// Serialize into the `Private` string bytes.
    #[must_use]
    pub fn to_bytes(self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..4].copy_from_slice(&self.width.to_le_bytes());
        out[4..8].copy_from_slice(&self.height.to_le_bytes());
        out[8] = self.mode as u8;
        out
    }

    /// Deserialize from the `Private` string bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut width = [0u8; 4];
        let mut height = [0u8; 4];
        width.copy_from_slice(&bytes[0..4]);
        height.copy_from_slice(&bytes[4..8]);
        Self {
            width: u32::from_le_bytes(width),
            height: u32::from_le_bytes(height),
            mode: PixelMode::from_tag(bytes[8]),
        }
    }
}

/// Read the native record out of a device dictionary.
pub fn private_data(ctx: &mut Context, devdict: Object) -> Result<PrivateData, PsError> {
    let key = Object::name(sysname::PRIVATE, Bank::Global);
    let s = dict::get_normalized(ctx, devdict, key)?.ok_or(PsError::Unregistered)?;
    let bytes = string::bytes(ctx, s)?;
    if bytes.len() < PrivateData::SIZE {
        return Err(PsError::Unregistered);
    }
    Ok(PrivateData::from_bytes(&bytes))
}

/// The installed device dictionary.
pub fn current_device(ctx: &mut Context) -> Result<Object, PsError> {
    let key = Object::name(sysname::DEVICE, Bank::Global);
    let sd = ctx.systemdict;
    dict::get_normalized(ctx, sd, key)?.ok_or(PsError::Undefined)
}

/// `Create(width, height, classdict)`: copy the class dictionary into a
/// fresh instance and schedule the native finisher by continuation.
fn op_create(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let classdict = args[2];
    let capacity = dict::maxlength(ctx, classdict)?;
    let devdict = dict::cons_in(ctx, Bank::Global, capacity)?;
    dict::copy_fill(ctx, classdict, devdict)?;
    dict::put(ctx, devdict, Object::name(sysname::WIDTH, Bank::Global), args[0])?;
    dict::put(ctx, devdict, Object::name(sysname::HEIGHT, Bank::Global), args[1])?;

    // Finish natively after the copy, by continuation.
    let cont_key = ctx.name_object_global(b".createcont")?;
    let cont = dict::get_normalized(ctx, devdict, cont_key)?.ok_or(PsError::Unregistered)?;
    ctx.push(args[0])?;
    ctx.push(args[1])?;
    ctx.push(devdict)?;
    ctx.es_push(cont)
}

/// `.createcont(width, height, devdict)`: allocate the native record and
/// the page image, leaving the finished instance on the operand stack.
fn op_create_cont(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let width = args[0].as_integer().ok_or(PsError::TypeCheck)?;
    let height = args[1].as_integer().ok_or(PsError::TypeCheck)?;
    if width <= 0 || height <= 0 {
        return Err(PsError::RangeCheck);
    }
    let devdict = args[2];

    let mode_key = ctx.name_object_global(b".pixelmode")?;
    let mode_tag = dict::get_normalized(ctx, devdict, mode_key)?
        .and_then(|obj| obj.as_integer())
        .unwrap_or(0);
    let private = PrivateData {
        width: width as u32,
        height: height as u32,
        mode: PixelMode::from_tag(mode_tag as u8),
    };

    let s = string::cons_in(ctx, Bank::Global, PrivateData::SIZE)?;
    string::put_bytes(ctx, s, 0, &private.to_bytes())?;
    dict::put(ctx, devdict, Object::name(sysname::PRIVATE, Bank::Global), s)?;

    // The page image: one row array per scanline, top row first.
    let img = array::cons_in(ctx, Bank::Global, height as usize)?;
    for row_index in 0..height as usize {
        let row = array::cons_in(ctx, Bank::Global, width as usize)?;
        for col in 0..width as usize {
            array::put(ctx, row, col, Object::integer(WHITE))?;
        }
        array::put(ctx, img, row_index, row)?;
    }
    dict::put(ctx, devdict, Object::name(sysname::IMG_DATA, Bank::Global), img)?;

    debug!(width, height, "device instance created");
    ctx.push(devdict)
}

/// `Emit(devdict)`: convert the page image into the client pixel layout
/// and hand it to the output binding.
fn op_emit(ctx: &mut Context, args: &[Object]) -> Result<(), PsError> {
    let devdict = args[0];
    let private = private_data(ctx, devdict)?;
    let width = private.width as usize;
    let height = private.height as usize;

    let img = dict::get_normalized(ctx, devdict, Object::name(sysname::IMG_DATA, Bank::Global))?
        .ok_or(PsError::Unregistered)?;

    let stride = private.mode.stride();
    let mut buffer = vec![0u8; width * height * stride];
    for row_index in 0..height {
        let row = array::get(ctx, img, row_index)?;
        for col in 0..width {
            let packed = array::get(ctx, row, col)?.as_integer().unwrap_or(0) as u32;
            let (r, g, b) = ((packed >> 16) as u8, (packed >> 8) as u8, packed as u8);
            let at = (row_index * width + col) * stride;
            match private.mode {
                PixelMode::Rgb => buffer[at..at + 3].copy_from_slice(&[r, g, b]),
                PixelMode::Bgr => buffer[at..at + 3].copy_from_slice(&[b, g, r]),
                PixelMode::Argb => buffer[at..at + 4].copy_from_slice(&[0xff, r, g, b]),
                PixelMode::Bgra => buffer[at..at + 4].copy_from_slice(&[b, g, r, 0xff]),
            }
        }
    }

    match ctx.options.output.clone() {
        Output::BufferOut => {
            info!(width, height, "page emitted to buffer");
            ctx.raster = Some(buffer);
        }
        Output::Filename(path) => {
            write_ppm(&path, private, &buffer).map_err(|_| PsError::IoError)?;
            info!(path = %path.display(), "page emitted to file");
        }
    }
    Ok(())
}

/// Write the emitted buffer as a binary PPM.
fn write_ppm(path: &std::path::Path, private: PrivateData, buffer: &[u8]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write!(file, "P6\n{} {}\n255\n", private.width, private.height)?;
    let stride = private.mode.stride();
    for pixel in buffer.chunks_exact(stride) {
        let rgb = match private.mode {
            PixelMode::Rgb => [pixel[0], pixel[1], pixel[2]],
            PixelMode::Bgr => [pixel[2], pixel[1], pixel[0]],
            PixelMode::Argb => [pixel[1], pixel[2], pixel[3]],
            PixelMode::Bgra => [pixel[2], pixel[1], pixel[0]],
        };
        file.write_all(&rgb)?;
    }
    file.flush()
}

/// `Flush(devdict)`: nothing buffered beyond Emit; kept as a device
/// entry for the embedding contract.
fn op_flush(_ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    Ok(())
}

/// Reset every page image pixel to white.
pub fn erase_page(ctx: &mut Context) -> Result<(), PsError> {
    let devdict = current_device(ctx)?;
    let private = private_data(ctx, devdict)?;
    let img = dict::get_normalized(ctx, devdict, Object::name(sysname::IMG_DATA, Bank::Global))?
        .ok_or(PsError::Unregistered)?;
    for row_index in 0..private.height as usize {
        let row = array::get(ctx, img, row_index)?;
        for col in 0..private.width as usize {
            array::put(ctx, row, col, Object::integer(WHITE))?;
        }
    }
    Ok(())
}

fn op_erasepage(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    erase_page(ctx)
}

/// `showpage`: schedule the device's `Emit` entry followed by the yield
/// continuation.
fn op_showpage(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    let devdict = current_device(ctx)?;
    let emit = dict::get_normalized(ctx, devdict, Object::name(sysname::EMIT, Bank::Global))?
        .ok_or(PsError::Unregistered)?;
    let yield_key = ctx.name_object_global(b".pageyield")?;
    let sd = ctx.systemdict;
    let pageyield = dict::get_normalized(ctx, sd, yield_key)?.ok_or(PsError::Unregistered)?;

    ctx.push(devdict)?;
    ctx.es_push(pageyield)?;
    ctx.es_push(emit)
}

/// `.pageyield`: erase the page and apply the showpage semantics.
fn op_pageyield(ctx: &mut Context, _args: &[Object]) -> Result<(), PsError> {
    erase_page(ctx)?;
    match ctx.options.showpage {
        ShowpageMode::Return => ctx.yield_request = true,
        ShowpageMode::NoPause => {}
        ShowpageMode::Pause => {
            let mut line = String::new();
            let _ = std::io::stdin().read_line(&mut line);
        }
    }
    Ok(())
}

/// Register the device operators, build the class dictionary for `spec`,
/// and instantiate the device through the execution stack.
pub fn install(ctx: &mut Context, spec: DeviceSpec) -> Result<(), InstallError> {
    let create = def_op_hidden(
        ctx,
        ".devcreate",
        vec![sig(op_create, 1, &[T::Integer, T::Integer, T::Dict])],
    )?;
    let createcont = def_op_hidden(
        ctx,
        ".createcont",
        vec![sig(op_create_cont, 1, &[T::Integer, T::Integer, T::Dict])],
    )?;
    let emit = def_op_hidden(ctx, ".devemit", vec![sig(op_emit, 0, &[T::Dict])])?;
    let flush = def_op_hidden(ctx, ".devflush", vec![sig(op_flush, 0, &[T::Dict])])?;
    let pageyield = def_op_hidden(ctx, ".pageyield", vec![sig(op_pageyield, 0, &[])])?;
    def_op(ctx, "showpage", vec![sig(op_showpage, 0, &[])])?;
    def_op(ctx, "erasepage", vec![sig(op_erasepage, 0, &[])])?;

    // The yield continuation must be reachable from showpage.
    let yield_key = ctx.name_object_global(b".pageyield")?;
    let sd = ctx.systemdict;
    dict::put(ctx, sd, yield_key, Object::operator(pageyield))?;

    // The device class dictionary.
    let class = dict::cons_in(ctx, Bank::Global, 16)?;
    dict::put(
        ctx,
        class,
        Object::name(sysname::CREATE, Bank::Global),
        Object::operator(create),
    )?;
    dict::put(
        ctx,
        class,
        Object::name(sysname::EMIT, Bank::Global),
        Object::operator(emit),
    )?;
    dict::put(
        ctx,
        class,
        Object::name(sysname::FLUSH, Bank::Global),
        Object::operator(flush),
    )?;
    dict::put(
        ctx,
        class,
        Object::name(sysname::NATIVECOLORSPACE, Bank::Global),
        Object::name(sysname::DEVICE_RGB, Bank::Global),
    )?;
    let cont_key = ctx.name_object_global(b".createcont")?;
    dict::put(ctx, class, cont_key, Object::operator(createcont))?;
    let mode_key = ctx.name_object_global(b".pixelmode")?;
    dict::put(ctx, class, mode_key, Object::integer(i32::from(spec.mode() as u8)))?;

    // Instantiate through the execution stack, as a program would.
    let width = ctx.options.size.width() as i32;
    let height = ctx.options.size.height() as i32;
    ctx.push(Object::integer(width))?;
    ctx.push(Object::integer(height))?;
    ctx.push(class)?;
    ctx.es_push(Object::operator(create))?;
    vm::run(ctx)?;
    let devdict = ctx.pop()?;
    if !matches!(devdict.payload(), Payload::Dict { .. }) {
        return Err(InstallError::Interp(PsError::Unregistered));
    }

    dict::put(ctx, sd, Object::name(sysname::DEVICE, Bank::Global), devdict)?;
    let buffer_out = matches!(ctx.options.output, Output::BufferOut);
    dict::put(
        ctx,
        sd,
        Object::name(sysname::OUTPUT_BUFFER_OUT, Bank::Global),
        Object::boolean(buffer_out),
    )?;
    info!(device = ?spec, width, height, "device installed");
    Ok(())
}
