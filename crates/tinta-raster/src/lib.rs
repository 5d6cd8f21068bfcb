// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! # Tinta raster
//!
//! The page device back-end and the graphics operators that draw into
//! it.
//!
//! A device is a dictionary of callable entries (`Create`, `Emit`,
//! `Flush`) plus a `Private` string holding the device's native record
//! and an `ImgData` array of row arrays of packed RGB integers. The
//! interpreter core knows nothing about pixels; [`install`] registers
//! the operators, instantiates the device through the execution stack
//! (the `Create` continuation), and binds it under the `DEVICE` key of
//! systemdict.
//!
//! Supported device specs: `raster` (and `raster:rgb`, `raster:argb`,
//! `raster:bgr`, `raster:bgra`) and `ppm`. The `png` family name parses
//! but has no built-in encoder.

pub mod device;
pub mod gstate;
pub mod ops;
pub mod raster;


use thiserror::Error;

use tinta_vm::context::{Context, ContextError};
use tinta_vm::error::PsError;

pub use device::{DeviceSpec, PixelMode};

/// Device installation error.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The device spec names an unknown family or pixel mode.
    #[error("unknown device spec: {0}")]
    UnknownDevice(String),
    /// The device family is recognized but has no back-end here.
    #[error("device family {0} is not available")]
    Unavailable(String),
    /// Interpreter failure during device bootstrap.
    #[error("interpreter error: {0}")]
    Interp(#[from] PsError),
    /// Context failure during device bootstrap.
    #[error("context error: {0}")]
    Context(#[from] ContextError),
}

/// Parse the context's device spec, register all operators, create the
/// device instance and bind it in systemdict.
pub fn install(ctx: &mut Context) -> Result<(), InstallError> {
    let spec = DeviceSpec::parse(&ctx.options.device)?;
    ops::install(ctx)?;
    device::install(ctx, spec)?;
    gstate::init(ctx)?;
    Ok(())
}
