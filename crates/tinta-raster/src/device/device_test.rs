// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the device dictionary and its lifecycle.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::{DeviceSpec, PixelMode, PrivateData, current_device, private_data};
use crate::InstallError;
use crate::install;
use tinta_vm::composite::{array, dict};
use tinta_vm::context::{Context, Options, PageSize};
use tinta_vm::names::sysname;
use tinta_vm::object::{Bank, Object};

fn small_ctx(device: &str) -> Context {
    let mut ctx = Context::create(Options {
        device: device.into(),
        size: PageSize::Exact {
            width: 16,
            height: 8,
        },
        ..Options::default()
    })
    .unwrap();
    install(&mut ctx).unwrap();
    ctx
}

#[test]
fn spec_parsing() {
    assert_eq!(DeviceSpec::parse("raster").unwrap(), DeviceSpec::Raster(PixelMode::Rgb));
    assert_eq!(
        DeviceSpec::parse("raster:rgb").unwrap(),
        DeviceSpec::Raster(PixelMode::Rgb)
    );
    assert_eq!(
        DeviceSpec::parse("raster:argb").unwrap(),
        DeviceSpec::Raster(PixelMode::Argb)
    );
    assert_eq!(
        DeviceSpec::parse("raster:bgr").unwrap(),
        DeviceSpec::Raster(PixelMode::Bgr)
    );
    assert_eq!(
        DeviceSpec::parse("raster:bgra").unwrap(),
        DeviceSpec::Raster(PixelMode::Bgra)
    );
    assert_eq!(DeviceSpec::parse("ppm").unwrap(), DeviceSpec::Ppm);
    assert!(matches!(
        DeviceSpec::parse("png"),
        Err(InstallError::Unavailable(_))
    ));
    assert!(matches!(
        DeviceSpec::parse("plotter"),
        Err(InstallError::UnknownDevice(_))
    ));
}

#[test]
fn private_data_round_trip() {
    let data = PrivateData {
        width: 612,
        height: 792,
        mode: PixelMode::Bgra,
    };
    assert_eq!(PrivateData::from_bytes(&data.to_bytes()), data);
}

#[test]
fn install_binds_the_device() {
    let mut ctx = small_ctx("raster:bgr");
    let devdict = current_device(&mut ctx).unwrap();
    let private = private_data(&mut ctx, devdict).unwrap();
    assert_eq!(private.width, 16);
    assert_eq!(private.height, 8);
    assert_eq!(private.mode, PixelMode::Bgr);

    // The instance carries the class entries and the page image.
    for id in [
        sysname::CREATE,
        sysname::EMIT,
        sysname::FLUSH,
        sysname::PRIVATE,
        sysname::IMG_DATA,
        sysname::WIDTH,
        sysname::HEIGHT,
    ] {
        let entry = dict::get_normalized(&ctx, devdict, Object::name(id, Bank::Global)).unwrap();
        assert!(entry.is_some(), "missing device entry {id}");
    }
    let colorspace =
        dict::get_normalized(&ctx, devdict, Object::name(sysname::NATIVECOLORSPACE, Bank::Global))
            .unwrap()
            .unwrap();
    assert_eq!(colorspace, Object::name(sysname::DEVICE_RGB, Bank::Global));
}

#[test]
fn page_image_is_white() {
    let mut ctx = small_ctx("raster");
    let devdict = current_device(&mut ctx).unwrap();
    let img = dict::get_normalized(&ctx, devdict, Object::name(sysname::IMG_DATA, Bank::Global))
        .unwrap()
        .unwrap();
    assert_eq!(array::length(img).unwrap(), 8);
    let row = array::get(&ctx, img, 0).unwrap();
    assert_eq!(array::length(row).unwrap(), 16);
    assert_eq!(array::get(&ctx, row, 0).unwrap(), Object::integer(super::WHITE));
}

#[test]
fn emit_fills_the_output_buffer() {
    let mut ctx = small_ctx("raster:rgb");
    assert!(ctx.raster_buffer().is_none());
    ctx.run(tinta_vm::context::Input::String("showpage")).unwrap();
    let buffer = ctx.raster_buffer().unwrap();
    assert_eq!(buffer.len(), 16 * 8 * 3);
    // A fresh page is white.
    assert!(buffer.iter().all(|byte| *byte == 0xff));
}

#[test]
fn pixel_strides() {
    assert_eq!(PixelMode::Rgb.stride(), 3);
    assert_eq!(PixelMode::Bgr.stride(), 3);
    assert_eq!(PixelMode::Argb.stride(), 4);
    assert_eq!(PixelMode::Bgra.stride(), 4);
}

proptest::proptest! {
    #[test]
    fn private_data_survives_any_dimensions(
        width in 1u32..=65535,
        height in 1u32..=65535,
        tag in 0u8..4,
    ) {
        let mode = match tag {
            1 => PixelMode::Argb,
            2 => PixelMode::Bgr,
            3 => PixelMode::Bgra,
            _ => PixelMode::Rgb,
        };
        let data = PrivateData { width, height, mode };
        proptest::prop_assert_eq!(PrivateData::from_bytes(&data.to_bytes()), data);
    }
}
