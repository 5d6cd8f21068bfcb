// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for rasterization.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::{fill_path, get_pixel, pack_rgb, stroke_path};
use crate::gstate::{self, PATH_LINE, PATH_MOVE};
use crate::install;
use tinta_vm::context::{Context, Options, PageSize};

fn ctx() -> Context {
    let mut ctx = Context::create(Options {
        size: PageSize::Exact {
            width: 32,
            height: 32,
        },
        ..Options::default()
    })
    .unwrap();
    install(&mut ctx).unwrap();
    ctx
}

const RED: i32 = 0x00ff_0000;
const WHITE: i32 = 0x00ff_ffff;

#[test]
fn pack_rgb_rounds_channels() {
    assert_eq!(pack_rgb(1.0, 0.0, 0.0), 0x00ff_0000);
    assert_eq!(pack_rgb(0.0, 1.0, 0.0), 0x0000_ff00);
    assert_eq!(pack_rgb(0.0, 0.0, 1.0), 0x0000_00ff);
    assert_eq!(pack_rgb(1.0, 1.0, 1.0), 0x00ff_ffff);
    // Out-of-range values clamp.
    assert_eq!(pack_rgb(2.0, -1.0, 0.5), 0x00ff_0080);
}

#[test]
fn fill_covers_a_rectangle() {
    let mut ctx = ctx();
    gstate::path_append(&mut ctx, PATH_MOVE, 4.0, 4.0).unwrap();
    gstate::path_append(&mut ctx, PATH_LINE, 12.0, 4.0).unwrap();
    gstate::path_append(&mut ctx, PATH_LINE, 12.0, 12.0).unwrap();
    gstate::path_append(&mut ctx, PATH_LINE, 4.0, 12.0).unwrap();
    fill_path(&mut ctx, RED).unwrap();

    assert_eq!(get_pixel(&mut ctx, 8, 8).unwrap(), RED);
    assert_eq!(get_pixel(&mut ctx, 5, 5).unwrap(), RED);
    // Outside stays white.
    assert_eq!(get_pixel(&mut ctx, 2, 2).unwrap(), WHITE);
    assert_eq!(get_pixel(&mut ctx, 20, 20).unwrap(), WHITE);
}

#[test]
fn fill_respects_subpaths_even_odd() {
    // Outer square with an inner square hole.
    let mut ctx = ctx();
    for (tag, x, y) in [
        (PATH_MOVE, 2.0, 2.0),
        (PATH_LINE, 30.0, 2.0),
        (PATH_LINE, 30.0, 30.0),
        (PATH_LINE, 2.0, 30.0),
        (PATH_MOVE, 10.0, 10.0),
        (PATH_LINE, 22.0, 10.0),
        (PATH_LINE, 22.0, 22.0),
        (PATH_LINE, 10.0, 22.0),
    ] {
        gstate::path_append(&mut ctx, tag, x, y).unwrap();
    }
    fill_path(&mut ctx, RED).unwrap();
    assert_eq!(get_pixel(&mut ctx, 5, 5).unwrap(), RED);
    // The hole stays white.
    assert_eq!(get_pixel(&mut ctx, 16, 16).unwrap(), WHITE);
}

#[test]
fn fill_clips_to_the_page() {
    let mut ctx = ctx();
    gstate::path_append(&mut ctx, PATH_MOVE, -10.0, -10.0).unwrap();
    gstate::path_append(&mut ctx, PATH_LINE, 50.0, -10.0).unwrap();
    gstate::path_append(&mut ctx, PATH_LINE, 50.0, 50.0).unwrap();
    gstate::path_append(&mut ctx, PATH_LINE, -10.0, 50.0).unwrap();
    fill_path(&mut ctx, RED).unwrap();
    assert_eq!(get_pixel(&mut ctx, 0, 0).unwrap(), RED);
    assert_eq!(get_pixel(&mut ctx, 31, 31).unwrap(), RED);
}

#[test]
fn stroke_draws_lines() {
    let mut ctx = ctx();
    gstate::path_append(&mut ctx, PATH_MOVE, 2.0, 16.0).unwrap();
    gstate::path_append(&mut ctx, PATH_LINE, 29.0, 16.0).unwrap();
    stroke_path(&mut ctx, RED).unwrap();
    for x in 2..=29 {
        assert_eq!(get_pixel(&mut ctx, x, 16).unwrap(), RED, "x={x}");
    }
    assert_eq!(get_pixel(&mut ctx, 16, 17).unwrap(), WHITE);
}

#[test]
fn stroke_handles_diagonals() {
    let mut ctx = ctx();
    gstate::path_append(&mut ctx, PATH_MOVE, 0.0, 0.0).unwrap();
    gstate::path_append(&mut ctx, PATH_LINE, 10.0, 10.0).unwrap();
    stroke_path(&mut ctx, RED).unwrap();
    assert_eq!(get_pixel(&mut ctx, 0, 0).unwrap(), RED);
    assert_eq!(get_pixel(&mut ctx, 5, 5).unwrap(), RED);
    assert_eq!(get_pixel(&mut ctx, 10, 10).unwrap(), RED);
}

#[test]
fn empty_path_fills_nothing() {
    let mut ctx = ctx();
    fill_path(&mut ctx, RED).unwrap();
    assert_eq!(get_pixel(&mut ctx, 16, 16).unwrap(), WHITE);
}
