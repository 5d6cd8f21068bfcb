// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! # Tinta VM
//!
//! A PostScript level 2 interpreter runtime.
//!
//! This crate provides:
//! - Tagged fixed-width objects over a two-bank segmented memory model
//!   (local memory is saved/restored, global memory is shared)
//! - Composite types (strings, arrays, dictionaries, interned names)
//!   layered on id-addressed entities
//! - The four interpreter stacks as segment chains in local memory
//! - An operator table with typed signatures and first-match dispatch
//! - A continuation-passing execution loop with errordict recovery
//! - The scanner for PostScript source text
//!
//! Device back-ends live in `tinta-raster`; this crate only defines the
//! boundary (a device is a dictionary of callable entries, installed
//! under the `DEVICE` key of systemdict).
//!
//! ```no_run
//! use tinta_vm::context::{Context, Input, Options};
//!
//! let mut ctx = Context::create(Options::default()).unwrap();
//! ctx.run(Input::String("1 2 add ==")).unwrap();
//! ```

pub mod composite;
pub mod context;
pub mod error;
pub mod mem;
pub mod names;
pub mod object;
pub mod operator;
pub mod ops;
pub mod printer;
pub mod reader;
pub mod stack;
pub mod vm;

// Re-export commonly used types at crate root
pub use context::{Context, Input, Options, Output, RunOutcome};
pub use error::PsError;
pub use object::{Bank, Object};
