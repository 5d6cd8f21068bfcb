// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tinta command line client.
//!
//! Runs a PostScript program (a file, or the built-in demo) against the
//! raster device and writes the rendered page as a PPM file. The demo
//! program and the buffer-to-PPM path follow the classic embedding
//! client: create a context with BUFFEROUT output, run until the first
//! showpage yields, dump the returned pixel buffer.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use tinta_raster::PixelMode;
use tinta_vm::context::{
    Context, Input, MessageLevel, Options, Output, RunOutcome, ShowpageMode,
};

/// The demo program: a blue disc with a label.
const DEMO: &str = "%%BoundingBox: 200 300 400 500\n\
    0 0 1 setrgbcolor\n\
    300 400 100 0 360 arc\n\
    fill\n\
    0 0 0 setrgbcolor\n\
    290 390 moveto\n\
    /Palatino-Roman 20 selectfont\n\
    (Tinta) show\n\
    showpage\n";

/// PostScript level 2 interpreter.
#[derive(Parser)]
#[command(name = "tinta", version, about)]
struct Args {
    /// Device name, optionally with a pixel mode (raster, raster:bgr,
    /// ppm)
    #[arg(short, long, default_value = "raster")]
    device: String,

    /// PostScript program to run instead of the built-in demo
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Suppress interpreter messages
    #[arg(short, long)]
    quiet: bool,

    /// Report errors and page notices
    #[arg(short, long)]
    verbose: bool,

    /// Add execution tracing, implies --verbose
    #[arg(short, long)]
    trace: bool,

    /// Show the program license
    #[arg(short = 'L', long)]
    license: bool,

    /// Output file
    output: Option<PathBuf>,
}

fn message_level(args: &Args) -> MessageLevel {
    if args.trace {
        MessageLevel::Tracing
    } else if args.verbose {
        MessageLevel::Verbose
    } else {
        MessageLevel::Quiet
    }
}

fn init_tracing(level: MessageLevel) {
    let filter = match level {
        MessageLevel::Quiet => "off",
        MessageLevel::Verbose => "info",
        MessageLevel::Tracing => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(std::io::stderr)
        .init();
}

/// Dump a bgr pixel buffer as a binary PPM, top row first.
fn write_ppm(path: &PathBuf, buffer: &[u8], width: usize, height: usize) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write!(file, "P6\n{width} {height}\n255\n")?;
    for pixel in buffer.chunks_exact(PixelMode::Bgr.stride()) {
        file.write_all(&[pixel[2], pixel[1], pixel[0]])?;
    }
    file.flush()
}

fn run(args: &Args) -> Result<(), String> {
    let messages = message_level(args);

    // The plain raster family runs in buffer mode and the client writes
    // the PPM itself; the ppm device writes its own file.
    let (device, output, showpage) = match args.device.as_str() {
        "raster" => ("raster:bgr".to_string(), Output::BufferOut, ShowpageMode::Return),
        "ppm" => {
            let path = args
                .output
                .clone()
                .unwrap_or_else(|| PathBuf::from("tinta_out.ppm"));
            ("ppm".to_string(), Output::Filename(path), ShowpageMode::NoPause)
        }
        other => (other.to_string(), Output::BufferOut, ShowpageMode::Return),
    };

    let options = Options {
        device,
        output: output.clone(),
        showpage,
        messages,
        ..Options::default()
    };
    let width = options.size.width() as usize;
    let height = options.size.height() as usize;

    let mut ctx = Context::create(options).map_err(|e| e.to_string())?;
    tinta_raster::install(&mut ctx).map_err(|e| e.to_string())?;

    let outcome = match &args.input {
        Some(path) => ctx.run(Input::Filename(path)),
        None => ctx.run(Input::String(DEMO)),
    }
    .map_err(|e| e.to_string())?;

    if output == Output::BufferOut {
        match outcome {
            RunOutcome::Yielded => {
                let buffer = ctx
                    .raster_buffer()
                    .ok_or_else(|| "no buffer after showpage".to_string())?;
                let path = args
                    .output
                    .clone()
                    .unwrap_or_else(|| PathBuf::from("tinta_out.ppm"));
                write_ppm(&path, buffer, width, height).map_err(|e| e.to_string())?;
                // Let the program run to completion after the page.
                ctx.run(Input::Resume).map_err(|e| e.to_string())?;
            }
            RunOutcome::Finished => {
                return Err("program finished before showpage".to_string());
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    if args.license {
        println!("GPL-3.0-or-later");
        return ExitCode::SUCCESS;
    }
    init_tracing(message_level(&args));
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{message}");
            eprintln!("tinta: {message}");
            ExitCode::FAILURE
        }
    }
}
