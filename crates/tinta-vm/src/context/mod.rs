// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The interpretation context.
//!
//! A [`Context`] is the unit of execution: it owns the two memory files,
//! the four stacks, both name tables, the operator table, the save stack,
//! the file table, and the standard dictionaries. Several contexts may
//! coexist in one process; nothing here is a process global.
//!
//! The embedding surface ([`Context::create`], [`Context::run`],
//! [`Context::raster_buffer`]) mirrors the classic client contract:
//! create with a device and output binding, run programs (strings or
//! files), resume after a showpage yield, read the rendered buffer.


use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

use crate::composite::dict;
use crate::error::PsError;
use crate::mem::{Mem, MemError};
use crate::names::{NameTable, SYSTEM_NAMES, cons as name_cons};
use crate::object::{Bank, EntityId, FileId, Object, Opcode, Payload};
use crate::operator::OpTable;
use crate::stack;

/// How rendered pages leave the interpreter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output {
    /// Write an image file per page.
    Filename(PathBuf),
    /// Hand the raw pixel buffer to the embedder.
    BufferOut,
}

/// What `showpage` does after emitting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShowpageMode {
    /// Return control to the embedder; resume with [`Input::Resume`].
    Return,
    /// Continue executing immediately.
    NoPause,
    /// Wait for a newline on standard input, then continue.
    Pause,
}

/// Interpreter message verbosity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum MessageLevel {
    /// No interpreter messages.
    Quiet,
    /// Error reports and page notices.
    Verbose,
    /// Everything, including execution traces.
    Tracing,
}

/// Page dimensions in pixels (one PostScript unit per pixel).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageSize {
    /// US Letter at 72 DPI: 612 x 792.
    Default,
    /// Explicit dimensions.
    Exact {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },
}

impl PageSize {
    /// Width in pixels.
    #[must_use]
    pub const fn width(self) -> u32 {
        match self {
            Self::Default => 612,
            Self::Exact { width, .. } => width,
        }
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(self) -> u32 {
        match self {
            Self::Default => 792,
            Self::Exact { height, .. } => height,
        }
    }
}

/// Context creation options.
#[derive(Clone, Debug)]
pub struct Options {
    /// Device family, optionally with a `:`-suffixed pixel mode
    /// (`raster`, `raster:bgr`, `ppm`, ...).
    pub device: String,
    /// Output binding.
    pub output: Output,
    /// Showpage semantics.
    pub showpage: ShowpageMode,
    /// Message verbosity.
    pub messages: MessageLevel,
    /// Page dimensions.
    pub size: PageSize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            device: "raster".into(),
            output: Output::BufferOut,
            showpage: ShowpageMode::Return,
            messages: MessageLevel::Quiet,
            size: PageSize::Default,
        }
    }
}

/// One program input to [`Context::run`].
#[derive(Clone, Copy, Debug)]
pub enum Input<'a> {
    /// Execute a program held in a string.
    String(&'a str),
    /// Execute a program read from a file.
    Filename(&'a Path),
    /// Resume after a showpage yield.
    Resume,
}

/// How a [`Context::run`] call ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The execution stack drained (or the program quit).
    Finished,
    /// A showpage yielded; the page buffer is available.
    Yielded,
}

/// Embedding-level error.
#[derive(Debug, Error)]
pub enum ContextError {
    /// Memory file failure during construction.
    #[error("memory: {0}")]
    Mem(#[from] MemError),
    /// Interpreter failure outside any error handler's reach.
    #[error("interpreter error: {0}")]
    Interp(#[from] PsError),
    /// The context is corrupt and no longer executable.
    #[error("context is not executable")]
    Dead,
    /// Program file could not be read.
    #[error("input: {0}")]
    Io(#[from] std::io::Error),
}

/// An open token source.
pub struct FileRec {
    /// Program bytes.
    pub data: Rc<[u8]>,
    /// Scan position.
    pub pos: usize,
    /// Display name for diagnostics.
    pub name: String,
    /// Whether the source is exhausted.
    pub closed: bool,
}

/// One save level: the snapshot needed to roll the local file back.
pub struct SaveRecord {
    /// Save level (1-based).
    pub level: u32,
    /// Local entity-table length at save time.
    pub table_len: usize,
    /// Local bump pointer at save time.
    pub used: usize,
    /// Undo log: first-mutation snapshots of pre-existing entities.
    pub undo: Vec<(EntityId, Vec<u8>)>,
}

/// Opcodes of continuation operators the execution loop and the control
/// operators must recognize. Filled during operator installation.
#[derive(Clone, Copy, Debug, Default)]
pub struct KnownOps {
    /// `stopped` barrier: pushes `false` when reached normally.
    pub stopfalse: Option<Opcode>,
    /// `for` continuation.
    pub forcont: Option<Opcode>,
    /// `repeat` continuation.
    pub repeatcont: Option<Opcode>,
    /// `loop` continuation.
    pub loopcont: Option<Opcode>,
    /// `forall` continuation over arrays.
    pub forallarr: Option<Opcode>,
    /// `forall` continuation over dicts.
    pub foralldict: Option<Opcode>,
    /// `forall` continuation over strings.
    pub forallstr: Option<Opcode>,
    /// Default errordict handler body.
    pub defaulterror: Option<Opcode>,
}

/// The unit of interpretation.
pub struct Context {
    /// Local memory file (saved/restored).
    pub lo: Mem,
    /// Global memory file.
    pub gl: Mem,
    /// Local name table.
    pub names_local: NameTable,
    /// Global name table; holds all system and operator names.
    pub names_global: NameTable,
    /// Operand stack head segment.
    pub os: EntityId,
    /// Execution stack head segment.
    pub es: EntityId,
    /// Dictionary stack head segment.
    pub ds: EntityId,
    /// Graphics stack head segment.
    pub gs: EntityId,
    /// Operator table.
    pub optab: OpTable,
    /// Continuation opcode handles.
    pub known: KnownOps,
    /// Save stack (local bank only).
    pub saves: Vec<SaveRecord>,
    /// Open token sources.
    pub files: Vec<FileRec>,
    /// Allocation bank selector (`setglobal`).
    pub vm_global: bool,
    /// The bottom search dictionary.
    pub systemdict: Object,
    /// The global dictionary.
    pub globaldict: Object,
    /// The default definition target.
    pub userdict: Object,
    /// Error handler procedures by error name.
    pub errordict: Object,
    /// The `$error` record dictionary.
    pub dollar_error: Object,
    /// Set by `quit`; the loop exits normally.
    pub quit: bool,
    /// Set by a showpage in RETURN mode; the loop yields.
    pub yield_request: bool,
    /// Set when the context is corrupt; nothing runs anymore.
    pub dead: bool,
    /// Cross-thread interrupt flag, polled between loop iterations.
    pub interrupt: Arc<AtomicBool>,
    /// Creation options.
    pub options: Options,
    /// Most recent emitted page buffer (BUFFEROUT binding).
    pub raster: Option<Vec<u8>>,
    /// `rand`/`srand` state.
    pub rng: u32,
}

/// Initial local arena capacity.
const LOCAL_CAPACITY: usize = 256 * 1024;
/// Initial global arena capacity. The page image lives here and forces
/// growth on first device creation; that path is exercised deliberately.
const GLOBAL_CAPACITY: usize = 1024 * 1024;

impl Context {
    /// Build a context with memory, names, stacks and the standard
    /// dictionaries, but no operators. Unit tests of the data model use
    /// this directly; [`Context::create`] finishes the job.
    pub fn bare(options: Options) -> Result<Self, ContextError> {
        let mut lo = Mem::create(Bank::Local, LOCAL_CAPACITY);
        let mut gl = Mem::create(Bank::Global, GLOBAL_CAPACITY);

        let mut names_global = NameTable::new(Bank::Global);
        let names_local = NameTable::new(Bank::Local);
        for name in SYSTEM_NAMES {
            names_global.cons(&mut gl, name.as_bytes())?;
        }

        let os = stack::init(&mut lo)?;
        let es = stack::init(&mut lo)?;
        let ds = stack::init(&mut lo)?;
        let gs = stack::init(&mut lo)?;

        let mut ctx = Self {
            lo,
            gl,
            names_local,
            names_global,
            os,
            es,
            ds,
            gs,
            optab: OpTable::new(),
            known: KnownOps::default(),
            saves: Vec::new(),
            files: Vec::new(),
            vm_global: false,
            systemdict: Object::null(),
            globaldict: Object::null(),
            userdict: Object::null(),
            errordict: Object::null(),
            dollar_error: Object::null(),
            quit: false,
            yield_request: false,
            dead: false,
            interrupt: Arc::new(AtomicBool::new(false)),
            options,
            raster: None,
            rng: 1,
        };

        ctx.systemdict = dict::cons_in(&mut ctx, Bank::Global, 512)?;
        ctx.globaldict = dict::cons_in(&mut ctx, Bank::Global, 64)?;
        ctx.errordict = dict::cons_in(&mut ctx, Bank::Global, 40)?;
        ctx.userdict = dict::cons_in(&mut ctx, Bank::Local, 128)?;
        ctx.dollar_error = dict::cons_in(&mut ctx, Bank::Local, 10)?;

        stack::push(&mut ctx.lo, ctx.ds, ctx.systemdict)?;
        stack::push(&mut ctx.lo, ctx.ds, ctx.globaldict)?;
        stack::push(&mut ctx.lo, ctx.ds, ctx.userdict)?;

        for (key, value) in [
            ("systemdict", ctx.systemdict),
            ("globaldict", ctx.globaldict),
            ("userdict", ctx.userdict),
            ("errordict", ctx.errordict),
            ("$error", ctx.dollar_error),
        ] {
            let name = ctx.name_object_global(key.as_bytes())?;
            let target = ctx.systemdict;
            dict::put(&mut ctx, target, name, value)?;
        }

        Ok(ctx)
    }

    /// Build a fully operational context: [`Context::bare`] plus the
    /// operator set and the default error handlers. Device installation
    /// is the raster crate's job.
    pub fn create(options: Options) -> Result<Self, ContextError> {
        let mut ctx = Self::bare(options)?;
        crate::ops::install(&mut ctx)?;
        crate::error::install_errordict(&mut ctx)?;
        Ok(ctx)
    }

    /// Interpreter version as (major, minor, micro).
    #[must_use]
    pub fn version() -> (u32, u32, u32) {
        let parse = |s: &str| s.parse().unwrap_or(0);
        (
            parse(env!("CARGO_PKG_VERSION_MAJOR")),
            parse(env!("CARGO_PKG_VERSION_MINOR")),
            parse(env!("CARGO_PKG_VERSION_PATCH")),
        )
    }

    /// The memory file of `bank`.
    #[must_use]
    pub const fn mem(&self, bank: Bank) -> &Mem {
        match bank {
            Bank::Local => &self.lo,
            Bank::Global => &self.gl,
        }
    }

    /// The memory file of `bank`, mutably.
    pub const fn mem_mut(&mut self, bank: Bank) -> &mut Mem {
        match bank {
            Bank::Local => &mut self.lo,
            Bank::Global => &mut self.gl,
        }
    }

    /// The current allocation bank.
    #[must_use]
    pub const fn current_bank(&self) -> Bank {
        if self.vm_global { Bank::Global } else { Bank::Local }
    }

    /// A handle the embedder may set from a signal handler to raise the
    /// `interrupt` error between loop iterations.
    #[must_use]
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    /// Poll and clear the interrupt flag.
    pub fn take_interrupt(&mut self) -> bool {
        self.interrupt.swap(false, Ordering::Relaxed)
    }

    // --- operand stack -------------------------------------------------

    /// Push onto the operand stack.
    pub fn push(&mut self, obj: Object) -> Result<(), PsError> {
        stack::push(&mut self.lo, self.os, obj).map_err(|_| PsError::StackOverflow)
    }

    /// Pop from the operand stack.
    pub fn pop(&mut self) -> Result<Object, PsError> {
        stack::pop(&mut self.lo, self.os)?.ok_or(PsError::StackUnderflow)
    }

    /// The object `n` below the operand stack top.
    pub fn top(&self, n: usize) -> Result<Object, PsError> {
        stack::peek(&self.lo, self.os, n)?.ok_or(PsError::StackUnderflow)
    }

    /// Operand stack depth.
    pub fn os_depth(&self) -> Result<usize, PsError> {
        Ok(stack::depth(&self.lo, self.os)?)
    }

    // --- execution stack -----------------------------------------------

    /// Push onto the execution stack.
    pub fn es_push(&mut self, obj: Object) -> Result<(), PsError> {
        stack::push(&mut self.lo, self.es, obj).map_err(|_| PsError::ExecStackOverflow)
    }

    /// Pop from the execution stack; `None` when drained.
    pub fn es_pop(&mut self) -> Result<Option<Object>, PsError> {
        Ok(stack::pop(&mut self.lo, self.es)?)
    }

    /// Execution stack depth.
    pub fn es_depth(&self) -> Result<usize, PsError> {
        Ok(stack::depth(&self.lo, self.es)?)
    }

    // --- dictionary stack ----------------------------------------------

    /// Push a dictionary onto the dictionary stack (`begin`).
    pub fn ds_push(&mut self, d: Object) -> Result<(), PsError> {
        if !matches!(d.payload(), Payload::Dict { .. }) {
            return Err(PsError::TypeCheck);
        }
        stack::push(&mut self.lo, self.ds, d).map_err(|_| PsError::DictStackOverflow)
    }

    /// Pop the dictionary stack (`end`); the three standard dictionaries
    /// cannot be popped.
    pub fn ds_pop(&mut self) -> Result<Object, PsError> {
        if stack::depth(&self.lo, self.ds)? <= 3 {
            return Err(PsError::DictStackUnderflow);
        }
        stack::pop(&mut self.lo, self.ds)?.ok_or(PsError::DictStackUnderflow)
    }

    /// Dictionary stack depth.
    pub fn ds_depth(&self) -> Result<usize, PsError> {
        Ok(stack::depth(&self.lo, self.ds)?)
    }

    /// The top of the dictionary stack (`currentdict`).
    pub fn currentdict(&self) -> Result<Object, PsError> {
        stack::peek(&self.lo, self.ds, 0)?.ok_or(PsError::DictStackUnderflow)
    }

    /// Search the dictionary stack top-down for a binding of `key`.
    pub fn lookup(&self, key: Object) -> Result<Option<Object>, PsError> {
        let depth = stack::depth(&self.lo, self.ds)?;
        for n in 0..depth {
            let Some(d) = stack::peek(&self.lo, self.ds, n)? else {
                break;
            };
            if let Some(value) = dict::get_normalized(self, d, key)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Search the dictionary stack top-down for the dict holding `key`
    /// (`where`).
    pub fn lookup_dict(&self, key: Object) -> Result<Option<Object>, PsError> {
        let depth = stack::depth(&self.lo, self.ds)?;
        for n in 0..depth {
            let Some(d) = stack::peek(&self.lo, self.ds, n)? else {
                break;
            };
            if dict::get_normalized(self, d, key)?.is_some() {
                return Ok(Some(d));
            }
        }
        Ok(None)
    }

    /// Bind `key` to `value` in the current dictionary (`def`).
    pub fn def(&mut self, key: Object, value: Object) -> Result<(), PsError> {
        let d = self.currentdict()?;
        dict::put(self, d, key, value)
    }

    // --- names ----------------------------------------------------------

    /// The canonical name object for `bytes`: global table first, then
    /// the current allocation bank.
    pub fn name_object(&mut self, bytes: &[u8]) -> Result<Object, PsError> {
        Ok(name_cons(
            &mut self.names_global,
            &mut self.names_local,
            &mut self.gl,
            &mut self.lo,
            bytes,
            self.vm_global,
        )?)
    }

    /// The canonical name object for `bytes`, interning globally.
    ///
    /// System, operator and error names always live in the global table
    /// so every context mode resolves them identically.
    pub fn name_object_global(&mut self, bytes: &[u8]) -> Result<Object, PsError> {
        Ok(name_cons(
            &mut self.names_global,
            &mut self.names_local,
            &mut self.gl,
            &mut self.lo,
            bytes,
            true,
        )?)
    }

    /// The bytes of a name object.
    pub fn name_bytes(&self, name: Object) -> Result<Vec<u8>, PsError> {
        match name.payload() {
            Payload::Name { id, bank } => {
                let table = match bank {
                    Bank::Global => &self.names_global,
                    Bank::Local => &self.names_local,
                };
                Ok(table.bytes(self.mem(bank), id)?)
            }
            _ => Err(PsError::TypeCheck),
        }
    }

    // --- save / restore -------------------------------------------------

    /// Record an undo snapshot for `ent` if this is its first mutation
    /// under the current save level. Global entities are never logged.
    pub fn touch(&mut self, bank: Bank, ent: EntityId) {
        if bank != Bank::Local {
            return;
        }
        let level = self.saves.len() as u32;
        if level == 0 || !self.lo.needs_undo(ent, level) {
            return;
        }
        if let Ok(snapshot) = self.lo.snapshot_entity(ent) {
            if let Some(record) = self.saves.last_mut() {
                record.undo.push((ent, snapshot));
            }
            self.lo.mark_saved(ent, level);
        }
    }

    /// Capture a save level and return its stamp object.
    pub fn do_save(&mut self) -> Result<Object, PsError> {
        let level = self.saves.len() as u32 + 1;
        self.saves.push(SaveRecord {
            level,
            table_len: self.lo.table_len(),
            used: self.lo.used(),
            undo: Vec::new(),
        });
        self.lo.set_save_level(level);
        Ok(Object::save(level))
    }

    /// Roll the local file back to a save stamp.
    pub fn do_restore(&mut self, stamp: Object) -> Result<(), PsError> {
        let Payload::Save(level) = stamp.payload() else {
            return Err(PsError::TypeCheck);
        };
        if level == 0 || level as usize > self.saves.len() {
            return Err(PsError::InvalidRestore);
        }
        let target = &self.saves[level as usize - 1];
        let table_len = target.table_len;

        // Stacks must not retain references into memory about to go away.
        for head in [self.os, self.es, self.ds, self.gs] {
            self.check_stack_survives(head, table_len)?;
        }

        while self.saves.len() >= level as usize {
            let Some(record) = self.saves.pop() else {
                break;
            };
            for (ent, snapshot) in record.undo.iter().rev() {
                // A later-born entity may already be gone; undo applies
                // only to survivors.
                if self.lo.entity(*ent).is_ok() {
                    self.lo.restore_entity(*ent, snapshot)?;
                }
                self.lo.mark_saved(*ent, 0);
            }
            if record.level == level {
                self.lo.reclaim_from(record.table_len);
            }
        }
        self.lo.set_save_level(self.saves.len() as u32);
        Ok(())
    }

    fn check_stack_survives(&self, head: EntityId, table_len: usize) -> Result<(), PsError> {
        let depth = stack::depth(&self.lo, head)?;
        for index in 0..depth {
            let Some(obj) = stack::get(&self.lo, head, index)? else {
                break;
            };
            let ent = match obj.payload() {
                Payload::String(c) | Payload::Array(c) if c.bank == Bank::Local => Some(c.ent),
                Payload::Dict { bank, ent } if bank == Bank::Local => Some(ent),
                _ => None,
            };
            if let Some(ent) = ent {
                if !self.lo.survives_reclaim(ent, table_len) {
                    return Err(PsError::InvalidRestore);
                }
            }
        }
        Ok(())
    }

    /// Current save depth (`vmstatus`).
    #[must_use]
    pub fn save_depth(&self) -> usize {
        self.saves.len()
    }

    // --- files ----------------------------------------------------------

    /// Open a token source over `data`.
    pub fn file_open(&mut self, data: Rc<[u8]>, name: &str) -> FileId {
        let id = self.files.len() as FileId;
        self.files.push(FileRec {
            data,
            pos: 0,
            name: name.into(),
            closed: false,
        });
        id
    }

    /// The file record for `id`.
    pub fn file(&self, id: FileId) -> Result<&FileRec, PsError> {
        self.files.get(id as usize).ok_or(PsError::IoError)
    }

    /// The file record for `id`, mutably.
    pub fn file_mut(&mut self, id: FileId) -> Result<&mut FileRec, PsError> {
        self.files.get_mut(id as usize).ok_or(PsError::IoError)
    }

    // --- embedding ------------------------------------------------------

    /// Execute a program or resume a yielded one.
    ///
    /// Returns [`RunOutcome::Yielded`] when a showpage in RETURN mode
    /// handed a page to the embedder; call again with [`Input::Resume`]
    /// to continue.
    pub fn run(&mut self, input: Input<'_>) -> Result<RunOutcome, ContextError> {
        if self.dead {
            return Err(ContextError::Dead);
        }
        match input {
            Input::String(program) => {
                let id = self.file_open(Rc::from(program.as_bytes()), "%string");
                self.es_push(Object::file(id))?;
            }
            Input::Filename(path) => {
                let bytes = std::fs::read(path)?;
                let name = path.display().to_string();
                let id = self.file_open(Rc::from(bytes.as_slice()), &name);
                self.es_push(Object::file(id))?;
            }
            Input::Resume => {}
        }
        crate::vm::run(self)
    }

    /// The most recently emitted page buffer, when the context was
    /// created with [`Output::BufferOut`]. Valid until the next
    /// `showpage` replaces it or the context is dropped.
    #[must_use]
    pub fn raster_buffer(&self) -> Option<&[u8]> {
        self.raster.as_deref()
    }
}
