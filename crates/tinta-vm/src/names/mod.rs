// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Interned name tables.
//!
//! Names are byte-strings interned to dense integer ids, one table per
//! memory bank. Interning is idempotent: consing the same bytes twice in
//! the same bank yields the same id, so name equality is an id comparison.
//!
//! The global table is always consulted first, regardless of the current
//! allocation bank. A byte-string therefore has exactly one canonical name
//! object process-wide: the global one if it was ever interned globally
//! (all system and operator names are), otherwise the local one. Without
//! this rule, dictionary lookups would miss keys interned in the other
//! bank.
//!
//! The first ids of the global table are reserved for system names in the
//! stable order of [`SYSTEM_NAMES`], so native code can cache id handles
//! at compile time (see [`sysname`]).

#[cfg(test)]
mod names_test;

use std::collections::HashMap;

use crate::mem::{Mem, MemError};
use crate::object::{Bank, EntityId, NameId, Object};

/// System names interned at context creation, in id order.
///
/// The device back-ends and the error machinery rely on these ids being
/// stable; extend only at the end.
pub const SYSTEM_NAMES: &[&str] = &[
    "Private",
    "width",
    "height",
    "nativecolorspace",
    "DeviceRGB",
    "Create",
    "Emit",
    "Flush",
    "ImgData",
    "OutputBufferOut",
    "newerror",
    "errorname",
    "command",
    "ostack",
    "estack",
    "dstack",
    "DEVICE",
];

/// Compile-time handles for the [`SYSTEM_NAMES`] ids.
pub mod sysname {
    use crate::object::NameId;

    /// `Private` - device native record slot.
    pub const PRIVATE: NameId = 0;
    /// `width` - device width entry.
    pub const WIDTH: NameId = 1;
    /// `height` - device height entry.
    pub const HEIGHT: NameId = 2;
    /// `nativecolorspace` - device colorspace entry.
    pub const NATIVECOLORSPACE: NameId = 3;
    /// `DeviceRGB` - the only native colorspace.
    pub const DEVICE_RGB: NameId = 4;
    /// `Create` - device constructor entry.
    pub const CREATE: NameId = 5;
    /// `Emit` - device page-emit entry.
    pub const EMIT: NameId = 6;
    /// `Flush` - device flush entry.
    pub const FLUSH: NameId = 7;
    /// `ImgData` - page image rows.
    pub const IMG_DATA: NameId = 8;
    /// `OutputBufferOut` - buffer handoff marker.
    pub const OUTPUT_BUFFER_OUT: NameId = 9;
    /// `newerror` - $error slot.
    pub const NEWERROR: NameId = 10;
    /// `errorname` - $error slot.
    pub const ERRORNAME: NameId = 11;
    /// `command` - $error slot.
    pub const COMMAND: NameId = 12;
    /// `ostack` - $error snapshot slot.
    pub const OSTACK: NameId = 13;
    /// `estack` - $error snapshot slot.
    pub const ESTACK: NameId = 14;
    /// `dstack` - $error snapshot slot.
    pub const DSTACK: NameId = 15;
    /// `DEVICE` - installed page device.
    pub const DEVICE: NameId = 16;
}

/// One bank's intern table.
///
/// Name bytes are stored as entities in the bank's memory file; the map is
/// the Rust-native stand-in for the original's ternary search tree and
/// serves the same contract (bytes -> id, idempotent).
pub struct NameTable {
    bank: Bank,
    ids: HashMap<Box<[u8]>, NameId>,
    entities: Vec<EntityId>,
}

impl NameTable {
    /// Create an empty table for one bank.
    #[must_use]
    pub fn new(bank: Bank) -> Self {
        Self {
            bank,
            ids: HashMap::new(),
            entities: Vec::new(),
        }
    }

    /// Which bank this table serves.
    #[must_use]
    pub const fn bank(&self) -> Bank {
        self.bank
    }

    /// Number of interned names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether no names are interned yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Look up bytes without interning.
    #[must_use]
    pub fn find(&self, bytes: &[u8]) -> Option<NameId> {
        self.ids.get(bytes).copied()
    }

    /// Intern `bytes`, storing them in `mem` on first sight.
    ///
    /// `mem` must be the memory file of this table's bank.
    pub fn cons(&mut self, mem: &mut Mem, bytes: &[u8]) -> Result<NameId, MemError> {
        debug_assert_eq!(mem.bank(), self.bank);
        if let Some(id) = self.find(bytes) {
            return Ok(id);
        }
        let ent = mem.alloc_entity(bytes.len())?;
        mem.put_bytes(ent, 0, bytes)?;
        let id = NameId::try_from(self.entities.len()).map_err(|_| MemError::Exhausted)?;
        self.entities.push(ent);
        self.ids.insert(bytes.into(), id);
        Ok(id)
    }

    /// The bytes of an interned name.
    pub fn bytes(&self, mem: &Mem, id: NameId) -> Result<Vec<u8>, MemError> {
        let ent = *self
            .entities
            .get(id as usize)
            .ok_or(MemError::BadEntity(id))?;
        let len = mem.entity_size(ent)?;
        let mut out = vec![0; len];
        mem.get_bytes(ent, 0, &mut out)?;
        Ok(out)
    }
}

/// The canonical name object for `bytes`: global table first, then the
/// bank selected by `local_mode`.
///
/// Returns a literal name; callers mark it executable as needed.
pub fn cons(
    global: &mut NameTable,
    local: &mut NameTable,
    global_mem: &mut Mem,
    local_mem: &mut Mem,
    bytes: &[u8],
    allocate_global: bool,
) -> Result<Object, MemError> {
    if let Some(id) = global.find(bytes) {
        return Ok(Object::name(id, Bank::Global));
    }
    if allocate_global {
        let id = global.cons(global_mem, bytes)?;
        return Ok(Object::name(id, Bank::Global));
    }
    let id = local.cons(local_mem, bytes)?;
    Ok(Object::name(id, Bank::Local))
}
