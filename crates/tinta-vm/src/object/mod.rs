// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tagged object representation.
//!
//! An [`Object`] is the fixed-width value that flows through the whole
//! interpreter: operand stack entries, dictionary keys and values, array
//! elements, and the items awaiting interpretation on the execution stack.
//! Simple values are stored inline; composite values carry an entity
//! reference into one of the two memory files (see [`crate::mem`]).
//!
//! Objects are `Copy` and are written into and read out of arena bytes
//! with unaligned typed access, so they must stay free of non-trivial
//! ownership.


use bitflags::bitflags;

/// Identifier of an interned name within one bank's name table.
pub type NameId = u32;

/// Identifier of an entity within one memory file.
pub type EntityId = u32;

/// Index of an operator in the operator table.
pub type Opcode = u16;

/// Identifier of an open file record in the context's file table.
pub type FileId = u32;

/// Which memory file a composite object lives in.
///
/// Local memory is subject to save/restore; global memory is not.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Bank {
    /// Per-save-context memory.
    Local = 0,
    /// Memory shared across save boundaries.
    Global = 1,
}

bitflags! {
    /// Access and execution flags carried by every object.
    ///
    /// "Unlimited" access is `READABLE | WRITABLE`; "read-only" drops
    /// WRITABLE; "execute-only" keeps only EXECUTABLE; "no access" is
    /// empty.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ObjectFlags: u16 {
        /// The execution loop acts on this object instead of pushing it.
        const EXECUTABLE = 1 << 0;
        /// Contents may be read.
        const READABLE = 1 << 1;
        /// Contents may be written.
        const WRITABLE = 1 << 2;
    }
}

/// Reference to a span of a composite entity.
///
/// Strings reference a span of bytes, arrays a span of objects. Substrings
/// and subarrays share the underlying entity and differ only in offset and
/// length, which is also the identity used for equality.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Composite {
    /// Memory file holding the entity.
    pub bank: Bank,
    /// Entity id within that memory file.
    pub ent: EntityId,
    /// Element offset of this reference within the entity.
    pub off: u16,
    /// Element count of this reference.
    pub len: u16,
}

/// The tagged payload of an object.
///
/// The tag uniquely determines the payload layout; there is no way to
/// construct an ambiguously typed object.
#[derive(Clone, Copy, Debug)]
pub enum Payload {
    /// No value.
    Null,
    /// Stack sentinel.
    Mark,
    /// Sentinel for failed lookups and allocations.
    Invalid,
    /// Boolean value.
    Boolean(bool),
    /// 32-bit signed integer.
    Integer(i32),
    /// 32-bit float.
    Real(f32),
    /// Index into the operator table.
    Operator(Opcode),
    /// Save stamp (save-stack level).
    Save(u32),
    /// Interned name.
    Name {
        /// Id within the bank's name table.
        id: NameId,
        /// Which name table holds the bytes.
        bank: Bank,
    },
    /// Byte string span.
    String(Composite),
    /// Object array span; executable arrays are procedures.
    Array(Composite),
    /// Dictionary entity.
    Dict {
        /// Memory file holding the entity.
        bank: Bank,
        /// Entity id of the slot table.
        ent: EntityId,
    },
    /// Open file record.
    File(FileId),
}

/// A fixed-width tagged value.
#[derive(Clone, Copy, Debug)]
pub struct Object {
    flags: ObjectFlags,
    payload: Payload,
}

/// Size in bytes of one object as stored in an arena.
pub const OBJECT_SIZE: usize = core::mem::size_of::<Object>();

impl Object {
    /// Default flags for a freshly constructed literal object.
    const DEFAULT: ObjectFlags = ObjectFlags::READABLE.union(ObjectFlags::WRITABLE);

    /// Construct from explicit flags and payload.
    #[must_use]
    pub const fn new(flags: ObjectFlags, payload: Payload) -> Self {
        Self { flags, payload }
    }

    /// The null object.
    #[must_use]
    pub const fn null() -> Self {
        Self::new(Self::DEFAULT, Payload::Null)
    }

    /// The mark sentinel.
    #[must_use]
    pub const fn mark() -> Self {
        Self::new(Self::DEFAULT, Payload::Mark)
    }

    /// The invalid sentinel.
    #[must_use]
    pub const fn invalid() -> Self {
        Self::new(ObjectFlags::empty(), Payload::Invalid)
    }

    /// Construct a boolean.
    #[must_use]
    pub const fn boolean(b: bool) -> Self {
        Self::new(Self::DEFAULT, Payload::Boolean(b))
    }

    /// Construct an integer.
    #[must_use]
    pub const fn integer(n: i32) -> Self {
        Self::new(Self::DEFAULT, Payload::Integer(n))
    }

    /// Construct a real.
    #[must_use]
    pub const fn real(r: f32) -> Self {
        Self::new(Self::DEFAULT, Payload::Real(r))
    }

    /// Construct an executable operator reference.
    #[must_use]
    pub const fn operator(opcode: Opcode) -> Self {
        Self::new(
            Self::DEFAULT.union(ObjectFlags::EXECUTABLE),
            Payload::Operator(opcode),
        )
    }

    /// Construct a save stamp.
    #[must_use]
    pub const fn save(level: u32) -> Self {
        Self::new(Self::DEFAULT, Payload::Save(level))
    }

    /// Construct a literal name.
    #[must_use]
    pub const fn name(id: NameId, bank: Bank) -> Self {
        Self::new(Self::DEFAULT, Payload::Name { id, bank })
    }

    /// Construct a string object covering a whole entity span.
    #[must_use]
    pub const fn string(composite: Composite) -> Self {
        Self::new(Self::DEFAULT, Payload::String(composite))
    }

    /// Construct an array object covering a whole entity span.
    #[must_use]
    pub const fn array(composite: Composite) -> Self {
        Self::new(Self::DEFAULT, Payload::Array(composite))
    }

    /// Construct a dictionary object.
    #[must_use]
    pub const fn dict(bank: Bank, ent: EntityId) -> Self {
        Self::new(Self::DEFAULT, Payload::Dict { bank, ent })
    }

    /// Construct an executable file object.
    #[must_use]
    pub const fn file(id: FileId) -> Self {
        Self::new(
            Self::DEFAULT.union(ObjectFlags::EXECUTABLE),
            Payload::File(id),
        )
    }

    /// The payload with its tag.
    #[must_use]
    pub const fn payload(&self) -> Payload {
        self.payload
    }

    /// The flags word.
    #[must_use]
    pub const fn flags(&self) -> ObjectFlags {
        self.flags
    }

    /// Whether the execution loop acts on this object.
    #[must_use]
    pub const fn is_executable(&self) -> bool {
        self.flags.contains(ObjectFlags::EXECUTABLE)
    }

    /// Whether contents may be read.
    #[must_use]
    pub const fn is_readable(&self) -> bool {
        self.flags.contains(ObjectFlags::READABLE)
    }

    /// Whether contents may be written.
    #[must_use]
    pub const fn is_writable(&self) -> bool {
        self.flags.contains(ObjectFlags::WRITABLE)
    }

    /// Copy with the executable flag set (`cvx`).
    #[must_use]
    pub const fn executable(mut self) -> Self {
        self.flags = self.flags.union(ObjectFlags::EXECUTABLE);
        self
    }

    /// Copy with the executable flag cleared (`cvlit`).
    #[must_use]
    pub const fn literal(mut self) -> Self {
        self.flags = self.flags.difference(ObjectFlags::EXECUTABLE);
        self
    }

    /// Copy with write access removed (`readonly`).
    #[must_use]
    pub const fn readonly(mut self) -> Self {
        self.flags = self.flags.difference(ObjectFlags::WRITABLE);
        self
    }

    /// Copy with read and write access removed (`executeonly`).
    #[must_use]
    pub const fn executeonly(mut self) -> Self {
        self.flags = self
            .flags
            .difference(ObjectFlags::READABLE.union(ObjectFlags::WRITABLE));
        self
    }

    /// Copy with all access removed (`noaccess`).
    #[must_use]
    pub const fn noaccess(mut self) -> Self {
        self.flags = ObjectFlags::empty();
        self
    }

    /// Whether this is a procedure: an executable array.
    #[must_use]
    pub const fn is_proc(&self) -> bool {
        matches!(self.payload, Payload::Array(_)) && self.is_executable()
    }

    /// Integer payload, if any.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i32> {
        match self.payload {
            Payload::Integer(n) => Some(n),
            _ => None,
        }
    }

    /// Numeric payload widened to f64; integers coerce.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self.payload {
            Payload::Integer(n) => Some(n as f64),
            Payload::Real(r) => Some(r as f64),
            _ => None,
        }
    }

    /// Boolean payload, if any.
    #[must_use]
    pub const fn as_boolean(&self) -> Option<bool> {
        match self.payload {
            Payload::Boolean(b) => Some(b),
            _ => None,
        }
    }

    /// String composite reference, if any.
    #[must_use]
    pub const fn as_string(&self) -> Option<Composite> {
        match self.payload {
            Payload::String(c) => Some(c),
            _ => None,
        }
    }

    /// Array composite reference, if any.
    #[must_use]
    pub const fn as_array(&self) -> Option<Composite> {
        match self.payload {
            Payload::Array(c) => Some(c),
            _ => None,
        }
    }

    /// The `<type>type` name used by the `type` operator.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self.payload {
            Payload::Null => "nulltype",
            Payload::Mark => "marktype",
            Payload::Invalid => "invalidtype",
            Payload::Boolean(_) => "booleantype",
            Payload::Integer(_) => "integertype",
            Payload::Real(_) => "realtype",
            Payload::Operator(_) => "operatortype",
            Payload::Save(_) => "savetype",
            Payload::Name { .. } => "nametype",
            Payload::String(_) => "stringtype",
            Payload::Array(_) => "arraytype",
            Payload::Dict { .. } => "dicttype",
            Payload::File(_) => "filetype",
        }
    }
}

impl PartialEq for Object {
    /// Equality per the language reference: structural for simples,
    /// numeric across integer/real, identity (entity, offset, length) for
    /// composites. Flags do not participate.
    fn eq(&self, other: &Self) -> bool {
        match (self.payload, other.payload) {
            (Payload::Null, Payload::Null)
            | (Payload::Mark, Payload::Mark)
            | (Payload::Invalid, Payload::Invalid) => true,
            (Payload::Boolean(a), Payload::Boolean(b)) => a == b,
            (Payload::Integer(a), Payload::Integer(b)) => a == b,
            (Payload::Real(a), Payload::Real(b)) => a == b,
            (Payload::Integer(a), Payload::Real(b)) | (Payload::Real(b), Payload::Integer(a)) => {
                a as f32 == b
            }
            (Payload::Operator(a), Payload::Operator(b)) => a == b,
            (Payload::Save(a), Payload::Save(b)) => a == b,
            (Payload::Name { id: a, bank: ab }, Payload::Name { id: b, bank: bb }) => {
                a == b && ab == bb
            }
            (Payload::String(a), Payload::String(b)) | (Payload::Array(a), Payload::Array(b)) => {
                a == b
            }
            (Payload::Dict { bank: ab, ent: a }, Payload::Dict { bank: bb, ent: b }) => {
                a == b && ab == bb
            }
            (Payload::File(a), Payload::File(b)) => a == b,
            _ => false,
        }
    }
}
