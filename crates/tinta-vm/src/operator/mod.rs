// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The operator table and typed dispatch.
//!
//! An operator is a named list of signatures; a signature is a native
//! function plus the operand types it consumes. Registration appends to
//! the table and returns the opcode (the table index), which is what an
//! operator object carries as its payload.
//!
//! Dispatch tries signatures in registration order and selects the first
//! whose declared types match the operand stack; the polymorphism of
//! operators like `get` and `copy` is this list, not host-language
//! overloading. A signature's operands are copied out, the stack is
//! truncated, and the function runs; if it fails, the operand stack is
//! restored to its pre-pop state before the error path takes over.


use crate::context::Context;
use crate::error::PsError;
use crate::object::{NameId, Object, Opcode, Payload};
use crate::stack;

/// Operand type pattern of one signature slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypePattern {
    /// Matches every object.
    Any,
    /// Integer or real.
    Number,
    /// Integer or real; the argument is coerced to a real before the
    /// function runs.
    Float,
    /// Executable array.
    Proc,
    /// Exactly an integer.
    Integer,
    /// Exactly a real.
    Real,
    /// A boolean.
    Boolean,
    /// A string.
    String,
    /// An array, literal or executable.
    Array,
    /// A dictionary.
    Dict,
    /// A name.
    Name,
    /// The mark sentinel.
    Mark,
    /// A save stamp.
    Save,
    /// A file.
    File,
    /// An operator object.
    Operator,
    /// The null object.
    Null,
}

impl TypePattern {
    /// Whether `obj` satisfies this pattern.
    #[must_use]
    pub fn matches(self, obj: &Object) -> bool {
        match self {
            Self::Any => true,
            Self::Number | Self::Float => {
                matches!(obj.payload(), Payload::Integer(_) | Payload::Real(_))
            }
            Self::Proc => obj.is_proc(),
            Self::Integer => matches!(obj.payload(), Payload::Integer(_)),
            Self::Real => matches!(obj.payload(), Payload::Real(_)),
            Self::Boolean => matches!(obj.payload(), Payload::Boolean(_)),
            Self::String => matches!(obj.payload(), Payload::String(_)),
            Self::Array => matches!(obj.payload(), Payload::Array(_)),
            Self::Dict => matches!(obj.payload(), Payload::Dict { .. }),
            Self::Name => matches!(obj.payload(), Payload::Name { .. }),
            Self::Mark => matches!(obj.payload(), Payload::Mark),
            Self::Save => matches!(obj.payload(), Payload::Save(_)),
            Self::File => matches!(obj.payload(), Payload::File(_)),
            Self::Operator => matches!(obj.payload(), Payload::Operator(_)),
            Self::Null => matches!(obj.payload(), Payload::Null),
        }
    }
}

/// Native operator body. Arguments arrive bottom-first; results are
/// pushed by the body itself.
pub type OpFn = fn(&mut Context, &[Object]) -> Result<(), PsError>;

/// One callable shape of an operator.
pub struct Signature {
    /// The native body.
    pub func: OpFn,
    /// Results pushed on success (informational).
    pub out: u8,
    /// Operand patterns, bottom-first.
    pub args: Vec<TypePattern>,
}

/// Build a signature.
#[must_use]
pub fn sig(func: OpFn, out: u8, args: &[TypePattern]) -> Signature {
    Signature {
        func,
        out,
        args: args.to_vec(),
    }
}

/// A named operator: signatures tried in registration order.
pub struct Oper {
    /// Global name id.
    pub name: NameId,
    /// Callable shapes.
    pub sigs: Vec<Signature>,
}

/// The operator table. Opcodes are indices and fit an object payload.
pub struct OpTable {
    ops: Vec<Oper>,
}

impl Default for OpTable {
    fn default() -> Self {
        Self::new()
    }
}

impl OpTable {
    /// An empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Number of registered operators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Append an operator, returning its opcode.
    pub fn push(&mut self, oper: Oper) -> Result<Opcode, PsError> {
        let opcode = Opcode::try_from(self.ops.len()).map_err(|_| PsError::LimitCheck)?;
        self.ops.push(oper);
        Ok(opcode)
    }

    /// The operator for `opcode`.
    #[must_use]
    pub fn get(&self, opcode: Opcode) -> Option<&Oper> {
        self.ops.get(usize::from(opcode))
    }
}

/// Register an operator and bind it in systemdict.
pub fn def_op(ctx: &mut Context, name: &str, sigs: Vec<Signature>) -> Result<Opcode, PsError> {
    let opcode = def_op_hidden(ctx, name, sigs)?;
    let name_obj = ctx.name_object_global(name.as_bytes())?;
    let systemdict = ctx.systemdict;
    crate::composite::dict::put(ctx, systemdict, name_obj, Object::operator(opcode))?;
    Ok(opcode)
}

/// Register an operator without a systemdict binding (continuations).
pub fn def_op_hidden(ctx: &mut Context, name: &str, sigs: Vec<Signature>) -> Result<Opcode, PsError> {
    let name_obj = ctx.name_object_global(name.as_bytes())?;
    let Payload::Name { id, .. } = name_obj.payload() else {
        return Err(PsError::Unregistered);
    };
    ctx.optab.push(Oper { name: id, sigs })
}

/// Dispatch an operator object from the execution loop.
pub fn exec(ctx: &mut Context, opcode: Opcode) -> Result<(), PsError> {
    let depth = ctx.os_depth()?;

    // Selection: find the first signature whose operand types match.
    // Borrows of the table and the stacks end before the body runs.
    let selected = {
        let oper = ctx.optab.get(opcode).ok_or(PsError::Unregistered)?;
        let mut enough_operands = false;
        let mut selected = None;
        'sigs: for signature in &oper.sigs {
            let arity = signature.args.len();
            if depth < arity {
                continue;
            }
            enough_operands = true;
            let mut originals = Vec::with_capacity(arity);
            for (slot, pattern) in signature.args.iter().enumerate() {
                let obj = stack::peek(&ctx.lo, ctx.os, arity - 1 - slot)?
                    .ok_or(PsError::StackUnderflow)?;
                if !pattern.matches(&obj) {
                    continue 'sigs;
                }
                originals.push(obj);
            }
            let coerced = originals
                .iter()
                .zip(&signature.args)
                .map(|(obj, pattern)| coerce(*obj, *pattern))
                .collect::<Vec<_>>();
            selected = Some((signature.func, originals, coerced));
            break;
        }
        match selected {
            Some(found) => found,
            None if enough_operands => return Err(PsError::TypeCheck),
            None => return Err(PsError::StackUnderflow),
        }
    };

    let (func, originals, coerced) = selected;
    stack::truncate(&mut ctx.lo, ctx.os, depth - originals.len())?;
    match func(ctx, &coerced) {
        Ok(()) => Ok(()),
        Err(err) => {
            // Restore the pre-pop operand stack before the error path.
            stack::truncate(&mut ctx.lo, ctx.os, depth - originals.len())?;
            for obj in &originals {
                stack::push(&mut ctx.lo, ctx.os, *obj)?;
            }
            Err(err)
        }
    }
}

fn coerce(obj: Object, pattern: TypePattern) -> Object {
    if matches!(pattern, TypePattern::Float) {
        if let Payload::Integer(n) = obj.payload() {
            return Object::real(n as f32);
        }
    }
    obj
}

/// The registered name bytes of an opcode (diagnostics, printing).
pub fn name_of(ctx: &Context, opcode: Opcode) -> Option<Vec<u8>> {
    let oper = ctx.optab.get(opcode)?;
    ctx.names_global.bytes(&ctx.gl, oper.name).ok()
}
