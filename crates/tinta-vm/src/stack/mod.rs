// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Segmented stacks.
//!
//! All four interpreter stacks (operand, execution, dictionary, graphics)
//! are chains of fixed-capacity segments whose storage is entities in the
//! local memory file. Push appends into the first non-full segment and
//! links a fresh segment at the boundary; pop truncates. Segments are
//! never unlinked once allocated, so a stack that has grown deep keeps its
//! chain for reuse, and restore reclamation can leave segment entities
//! alive (they carry the STACK entity flag).
//!
//! Segment layout: a [`SegHeader`] followed by [`SEGMENT_CAPACITY`]
//! object slots.

#[cfg(test)]
mod stack_test;

use crate::mem::{EntityFlags, Mem, MemError};
use crate::object::{EntityId, OBJECT_SIZE, Object};

/// Objects per segment.
pub const SEGMENT_CAPACITY: usize = 256;

/// Chain terminator for [`SegHeader::next`].
pub const NO_SEGMENT: EntityId = EntityId::MAX;

/// Per-segment header stored at offset 0 of the segment entity.
#[derive(Clone, Copy, Debug)]
#[repr(C)]
struct SegHeader {
    /// Occupied slots in this segment.
    used: u32,
    /// Next segment entity, or [`NO_SEGMENT`].
    next: EntityId,
}

const HEADER_SIZE: usize = core::mem::size_of::<SegHeader>();

const fn slot_offset(index: usize) -> usize {
    HEADER_SIZE + index * OBJECT_SIZE
}

const fn segment_bytes() -> usize {
    slot_offset(SEGMENT_CAPACITY)
}

/// Allocate a new empty stack, returning its head segment entity.
pub fn init(mem: &mut Mem) -> Result<EntityId, MemError> {
    let seg = mem.alloc_entity_flagged(segment_bytes(), EntityFlags::STACK)?;
    mem.write_at(
        seg,
        0,
        SegHeader {
            used: 0,
            next: NO_SEGMENT,
        },
    )?;
    Ok(seg)
}

/// Total number of objects on the stack.
pub fn depth(mem: &Mem, head: EntityId) -> Result<usize, MemError> {
    let mut total = 0;
    let mut seg = head;
    while seg != NO_SEGMENT {
        let header: SegHeader = mem.read_at(seg, 0)?;
        total += header.used as usize;
        seg = header.next;
    }
    Ok(total)
}

/// Push an object, linking a new segment at the capacity boundary.
pub fn push(mem: &mut Mem, head: EntityId, obj: Object) -> Result<(), MemError> {
    let mut seg = head;
    loop {
        let header: SegHeader = mem.read_at(seg, 0)?;
        if (header.used as usize) < SEGMENT_CAPACITY {
            mem.write_at(seg, slot_offset(header.used as usize), obj)?;
            mem.write_at(
                seg,
                0,
                SegHeader {
                    used: header.used + 1,
                    ..header
                },
            )?;
            return Ok(());
        }
        if header.next == NO_SEGMENT {
            let new_seg = mem.alloc_entity_flagged(segment_bytes(), EntityFlags::STACK)?;
            mem.write_at(
                new_seg,
                0,
                SegHeader {
                    used: 0,
                    next: NO_SEGMENT,
                },
            )?;
            // Re-read the header: the allocation may have grown the arena,
            // but entity addressing makes that safe; only `next` changes.
            mem.write_at(
                seg,
                0,
                SegHeader {
                    next: new_seg,
                    ..header
                },
            )?;
            seg = new_seg;
        } else {
            seg = header.next;
        }
    }
}

/// Find the segment holding the top object, if any.
fn top_segment(mem: &Mem, head: EntityId) -> Result<Option<EntityId>, MemError> {
    let mut seg = head;
    let mut last_used = None;
    while seg != NO_SEGMENT {
        let header: SegHeader = mem.read_at(seg, 0)?;
        if header.used > 0 {
            last_used = Some(seg);
        }
        seg = header.next;
    }
    Ok(last_used)
}

/// Pop the top object. `None` on an empty stack.
pub fn pop(mem: &mut Mem, head: EntityId) -> Result<Option<Object>, MemError> {
    let Some(seg) = top_segment(mem, head)? else {
        return Ok(None);
    };
    let header: SegHeader = mem.read_at(seg, 0)?;
    let index = header.used as usize - 1;
    let obj = mem.read_at(seg, slot_offset(index))?;
    mem.write_at(
        seg,
        0,
        SegHeader {
            used: header.used - 1,
            ..header
        },
    )?;
    Ok(Some(obj))
}

/// Read the object `n` positions below the top (`n = 0` is the top).
pub fn peek(mem: &Mem, head: EntityId, n: usize) -> Result<Option<Object>, MemError> {
    let total = depth(mem, head)?;
    if n >= total {
        return Ok(None);
    }
    get(mem, head, total - 1 - n)
}

/// Read the object at `index` counted from the bottom.
pub fn get(mem: &Mem, head: EntityId, index: usize) -> Result<Option<Object>, MemError> {
    let mut seg = head;
    let mut remaining = index;
    while seg != NO_SEGMENT {
        let header: SegHeader = mem.read_at(seg, 0)?;
        if remaining < header.used as usize {
            return Ok(Some(mem.read_at(seg, slot_offset(remaining))?));
        }
        remaining -= header.used as usize;
        seg = header.next;
    }
    Ok(None)
}

/// Overwrite the object at `index` counted from the bottom.
pub fn put(mem: &mut Mem, head: EntityId, index: usize, obj: Object) -> Result<(), MemError> {
    let mut seg = head;
    let mut remaining = index;
    while seg != NO_SEGMENT {
        let header: SegHeader = mem.read_at(seg, 0)?;
        if remaining < header.used as usize {
            return mem.write_at(seg, slot_offset(remaining), obj);
        }
        remaining -= header.used as usize;
        seg = header.next;
    }
    Err(MemError::Bounds {
        off: index,
        len: 1,
        sz: 0,
    })
}

/// Drop objects until only `new_depth` remain.
pub fn truncate(mem: &mut Mem, head: EntityId, new_depth: usize) -> Result<(), MemError> {
    let mut seg = head;
    let mut remaining = new_depth;
    while seg != NO_SEGMENT {
        let header: SegHeader = mem.read_at(seg, 0)?;
        let keep = remaining.min(header.used as usize).min(SEGMENT_CAPACITY);
        if keep != header.used as usize {
            mem.write_at(
                seg,
                0,
                SegHeader {
                    used: keep as u32,
                    ..header
                },
            )?;
        }
        remaining = remaining.saturating_sub(keep);
        seg = header.next;
    }
    Ok(())
}

/// Collect every segment entity of the chain (restore validation).
pub fn segments(mem: &Mem, head: EntityId) -> Result<Vec<EntityId>, MemError> {
    let mut out = Vec::new();
    let mut seg = head;
    while seg != NO_SEGMENT {
        out.push(seg);
        let header: SegHeader = mem.read_at(seg, 0)?;
        seg = header.next;
    }
    Ok(out)
}
