//! Persistent lists: Relaxed Radix Balanced trees.
//!
//! A list is a header record pointing at a radix tree of 32-way nodes plus
//! a tail leaf of recent pushes. Strict subtrees index purely by bit
//! arithmetic; relaxed subtrees (produced by concatenation and slicing)
//! carry cumulative size tables. All operations are persistent: they share
//! structure with their input and never mutate published nodes.
//!
//! Everything here allocates from the GC arena. Collections cannot happen
//! mid-operation (allocation never collects), so holding raw node pointers
//! across allocations is sound.

pub(crate) mod concat;
pub mod node;
pub(crate) mod push;
pub(crate) mod slice;

use core::mem::size_of;
use core::ptr;

use owl_types::{Tag, Term};

use crate::heap::Heap;
use crate::term;

use self::node::{
    internal_children, internal_children_mut, internal_node_clone, leaf_children,
    leaf_children_mut, leaf_node_clone, leaf_node_create, leaf_node_dec, leaf_node_inc,
    table_sizes, InternalNode, LeafNode, NodePtr, RRB_BITS, RRB_BRANCHING, RRB_MASK,
};

/// List header record.
///
/// `root` is null for lists held entirely in the tail. `shift` is the
/// number of index bits consumed at the root level.
#[repr(C)]
pub struct Rrb {
    pub(crate) cnt: u32,
    pub(crate) shift: u32,
    pub(crate) tail_len: u32,
    pub(crate) root: NodePtr,
    pub(crate) tail: *mut LeafNode,
}

pub(crate) fn rrb_of(list: Term) -> *const Rrb {
    list.payload_ptr() as *const Rrb
}

fn to_term(rrb: *const Rrb) -> Term {
    Term::tag_ptr(rrb as *const u8, Tag::List)
}

/// The empty list.
pub fn init(heap: &Heap) -> Term {
    heap.empty_list_term()
}

/// Append an element.
pub fn push(heap: &mut Heap, list: Term, elem: Term) -> Term {
    // Safety: list terms always point at live header records.
    unsafe { to_term(rrb_push(heap, rrb_of(list), elem)) }
}

/// Element at `index`, or `nil` past the end.
pub fn nth(list: Term, index: u64) -> Term {
    // Safety: as above.
    unsafe {
        let rrb = rrb_of(list);
        if index >= (*rrb).cnt as u64 {
            return Term::NIL;
        }
        rrb_nth(rrb, index as u32)
    }
}

/// Element count.
pub fn count(list: Term) -> u64 {
    // Safety: as above.
    unsafe { (*rrb_of(list)).cnt as u64 }
}

/// Half-open slice `[from, to)`. Degenerate ranges produce the empty list.
pub fn slice(heap: &mut Heap, list: Term, from: u64, to: u64) -> Term {
    let from = from.min(u32::MAX as u64) as u32;
    let to = to.min(u32::MAX as u64) as u32;
    // Safety: as above.
    unsafe {
        let sliced = slice::slice_right(heap, rrb_of(list), to);
        to_term(slice::slice_left(heap, sliced, from))
    }
}

/// Concatenate two lists, rebalancing to keep indexing logarithmic.
pub fn concat(heap: &mut Heap, left: Term, right: Term) -> Term {
    // Safety: as above.
    unsafe { to_term(concat::rrb_concat(heap, rrb_of(left), rrb_of(right))) }
}

/// Replace the element at `index` by path copying. `None` out of range.
pub fn update(heap: &mut Heap, list: Term, index: u64, elem: Term) -> Option<Term> {
    if index >= count(list) {
        return None;
    }
    // Safety: as above.
    unsafe { Some(to_term(rrb_update(heap, rrb_of(list), index as u32, elem))) }
}

/// Remove the last element.
pub fn pop(heap: &mut Heap, list: Term) -> Term {
    if count(list) == 0 {
        return list;
    }
    // Safety: as above.
    unsafe { to_term(rrb_pop(heap, rrb_of(list))) }
}

/// The last element, or `nil` for the empty list.
pub fn peek(list: Term) -> Term {
    // Safety: as above.
    unsafe {
        let rrb = rrb_of(list);
        if (*rrb).cnt == 0 {
            return Term::NIL;
        }
        leaf_children((*rrb).tail)[(*rrb).tail_len as usize - 1]
    }
}

/// Emptiness is pointer identity with the immortal empty singleton.
pub fn is_empty(heap: &Heap, list: Term) -> bool {
    rrb_of(list) == heap.empty_rrb_ptr()
}

/// Element-wise structural equality.
pub fn eq(left: Term, right: Term) -> bool {
    let len = count(left);
    if len != count(right) {
        return false;
    }
    (0..len).all(|i| term::terms_eq(nth(left, i), nth(right, i)))
}

pub(crate) unsafe fn rrb_head_clone(heap: &mut Heap, original: *const Rrb) -> *mut Rrb {
    let clone = heap.alloc(size_of::<Rrb>()) as *mut Rrb;
    ptr::copy_nonoverlapping(original, clone, 1);
    clone
}

/// A zeroed header record: empty, rootless, null tail. Callers fill it in.
pub(crate) unsafe fn rrb_alloc(heap: &mut Heap) -> *mut Rrb {
    heap.alloc(size_of::<Rrb>()) as *mut Rrb
}

unsafe fn rrb_tail_push(heap: &mut Heap, rrb: *const Rrb, elt: Term) -> *mut Rrb {
    let new_rrb = rrb_head_clone(heap, rrb);
    let new_tail = leaf_node_inc(heap, (*rrb).tail);
    leaf_children_mut(new_tail)[(*new_rrb).tail_len as usize] = elt;
    (*new_rrb).cnt += 1;
    (*new_rrb).tail_len += 1;
    (*new_rrb).tail = new_tail;
    new_rrb
}

pub(crate) unsafe fn rrb_push(heap: &mut Heap, rrb: *const Rrb, elt: Term) -> *mut Rrb {
    if (*rrb).tail_len < RRB_BRANCHING {
        // Room in the tail: all but the rightmost spine is shared.
        return rrb_tail_push(heap, rrb, elt);
    }
    let new_rrb = rrb_head_clone(heap, rrb);
    (*new_rrb).cnt += 1;

    let new_tail = leaf_node_create(heap, 1);
    leaf_children_mut(new_tail)[0] = elt;
    (*new_rrb).tail_len = 1;
    push::push_down_tail(heap, rrb, new_rrb, new_tail)
}

/// Radix descent with size-table correction in relaxed nodes.
pub(crate) unsafe fn rrb_nth(rrb: *const Rrb, mut index: u32) -> Term {
    let tail_offset = (*rrb).cnt - (*rrb).tail_len;
    if tail_offset <= index {
        return leaf_children((*rrb).tail)[(index - tail_offset) as usize];
    }
    let mut current = (*rrb).root;
    let mut shift = (*rrb).shift;
    while shift > 0 {
        let internal = current as *const InternalNode;
        current = if (*internal).size_table.is_null() {
            let subidx = (index >> shift) & RRB_MASK;
            internal_children(internal)[subidx as usize]
        } else {
            sized(internal, &mut index, shift)
        };
        shift -= RRB_BITS;
    }
    leaf_children(current as *const LeafNode)[(index & RRB_MASK) as usize]
}

/// Child index under a size table; adjusts `index` to be child-relative.
pub(crate) unsafe fn sized_pos(node: *const InternalNode, index: &mut u32, sp: u32) -> u32 {
    let sizes = table_sizes((*node).size_table, (*node).head.len);
    let mut is = *index >> sp;
    while sizes[is as usize] <= *index {
        is += 1;
    }
    if is != 0 {
        *index -= sizes[is as usize - 1];
    }
    is
}

unsafe fn sized(node: *const InternalNode, index: &mut u32, sp: u32) -> NodePtr {
    let is = sized_pos(node, index, sp);
    internal_children(node)[is as usize]
}

unsafe fn rrb_update(heap: &mut Heap, rrb: *const Rrb, mut index: u32, elt: Term) -> *mut Rrb {
    let new_rrb = rrb_head_clone(heap, rrb);
    let tail_offset = (*rrb).cnt - (*rrb).tail_len;
    if tail_offset <= index {
        let new_tail = leaf_node_clone(heap, (*rrb).tail);
        leaf_children_mut(new_tail)[(index - tail_offset) as usize] = elt;
        (*new_rrb).tail = new_tail;
        return new_rrb;
    }

    let mut previous_pointer: *mut NodePtr = &mut (*new_rrb).root;
    let mut current = (*rrb).root;
    let mut shift = (*rrb).shift;
    while shift > 0 {
        let cloned = internal_node_clone(heap, current as *const InternalNode);
        *previous_pointer = cloned as NodePtr;

        let child_index = if (*cloned).size_table.is_null() {
            (index >> shift) & RRB_MASK
        } else {
            sized_pos(cloned, &mut index, shift)
        };
        previous_pointer = &mut internal_children_mut(cloned)[child_index as usize];
        current = internal_children(cloned)[child_index as usize];
        shift -= RRB_BITS;
    }

    let leaf = leaf_node_clone(heap, current as *const LeafNode);
    *previous_pointer = leaf as NodePtr;
    leaf_children_mut(leaf)[(index & RRB_MASK) as usize] = elt;
    new_rrb
}

unsafe fn rrb_pop(heap: &mut Heap, rrb: *const Rrb) -> *const Rrb {
    if (*rrb).cnt == 1 {
        return heap.empty_rrb_ptr();
    }
    let new_rrb = rrb_head_clone(heap, rrb);
    (*new_rrb).cnt -= 1;

    if (*rrb).tail_len == 1 {
        slice::promote_rightmost_leaf(heap, new_rrb);
        new_rrb
    } else {
        let new_tail = leaf_node_dec(heap, (*rrb).tail);
        (*new_rrb).tail_len -= 1;
        (*new_rrb).tail = new_tail;
        new_rrb
    }
}

#[cfg(test)]
mod tests;
