//! Pushing a full tail down into the tree.

use crate::heap::Heap;

use super::node::{
    inc_shift, internal_children, internal_children_mut, internal_node_clone,
    internal_node_create, internal_node_inc, size_table_clone, size_table_create,
    table_sizes, table_sizes_mut, InternalNode, LeafNode, NodeKind, NodePtr, LEAF_NODE_SHIFT,
    RRB_BITS, RRB_BRANCHING, RRB_MASK,
};
use super::Rrb;

/// Insert `new_rrb`'s previous tail as the rightmost leaf of its tree and
/// install `new_tail` (null when the caller will set the tail itself).
///
/// `rrb` is the pre-push header; its count decides where the old tail
/// lands. The descent counts how many rightmost-spine nodes can be reused
/// (`nodes_to_copy`) versus how many fresh single-child nodes must be
/// appended below the copied prefix.
pub(crate) unsafe fn push_down_tail(
    heap: &mut Heap,
    rrb: *const Rrb,
    new_rrb: *mut Rrb,
    new_tail: *mut LeafNode,
) -> *mut Rrb {
    let old_tail = (*new_rrb).tail;
    (*new_rrb).tail = new_tail;
    if (*rrb).cnt <= RRB_BRANCHING {
        (*new_rrb).shift = LEAF_NODE_SHIFT;
        (*new_rrb).root = old_tail as NodePtr;
        return new_rrb;
    }

    let mut index = (*rrb).cnt - 1;
    let mut nodes_to_copy = 0u32;
    let mut nodes_visited = 0u32;
    let mut current = (*rrb).root as *const InternalNode;
    let mut shift = (*rrb).shift;

    'copyable: {
        // All levels strictly above the lowest non-leaf one.
        while shift > inc_shift(LEAF_NODE_SHIFT) {
            let child_index;
            if (*current).size_table.is_null() {
                // A full strict subtree spills over into a taller tree.
                let prev_shift = shift + RRB_BITS;
                if index >> prev_shift > 0 {
                    nodes_visited += 1;
                    break 'copyable;
                }
                child_index = (index >> shift) & RRB_MASK;
                index &= !(RRB_MASK << shift);
            } else {
                child_index = (*current).head.len - 1;
                if child_index != 0 {
                    index -= table_sizes((*current).size_table, (*current).head.len)
                        [child_index as usize - 1];
                }
            }
            nodes_visited += 1;
            if child_index < RRB_MASK {
                nodes_to_copy = nodes_visited;
            }

            let child = internal_children(current)[child_index as usize];
            if child.is_null() {
                // Unpopulated rightmost edge: everything above is reusable.
                nodes_to_copy = nodes_visited;
                break 'copyable;
            }
            current = child as *const InternalNode;
            shift -= RRB_BITS;
        }

        // Lowest non-leaf level: the old tail slots in at `len` if it fits.
        if shift != 0 {
            nodes_visited += 1;
            if (*current).head.len < RRB_BRANCHING {
                nodes_to_copy = nodes_visited;
            }
        }
    }

    // Settle the visit count for levels the early exits skipped.
    while shift > inc_shift(LEAF_NODE_SHIFT) {
        nodes_visited += 1;
        shift -= RRB_BITS;
    }

    if nodes_to_copy == 0 {
        // No reusable spine: grow the tree by one level.
        let new_root = internal_node_create(heap, 2);
        internal_children_mut(new_root)[0] = (*rrb).root;
        (*new_rrb).root = new_root as NodePtr;
        (*new_rrb).shift = inc_shift((*new_rrb).shift);

        if (*(*rrb).root).kind != NodeKind::Leaf
            && !(*((*rrb).root as *const InternalNode)).size_table.is_null()
        {
            let table = size_table_create(heap, 2);
            let sizes = table_sizes_mut(table, 2);
            // Left branch holds everything but the old tail; the right
            // branch completes the full count.
            sizes[0] = (*rrb).cnt - (*old_tail).head.len;
            sizes[1] = (*rrb).cnt;
            (*new_root).size_table = table;
        }

        let slot: *mut NodePtr = &mut internal_children_mut(new_root)[1];
        let to_set = append_empty(heap, slot, nodes_visited);
        *to_set = old_tail as NodePtr;
    } else {
        let node = copy_first_k(heap, rrb, new_rrb, nodes_to_copy, (*old_tail).head.len);
        let to_set = append_empty(heap, node, nodes_visited - nodes_to_copy);
        *to_set = old_tail as NodePtr;
    }

    new_rrb
}

/// Copy the first `k` nodes of the rightmost spine, adjusting size tables
/// for the incoming tail, and return the child slot the next level hangs
/// off.
unsafe fn copy_first_k(
    heap: &mut Heap,
    rrb: *const Rrb,
    new_rrb: *mut Rrb,
    k: u32,
    tail_size: u32,
) -> *mut NodePtr {
    let mut current = (*rrb).root as *const InternalNode;
    let mut to_set: *mut NodePtr = &mut (*new_rrb).root;
    let mut index = (*rrb).cnt - 1;
    let mut shift = (*rrb).shift;

    let mut i = 1;
    while i <= k && shift != 0 {
        let new_current;
        if i != k {
            new_current = internal_node_clone(heap, current);
            if !(*current).size_table.is_null() {
                let len = (*new_current).head.len;
                (*new_current).size_table = size_table_clone(heap, (*new_current).size_table, len);
                table_sizes_mut((*new_current).size_table, len)[len as usize - 1] += tail_size;
            }
        } else {
            // The last copied node grows a slot for the appended branch.
            new_current = internal_node_inc(heap, current);
            if !(*current).size_table.is_null() {
                let len = (*new_current).head.len;
                let sizes = table_sizes_mut((*new_current).size_table, len);
                sizes[len as usize - 1] = sizes[len as usize - 2] + tail_size;
            }
        }
        *to_set = new_current as NodePtr;

        let child_index = if (*current).size_table.is_null() {
            (index >> shift) & RRB_MASK
        } else {
            let ci = (*new_current).head.len - 1;
            if ci != 0 {
                index -= table_sizes((*current).size_table, (*current).head.len)[ci as usize - 1];
            }
            ci
        };
        to_set = &mut internal_children_mut(new_current)[child_index as usize];
        if i != k {
            current = internal_children(current)[child_index as usize] as *const InternalNode;
        }

        i += 1;
        shift -= RRB_BITS;
    }

    to_set
}

/// Chain `empty_height` single-child nodes under `to_set` and return the
/// innermost child slot.
unsafe fn append_empty(heap: &mut Heap, to_set: *mut NodePtr, empty_height: u32) -> *mut NodePtr {
    if empty_height == 0 {
        return to_set;
    }
    let bottom = internal_node_create(heap, 1);
    let mut empty = bottom as NodePtr;
    for _ in 1..empty_height {
        let new_empty = internal_node_create(heap, 1);
        internal_children_mut(new_empty)[0] = empty;
        empty = new_empty as NodePtr;
    }
    *to_set = empty;
    let slot: *mut NodePtr = &mut internal_children_mut(bottom)[0];
    slot
}
