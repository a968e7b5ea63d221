//! Function records.
//!
//! Named functions are registered at load time, boxed outside the arena and
//! immortal. Anonymous functions (closures) are arena allocations with
//! their captured upvalues in a flexible array after the fixed fields, and
//! move with the collector like any other heap value. Upvalues are copies
//! of terms at capture time, never references into caller frames.

use core::mem::size_of;
use core::slice;

use owl_types::{Tag, Term};

use crate::heap::Heap;

/// Fixed prefix of a function record. Closures append `n_upvalues` terms.
#[derive(Debug)]
#[repr(C)]
pub struct Function {
    /// Absolute instruction offset of the body in the VM code buffer.
    pub location: u64,
    /// String term naming the function.
    pub name: Term,
    /// Captured term count; 0 for named functions.
    pub n_upvalues: u8,
}

impl Function {
    /// A named, immortal function bound at load time.
    pub fn named(name: Term, location: u64) -> Box<Function> {
        Box::new(Function {
            location,
            name,
            n_upvalues: 0,
        })
    }

    /// The term handle for a boxed named function.
    pub fn term(function: &Function) -> Term {
        Term::tag_ptr(function as *const Function as *const u8, Tag::Function)
    }
}

/// Allocate a closure on the GC heap. Upvalue slots start zeroed; the
/// caller fills them before the term escapes into a register.
pub fn alloc_anon(heap: &mut Heap, location: u64, name: Term, n_upvalues: u8) -> *mut Function {
    let size = size_of::<Function>() + n_upvalues as usize * size_of::<Term>();
    let fun = heap.alloc(size) as *mut Function;
    // Safety: the allocation covers the fixed fields plus the upvalue array.
    unsafe {
        (*fun).location = location;
        (*fun).name = name;
        (*fun).n_upvalues = n_upvalues;
    }
    fun
}

pub(crate) unsafe fn upvalues<'a>(fun: *const Function) -> &'a [Term] {
    let base = (fun as *const u8).add(size_of::<Function>()) as *const Term;
    slice::from_raw_parts(base, (*fun).n_upvalues as usize)
}

pub(crate) unsafe fn upvalues_mut<'a>(fun: *mut Function) -> &'a mut [Term] {
    let base = (fun as *mut u8).add(size_of::<Function>()) as *mut Term;
    slice::from_raw_parts_mut(base, (*fun).n_upvalues as usize)
}

/// The name term of a function value.
pub fn name(function: Term) -> Term {
    // Safety: callers have checked the tag; function payloads are live
    // records.
    unsafe { (*(function.payload_ptr() as *const Function)).name }
}

/// The body offset of a function value.
pub fn location(function: Term) -> u64 {
    // Safety: as above.
    unsafe { (*(function.payload_ptr() as *const Function)).location }
}
