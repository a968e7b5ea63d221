//! Heap strings.
//!
//! Strings are NUL-terminated UTF-8 byte buffers; the length is implicit.
//! Buffers produced at runtime live on the GC heap, literal and name
//! strings live in the intern pools outside it. Both are at least 8-byte
//! aligned so the tag bits stay free.

use owl_types::{Tag, Term};

use crate::error::VmError;
use crate::heap::Heap;

/// Byte length of a NUL-terminated buffer.
///
/// # Safety
///
/// `ptr` must point at a NUL-terminated allocation.
pub(crate) unsafe fn byte_len(ptr: *const u8) -> usize {
    let mut len = 0;
    while *ptr.add(len) != 0 {
        len += 1;
    }
    len
}

/// The bytes of a string term, without the terminator.
pub fn bytes<'a>(string: Term) -> &'a [u8] {
    let ptr = string.payload_ptr() as *const u8;
    // Safety: string payloads are NUL-terminated by construction.
    unsafe { core::slice::from_raw_parts(ptr, byte_len(ptr)) }
}

/// Allocate a heap string from raw bytes.
pub fn from_bytes(heap: &mut Heap, content: &[u8]) -> Term {
    let string = heap.alloc(content.len() + 1);
    // Safety: the allocation holds `len + 1` bytes and `alloc` zeroed the
    // tail, so the terminator is already in place.
    unsafe {
        core::ptr::copy_nonoverlapping(content.as_ptr(), string, content.len());
    }
    Term::tag_ptr(string, Tag::String)
}

/// Allocate a heap string from UTF-8 text.
pub fn from_str(heap: &mut Heap, content: &str) -> Term {
    from_bytes(heap, content.as_bytes())
}

/// Concatenate two strings into a fresh heap string.
pub fn concat(heap: &mut Heap, left: Term, right: Term) -> Term {
    let left_bytes = bytes(left);
    let right_bytes = bytes(right);
    let merged = heap.alloc(left_bytes.len() + right_bytes.len() + 1);
    // Safety: the allocation covers both halves plus the terminator.
    unsafe {
        core::ptr::copy_nonoverlapping(left_bytes.as_ptr(), merged, left_bytes.len());
        core::ptr::copy_nonoverlapping(
            right_bytes.as_ptr(),
            merged.add(left_bytes.len()),
            right_bytes.len(),
        );
    }
    Term::tag_ptr(merged, Tag::String)
}

/// Half-open byte slice `[from, to)`. `to` is capped at the length; a slice
/// selecting no bytes is fatal, unlike list slicing.
pub fn slice(heap: &mut Heap, string: Term, from: u64, to: u64) -> Result<Term, VmError> {
    let content = bytes(string);
    let to = to.min(content.len() as u64);
    if from >= to {
        return Err(VmError::EmptyStringSlice);
    }
    Ok(from_bytes(heap, &content[from as usize..to as usize]))
}

/// Byte length as a term.
pub fn count(string: Term) -> Term {
    Term::int(bytes(string).len() as u64)
}

/// Substring test.
pub fn contains(haystack: Term, needle: Term) -> Term {
    let haystack = bytes(haystack);
    let needle = bytes(needle);
    if needle.is_empty() {
        return Term::TRUE;
    }
    if needle.len() > haystack.len() {
        return Term::FALSE;
    }
    Term::bool(haystack.windows(needle.len()).any(|window| window == needle))
}
