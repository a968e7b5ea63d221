//! Intern pools for function names and string literals.
//!
//! The module wire format refers to interned entries by 1-byte id; more
//! than 255 entries is a load error. Entries are stored NUL-terminated in
//! 8-aligned buffers with stable addresses, so a pool entry can be handed
//! out directly as a string term: the collector recognizes the address as
//! out-of-arena and never moves it.

use hashbrown::HashMap;
use owl_types::{Tag, Term};

use crate::error::VmError;

/// A NUL-terminated byte buffer backed by `u64` words for alignment.
struct PoolEntry {
    words: Box<[u64]>,
    len: usize,
}

impl PoolEntry {
    fn new(text: &str) -> Self {
        let len = text.len();
        let mut words = vec![0u64; len / 8 + 1].into_boxed_slice();
        // Safety: the word buffer holds at least `len + 1` bytes and is
        // zeroed, so the terminator is in place.
        unsafe {
            core::ptr::copy_nonoverlapping(
                text.as_ptr(),
                words.as_mut_ptr() as *mut u8,
                len,
            );
        }
        PoolEntry { words, len }
    }

    fn as_str(&self) -> &str {
        let bytes = unsafe {
            core::slice::from_raw_parts(self.words.as_ptr() as *const u8, self.len)
        };
        // Entries are only created from &str.
        core::str::from_utf8(bytes).expect("pool entry is UTF-8")
    }

    fn term(&self) -> Term {
        Term::tag_ptr(self.words.as_ptr() as *const u8, Tag::String)
    }
}

/// String-to-id pool with stable reverse lookup.
#[derive(Default)]
pub struct Interner {
    ids: HashMap<String, u8>,
    entries: Vec<PoolEntry>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `text`, returning its id. Idempotent.
    pub fn intern(&mut self, text: &str) -> Result<u8, VmError> {
        if let Some(&id) = self.ids.get(text) {
            return Ok(id);
        }
        if self.entries.len() > u8::MAX as usize {
            return Err(VmError::NameTableFull);
        }
        let id = self.entries.len() as u8;
        self.entries.push(PoolEntry::new(text));
        self.ids.insert(text.to_owned(), id);
        Ok(id)
    }

    /// Id of an already-interned string.
    pub fn lookup(&self, text: &str) -> Option<u8> {
        self.ids.get(text).copied()
    }

    /// Text of an id.
    pub fn get(&self, id: u8) -> Option<&str> {
        self.entries.get(id as usize).map(PoolEntry::as_str)
    }

    /// String term pointing at the pooled buffer.
    pub fn term(&self, id: u8) -> Option<Term> {
        self.entries.get(id as usize).map(PoolEntry::term)
    }

    /// Number of interned entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::string;

    #[test]
    fn interning_is_idempotent() {
        let mut pool = Interner::new();
        let a = pool.intern("mod.main").unwrap();
        let b = pool.intern("mod.other").unwrap();
        let a2 = pool.intern("mod.main").unwrap();
        assert_eq!(a, a2);
        assert_ne!(a, b);
        assert_eq!(pool.get(a), Some("mod.main"));
        assert_eq!(pool.lookup("mod.other"), Some(b));
    }

    #[test]
    fn pooled_terms_are_aligned_nul_terminated_strings() {
        let mut pool = Interner::new();
        let id = pool.intern("hello").unwrap();
        let term = pool.term(id).unwrap();
        assert_eq!(term.payload_ptr() as usize % 8, 0);
        assert_eq!(string::bytes(term), b"hello");
    }

    #[test]
    fn pool_overflows_at_256_entries() {
        let mut pool = Interner::new();
        for i in 0..256 {
            pool.intern(&format!("name{i}")).unwrap();
        }
        assert!(matches!(
            pool.intern("one-too-many"),
            Err(VmError::NameTableFull)
        ));
    }
}
