//! Atomic term representation of the Owl VM.
//!
//! Every runtime value is a [`Term`]: a 64-bit word whose low 3 bits carry a
//! [`Tag`] and whose upper 61 bits carry the payload, a small integer or a
//! heap address. Heap addresses are at least 8-byte aligned, which is what
//! frees the tag bits.

mod term;

pub use term::{Tag, Term, UnknownTag};

/// Register index inside an instruction.
pub type Reg = u8;

/// Size of the per-frame register window. Register bytes at or above this
/// value address the executing closure's upvalues instead.
pub const REGISTER_COUNT: usize = 128;

/// First register byte that aliases an upvalue rather than a frame register.
pub const UPVALUE_BASE: Reg = REGISTER_COUNT as Reg;
