//! Runtime error variants.
//!
//! The VM has no user-level exception mechanism: everything here is fatal
//! and terminates execution. Non-fatal conditions (tuple or list index out
//! of range) return `nil` instead of erroring, and a missing module is a
//! silent no-op in the loader that surfaces later as
//! [`VmError::UnresolvedFunction`]. Arena exhaustion aborts the process
//! directly in the allocator and never reaches this type.

use std::io;

use thiserror::Error;

/// Fatal interpreter errors.
#[derive(Debug, Error)]
pub enum VmError {
    /// The dispatched byte does not name an opcode.
    #[error("unknown opcode {opcode:#04x} at ip {ip:#06x}")]
    UnknownOpcode {
        /// The offending byte.
        opcode: u8,
        /// Instruction pointer at dispatch time.
        ip: usize,
    },
    /// An operand fetch ran past the end of the code buffer.
    #[error("instruction stream ended unexpectedly at ip {ip:#06x}")]
    CodeOutOfBounds {
        /// Instruction pointer of the failed fetch.
        ip: usize,
    },
    /// A module stream ended in the middle of an instruction.
    #[error("module stream truncated at offset {offset}")]
    TruncatedModule {
        /// Offset of the failed read.
        offset: usize,
    },
    /// A symbolic name in a module is not valid UTF-8.
    #[error("malformed name in module stream at offset {offset}")]
    MalformedName {
        /// Offset of the name bytes.
        offset: usize,
    },
    /// The 1-byte id space for interned names is exhausted.
    #[error("name table exhausted: more than 255 interned names")]
    NameTableFull,
    /// A call target could not be resolved, even after module loading.
    #[error("unresolved function: {0}")]
    UnresolvedFunction(String),
    /// An operation was applied to a term of the wrong type.
    #[error("type error: expected {expected}, got {actual}")]
    TypeError {
        /// Type the operation requires.
        expected: &'static str,
        /// Type actually found.
        actual: &'static str,
    },
    /// String slices must select at least one byte.
    #[error("string slice must select at least one byte")]
    EmptyStringSlice,
    /// A register byte addressed neither the frame window nor a live
    /// upvalue.
    #[error("invalid register {reg:#04x}")]
    InvalidRegister {
        /// The offending register byte.
        reg: u8,
    },
    /// The frame stack is full.
    #[error("call stack exhausted ({depth} frames)")]
    StackOverflow {
        /// Configured stack depth.
        depth: usize,
    },
    /// A `Return` executed in the root frame; the stream is malformed.
    #[error("return without a caller frame at ip {ip:#06x}")]
    ReturnWithoutCaller {
        /// Instruction pointer of the return.
        ip: usize,
    },
    /// I/O failure while reading a module or writing output.
    #[error("unrecoverable error: {0}")]
    Io(#[from] io::Error),
}
