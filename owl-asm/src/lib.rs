//! Bytecode primitives of the Owl VM.
//!
//! [`Opcode`] is the fieldless byte-level enumeration the interpreter
//! dispatches on. [`Instruction`] is the payload-carrying form used to
//! assemble module streams in the byte format the loader consumes.

mod instruction;
mod opcode;

pub use instruction::Instruction;
pub use opcode::{InvalidOpcode, Opcode};
