//! Operand fetch and register access.
//!
//! The fetch model mirrors the byte-at-a-time stream: `ip` rests on the
//! opcode byte during dispatch, each operand read advances it, and the
//! handler's tail moves it past the instruction.

use owl_types::{Reg, Term, REGISTER_COUNT, UPVALUE_BASE};

use crate::error::VmError;
use crate::function::{self, Function};

use super::Interpreter;

impl Interpreter {
    /// The opcode byte under `ip`.
    pub(crate) fn fetch(&self) -> Result<u8, VmError> {
        self.code
            .get(self.ip)
            .copied()
            .ok_or(VmError::CodeOutOfBounds { ip: self.ip })
    }

    /// Advance and read the next operand byte.
    pub(crate) fn next_byte(&mut self) -> Result<u8, VmError> {
        self.ip += 1;
        self.fetch()
    }

    /// Next operand byte, interpreted as a frame register.
    pub(crate) fn next_reg(&mut self) -> Result<Reg, VmError> {
        let reg = self.next_byte()?;
        if reg as usize >= REGISTER_COUNT {
            return Err(VmError::InvalidRegister { reg });
        }
        Ok(reg)
    }

    /// Two operand bytes as an unsigned 16-bit integer term, low byte
    /// first. Wider literals are not representable in the bytecode.
    pub(crate) fn next_int(&mut self) -> Result<Term, VmError> {
        let lo = self.next_byte()?;
        let hi = self.next_byte()?;
        Ok(Term::int(lo as u64 + 256 * hi as u64))
    }

    /// Step past the final operand onto the next instruction.
    pub(crate) fn advance(&mut self) {
        self.ip += 1;
    }

    /// Read a frame register.
    pub(crate) fn get_reg(&self, reg: Reg) -> Term {
        self.frames[self.current_frame].registers[reg as usize]
    }

    /// Read a register byte: the low half addresses the frame window, the
    /// high half the executing closure's upvalues (read-only).
    pub(crate) fn get_var(&self, reg: u8) -> Result<Term, VmError> {
        if reg < UPVALUE_BASE {
            return Ok(self.get_reg(reg));
        }
        let function = self.frames[self.current_frame].function;
        if function == Term::EMPTY {
            return Err(VmError::InvalidRegister { reg });
        }
        let fun = function.payload_ptr() as *const Function;
        // Safety: frame functions are live records rooted by the collector.
        let upvalues = unsafe { function::upvalues(fun) };
        upvalues
            .get((reg - UPVALUE_BASE) as usize)
            .copied()
            .ok_or(VmError::InvalidRegister { reg })
    }

    /// Write a frame register. Upvalues are not writable.
    pub(crate) fn set_reg(&mut self, reg: Reg, term: Term) -> Result<(), VmError> {
        if reg as usize >= REGISTER_COUNT {
            return Err(VmError::InvalidRegister { reg });
        }
        self.frames[self.current_frame].registers[reg as usize] = term;
        Ok(())
    }
}
