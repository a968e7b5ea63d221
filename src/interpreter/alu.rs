//! Register-to-register instructions: arithmetic, comparison, moves and
//! relative jumps.

use owl_types::Term;

use crate::error::VmError;
use crate::state::ExecuteState;
use crate::term;

use super::Interpreter;

impl Interpreter {
    /// Shared shape of the three-operand instructions: read two sources,
    /// combine, write the destination.
    fn binary_op<F>(&mut self, combine: F) -> Result<ExecuteState, VmError>
    where
        F: FnOnce(Term, Term) -> Term,
    {
        let dst = self.next_reg()?;
        let left = self.next_byte()?;
        let right = self.next_byte()?;
        let result = combine(self.get_var(left)?, self.get_var(right)?);
        self.set_reg(dst, result)?;
        self.advance();
        Ok(ExecuteState::Proceed)
    }

    pub(crate) fn op_add(&mut self) -> Result<ExecuteState, VmError> {
        self.binary_op(|a, b| Term::int(a.as_int().wrapping_add(b.as_int())))
    }

    pub(crate) fn op_sub(&mut self) -> Result<ExecuteState, VmError> {
        self.binary_op(|a, b| Term::int(a.as_int().wrapping_sub(b.as_int())))
    }

    pub(crate) fn op_eq(&mut self) -> Result<ExecuteState, VmError> {
        self.binary_op(|a, b| Term::bool(term::terms_eq(a, b)))
    }

    pub(crate) fn op_not_eq(&mut self) -> Result<ExecuteState, VmError> {
        self.binary_op(|a, b| Term::bool(!term::terms_eq(a, b)))
    }

    pub(crate) fn op_greater_than(&mut self) -> Result<ExecuteState, VmError> {
        self.binary_op(|a, b| Term::bool(a.as_int() > b.as_int()))
    }

    pub(crate) fn op_not(&mut self) -> Result<ExecuteState, VmError> {
        let dst = self.next_reg()?;
        let src = self.next_byte()?;
        let negated = self.get_var(src)?.negate();
        self.set_reg(dst, negated)?;
        self.advance();
        Ok(ExecuteState::Proceed)
    }

    pub(crate) fn op_mov(&mut self) -> Result<ExecuteState, VmError> {
        let dst = self.next_reg()?;
        let src = self.next_byte()?;
        let value = self.get_var(src)?;
        self.set_reg(dst, value)?;
        self.advance();
        Ok(ExecuteState::Proceed)
    }

    /// Conditional relative jump: truthy takes the offset, falsy falls
    /// through to the next instruction. The offset byte is signed, so
    /// loops jump backwards.
    pub(crate) fn op_test(&mut self) -> Result<ExecuteState, VmError> {
        let reg = self.next_byte()?;
        let offset = self.next_byte()? as i8;
        if self.get_var(reg)?.truthy() {
            self.ip = self.ip.wrapping_add_signed(offset as isize);
        } else {
            self.advance();
        }
        Ok(ExecuteState::Proceed)
    }

    pub(crate) fn op_jmp(&mut self) -> Result<ExecuteState, VmError> {
        let offset = self.next_byte()? as i8;
        self.ip = self.ip.wrapping_add_signed(offset as isize);
        Ok(ExecuteState::Proceed)
    }
}
