//! Instructions that materialize terms: literals, tuples, lists, closures.

use owl_types::{Tag, Term};

use crate::error::VmError;
use crate::function;
use crate::list;
use crate::state::ExecuteState;

use super::Interpreter;

impl Interpreter {
    pub(crate) fn op_store_int(&mut self) -> Result<ExecuteState, VmError> {
        let dst = self.next_reg()?;
        let value = self.next_int()?;
        self.set_reg(dst, value)?;
        self.advance();
        Ok(ExecuteState::Proceed)
    }

    pub(crate) fn op_store_sentinel(&mut self, value: Term) -> Result<ExecuteState, VmError> {
        let dst = self.next_reg()?;
        self.set_reg(dst, value)?;
        self.advance();
        Ok(ExecuteState::Proceed)
    }

    /// Load a string literal interned at module-load time.
    pub(crate) fn op_load_string(&mut self) -> Result<ExecuteState, VmError> {
        let dst = self.next_reg()?;
        let id = self.next_byte()?;
        let literal = self
            .strings
            .term(id)
            .ok_or(VmError::CodeOutOfBounds { ip: self.ip })?;
        self.set_reg(dst, literal)?;
        self.advance();
        Ok(ExecuteState::Proceed)
    }

    /// Allocate a word array `[arity, e1, .., en]` and tag it as a tuple.
    pub(crate) fn op_tuple(&mut self) -> Result<ExecuteState, VmError> {
        let dst = self.next_reg()?;
        let size = self.next_byte()?;

        let words = self.heap.alloc((size as usize + 1) * 8) as *mut u64;
        // Safety: the allocation holds `size + 1` words.
        unsafe {
            *words = size as u64;
            for i in 1..=size as usize {
                let src = self.next_byte()?;
                *words.add(i) = self.get_var(src)?.raw();
            }
        }

        self.set_reg(dst, Term::tag_ptr(words as *const u8, Tag::Tuple))?;
        self.advance();
        Ok(ExecuteState::Proceed)
    }

    /// Build a list by pushing each source register onto the empty list.
    pub(crate) fn op_list(&mut self) -> Result<ExecuteState, VmError> {
        let dst = self.next_reg()?;
        let size = self.next_byte()?;

        let mut result = self.heap.empty_list_term();
        for _ in 0..size {
            let src = self.next_byte()?;
            let elem = self.get_var(src)?;
            result = list::push(&mut self.heap, result, elem);
        }

        self.set_reg(dst, result)?;
        self.advance();
        Ok(ExecuteState::Proceed)
    }

    /// Allocate a closure capturing the named registers by value, then
    /// skip the body: `jmp` is relative to the last operand byte, and the
    /// body starts right after it.
    pub(crate) fn op_anon_fn(&mut self) -> Result<ExecuteState, VmError> {
        let dst = self.next_reg()?;
        let jmp = self.next_byte()?;
        let _arity = self.next_byte()?;
        let n_upvalues = self.next_byte()?;

        let mut captured = Vec::with_capacity(n_upvalues as usize);
        for _ in 0..n_upvalues {
            let src = self.next_byte()?;
            captured.push(self.get_var(src)?);
        }

        let location = self.ip as u64 + 1;
        let fun = function::alloc_anon(&mut self.heap, location, self.anon_name, n_upvalues);
        // Safety: `alloc_anon` reserved `n_upvalues` upvalue slots.
        unsafe {
            function::upvalues_mut(fun).copy_from_slice(&captured);
        }

        self.set_reg(dst, Term::tag_ptr(fun as *const u8, Tag::Function))?;
        self.ip += jmp as usize;
        Ok(ExecuteState::Proceed)
    }
}
