//! Calls, returns and process exit.

use owl_types::{Reg, Tag, Term};
use tracing::debug;

use crate::consts::STACK_DEPTH;
use crate::error::VmError;
use crate::function::{self, Function};
use crate::state::ExecuteState;
use crate::term;

use super::Interpreter;

impl Interpreter {
    /// Look up a function id, attempting module resolution on a miss.
    /// Returns the body location and the function term.
    pub(crate) fn resolve_function(&mut self, id: u8) -> Result<(u64, Term), VmError> {
        if !self.functions.contains_key(&id) {
            if let Some(name) = self.function_names.get(id).map(str::to_owned) {
                let module = name.split('.').next().unwrap_or(&name).to_owned();
                debug!(function = %name, module = %module, "resolving through module load");
                self.load_module_by_name(&module)?;
            }
        }
        match self.functions.get(&id) {
            Some(function) => Ok((function.location, Function::term(function))),
            None => {
                let name = self
                    .function_names
                    .get(id)
                    .unwrap_or("<unknown id>")
                    .to_owned();
                Err(VmError::UnresolvedFunction(name))
            }
        }
    }

    /// Copy `arity` argument registers into the next frame (registers
    /// `1..=arity`; register 0 is reserved for the return value), link the
    /// return address and jump to the body.
    fn push_frame(
        &mut self,
        ret_reg: Reg,
        location: u64,
        function: Term,
        arity: u8,
    ) -> Result<(), VmError> {
        if self.current_frame + 1 >= STACK_DEPTH {
            return Err(VmError::StackOverflow { depth: STACK_DEPTH });
        }
        let next = self.current_frame + 1;
        for i in 0..arity {
            let src = self.next_byte()?;
            let arg = self.get_var(src)?;
            self.frames[next].registers[i as usize + 1] = arg;
        }

        self.frames[next].ret_address = self.ip + 1;
        self.frames[next].ret_register = ret_reg;
        self.frames[next].function = function;
        self.current_frame = next;
        self.ip = location as usize;
        Ok(())
    }

    pub(crate) fn op_call(&mut self) -> Result<ExecuteState, VmError> {
        self.gc_safepoint();
        let ret_reg = self.next_reg()?;
        let id = self.next_byte()?;
        let arity = self.next_byte()?;
        let (location, function) = self.resolve_function(id)?;
        self.push_frame(ret_reg, location, function, arity)?;
        Ok(ExecuteState::Proceed)
    }

    /// Call a function value held in a register or upvalue.
    pub(crate) fn op_call_local(&mut self) -> Result<ExecuteState, VmError> {
        self.gc_safepoint();
        let ret_reg = self.next_reg()?;
        let fn_reg = self.next_byte()?;
        let arity = self.next_byte()?;

        let function = self.get_var(fn_reg)?;
        if function.is_sentinel() || function.tag() != Tag::Function {
            return Err(VmError::TypeError {
                expected: "Function",
                actual: term::type_name(function),
            });
        }
        let location = function::location(function);
        self.push_frame(ret_reg, location, function, arity)?;
        Ok(ExecuteState::Proceed)
    }

    /// Store a named function as a first-class value.
    pub(crate) fn op_capture(&mut self) -> Result<ExecuteState, VmError> {
        let dst = self.next_reg()?;
        let id = self.next_byte()?;
        let (_, function) = self.resolve_function(id)?;
        self.set_reg(dst, function)?;
        self.advance();
        Ok(ExecuteState::Proceed)
    }

    /// Deposit register 0 into the caller's return register, clear the
    /// dead frame so it stops rooting garbage, and resume the caller.
    pub(crate) fn op_return(&mut self) -> Result<ExecuteState, VmError> {
        if self.current_frame == 0 {
            return Err(VmError::ReturnWithoutCaller { ip: self.ip });
        }
        let result = self.frames[self.current_frame].registers[0];
        let ret_register = self.frames[self.current_frame].ret_register;
        let ret_address = self.frames[self.current_frame].ret_address;

        self.frames[self.current_frame].clear();
        self.current_frame -= 1;
        self.frames[self.current_frame].registers[ret_register as usize] = result;
        self.ip = ret_address;
        Ok(ExecuteState::Proceed)
    }

    pub(crate) fn op_exit(&mut self) -> Result<ExecuteState, VmError> {
        let code = self.next_byte()?;
        Ok(ExecuteState::Exit(code))
    }

    pub(crate) fn op_gc_collect(&mut self) -> Result<ExecuteState, VmError> {
        self.collect_garbage();
        self.advance();
        Ok(ExecuteState::Proceed)
    }
}
