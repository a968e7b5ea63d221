//! The dispatch loop.

use owl_asm::Opcode;
use tracing::trace;

use crate::error::VmError;
use crate::state::ExecuteState;

use super::Interpreter;

impl Interpreter {
    /// Run until an `Exit` instruction and return its code.
    pub fn run(&mut self) -> Result<u8, VmError> {
        loop {
            match self.step()? {
                ExecuteState::Proceed => (),
                ExecuteState::Exit(code) => return Ok(code),
            }
        }
    }

    /// Fetch, decode and execute one instruction.
    pub fn step(&mut self) -> Result<ExecuteState, VmError> {
        let byte = self.fetch()?;
        let op = Opcode::try_from(byte).map_err(|bad| VmError::UnknownOpcode {
            opcode: bad.0,
            ip: self.ip,
        })?;
        trace!(ip = self.ip, %op, "dispatch");

        match op {
            Opcode::Exit => self.op_exit(),
            Opcode::StoreInt => self.op_store_int(),
            Opcode::Print => self.op_print(),
            Opcode::Add => self.op_add(),
            Opcode::Sub => self.op_sub(),
            Opcode::Call => self.op_call(),
            Opcode::Return => self.op_return(),
            Opcode::Mov => self.op_mov(),
            Opcode::Jmp => self.op_jmp(),
            Opcode::Tuple => self.op_tuple(),
            Opcode::TupleNth => self.op_tuple_nth(),
            Opcode::List => self.op_list(),
            Opcode::StoreTrue => self.op_store_sentinel(owl_types::Term::TRUE),
            Opcode::StoreFalse => self.op_store_sentinel(owl_types::Term::FALSE),
            Opcode::StoreNil => self.op_store_sentinel(owl_types::Term::NIL),
            Opcode::Test => self.op_test(),
            Opcode::Eq => self.op_eq(),
            Opcode::NotEq => self.op_not_eq(),
            Opcode::Not => self.op_not(),
            Opcode::GreaterThan => self.op_greater_than(),
            Opcode::LoadString => self.op_load_string(),
            Opcode::FilePwd => self.op_file_pwd(),
            Opcode::FileLs => self.op_file_ls(),
            Opcode::Concat => self.op_concat(),
            Opcode::Capture => self.op_capture(),
            Opcode::CallLocal => self.op_call_local(),
            Opcode::ListNth => self.op_list_nth(),
            Opcode::ListCount => self.op_list_count(),
            Opcode::ListSlice => self.op_list_slice(),
            Opcode::StringSlice => self.op_string_slice(),
            Opcode::CodeLoad => self.op_code_load(),
            Opcode::FunctionName => self.op_function_name(),
            Opcode::StringCount => self.op_string_count(),
            Opcode::StringContains => self.op_string_contains(),
            Opcode::ToString => self.op_to_string(),
            Opcode::AnonFn => self.op_anon_fn(),
            Opcode::GcCollect => self.op_gc_collect(),
            // Load-time marker; the loader never emits it into the code
            // buffer.
            Opcode::PubFn => Err(VmError::UnknownOpcode {
                opcode: byte,
                ip: self.ip,
            }),
        }
    }
}
