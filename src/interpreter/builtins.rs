//! Library instructions over terms: printing, strings, lists, tuples,
//! files, runtime code loading.

use std::env;
use std::fs;
use std::io::Write;

use owl_types::{Tag, Term};

use crate::error::VmError;
use crate::function;
use crate::list;
use crate::state::ExecuteState;
use crate::string;
use crate::term;

use super::Interpreter;

impl Interpreter {
    fn expect_tag(&self, value: Term, tag: Tag) -> Result<Term, VmError> {
        if value.is_sentinel() || value.tag() != tag {
            return Err(VmError::TypeError {
                expected: tag.name(),
                actual: term::type_name(value),
            });
        }
        Ok(value)
    }

    pub(crate) fn op_print(&mut self) -> Result<ExecuteState, VmError> {
        let src = self.next_byte()?;
        let rendered = term::render(self.get_var(src)?);
        writeln!(self.output, "{rendered}").map_err(VmError::Io)?;
        self.advance();
        Ok(ExecuteState::Proceed)
    }

    pub(crate) fn op_to_string(&mut self) -> Result<ExecuteState, VmError> {
        let dst = self.next_reg()?;
        let src = self.next_byte()?;
        let value = self.get_var(src)?;
        let converted = term::to_string(&mut self.heap, value);
        self.set_reg(dst, converted)?;
        self.advance();
        Ok(ExecuteState::Proceed)
    }

    pub(crate) fn op_concat(&mut self) -> Result<ExecuteState, VmError> {
        let dst = self.next_reg()?;
        let left = self.next_byte()?;
        let right = self.next_byte()?;
        let left = self.get_var(left)?;
        let right = self.get_var(right)?;
        let joined = term::concat(&mut self.heap, left, right)?;
        self.set_reg(dst, joined)?;
        self.advance();
        Ok(ExecuteState::Proceed)
    }

    pub(crate) fn op_tuple_nth(&mut self) -> Result<ExecuteState, VmError> {
        let dst = self.next_reg()?;
        let tuple = self.next_byte()?;
        let index = self.next_byte()?;
        let tuple = self.expect_tag(self.get_var(tuple)?, Tag::Tuple)?;
        let index = self.get_var(index)?.as_int();
        self.set_reg(dst, term::tuple_nth(tuple, index))?;
        self.advance();
        Ok(ExecuteState::Proceed)
    }

    pub(crate) fn op_list_nth(&mut self) -> Result<ExecuteState, VmError> {
        let dst = self.next_reg()?;
        let target = self.next_byte()?;
        let index = self.next_byte()?;
        let target = self.expect_tag(self.get_var(target)?, Tag::List)?;
        let index = self.get_var(index)?.as_int();
        self.set_reg(dst, list::nth(target, index))?;
        self.advance();
        Ok(ExecuteState::Proceed)
    }

    pub(crate) fn op_list_count(&mut self) -> Result<ExecuteState, VmError> {
        let dst = self.next_reg()?;
        let target = self.next_byte()?;
        let target = self.expect_tag(self.get_var(target)?, Tag::List)?;
        self.set_reg(dst, Term::int(list::count(target)))?;
        self.advance();
        Ok(ExecuteState::Proceed)
    }

    pub(crate) fn op_list_slice(&mut self) -> Result<ExecuteState, VmError> {
        let dst = self.next_reg()?;
        let target = self.next_byte()?;
        let from = self.next_byte()?;
        let to = self.next_byte()?;
        let target = self.expect_tag(self.get_var(target)?, Tag::List)?;
        let from = self.get_var(from)?.as_int();
        let to = self.get_var(to)?.as_int();
        let sliced = list::slice(&mut self.heap, target, from, to);
        self.set_reg(dst, sliced)?;
        self.advance();
        Ok(ExecuteState::Proceed)
    }

    pub(crate) fn op_string_slice(&mut self) -> Result<ExecuteState, VmError> {
        let dst = self.next_reg()?;
        let target = self.next_byte()?;
        let from = self.next_byte()?;
        let to = self.next_byte()?;
        let target = self.expect_tag(self.get_var(target)?, Tag::String)?;
        let from = self.get_var(from)?.as_int();
        let to = self.get_var(to)?.as_int();
        let sliced = string::slice(&mut self.heap, target, from, to)?;
        self.set_reg(dst, sliced)?;
        self.advance();
        Ok(ExecuteState::Proceed)
    }

    pub(crate) fn op_string_count(&mut self) -> Result<ExecuteState, VmError> {
        let dst = self.next_reg()?;
        let target = self.next_byte()?;
        let target = self.expect_tag(self.get_var(target)?, Tag::String)?;
        self.set_reg(dst, string::count(target))?;
        self.advance();
        Ok(ExecuteState::Proceed)
    }

    pub(crate) fn op_string_contains(&mut self) -> Result<ExecuteState, VmError> {
        let dst = self.next_reg()?;
        let haystack = self.next_byte()?;
        let needle = self.next_byte()?;
        let haystack = self.expect_tag(self.get_var(haystack)?, Tag::String)?;
        let needle = self.expect_tag(self.get_var(needle)?, Tag::String)?;
        self.set_reg(dst, string::contains(haystack, needle))?;
        self.advance();
        Ok(ExecuteState::Proceed)
    }

    pub(crate) fn op_function_name(&mut self) -> Result<ExecuteState, VmError> {
        let dst = self.next_reg()?;
        let src = self.next_byte()?;
        let function = self.expect_tag(self.get_var(src)?, Tag::Function)?;
        self.set_reg(dst, function::name(function))?;
        self.advance();
        Ok(ExecuteState::Proceed)
    }

    pub(crate) fn op_file_pwd(&mut self) -> Result<ExecuteState, VmError> {
        let dst = self.next_reg()?;
        let cwd = env::current_dir().map_err(VmError::Io)?;
        let cwd = string::from_str(&mut self.heap, &cwd.to_string_lossy());
        self.set_reg(dst, cwd)?;
        self.advance();
        Ok(ExecuteState::Proceed)
    }

    /// Directory entries as a list of name strings. An unreadable
    /// directory yields the empty list.
    pub(crate) fn op_file_ls(&mut self) -> Result<ExecuteState, VmError> {
        let dst = self.next_reg()?;
        let path = self.next_byte()?;
        let path = self.expect_tag(self.get_var(path)?, Tag::String)?;
        let path = String::from_utf8_lossy(string::bytes(path)).into_owned();

        let mut entries = self.heap.empty_list_term();
        if let Ok(dir) = fs::read_dir(path) {
            for entry in dir.flatten() {
                let name = entry.file_name();
                let name = string::from_str(&mut self.heap, &name.to_string_lossy());
                entries = list::push(&mut self.heap, entries, name);
            }
        }

        self.set_reg(dst, entries)?;
        self.advance();
        Ok(ExecuteState::Proceed)
    }

    /// Load a bytecode module file at runtime; the result is the list of
    /// function names the module registered.
    pub(crate) fn op_code_load(&mut self) -> Result<ExecuteState, VmError> {
        let dst = self.next_reg()?;
        let path = self.next_byte()?;
        let path = self.expect_tag(self.get_var(path)?, Tag::String)?;
        let path = String::from_utf8_lossy(string::bytes(path)).into_owned();

        let bytes = fs::read(path).map_err(VmError::Io)?;
        let registered = self.load_module(&bytes)?;
        self.set_reg(dst, registered)?;
        self.advance();
        Ok(ExecuteState::Proceed)
    }
}
