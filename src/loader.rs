//! Module loading.
//!
//! A module is a byte stream of instructions. The loader scans it one
//! instruction at a time, appending to the VM's single code buffer and
//! rewriting symbolic references: `Call`, `Capture` and `LoadString` carry
//! inline names which are interned down to 1-byte ids, and `PubFn` binds
//! the name that follows to the current end of the code buffer. Function
//! locations are therefore absolute offsets that stay meaningful across
//! later module loads.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use owl_asm::{Instruction, Opcode};
use owl_types::Term;
use tracing::debug;

use crate::error::VmError;
use crate::function::Function;
use crate::interpreter::Interpreter;
use crate::list;

struct Scanner<'a> {
    bytes: &'a [u8],
    index: usize,
}

impl<'a> Scanner<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Scanner { bytes, index: 0 }
    }

    fn has_next(&self) -> bool {
        self.index < self.bytes.len()
    }

    fn next(&mut self) -> Result<u8, VmError> {
        let byte = self
            .bytes
            .get(self.index)
            .copied()
            .ok_or(VmError::TruncatedModule { offset: self.index })?;
        self.index += 1;
        Ok(byte)
    }

    fn read(&mut self, len: usize) -> Result<&'a [u8], VmError> {
        let end = self.index + len;
        let chunk = self
            .bytes
            .get(self.index..end)
            .ok_or(VmError::TruncatedModule { offset: self.index })?;
        self.index = end;
        Ok(chunk)
    }

    /// A length-prefixed, NUL-terminated name.
    fn read_name(&mut self) -> Result<&'a str, VmError> {
        let offset = self.index;
        let len = self.next()? as usize;
        let raw = self.read(len)?;
        let trimmed = match raw.iter().position(|&b| b == 0) {
            Some(nul) => &raw[..nul],
            None => raw,
        };
        core::str::from_utf8(trimmed).map_err(|_| VmError::MalformedName { offset })
    }
}

impl Interpreter {
    /// Load one module stream, appending its code and registering its
    /// public functions. Returns the list of registered function names.
    pub fn load_module(&mut self, bytes: &[u8]) -> Result<Term, VmError> {
        let mut scanner = Scanner::new(bytes);
        let mut registered = self.heap.empty_list_term();
        let base = self.code.len();

        while scanner.has_next() {
            let byte = scanner.next()?;
            let op = Opcode::try_from(byte).map_err(|bad| VmError::UnknownOpcode {
                opcode: bad.0,
                ip: scanner.index - 1,
            })?;

            match op {
                Opcode::Return | Opcode::GcCollect => self.code.push(byte),
                Opcode::Exit
                | Opcode::Print
                | Opcode::FilePwd
                | Opcode::StoreTrue
                | Opcode::StoreFalse
                | Opcode::StoreNil
                | Opcode::Jmp => {
                    self.code.push(byte);
                    self.code.push(scanner.next()?);
                }
                Opcode::Mov
                | Opcode::FileLs
                | Opcode::Not
                | Opcode::ListCount
                | Opcode::StringCount
                | Opcode::CodeLoad
                | Opcode::Test
                | Opcode::ToString
                | Opcode::FunctionName => {
                    self.code.push(byte);
                    self.code.push(scanner.next()?);
                    self.code.push(scanner.next()?);
                }
                Opcode::TupleNth
                | Opcode::StoreInt
                | Opcode::Add
                | Opcode::Sub
                | Opcode::Eq
                | Opcode::NotEq
                | Opcode::GreaterThan
                | Opcode::ListNth
                | Opcode::Concat
                | Opcode::StringContains => {
                    self.code.push(byte);
                    self.code.push(scanner.next()?);
                    self.code.push(scanner.next()?);
                    self.code.push(scanner.next()?);
                }
                Opcode::ListSlice | Opcode::StringSlice => {
                    self.code.push(byte);
                    for _ in 0..4 {
                        self.code.push(scanner.next()?);
                    }
                }
                Opcode::Tuple | Opcode::List => {
                    self.code.push(byte);
                    self.code.push(scanner.next()?);
                    let size = scanner.next()?;
                    self.code.push(size);
                    for _ in 0..size {
                        self.code.push(scanner.next()?);
                    }
                }
                Opcode::LoadString => {
                    self.code.push(byte);
                    self.code.push(scanner.next()?);
                    let literal = scanner.read_name()?;
                    let id = self.strings.intern(literal)?;
                    self.code.push(id);
                }
                Opcode::Capture => {
                    self.code.push(byte);
                    self.code.push(scanner.next()?);
                    let name = scanner.read_name()?;
                    let id = self.function_names.intern(name)?;
                    self.code.push(id);
                }
                Opcode::PubFn => {
                    let name = scanner.read_name()?;
                    let id = self.function_names.intern(name)?;
                    let location = self.code.len() as u64;
                    let name_term = self.function_names.term(id).expect("just interned");

                    self.functions
                        .insert(id, Function::named(name_term, location));
                    registered = list::push(&mut self.heap, registered, name_term);
                }
                Opcode::Call => {
                    self.code.push(byte);
                    self.code.push(scanner.next()?);
                    let name = scanner.read_name()?;
                    let id = self.function_names.intern(name)?;
                    self.code.push(id);
                    let arity = scanner.next()?;
                    self.code.push(arity);
                    for _ in 0..arity {
                        self.code.push(scanner.next()?);
                    }
                }
                Opcode::CallLocal => {
                    self.code.push(byte);
                    self.code.push(scanner.next()?);
                    self.code.push(scanner.next()?);
                    let arity = scanner.next()?;
                    self.code.push(arity);
                    for _ in 0..arity {
                        self.code.push(scanner.next()?);
                    }
                }
                Opcode::AnonFn => {
                    self.code.push(byte);
                    self.code.push(scanner.next()?);
                    self.code.push(scanner.next()?);
                    self.code.push(scanner.next()?);
                    let n_upvalues = scanner.next()?;
                    self.code.push(n_upvalues);
                    for _ in 0..n_upvalues {
                        self.code.push(scanner.next()?);
                    }
                }
            }
        }

        debug!(
            bytes = self.code.len() - base,
            functions = list::count(registered),
            "module loaded"
        );
        Ok(registered)
    }

    /// Load a module by name from `OWL_LOAD_PATH`. A missing module is a
    /// silent no-op; the caller surfaces the unresolved function instead.
    pub fn load_module_by_name(&mut self, module: &str) -> Result<(), VmError> {
        let Some(path) = resolve_module_path(module) else {
            debug!(module, "module not found on OWL_LOAD_PATH");
            return Ok(());
        };
        let bytes = fs::read(&path).map_err(VmError::Io)?;
        debug!(module, path = %path.display(), "loading module");
        self.load_module(&bytes)?;
        Ok(())
    }

    /// Load a module file and invoke its entry point `<stem>.main`,
    /// returning the program's exit code.
    pub fn run_module_file(&mut self, path: &Path) -> Result<u8, VmError> {
        let bytes = fs::read(path).map_err(VmError::Io)?;
        self.load_module(&bytes)?;
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.run_function(&format!("{stem}.main"))
    }

    /// Invoke a registered function with no arguments and run to
    /// completion. The synthetic continuation is a default `Exit 0`, so a
    /// program that never executes its own `Exit` terminates cleanly.
    pub fn run_function(&mut self, name: &str) -> Result<u8, VmError> {
        let id = self
            .function_names
            .lookup(name)
            .ok_or_else(|| VmError::UnresolvedFunction(name.to_owned()))?;
        let function = self
            .functions
            .get(&id)
            .ok_or_else(|| VmError::UnresolvedFunction(name.to_owned()))?;
        let location = function.location;
        let function = Function::term(function);

        let halt = self.code.len();
        Instruction::Exit(0).encode(&mut self.code);

        let entry = self.current_frame + 1;
        self.frames[entry].ret_address = halt;
        self.frames[entry].ret_register = 0;
        self.frames[entry].function = function;
        self.current_frame = entry;
        self.ip = location as usize;
        self.run()
    }
}

/// Search the colon-separated `OWL_LOAD_PATH` for a file whose stem equals
/// the module name.
fn resolve_module_path(module: &str) -> Option<PathBuf> {
    let load_path = env::var("OWL_LOAD_PATH").ok()?;
    for dir in load_path.split(':').filter(|dir| !dir.is_empty()) {
        let Ok(entries) = fs::read_dir(dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let matches = path
                .file_stem()
                .map(|stem| stem.to_string_lossy() == module)
                .unwrap_or(false);
            if matches {
                return Some(path);
            }
        }
    }
    None
}
