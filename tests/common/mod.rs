#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use owl_asm::Instruction;
use owl_vm::interpreter::Interpreter;

/// Capture buffer for `Print` output, cloneable so the test keeps a handle
/// after the VM takes one.
#[derive(Clone, Default)]
pub struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A VM with captured output and the module already loaded.
pub fn vm_with_module(heap_size: usize, program: &[Instruction]) -> (Interpreter, SharedBuf) {
    let out = SharedBuf::new();
    let mut vm = Interpreter::with_heap_size(heap_size).with_output(Box::new(out.clone()));
    vm.load_module(&Instruction::encode_all(program))
        .expect("module loads");
    (vm, out)
}

/// Load `program` and run `test.main`, returning the exit code and
/// everything printed.
pub fn run_program(heap_size: usize, program: &[Instruction]) -> (u8, String) {
    let (mut vm, out) = vm_with_module(heap_size, program);
    let code = vm.run_function("test.main").expect("program runs");
    (code, out.contents())
}
