//! The interpreter: frame stack, dispatch state, and opcode handlers.

use std::io::{self, Write};

use hashbrown::HashMap;
use owl_types::Term;

use crate::call::Frame;
use crate::consts::{DEFAULT_HEAP_SIZE, STACK_DEPTH};
use crate::function::Function;
use crate::heap::Heap;
use crate::interner::Interner;

mod alu;
mod builtins;
mod constructors;
mod executors;
mod flow;
mod internal;

/// The virtual machine.
///
/// Owns the frame stack, the appended code buffer, the intern pools, the
/// named-function table and the GC heap. The function table is a growable
/// map keyed by interned id; the 1-byte id encoding in the bytecode is the
/// only remaining limit on function counts.
pub struct Interpreter {
    pub(crate) frames: Box<[Frame]>,
    pub(crate) current_frame: usize,
    pub(crate) ip: usize,
    pub(crate) code: Vec<u8>,
    pub(crate) functions: HashMap<u8, Box<Function>>,
    pub(crate) function_names: Interner,
    pub(crate) strings: Interner,
    pub(crate) heap: Heap,
    pub(crate) output: Box<dyn Write>,
    /// Shared name term for closures.
    pub(crate) anon_name: Term,
}

impl Interpreter {
    /// A VM with the default arena size, printing to stdout.
    pub fn new() -> Self {
        Self::with_heap_size(DEFAULT_HEAP_SIZE)
    }

    /// A VM with an explicit arena size in bytes.
    pub fn with_heap_size(heap_size: usize) -> Self {
        let mut strings = Interner::new();
        let anon_id = strings.intern("anonymous").expect("fresh pool");
        let anon_name = strings.term(anon_id).expect("interned");

        Interpreter {
            frames: vec![Frame::default(); STACK_DEPTH].into_boxed_slice(),
            current_frame: 0,
            ip: 0,
            code: Vec::new(),
            functions: HashMap::new(),
            function_names: Interner::new(),
            strings,
            heap: Heap::new(heap_size),
            output: Box::new(io::stdout()),
            anon_name,
        }
    }

    /// Redirect `Print` output, e.g. into a buffer under test.
    pub fn with_output(mut self, output: Box<dyn Write>) -> Self {
        self.output = output;
        self
    }

    /// The GC heap.
    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    /// Registers of the current frame, for inspection in tests.
    pub fn registers(&self) -> &[Term] {
        &self.frames[self.current_frame].registers
    }

    /// Read one register of the current frame.
    pub fn register(&self, reg: owl_types::Reg) -> Term {
        self.frames[self.current_frame].registers[reg as usize]
    }

    /// Write one register of the current frame, e.g. to seed roots when
    /// driving the VM programmatically.
    pub fn set_register(&mut self, reg: owl_types::Reg, term: Term) {
        self.frames[self.current_frame].registers[reg as usize] = term;
    }

    /// Force a full collection from the current roots.
    pub fn collect_garbage(&mut self) {
        self.heap.collect(&mut self.frames, self.current_frame);
    }

    /// Collect when the reserve threshold is crossed. Called at the top of
    /// every function call; this is the only implicit collection point.
    pub(crate) fn gc_safepoint(&mut self) {
        if self.heap.should_collect() {
            self.heap.collect(&mut self.frames, self.current_frame);
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
