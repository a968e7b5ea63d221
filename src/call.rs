//! Call frame representation.

use owl_types::{Reg, Term, REGISTER_COUNT};

/// One entry of the frame stack.
///
/// Frames are preallocated and reused: a call fills the next slot, a return
/// clears it. `function` is the term of the function executing in this
/// frame; the collector treats it as a root alongside the registers so the
/// upvalues of a live closure survive collection.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Instruction offset execution resumes at after this frame returns.
    pub ret_address: usize,
    /// Caller register receiving this frame's register 0 on return.
    pub ret_register: Reg,
    /// The executing function, or `Term::EMPTY` for the root frame.
    pub function: Term,
    /// The register window.
    pub registers: [Term; REGISTER_COUNT],
}

impl Default for Frame {
    fn default() -> Self {
        Frame {
            ret_address: 0,
            ret_register: 0,
            function: Term::EMPTY,
            registers: [Term::EMPTY; REGISTER_COUNT],
        }
    }
}

impl Frame {
    /// Reset the frame after a return so dead terms stop acting as GC roots.
    pub fn clear(&mut self) {
        self.ret_address = 0;
        self.ret_register = 0;
        self.function = Term::EMPTY;
        self.registers = [Term::EMPTY; REGISTER_COUNT];
    }
}
