// ABOUTME: A VM activation record: the running closure, instruction pointer, and base pointer

use crate::code::Instructions;
use crate::object::{CompiledFunction, Object};
use std::rc::Rc;

pub struct Frame {
    pub closure_func: Rc<CompiledFunction>,
    pub free: Vec<Rc<Object>>,
    pub ip: usize,
    pub base_pointer: usize,
}

impl Frame {
    /// `base_pointer` is the stack depth at which this call's locals begin
    /// (argument 0 occupies that slot).
    pub fn new(closure_func: Rc<CompiledFunction>, free: Vec<Rc<Object>>, base_pointer: usize) -> Self {
        Frame {
            closure_func,
            free,
            ip: 0,
            base_pointer,
        }
    }

    pub fn instructions(&self) -> &Instructions {
        &self.closure_func.instructions
    }
}
