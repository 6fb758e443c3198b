use std::sync::Arc;
use tracing::{error, trace};
use crate::bytecode::{read_u16_at, Bytecode, OpCode};
use crate::vm::{GlobalScope, Value, VMError, VMResult};

/// Default maximum operand stack depth
pub const DEFAULT_STACK_LIMIT: usize = 2048;

/// The execution context for one run of a program
pub struct ExecutionContext {
    bytecode: Arc<Bytecode>,
    pc: usize,
    stack: Vec<Value>,
    stack_limit: usize,
    globals: GlobalScope,
    last_popped: Option<Value>,
    stack_trace_enabled: bool,
}

impl ExecutionContext {
    pub fn new(bytecode: Arc<Bytecode>) -> Self {
        Self::with_globals(bytecode, GlobalScope::new())
    }

    pub fn with_globals(bytecode: Arc<Bytecode>, globals: GlobalScope) -> Self {
        Self {
            bytecode,
            pc: 0,
            stack: Vec::with_capacity(256),
            stack_limit: DEFAULT_STACK_LIMIT,
            globals,
            last_popped: None,
            stack_trace_enabled: false,
        }
    }

    /// Get the loaded program
    pub fn bytecode(&self) -> &Bytecode {
        &self.bytecode
    }

    /// Get the current program counter
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Set the program counter
    pub fn set_pc(&mut self, pc: usize) {
        self.pc = pc;
    }

    /// Jump to `target`; the end of the stream is a valid target and halts
    pub fn jump(&mut self, target: u16) -> VMResult<()> {
        let target = target as usize;
        if target > self.bytecode.instructions.len() {
            return Err(VMError::InvalidProgramCounter(target));
        }
        if self.stack_trace_enabled {
            trace!(from = self.pc, to = target, "JUMP");
        }
        self.pc = target;
        Ok(())
    }

    /// Check if there are more instructions to execute
    pub fn has_more_instructions(&self) -> bool {
        self.pc < self.bytecode.instructions.len()
    }

    /// Decode the opcode at the program counter
    pub fn current_opcode(&self) -> VMResult<OpCode> {
        let byte = *self
            .bytecode
            .instructions
            .get(self.pc)
            .ok_or(VMError::InvalidProgramCounter(self.pc))?;
        OpCode::from_byte(byte).ok_or(VMError::UnknownOpcode { byte, position: self.pc })
    }

    /// Read the u16 operand of the instruction at the program counter
    pub fn read_operand(&self) -> VMResult<u16> {
        read_u16_at(&self.bytecode.instructions, self.pc)
            .ok_or(VMError::MalformedInstruction(self.pc))
    }

    /// Push a value onto the stack
    pub fn push(&mut self, value: Value) -> VMResult<()> {
        if self.stack.len() >= self.stack_limit {
            return Err(VMError::StackOverflow(self.stack_limit));
        }
        if self.stack_trace_enabled {
            trace!(value = %value, "PUSH");
        }
        self.stack.push(value);
        Ok(())
    }

    /// Pop a value from the stack, remembering it as the last popped value
    pub fn pop(&mut self) -> VMResult<Value> {
        match self.stack.pop() {
            Some(value) => {
                if self.stack_trace_enabled {
                    trace!(value = %value, "POP");
                }
                self.last_popped = Some(value.clone());
                Ok(value)
            },
            None => {
                error!(pc = self.pc, "Stack underflow");
                Err(VMError::StackUnderflow)
            }
        }
    }

    /// Remove the top `count` values, returned bottom-first.
    ///
    /// Values come off top first, so the bottom one is the last popped.
    pub fn pop_many(&mut self, count: usize) -> Option<Vec<Value>> {
        let start = self.stack.len().checked_sub(count)?;
        let values = self.stack.split_off(start);
        if let Some(bottom) = values.first() {
            self.last_popped = Some(bottom.clone());
        }
        Some(values)
    }

    /// Peek at the top value on the stack without removing it
    pub fn peek(&self) -> VMResult<&Value> {
        self.stack.last().ok_or(VMError::StackUnderflow)
    }

    /// Most recently popped value
    pub fn last_popped(&self) -> Option<&Value> {
        self.last_popped.as_ref()
    }

    pub fn take_last_popped(&mut self) -> Option<Value> {
        self.last_popped.take()
    }

    /// Get the constant at the specified index
    pub fn get_constant(&self, index: u16) -> VMResult<Value> {
        self.bytecode
            .constants
            .get(index as usize)
            .cloned()
            .ok_or(VMError::InvalidConstantIndex(index))
    }

    pub fn set_global(&mut self, index: u16, value: Value) -> VMResult<()> {
        if self.stack_trace_enabled {
            trace!(index, value = %value, "SET GLOBAL");
        }
        self.globals.set(index, value)
    }

    pub fn get_global(&self, index: u16) -> VMResult<Value> {
        let value = self.globals.get(index)?;
        if self.stack_trace_enabled {
            trace!(index, value = %value, "GET GLOBAL");
        }
        Ok(value)
    }

    /// Hand the global slots back once execution is over
    pub fn into_globals(self) -> GlobalScope {
        self.globals
    }

    pub fn set_stack_limit(&mut self, limit: usize) {
        self.stack_limit = limit;
    }

    /// Enable or disable stack trace debugging
    pub fn set_stack_trace(&mut self, enabled: bool) {
        self.stack_trace_enabled = enabled;
    }

    /// Get the current stack depth
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Log the current stack, top first
    pub fn print_stack(&self) {
        trace!(depth = self.stack.len(), "STACK");
        for (i, value) in self.stack.iter().enumerate().rev() {
            trace!("{}: {}", i, value);
        }
    }
}
