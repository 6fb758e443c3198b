//! Runtime configuration options

use crate::runtime::{RuntimeError, RuntimeResult};
use crate::vm::{DEFAULT_GLOBAL_CAPACITY, DEFAULT_STACK_LIMIT};

/// Configuration options for the Monkey runtime
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub debug_mode: bool,
    pub stack_trace: bool,
    pub global_capacity: usize,
    pub stack_limit: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            debug_mode: false,
            stack_trace: false,
            global_capacity: DEFAULT_GLOBAL_CAPACITY,
            stack_limit: DEFAULT_STACK_LIMIT,
        }
    }
}

impl RuntimeConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable debug mode
    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    /// Enable or disable stack trace
    pub fn with_stack_trace(mut self, stack_trace: bool) -> Self {
        self.stack_trace = stack_trace;
        self
    }

    /// Set the number of addressable global slots
    pub fn with_global_capacity(mut self, capacity: usize) -> Self {
        self.global_capacity = capacity;
        self
    }

    /// Set the maximum operand stack depth
    pub fn with_stack_limit(mut self, limit: usize) -> Self {
        self.stack_limit = limit;
        self
    }

    pub fn validate(&self) -> RuntimeResult<()> {
        if self.global_capacity == 0 {
            return Err(RuntimeError::ConfigError("global capacity must be at least 1".to_string()));
        }
        if self.stack_limit == 0 {
            return Err(RuntimeError::ConfigError("stack limit must be at least 1".to_string()));
        }
        Ok(())
    }
}
