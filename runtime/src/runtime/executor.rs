use std::sync::Arc;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};
use crate::vm::{VM, Value};
use crate::runtime::{RuntimeConfig, RuntimeResult};
use crate::bytecode::{disassemble, Bytecode, Parser};

/// The Runtime is the main entry point for using the bytecode VM
#[derive(Clone, Debug)]
pub struct Runtime {
    vm: VM,
    config: RuntimeConfig,
}

impl Runtime {
    /// Create a new runtime with default configuration
    pub fn new() -> RuntimeResult<Self> {
        Self::with_config(RuntimeConfig::default())
    }

    /// Create a new runtime with custom configuration
    pub fn with_config(config: RuntimeConfig) -> RuntimeResult<Self> {
        config.validate()?;

        let mut vm = VM::new();
        vm.set_stack_trace(config.stack_trace);
        vm.set_stack_limit(config.stack_limit);
        vm.set_global_capacity(config.global_capacity);

        Ok(Self { vm, config })
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Run a compiled program and return the last value it popped
    pub fn execute(&self, bytecode: Arc<Bytecode>) -> RuntimeResult<Value> {
        if self.config.debug_mode {
            debug!(
                constants = bytecode.constants.len(),
                bytes = bytecode.instructions.len(),
                "Loaded program"
            );
            debug!("\n{}", disassemble(&bytecode.instructions));
        }

        let result = self.vm.run(bytecode)?;
        info!(result = %result, "Execution completed");
        Ok(result)
    }

    /// Execute a bytecode file and return the result
    pub fn execute_file<P: AsRef<Path>>(&self, path: P) -> RuntimeResult<Value> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let bytecode = Parser::parse(&mut reader)?;

        if self.config.debug_mode {
            debug!(path = %path.display(), "Parsed bytecode file");
        }

        self.execute(Arc::new(bytecode))
    }
}
