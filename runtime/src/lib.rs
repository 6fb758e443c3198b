// Monkey - A stack-machine bytecode runtime for the Monkey expression language

pub mod bytecode;
pub mod vm;
pub mod runtime;
pub mod utils;

pub use bytecode::{Bytecode, Instruction, OpCode};
pub use vm::{VM, ExecutionContext, Value};
pub use runtime::Runtime;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
