mod interpreter;
mod execution_context;
mod value;
mod error;
mod hash_map;
mod globals;
pub mod operators;

pub use interpreter::VM;
pub use execution_context::{ExecutionContext, DEFAULT_STACK_LIMIT};
pub use value::{ObjectType, Value, FALSE, NULL, TRUE};
pub use error::{VMError, VMResult};
pub use hash_map::{HashMapObject, DEFAULT_BUCKETS};
pub use globals::{GlobalScope, DEFAULT_GLOBAL_CAPACITY};
