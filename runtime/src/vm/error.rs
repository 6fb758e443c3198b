use thiserror::Error;

/// Error type for VM operations. Every variant is fatal to the run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VMError {
    #[error("Stack underflow")]
    StackUnderflow,

    #[error("Stack overflow: limit of {0} values reached")]
    StackOverflow(usize),

    #[error("Invalid program counter: {0}")]
    InvalidProgramCounter(usize),

    #[error("Invalid constant index: {0}")]
    InvalidConstantIndex(u16),

    #[error("Invalid global index: {0}")]
    InvalidGlobalIndex(u16),

    #[error("Unknown opcode 0x{byte:02X} at {position}")]
    UnknownOpcode { byte: u8, position: usize },

    #[error("Malformed instruction at {0}: operand bytes missing")]
    MalformedInstruction(usize),

    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Cannot negate value {value} of type {type_name}")]
    InvalidNegation { value: String, type_name: &'static str },

    #[error("Arithmetic error: {0}")]
    ArithmeticError(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Cannot set a global without a value on the stack")]
    MissingGlobalValue,

    #[error("Null is not a valid map key")]
    NullHashKey,

    #[error("Hash map needs key/value pairs, got {0} values")]
    OddHashMapCount(u16),

    #[error("Expected {expected} hash map entries on the stack, but there were only {found}")]
    HashMapUnderflow { expected: usize, found: usize },

    #[error("Array index key must be an Integer, but was {0}")]
    NonIntegerIndex(&'static str),

    #[error("Index operator not supported for {0}")]
    IndexNotSupported(&'static str),
}

/// Result type for VM operations
pub type VMResult<T> = Result<T, VMError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vm_error_stack_underflow_display() {
        assert_eq!(VMError::StackUnderflow.to_string(), "Stack underflow");
    }

    #[test]
    fn test_vm_error_invalid_program_counter_display() {
        let error = VMError::InvalidProgramCounter(42);
        assert_eq!(error.to_string(), "Invalid program counter: 42");
    }

    #[test]
    fn test_vm_error_invalid_constant_index_display() {
        let error = VMError::InvalidConstantIndex(10);
        assert_eq!(error.to_string(), "Invalid constant index: 10");
    }

    #[test]
    fn test_vm_error_unknown_opcode_display() {
        let error = VMError::UnknownOpcode { byte: 0xAB, position: 7 };
        assert_eq!(error.to_string(), "Unknown opcode 0xAB at 7");
    }

    #[test]
    fn test_vm_error_type_error_display() {
        let error = VMError::TypeError("Opcode OpAdd not supported for the types provided (BOOLEAN)".to_string());
        assert_eq!(
            error.to_string(),
            "Type error: Opcode OpAdd not supported for the types provided (BOOLEAN)"
        );
    }

    #[test]
    fn test_vm_error_negation_display() {
        let error = VMError::InvalidNegation { value: "true".to_string(), type_name: "BOOLEAN" };
        assert_eq!(error.to_string(), "Cannot negate value true of type BOOLEAN");
    }

    #[test]
    fn test_vm_error_global_and_map_messages() {
        assert_eq!(
            VMError::MissingGlobalValue.to_string(),
            "Cannot set a global without a value on the stack"
        );
        assert_eq!(VMError::NullHashKey.to_string(), "Null is not a valid map key");
        assert_eq!(
            VMError::HashMapUnderflow { expected: 2, found: 1 }.to_string(),
            "Expected 2 hash map entries on the stack, but there were only 1"
        );
    }

    #[test]
    fn test_vm_error_index_messages() {
        assert_eq!(
            VMError::NonIntegerIndex("STRING").to_string(),
            "Array index key must be an Integer, but was STRING"
        );
        assert_eq!(
            VMError::IndexNotSupported("INTEGER").to_string(),
            "Index operator not supported for INTEGER"
        );
    }

    #[test]
    fn test_vm_result_error() {
        let result: VMResult<i32> = Err(VMError::DivisionByZero);
        match result {
            Err(VMError::DivisionByZero) => {},
            _ => panic!("Expected DivisionByZero error"),
        }
    }

    #[test]
    fn test_vm_error_large_values() {
        let pc_error = VMError::InvalidProgramCounter(usize::MAX);
        let index_error = VMError::InvalidConstantIndex(u16::MAX);

        assert!(pc_error.to_string().contains(&usize::MAX.to_string()));
        assert!(index_error.to_string().contains(&u16::MAX.to_string()));
    }
}
