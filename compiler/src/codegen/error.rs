use std::fmt;
use monkey::bytecode::EncodeError;

/// One reason a compilation failed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error("Node not supported: {0}")]
    UnsupportedNode(&'static str),

    #[error("Operator not supported: {0}")]
    UnsupportedInfixOperator(String),

    #[error("Prefix operator {0} not supported")]
    UnsupportedPrefixOperator(String),

    #[error("Identifier {0} is not bound")]
    UnboundIdentifier(String),

    #[error("Constant pool is full ({0} entries)")]
    TooManyConstants(usize),

    #[error("Global scope is full ({0} slots)")]
    TooManyGlobals(usize),

    #[error("{kind} has {count} entries, more than an operand can address")]
    OperandOverflow { kind: &'static str, count: usize },

    #[error("Jump target {0} is out of range")]
    JumpOutOfRange(usize),

    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodeError),
}

/// Failed compilation: the reasons collected before the compiler stopped
#[derive(Debug, Clone, PartialEq)]
pub struct CompileFailure {
    pub reasons: Vec<CompileError>,
}

impl From<CompileError> for CompileFailure {
    fn from(error: CompileError) -> Self {
        Self { reasons: vec![error] }
    }
}

impl fmt::Display for CompileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reasons: Vec<String> = self.reasons.iter().map(|r| r.to_string()).collect();
        write!(f, "Compilation failed: {}", reasons.join("; "))
    }
}

impl std::error::Error for CompileFailure {}
