mod instruction;
mod opcode;
pub(crate) mod parser;

pub use instruction::{make, read_operands, read_u16_at, EncodeError, Instruction};
pub use opcode::{OpCode, OpCodeDefinition, OPCODE_WIDTH};
pub use parser::{Parser, ParseError, MAGIC, MAX_CONSTANT_DEPTH, VERSION_MAJOR};

use std::fmt::Write;
use crate::vm::Value;

/// Compiler output and VM input: packed instructions plus the constant pool
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bytecode {
    pub instructions: Vec<u8>,
    pub constants: Vec<Value>,
}

impl Bytecode {
    pub fn new(instructions: Vec<u8>, constants: Vec<Value>) -> Self {
        Self {
            instructions,
            constants,
        }
    }

    /// Decode the instruction stream into (offset, instruction) pairs,
    /// stopping at the first byte that does not decode
    pub fn decoded(&self) -> Vec<(usize, Instruction)> {
        let mut decoded = Vec::new();
        let mut offset = 0;
        while let Some((instruction, width)) = Instruction::decode(&self.instructions[offset..]) {
            decoded.push((offset, instruction));
            offset += width;
        }
        decoded
    }
}

/// Render instructions one per line as `0000 OpName op,op`
pub fn disassemble(instructions: &[u8]) -> String {
    let mut output = String::new();
    let mut offset = 0;
    while let Some((instruction, width)) = Instruction::decode(&instructions[offset..]) {
        // Writing into a String cannot fail
        let _ = writeln!(output, "{:04} {}", offset, instruction);
        offset += width;
    }
    output
}
