use std::fmt;
use byteorder::{BigEndian, ByteOrder};
use thiserror::Error;
use crate::bytecode::OpCode;
use crate::bytecode::opcode::OPCODE_WIDTH;

/// Raised when an instruction is built with the wrong operand count.
/// Internally generated code never hits this.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("{name} expects {expected} operand(s), got {found}")]
    OperandCountMismatch {
        name: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Represents a single bytecode instruction with its operands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: OpCode,
    pub operands: Vec<u16>,  // Constant indexes, jump targets, global slots, element counts
}

impl Instruction {
    pub fn new(opcode: OpCode) -> Self {
        Self {
            opcode,
            operands: Vec::new(),
        }
    }

    pub fn with_operand(mut self, operand: u16) -> Self {
        self.operands.push(operand);
        self
    }

    /// Decode the instruction starting at the front of `bytes`.
    ///
    /// Returns the instruction and the number of bytes it occupied, or `None`
    /// when `bytes` is empty, starts with an unknown opcode, or is truncated.
    pub fn decode(bytes: &[u8]) -> Option<(Instruction, usize)> {
        let opcode = OpCode::from_byte(*bytes.first()?)?;
        if bytes.len() < opcode.instruction_width() {
            return None;
        }
        let (operands, read) = read_operands(bytes);
        Some((Instruction { opcode, operands }, OPCODE_WIDTH + read))
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode.definition().name)?;
        for (i, operand) in self.operands.iter().enumerate() {
            let separator = if i == 0 { " " } else { "," };
            write!(f, "{}{}", separator, operand)?;
        }
        Ok(())
    }
}

/// Encode `opcode` with `operands` into a fresh byte vector
pub fn make(opcode: OpCode, operands: &[u16]) -> Result<Vec<u8>, EncodeError> {
    let definition = opcode.definition();
    if definition.operand_widths.len() != operands.len() {
        return Err(EncodeError::OperandCountMismatch {
            name: definition.name,
            expected: definition.operand_widths.len(),
            found: operands.len(),
        });
    }

    let mut bytes = vec![0u8; opcode.instruction_width()];
    bytes[0] = opcode.to_byte();
    let mut offset = OPCODE_WIDTH;
    for (operand, width) in operands.iter().zip(definition.operand_widths) {
        if *width == 2 {
            BigEndian::write_u16(&mut bytes[offset..offset + 2], *operand);
        }
        offset += width;
    }
    Ok(bytes)
}

/// Read the operands of the instruction at the front of `instruction`.
///
/// Returns the operand values and the number of operand bytes consumed (the
/// opcode byte is not counted). An empty slice, an unknown opcode or a
/// truncated operand yields no operands and zero bytes.
pub fn read_operands(instruction: &[u8]) -> (Vec<u16>, usize) {
    let Some(opcode) = instruction.first().and_then(|byte| OpCode::from_byte(*byte)) else {
        return (Vec::new(), 0);
    };

    let definition = opcode.definition();
    if instruction.len() < OPCODE_WIDTH + definition.operand_bytes() {
        return (Vec::new(), 0);
    }

    let mut operands = Vec::with_capacity(definition.operand_widths.len());
    let mut offset = OPCODE_WIDTH;
    for width in definition.operand_widths {
        if *width == 2 {
            operands.push(BigEndian::read_u16(&instruction[offset..offset + 2]));
        }
        offset += width;
    }
    (operands, offset - OPCODE_WIDTH)
}

/// Read the single u16 operand of the instruction at `position` in `code`
pub fn read_u16_at(code: &[u8], position: usize) -> Option<u16> {
    let start = position + OPCODE_WIDTH;
    code.get(start..start + 2).map(BigEndian::read_u16)
}
