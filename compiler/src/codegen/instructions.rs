use monkey::bytecode::{make, OpCode};
use crate::codegen::CompileError;

/// Where an emitted instruction starts and what it was
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmittedInstruction {
    pub opcode: OpCode,
    pub position: usize,
}

/// Growable buffer of encoded instructions.
///
/// Tracks the last two appended instructions so the most recent one can
/// be inspected or removed again.
#[derive(Debug, Clone, Default)]
pub struct InstructionStream {
    bytes: Vec<u8>,
    last: Option<EmittedInstruction>,
    previous: Option<EmittedInstruction>,
}

impl InstructionStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an encoded instruction and return the offset it starts at
    pub fn append(&mut self, opcode: OpCode, operands: &[u16]) -> Result<usize, CompileError> {
        let encoded = make(opcode, operands)?;
        let position = self.bytes.len();
        self.bytes.extend_from_slice(&encoded);
        self.previous = self.last.replace(EmittedInstruction { opcode, position });
        Ok(position)
    }

    /// Bytes of the most recently appended instruction
    pub fn last_instruction(&self) -> Option<&[u8]> {
        self.last.map(|last| &self.bytes[last.position..])
    }

    pub fn last_emitted(&self) -> Option<EmittedInstruction> {
        self.last
    }

    pub fn last_is(&self, opcode: OpCode) -> bool {
        self.last.map_or(false, |last| last.opcode == opcode)
    }

    /// Remove the most recently appended instruction and return its bytes.
    ///
    /// Only one level of history is kept: after two pops in a row nothing
    /// is known about the new last instruction.
    pub fn pop_last(&mut self) -> Option<Vec<u8>> {
        let last = self.last.take()?;
        let removed = self.bytes.split_off(last.position);
        self.last = self.previous.take();
        Some(removed)
    }

    /// Rewrite the operand of the instruction at `position` in place.
    /// A position past the end of the buffer is ignored.
    pub fn patch_operand(&mut self, position: usize, operand: u16) -> Result<(), CompileError> {
        let Some(opcode) = self.bytes.get(position).and_then(|byte| OpCode::from_byte(*byte)) else {
            return Ok(());
        };
        let patched = make(opcode, &[operand])?;
        if let Some(target) = self.bytes.get_mut(position..position + patched.len()) {
            target.copy_from_slice(&patched);
        }
        Ok(())
    }

    /// Offset the next appended instruction will start at
    pub fn next_position(&self) -> usize {
        self.bytes.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
