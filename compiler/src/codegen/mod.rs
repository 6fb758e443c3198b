mod constant_pool;
mod error;
mod instructions;
mod symbol_table;

pub use constant_pool::{ConstantPool, MAX_CONSTANTS};
pub use error::{CompileError, CompileFailure};
pub use instructions::{EmittedInstruction, InstructionStream};
pub use symbol_table::{Symbol, SymbolScope, SymbolTable, MAX_GLOBALS};

use monkey::bytecode::{Bytecode, OpCode};
use monkey::vm::Value;
use tracing::{debug, trace};
use crate::ast::AstNode;

/// Jump target emitted before the real destination is known
const PLACEHOLDER_TARGET: u16 = 9999;

/// Compile a whole tree into bytecode
pub fn compile(node: &AstNode) -> Result<Bytecode, CompileFailure> {
    let mut compiler = Compiler::new();
    compiler.compile(node)?;
    Ok(compiler.into_bytecode())
}

/// Translates a syntax tree into bytecode in a single recursive walk
#[derive(Debug, Default)]
pub struct Compiler {
    instructions: InstructionStream,
    constants: ConstantPool,
    symbols: SymbolTable,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `node`, stopping at the first error
    pub fn compile(&mut self, node: &AstNode) -> Result<(), CompileFailure> {
        self.compile_node(node)?;
        debug!(
            bytes = self.instructions.next_position(),
            constants = self.constants.len(),
            globals = self.symbols.allocated(),
            "Compiled {}",
            node.kind()
        );
        Ok(())
    }

    /// Snapshot of everything emitted so far
    pub fn bytecode(&self) -> Bytecode {
        Bytecode::new(self.instructions.as_bytes().to_vec(), self.constants.snapshot())
    }

    /// Finish compiling and hand over the emitted program
    pub fn into_bytecode(self) -> Bytecode {
        Bytecode::new(self.instructions.into_bytes(), self.constants.into_values())
    }

    fn compile_node(&mut self, node: &AstNode) -> Result<(), CompileError> {
        match node {
            AstNode::Program(statements) | AstNode::Block(statements) => {
                for statement in statements {
                    self.compile_node(statement)?;
                }
            }

            AstNode::ExpressionStatement(expression) => {
                self.compile_node(expression)?;
                self.emit(OpCode::Pop, &[])?;
            }

            AstNode::Integer(value) => {
                self.emit_constant(Value::Integer(*value))?;
            }

            AstNode::String(value) => {
                self.emit_constant(Value::String(value.clone()))?;
            }

            AstNode::Boolean(value) => {
                let opcode = if *value { OpCode::True } else { OpCode::False };
                self.emit(opcode, &[])?;
            }

            AstNode::Array(elements) => {
                for element in elements {
                    self.compile_node(element)?;
                }
                let count = operand_count("Array literal", elements.len())?;
                self.emit(OpCode::Array, &[count])?;
            }

            AstNode::Hash(pairs) => {
                for (key, value) in pairs {
                    self.compile_node(key)?;
                    self.compile_node(value)?;
                }
                let count = operand_count("Hash literal", pairs.len() * 2)?;
                self.emit(OpCode::HashMap, &[count])?;
            }

            AstNode::Infix { left, operator, right } => {
                self.compile_infix(left, operator, right)?;
            }

            AstNode::Prefix { operator, operand } => {
                self.compile_node(operand)?;
                let opcode = match operator.as_str() {
                    "!" => OpCode::Bang,
                    "-" => OpCode::Minus,
                    _ => return Err(CompileError::UnsupportedPrefixOperator(operator.clone())),
                };
                self.emit(opcode, &[])?;
            }

            AstNode::If { condition, consequence, alternative } => {
                self.compile_if(condition, consequence, alternative.as_deref())?;
            }

            AstNode::Index { collection, index } => {
                self.compile_node(collection)?;
                self.compile_node(index)?;
                self.emit(OpCode::Index, &[])?;
            }

            AstNode::Let { name, value } => {
                self.compile_node(value)?;
                let symbol = self.symbols.define(name)?;
                self.emit(OpCode::SetGlobal, &[symbol.index])?;
            }

            AstNode::Identifier(name) => {
                let index = self
                    .symbols
                    .resolve(name)
                    .map(|symbol| symbol.index)
                    .ok_or_else(|| CompileError::UnboundIdentifier(name.clone()))?;
                self.emit(OpCode::GetGlobal, &[index])?;
            }

            AstNode::Return(_) | AstNode::Function { .. } | AstNode::Call { .. } => {
                return Err(CompileError::UnsupportedNode(node.kind()));
            }
        }
        Ok(())
    }

    fn compile_infix(&mut self, left: &AstNode, operator: &str, right: &AstNode) -> Result<(), CompileError> {
        // `a < b` is compiled as `b > a`
        if operator == "<" {
            self.compile_node(right)?;
            self.compile_node(left)?;
            self.emit(OpCode::GreaterThan, &[])?;
            return Ok(());
        }

        self.compile_node(left)?;
        self.compile_node(right)?;
        let opcode = match operator {
            "+" => OpCode::Add,
            "-" => OpCode::Subtract,
            "*" => OpCode::Multiply,
            "/" => OpCode::Divide,
            "==" => OpCode::Equal,
            "!=" => OpCode::NotEqual,
            ">" => OpCode::GreaterThan,
            _ => return Err(CompileError::UnsupportedInfixOperator(operator.to_string())),
        };
        self.emit(opcode, &[])?;
        Ok(())
    }

    fn compile_if(
        &mut self,
        condition: &AstNode,
        consequence: &AstNode,
        alternative: Option<&AstNode>,
    ) -> Result<(), CompileError> {
        self.compile_node(condition)?;
        let jump_if_not_true = self.emit(OpCode::JumpIfNotTrue, &[PLACEHOLDER_TARGET])?;

        self.compile_branch(consequence)?;
        let jump = self.emit(OpCode::Jump, &[PLACEHOLDER_TARGET])?;
        self.patch_jump(jump_if_not_true)?;

        match alternative {
            Some(alternative) => self.compile_branch(alternative)?,
            None => {
                self.emit(OpCode::Null, &[])?;
            }
        }
        self.patch_jump(jump)?;
        Ok(())
    }

    /// Compile an if-branch so it leaves exactly one value on the stack:
    /// a trailing `POP` is dropped, and a branch that ends without an
    /// expression value yields `Null`.
    fn compile_branch(&mut self, block: &AstNode) -> Result<(), CompileError> {
        let start = self.instructions.next_position();
        self.compile_node(block)?;

        let ends_with_pop = self
            .instructions
            .last_emitted()
            .map_or(false, |last| last.opcode == OpCode::Pop && last.position >= start);
        if ends_with_pop {
            self.instructions.pop_last();
            trace!(position = self.instructions.next_position(), "removed trailing OpPop");
        } else {
            self.emit(OpCode::Null, &[])?;
        }
        Ok(())
    }

    /// Point the jump at `position` to the next instruction to be emitted
    fn patch_jump(&mut self, position: usize) -> Result<(), CompileError> {
        let next = self.instructions.next_position();
        let target = u16::try_from(next).map_err(|_| CompileError::JumpOutOfRange(next))?;
        self.instructions.patch_operand(position, target)?;
        trace!(position, target, "patched jump");
        Ok(())
    }

    fn emit_constant(&mut self, value: Value) -> Result<usize, CompileError> {
        let index = self.constants.add(value)?;
        self.emit(OpCode::Constant, &[index])
    }

    fn emit(&mut self, opcode: OpCode, operands: &[u16]) -> Result<usize, CompileError> {
        let position = self.instructions.append(opcode, operands)?;
        trace!(position, ?operands, "emit {}", opcode.definition().name);
        Ok(position)
    }
}

fn operand_count(kind: &'static str, count: usize) -> Result<u16, CompileError> {
    u16::try_from(count).map_err(|_| CompileError::OperandOverflow { kind, count })
}
