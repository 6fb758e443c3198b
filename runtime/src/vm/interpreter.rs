use std::sync::Arc;
use tracing::{debug, trace};
use crate::bytecode::{Bytecode, Instruction, OpCode};
use crate::vm::operators::{bang, binary_operation, negate};
use crate::vm::{
    ExecutionContext, GlobalScope, HashMapObject, Value, VMError, VMResult,
    DEFAULT_GLOBAL_CAPACITY, DEFAULT_STACK_LIMIT, FALSE, NULL, TRUE,
};

/// The Virtual Machine that executes bytecode instructions
#[derive(Clone, Debug)]
pub struct VM {
    stack_trace_enabled: bool,
    stack_limit: usize,
    global_capacity: usize,
}

impl VM {
    pub fn new() -> Self {
        Self {
            stack_trace_enabled: false,
            stack_limit: DEFAULT_STACK_LIMIT,
            global_capacity: DEFAULT_GLOBAL_CAPACITY,
        }
    }

    /// Enable or disable stack tracing
    pub fn set_stack_trace(&mut self, enabled: bool) {
        self.stack_trace_enabled = enabled;
    }

    pub fn set_stack_limit(&mut self, limit: usize) {
        self.stack_limit = limit;
    }

    pub fn set_global_capacity(&mut self, capacity: usize) {
        self.global_capacity = capacity;
    }

    /// Run a program from the start with a fresh stack and global scope.
    ///
    /// Returns the last value popped by the program, or `Null` when nothing
    /// was popped.
    pub fn run(&self, bytecode: Arc<Bytecode>) -> VMResult<Value> {
        let mut context = ExecutionContext::with_globals(
            bytecode,
            GlobalScope::with_capacity(self.global_capacity),
        );
        context.set_stack_limit(self.stack_limit);
        context.set_stack_trace(self.stack_trace_enabled);

        if self.stack_trace_enabled {
            debug!(
                bytes = context.bytecode().instructions.len(),
                constants = context.bytecode().constants.len(),
                "Starting execution with stack tracing enabled"
            );
        }

        self.execute(&mut context)
    }

    /// Execute instructions in an execution context until the pointer
    /// leaves the instruction buffer
    pub fn execute(&self, context: &mut ExecutionContext) -> VMResult<Value> {
        while context.has_more_instructions() {
            let pc = context.pc();
            let opcode = context.current_opcode()?;

            if self.stack_trace_enabled {
                match Instruction::decode(&context.bytecode().instructions[pc..]) {
                    Some((instruction, _)) => trace!(pc, "{}", instruction),
                    None => trace!(pc, "{}", opcode.definition().name),
                }
                context.print_stack();
            }

            match opcode {
                OpCode::Constant => {
                    let index = context.read_operand()?;
                    let value = context.get_constant(index)?;
                    context.push(value)?;
                },

                OpCode::Pop => {
                    context.pop()?;
                },

                OpCode::Add
                | OpCode::Subtract
                | OpCode::Multiply
                | OpCode::Divide
                | OpCode::Equal
                | OpCode::NotEqual
                | OpCode::GreaterThan => {
                    let right = context.pop()?;
                    let left = context.pop()?;
                    context.push(binary_operation(opcode, left, right)?)?;
                },

                OpCode::True => context.push(TRUE)?,
                OpCode::False => context.push(FALSE)?,
                OpCode::Null => context.push(NULL)?,

                OpCode::Minus => {
                    let value = context.pop()?;
                    context.push(negate(&value)?)?;
                },

                OpCode::Bang => {
                    let value = context.pop()?;
                    context.push(bang(&value))?;
                },

                OpCode::Jump => {
                    let target = context.read_operand()?;
                    context.jump(target)?;
                    continue;
                },

                OpCode::JumpIfNotTrue => {
                    let target = context.read_operand()?;
                    let condition = context.pop()?;
                    if !condition.is_truthy() {
                        context.jump(target)?;
                        continue;
                    }
                },

                OpCode::SetGlobal => {
                    let index = context.read_operand()?;
                    let value = context.pop().map_err(|_| VMError::MissingGlobalValue)?;
                    context.set_global(index, value)?;
                },

                OpCode::GetGlobal => {
                    let index = context.read_operand()?;
                    let value = context.get_global(index)?;
                    context.push(value)?;
                },

                OpCode::Array => {
                    let count = context.read_operand()? as usize;
                    let elements = context.pop_many(count).ok_or(VMError::StackUnderflow)?;
                    context.push(Value::Array(Arc::new(elements)))?;
                },

                OpCode::HashMap => {
                    let count = context.read_operand()?;
                    let map = build_hash_map(context, count)?;
                    context.push(Value::HashMap(Arc::new(map)))?;
                },

                OpCode::Index => {
                    let index = context.pop()?;
                    let collection = context.pop()?;
                    context.push(index_value(&collection, &index)?)?;
                },
            }

            context.set_pc(pc + opcode.instruction_width());
        }

        Ok(context.take_last_popped().unwrap_or(Value::Null))
    }
}

impl Default for VM {
    fn default() -> Self {
        Self::new()
    }
}

/// Take `count` values (key, value, key, value, ...) off the stack and
/// insert them in source order, so a repeated key keeps its last value
fn build_hash_map(context: &mut ExecutionContext, count: u16) -> VMResult<HashMapObject> {
    if count % 2 != 0 {
        return Err(VMError::OddHashMapCount(count));
    }

    let pairs_on_stack = context.stack_depth() / 2;
    let values = context
        .pop_many(count as usize)
        .ok_or(VMError::HashMapUnderflow { expected: count as usize / 2, found: pairs_on_stack })?;

    let mut map = HashMapObject::new();
    let mut entries = values.into_iter();
    while let (Some(key), Some(value)) = (entries.next(), entries.next()) {
        if key == Value::Null {
            return Err(VMError::NullHashKey);
        }
        map.insert(key, value);
    }
    Ok(map)
}

fn index_value(collection: &Value, index: &Value) -> VMResult<Value> {
    match collection {
        Value::HashMap(map) => match index {
            Value::Null => Err(VMError::NullHashKey),
            Value::Integer(_) | Value::Boolean(_) | Value::String(_) | Value::Array(_) | Value::HashMap(_) => {
                Ok(map.get(index).cloned().unwrap_or(Value::Null))
            },
        },
        Value::Array(elements) => match index {
            Value::Integer(i) => Ok(usize::try_from(*i)
                .ok()
                .and_then(|i| elements.get(i))
                .cloned()
                .unwrap_or(Value::Null)),
            Value::Null | Value::Boolean(_) | Value::String(_) | Value::Array(_) | Value::HashMap(_) => {
                Err(VMError::NonIntegerIndex(index.type_name()))
            },
        },
        Value::Null | Value::Integer(_) | Value::Boolean(_) | Value::String(_) => {
            Err(VMError::IndexNotSupported(collection.type_name()))
        },
    }
}
