//! Binary and unary operator semantics for runtime values.

use crate::bytecode::OpCode;
use crate::vm::value::{FALSE, TRUE};
use crate::vm::{VMError, VMResult, Value};

/// Apply a binary opcode to `left` and `right`.
///
/// Integers support arithmetic and comparison, strings support `+` and
/// equality, and any other pair of the same type supports equality only.
/// Mixed-type pairs are a type error naming the left operand's type.
pub fn binary_operation(opcode: OpCode, left: Value, right: Value) -> VMResult<Value> {
    match (left, right) {
        (Value::Integer(l), Value::Integer(r)) => integer_operation(opcode, l, r),
        (Value::String(l), Value::String(r)) => string_operation(opcode, l, r),
        (left, right) if left.object_type() == right.object_type() => {
            equality_operation(opcode, &left, &right)
        },
        (left, _) => Err(unsupported(opcode, &left)),
    }
}

fn integer_operation(opcode: OpCode, left: i64, right: i64) -> VMResult<Value> {
    let overflow = || VMError::ArithmeticError(format!(
        "integer overflow in {} {} {}",
        left,
        opcode.definition().name,
        right
    ));

    match opcode {
        OpCode::Add => left.checked_add(right).map(Value::Integer).ok_or_else(overflow),
        OpCode::Subtract => left.checked_sub(right).map(Value::Integer).ok_or_else(overflow),
        OpCode::Multiply => left.checked_mul(right).map(Value::Integer).ok_or_else(overflow),
        OpCode::Divide => {
            if right == 0 {
                return Err(VMError::DivisionByZero);
            }
            left.checked_div(right).map(Value::Integer).ok_or_else(overflow)
        },
        OpCode::GreaterThan => Ok(Value::from_bool(left > right)),
        OpCode::Equal => Ok(Value::from_bool(left == right)),
        OpCode::NotEqual => Ok(Value::from_bool(left != right)),
        _ => Err(unsupported(opcode, &Value::Integer(left))),
    }
}

fn string_operation(opcode: OpCode, left: String, right: String) -> VMResult<Value> {
    match opcode {
        OpCode::Add => Ok(Value::String(left + &right)),
        OpCode::Equal => Ok(Value::from_bool(left == right)),
        OpCode::NotEqual => Ok(Value::from_bool(left != right)),
        _ => Err(unsupported(opcode, &Value::String(left))),
    }
}

fn equality_operation(opcode: OpCode, left: &Value, right: &Value) -> VMResult<Value> {
    match opcode {
        OpCode::Equal => Ok(Value::from_bool(left == right)),
        OpCode::NotEqual => Ok(Value::from_bool(left != right)),
        _ => Err(unsupported(opcode, left)),
    }
}

fn unsupported(opcode: OpCode, left: &Value) -> VMError {
    VMError::TypeError(format!(
        "Opcode {} not supported for the types provided ({})",
        opcode.definition().name,
        left.type_name()
    ))
}

/// Logical negation: true→false, false→true, null→true, anything else→false
pub fn bang(value: &Value) -> Value {
    match value {
        Value::Boolean(true) => FALSE,
        Value::Boolean(false) | Value::Null => TRUE,
        Value::Integer(_) | Value::String(_) | Value::Array(_) | Value::HashMap(_) => FALSE,
    }
}

/// Arithmetic negation, defined for integers only
pub fn negate(value: &Value) -> VMResult<Value> {
    match value {
        Value::Integer(i) => i
            .checked_neg()
            .map(Value::Integer)
            .ok_or_else(|| VMError::ArithmeticError(format!("integer overflow negating {}", i))),
        Value::Null | Value::Boolean(_) | Value::String(_) | Value::Array(_) | Value::HashMap(_) => {
            Err(VMError::InvalidNegation {
                value: value.to_string(),
                type_name: value.type_name(),
            })
        },
    }
}
