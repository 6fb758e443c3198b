//! Utility functions for the Monkey bytecode runtime

use std::fs::File;
use std::io::{BufWriter, Error as IoError, ErrorKind, Write};
use std::path::Path;
use byteorder::{BigEndian, WriteBytesExt};
use crate::bytecode::parser::{TAG_ARRAY, TAG_BOOLEAN, TAG_INTEGER, TAG_NULL, TAG_STRING};
use crate::bytecode::{make, Bytecode, EncodeError, OpCode, MAGIC, VERSION_MAJOR};
use crate::vm::Value;

/// Writes a program to a bytecode file
pub fn write_bytecode<P: AsRef<Path>>(bytecode: &Bytecode, path: P) -> Result<(), IoError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    encode_bytecode(bytecode, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Serialize a program into any writer using the bytecode file layout
pub fn encode_bytecode<W: Write>(bytecode: &Bytecode, writer: &mut W) -> Result<(), IoError> {
    // Write magic number "MNKY"
    writer.write_u32::<BigEndian>(MAGIC)?;

    // Write version
    writer.write_u8(VERSION_MAJOR)?; // Major version
    writer.write_u8(0)?; // Minor version
    writer.write_u16::<BigEndian>(0)?; // Patch version

    // Write constants
    writer.write_u32::<BigEndian>(length_u32(bytecode.constants.len())?)?;
    for constant in &bytecode.constants {
        write_constant(writer, constant)?;
    }

    // Write instructions
    writer.write_u32::<BigEndian>(length_u32(bytecode.instructions.len())?)?;
    writer.write_all(&bytecode.instructions)?;
    Ok(())
}

fn write_constant<W: Write>(writer: &mut W, constant: &Value) -> Result<(), IoError> {
    match constant {
        Value::Null => {
            writer.write_u8(TAG_NULL)?;
        },
        Value::Integer(i) => {
            writer.write_u8(TAG_INTEGER)?;
            writer.write_i64::<BigEndian>(*i)?;
        },
        Value::Boolean(b) => {
            writer.write_u8(TAG_BOOLEAN)?;
            writer.write_u8(*b as u8)?;
        },
        Value::String(s) => {
            writer.write_u8(TAG_STRING)?;
            writer.write_u32::<BigEndian>(length_u32(s.len())?)?;
            writer.write_all(s.as_bytes())?;
        },
        Value::Array(elements) => {
            writer.write_u8(TAG_ARRAY)?;
            writer.write_u32::<BigEndian>(length_u32(elements.len())?)?;
            for element in elements.iter() {
                write_constant(writer, element)?;
            }
        },
        Value::HashMap(_) => {
            return Err(IoError::new(ErrorKind::InvalidData, "Hash maps cannot be stored as constants"));
        },
    }
    Ok(())
}

fn length_u32(len: usize) -> Result<u32, IoError> {
    u32::try_from(len).map_err(|_| IoError::new(ErrorKind::InvalidData, "Length does not fit in u32"))
}

/// Generate a simple demonstration program:
///
/// ```text
/// let answer = 42 + 58;
/// if (answer > 99) { "Hello, " + "Monkey!" } else { null };
/// [answer, 2, 3][0]
/// ```
pub fn generate_demo_bytecode() -> Result<Bytecode, EncodeError> {
    let constants = vec![
        Value::Integer(42),               // 0
        Value::Integer(58),               // 1
        Value::Integer(99),               // 2
        Value::from("Hello, "),           // 3
        Value::from("Monkey!"),           // 4
        Value::Integer(2),                // 5
        Value::Integer(3),                // 6
        Value::Integer(0),                // 7
    ];

    let parts: Vec<(OpCode, Vec<u16>)> = vec![
        /* 0000 */ (OpCode::Constant, vec![0]),
        /* 0003 */ (OpCode::Constant, vec![1]),
        /* 0006 */ (OpCode::Add, vec![]),
        /* 0007 */ (OpCode::SetGlobal, vec![0]),
        /* 0010 */ (OpCode::GetGlobal, vec![0]),
        /* 0013 */ (OpCode::Constant, vec![2]),
        /* 0016 */ (OpCode::GreaterThan, vec![]),
        /* 0017 */ (OpCode::JumpIfNotTrue, vec![30]),
        /* 0020 */ (OpCode::Constant, vec![3]),
        /* 0023 */ (OpCode::Constant, vec![4]),
        /* 0026 */ (OpCode::Add, vec![]),
        /* 0027 */ (OpCode::Jump, vec![31]),
        /* 0030 */ (OpCode::Null, vec![]),
        /* 0031 */ (OpCode::Pop, vec![]),
        /* 0032 */ (OpCode::GetGlobal, vec![0]),
        /* 0035 */ (OpCode::Constant, vec![5]),
        /* 0038 */ (OpCode::Constant, vec![6]),
        /* 0041 */ (OpCode::Array, vec![3]),
        /* 0044 */ (OpCode::Constant, vec![7]),
        /* 0047 */ (OpCode::Index, vec![]),
        /* 0048 */ (OpCode::Pop, vec![]),
    ];

    let mut instructions = Vec::new();
    for (opcode, operands) in &parts {
        instructions.extend(make(*opcode, operands)?);
    }

    Ok(Bytecode::new(instructions, constants))
}
