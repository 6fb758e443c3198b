use std::io::{Error as IoError, ErrorKind, Read};
use std::sync::Arc;
use byteorder::{ReadBytesExt, BigEndian};
use thiserror::Error;
use crate::bytecode::{Bytecode, OpCode};
use crate::vm::Value;

/// "MNKY" in ASCII
pub const MAGIC: u32 = 0x4D4E_4B59;
pub const VERSION_MAJOR: u8 = 1;

pub(crate) const TAG_NULL: u8 = 0;
pub(crate) const TAG_INTEGER: u8 = 1;
pub(crate) const TAG_BOOLEAN: u8 = 2;
pub(crate) const TAG_STRING: u8 = 3;
pub(crate) const TAG_ARRAY: u8 = 4;

/// Deepest array nesting accepted in the constant pool
pub const MAX_CONSTANT_DEPTH: usize = 64;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    IoError(#[from] IoError),

    #[error("Invalid bytecode format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported bytecode version: {0}")]
    UnsupportedVersion(u8),
}

pub struct Parser;

impl Parser {
    /// Parse bytecode from a reader (file, memory buffer, etc.)
    pub fn parse<R: Read>(reader: &mut R) -> Result<Bytecode, ParseError> {
        // Read magic number and version
        let magic = reader.read_u32::<BigEndian>()?;
        if magic != MAGIC {
            return Err(ParseError::InvalidFormat("Invalid magic number".to_string()));
        }

        let version = reader.read_u8()?;
        if version != VERSION_MAJOR {
            return Err(ParseError::UnsupportedVersion(version));
        }
        let _minor_version = reader.read_u8()?;
        let _patch_version = reader.read_u16::<BigEndian>()?;

        // Read constants
        let constants_len = reader.read_u32::<BigEndian>()? as usize;
        let mut constants = Vec::with_capacity(constants_len.min(u16::MAX as usize + 1));
        for _ in 0..constants_len {
            constants.push(Self::parse_constant(reader, 0)?);
        }

        // Read instructions
        let code_len = reader.read_u32::<BigEndian>()?;
        let instructions = Self::read_bytes(reader, code_len)?;
        Self::validate_instructions(&instructions)?;

        Ok(Bytecode::new(instructions, constants))
    }

    fn parse_constant<R: Read>(reader: &mut R, depth: usize) -> Result<Value, ParseError> {
        let const_type = reader.read_u8()?;
        let constant = match const_type {
            TAG_NULL => Value::Null,
            TAG_INTEGER => Value::Integer(reader.read_i64::<BigEndian>()?),
            TAG_BOOLEAN => Value::from_bool(reader.read_u8()? != 0),
            TAG_STRING => {
                let str_len = reader.read_u32::<BigEndian>()?;
                let str_bytes = Self::read_bytes(reader, str_len)?;
                let string = String::from_utf8(str_bytes)
                    .map_err(|e| ParseError::InvalidFormat(format!("String constant is not UTF-8: {}", e)))?;
                Value::String(string)
            },
            TAG_ARRAY => {
                if depth >= MAX_CONSTANT_DEPTH {
                    return Err(ParseError::InvalidFormat("constant nesting too deep".to_string()));
                }
                let count = reader.read_u32::<BigEndian>()? as usize;
                let mut elements = Vec::new();
                for _ in 0..count {
                    elements.push(Self::parse_constant(reader, depth + 1)?);
                }
                Value::Array(Arc::new(elements))
            },
            _ => return Err(ParseError::InvalidFormat(format!("Unknown constant type: {}", const_type))),
        };
        Ok(constant)
    }

    /// Read exactly `len` bytes without trusting `len` for the allocation
    fn read_bytes<R: Read>(reader: &mut R, len: u32) -> Result<Vec<u8>, ParseError> {
        let mut bytes = Vec::new();
        reader.by_ref().take(u64::from(len)).read_to_end(&mut bytes)?;
        if bytes.len() != len as usize {
            return Err(ParseError::IoError(IoError::from(ErrorKind::UnexpectedEof)));
        }
        Ok(bytes)
    }

    /// Walk the instruction stream and reject unknown opcodes or cut-off operands
    fn validate_instructions(code: &[u8]) -> Result<(), ParseError> {
        let mut offset = 0;
        while offset < code.len() {
            let byte = code[offset];
            let opcode = OpCode::from_byte(byte).ok_or_else(|| {
                ParseError::InvalidFormat(format!("Unknown opcode 0x{:02X} at {}", byte, offset))
            })?;
            let width = opcode.instruction_width();
            if offset + width > code.len() {
                return Err(ParseError::InvalidFormat(format!(
                    "Truncated {} at {}",
                    opcode.definition().name,
                    offset
                )));
            }
            offset += width;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use byteorder::WriteBytesExt;
    use crate::bytecode::make;

    /// Helper function to create valid bytecode header
    fn create_valid_header() -> Vec<u8> {
        let mut data = Vec::new();
        data.write_u32::<BigEndian>(MAGIC).unwrap();
        data.write_u8(1).unwrap(); // Major version
        data.write_u8(0).unwrap(); // Minor version
        data.write_u16::<BigEndian>(0).unwrap(); // Patch version
        data
    }

    fn write_code(data: &mut Vec<u8>, code: &[u8]) {
        data.write_u32::<BigEndian>(code.len() as u32).unwrap();
        data.extend_from_slice(code);
    }

    /// Helper function to create a complete valid bytecode
    fn create_valid_bytecode() -> Vec<u8> {
        let mut data = create_valid_header();

        // Constants: [42, "hello", true, null]
        data.write_u32::<BigEndian>(4).unwrap();

        data.write_u8(TAG_INTEGER).unwrap();
        data.write_i64::<BigEndian>(42).unwrap();

        data.write_u8(TAG_STRING).unwrap();
        data.write_u32::<BigEndian>(5).unwrap();
        data.extend_from_slice(b"hello");

        data.write_u8(TAG_BOOLEAN).unwrap();
        data.write_u8(1).unwrap();

        data.write_u8(TAG_NULL).unwrap();

        // Instructions: [Constant 0, Pop]
        let mut code = make(OpCode::Constant, &[0]).unwrap();
        code.extend(make(OpCode::Pop, &[]).unwrap());
        write_code(&mut data, &code);

        data
    }

    #[test]
    fn test_parse_valid_bytecode() {
        let data = create_valid_bytecode();
        let mut cursor = Cursor::new(data);

        let bytecode = Parser::parse(&mut cursor).unwrap();
        assert_eq!(
            bytecode.constants,
            vec![Value::Integer(42), Value::from("hello"), Value::from_bool(true), Value::Null]
        );
        assert_eq!(bytecode.instructions, vec![OpCode::Constant.to_byte(), 0, 0, OpCode::Pop.to_byte()]);
    }

    #[test]
    fn test_parse_invalid_magic_number() {
        let mut data = Vec::new();
        data.write_u32::<BigEndian>(0x4C4F4146).unwrap();
        data.write_u8(1).unwrap();

        match Parser::parse(&mut Cursor::new(data)) {
            Err(ParseError::InvalidFormat(msg)) => assert!(msg.contains("magic")),
            other => panic!("Expected InvalidFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_unsupported_version() {
        let mut data = Vec::new();
        data.write_u32::<BigEndian>(MAGIC).unwrap();
        data.write_u8(2).unwrap();

        match Parser::parse(&mut Cursor::new(data)) {
            Err(ParseError::UnsupportedVersion(2)) => {},
            other => panic!("Expected UnsupportedVersion(2), got {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty_program() {
        let mut data = create_valid_header();
        data.write_u32::<BigEndian>(0).unwrap();
        write_code(&mut data, &[]);

        let bytecode = Parser::parse(&mut Cursor::new(data)).unwrap();
        assert!(bytecode.constants.is_empty());
        assert!(bytecode.instructions.is_empty());
    }

    #[test]
    fn test_parse_nested_array_constant() {
        let mut data = create_valid_header();
        data.write_u32::<BigEndian>(1).unwrap();
        data.write_u8(TAG_ARRAY).unwrap();
        data.write_u32::<BigEndian>(2).unwrap();
        data.write_u8(TAG_INTEGER).unwrap();
        data.write_i64::<BigEndian>(i64::MIN).unwrap();
        data.write_u8(TAG_ARRAY).unwrap();
        data.write_u32::<BigEndian>(0).unwrap();
        write_code(&mut data, &[]);

        let bytecode = Parser::parse(&mut Cursor::new(data)).unwrap();
        assert_eq!(
            bytecode.constants,
            vec![Value::from(vec![Value::Integer(i64::MIN), Value::from(vec![])])]
        );
    }

    fn nested_arrays(depth: usize) -> Vec<u8> {
        let mut data = create_valid_header();
        data.write_u32::<BigEndian>(1).unwrap();
        for _ in 0..depth {
            data.write_u8(TAG_ARRAY).unwrap();
            data.write_u32::<BigEndian>(1).unwrap();
        }
        data.write_u8(TAG_NULL).unwrap();
        write_code(&mut data, &[]);
        data
    }

    #[test]
    fn test_parse_array_nesting_limit() {
        let bytecode = Parser::parse(&mut Cursor::new(nested_arrays(MAX_CONSTANT_DEPTH))).unwrap();
        assert_eq!(bytecode.constants.len(), 1);

        match Parser::parse(&mut Cursor::new(nested_arrays(MAX_CONSTANT_DEPTH + 1))) {
            Err(ParseError::InvalidFormat(msg)) => assert_eq!(msg, "constant nesting too deep"),
            other => panic!("Expected InvalidFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_deeply_nested_arrays_fails_cleanly() {
        match Parser::parse(&mut Cursor::new(nested_arrays(200_000))) {
            Err(ParseError::InvalidFormat(msg)) => assert_eq!(msg, "constant nesting too deep"),
            other => panic!("Expected InvalidFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_oversized_string_length() {
        let mut data = create_valid_header();
        data.write_u32::<BigEndian>(1).unwrap();
        data.write_u8(TAG_STRING).unwrap();
        data.write_u32::<BigEndian>(u32::MAX).unwrap();
        data.extend_from_slice(b"abc");

        match Parser::parse(&mut Cursor::new(data)) {
            Err(ParseError::IoError(err)) => assert_eq!(err.kind(), ErrorKind::UnexpectedEof),
            other => panic!("Expected IoError, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_unknown_constant_type() {
        let mut data = create_valid_header();
        data.write_u32::<BigEndian>(1).unwrap();
        data.write_u8(99).unwrap();

        match Parser::parse(&mut Cursor::new(data)) {
            Err(ParseError::InvalidFormat(msg)) => assert!(msg.contains("Unknown constant type: 99")),
            other => panic!("Expected InvalidFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_opcode() {
        let mut data = create_valid_header();
        data.write_u32::<BigEndian>(0).unwrap();
        write_code(&mut data, &[OpCode::Pop.to_byte(), 0xF0]);

        match Parser::parse(&mut Cursor::new(data)) {
            Err(ParseError::InvalidFormat(msg)) => assert!(msg.contains("Unknown opcode 0xF0 at 1")),
            other => panic!("Expected InvalidFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_truncated_operand() {
        let mut data = create_valid_header();
        data.write_u32::<BigEndian>(0).unwrap();
        write_code(&mut data, &[OpCode::Jump.to_byte(), 0x00]);

        match Parser::parse(&mut Cursor::new(data)) {
            Err(ParseError::InvalidFormat(msg)) => assert!(msg.contains("Truncated OpJump at 0")),
            other => panic!("Expected InvalidFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_truncated_data() {
        let mut data = create_valid_bytecode();
        data.truncate(data.len() - 2);

        match Parser::parse(&mut Cursor::new(data)) {
            Err(ParseError::IoError(_)) => {},
            other => panic!("Expected IoError, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_unicode_strings() {
        let text = "Hello 🌍 世界";
        let mut data = create_valid_header();
        data.write_u32::<BigEndian>(1).unwrap();
        data.write_u8(TAG_STRING).unwrap();
        data.write_u32::<BigEndian>(text.len() as u32).unwrap();
        data.extend_from_slice(text.as_bytes());
        write_code(&mut data, &[]);

        let bytecode = Parser::parse(&mut Cursor::new(data)).unwrap();
        assert_eq!(bytecode.constants, vec![Value::from(text)]);
    }
}
