/// Opcodes for the VM
///
/// The discriminant of each opcode is the byte written into the instruction
/// stream, so the order of this enum is part of the binary format.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    // Constant pool
    Constant = 0x00,     // Push constant onto stack (1 operand)

    // Stack manipulation
    Pop = 0x01,          // Discard top value

    // Arithmetic operations
    Add = 0x02,          // Add (or concatenate) top two values
    Subtract = 0x03,     // Subtract top value from second top value
    Multiply = 0x04,     // Multiply top two values
    Divide = 0x05,       // Divide second top value by top value

    // Literals
    True = 0x06,         // Push true
    False = 0x07,        // Push false
    Null = 0x08,         // Push null

    // Comparison operations
    Equal = 0x09,        // Equality comparison
    NotEqual = 0x0A,     // Not equal comparison
    GreaterThan = 0x0B,  // Greater than (less than is compiled with swapped operands)

    // Unary operations
    Minus = 0x0C,        // Negate integer
    Bang = 0x0D,         // Logical NOT

    // Control flow
    Jump = 0x0E,         // Jump to byte offset (1 operand)
    JumpIfNotTrue = 0x0F, // Pop condition, jump if not truthy (1 operand)

    // Globals
    SetGlobal = 0x10,    // Pop value into global slot (1 operand)
    GetGlobal = 0x11,    // Push global slot (1 operand)

    // Collections
    Array = 0x12,        // Build array from n stack values (1 operand)
    HashMap = 0x13,      // Build hash map from n stack values, key/value interleaved (1 operand)
    Index = 0x14,        // Index collection with key
}

const CONSTANT: u8 = OpCode::Constant as u8;
const POP: u8 = OpCode::Pop as u8;

const ADD: u8 = OpCode::Add as u8;
const SUBTRACT: u8 = OpCode::Subtract as u8;
const MULTIPLY: u8 = OpCode::Multiply as u8;
const DIVIDE: u8 = OpCode::Divide as u8;

const TRUE: u8 = OpCode::True as u8;
const FALSE: u8 = OpCode::False as u8;
const NULL: u8 = OpCode::Null as u8;

const EQUAL: u8 = OpCode::Equal as u8;
const NOT_EQUAL: u8 = OpCode::NotEqual as u8;
const GREATER_THAN: u8 = OpCode::GreaterThan as u8;

const MINUS: u8 = OpCode::Minus as u8;
const BANG: u8 = OpCode::Bang as u8;

const JUMP: u8 = OpCode::Jump as u8;
const JUMP_IF_NOT_TRUE: u8 = OpCode::JumpIfNotTrue as u8;

const SET_GLOBAL: u8 = OpCode::SetGlobal as u8;
const GET_GLOBAL: u8 = OpCode::GetGlobal as u8;

const ARRAY: u8 = OpCode::Array as u8;
const HASH_MAP: u8 = OpCode::HashMap as u8;
const INDEX: u8 = OpCode::Index as u8;

/// Width in bytes of the opcode itself
pub const OPCODE_WIDTH: usize = 1;

/// Display name and operand layout of an opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpCodeDefinition {
    pub name: &'static str,
    pub operand_widths: &'static [usize],
}

impl OpCodeDefinition {
    const fn new(name: &'static str, operand_widths: &'static [usize]) -> Self {
        Self { name, operand_widths }
    }

    /// Total number of operand bytes following the opcode byte
    pub fn operand_bytes(&self) -> usize {
        self.operand_widths.iter().sum()
    }
}

const NO_OPERANDS: &[usize] = &[];
const ONE_U16: &[usize] = &[2];

impl OpCode {
    /// Every opcode, in byte order
    pub const ALL: [OpCode; 21] = [
        OpCode::Constant,
        OpCode::Pop,
        OpCode::Add,
        OpCode::Subtract,
        OpCode::Multiply,
        OpCode::Divide,
        OpCode::True,
        OpCode::False,
        OpCode::Null,
        OpCode::Equal,
        OpCode::NotEqual,
        OpCode::GreaterThan,
        OpCode::Minus,
        OpCode::Bang,
        OpCode::Jump,
        OpCode::JumpIfNotTrue,
        OpCode::SetGlobal,
        OpCode::GetGlobal,
        OpCode::Array,
        OpCode::HashMap,
        OpCode::Index,
    ];

    /// Convert a byte to an opcode
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            CONSTANT => Some(OpCode::Constant),
            POP => Some(OpCode::Pop),

            ADD => Some(OpCode::Add),
            SUBTRACT => Some(OpCode::Subtract),
            MULTIPLY => Some(OpCode::Multiply),
            DIVIDE => Some(OpCode::Divide),

            TRUE => Some(OpCode::True),
            FALSE => Some(OpCode::False),
            NULL => Some(OpCode::Null),

            EQUAL => Some(OpCode::Equal),
            NOT_EQUAL => Some(OpCode::NotEqual),
            GREATER_THAN => Some(OpCode::GreaterThan),

            MINUS => Some(OpCode::Minus),
            BANG => Some(OpCode::Bang),

            JUMP => Some(OpCode::Jump),
            JUMP_IF_NOT_TRUE => Some(OpCode::JumpIfNotTrue),

            SET_GLOBAL => Some(OpCode::SetGlobal),
            GET_GLOBAL => Some(OpCode::GetGlobal),

            ARRAY => Some(OpCode::Array),
            HASH_MAP => Some(OpCode::HashMap),
            INDEX => Some(OpCode::Index),

            _ => None,
        }
    }

    /// Convert an opcode to a byte
    pub fn to_byte(&self) -> u8 {
        *self as u8
    }

    /// Display name and operand widths
    pub fn definition(&self) -> OpCodeDefinition {
        match self {
            OpCode::Constant => OpCodeDefinition::new("OpConstant", ONE_U16),
            OpCode::Pop => OpCodeDefinition::new("OpPop", NO_OPERANDS),
            OpCode::Add => OpCodeDefinition::new("OpAdd", NO_OPERANDS),
            OpCode::Subtract => OpCodeDefinition::new("OpSubtract", NO_OPERANDS),
            OpCode::Multiply => OpCodeDefinition::new("OpMultiply", NO_OPERANDS),
            OpCode::Divide => OpCodeDefinition::new("OpDivide", NO_OPERANDS),
            OpCode::True => OpCodeDefinition::new("OpTrue", NO_OPERANDS),
            OpCode::False => OpCodeDefinition::new("OpFalse", NO_OPERANDS),
            OpCode::Null => OpCodeDefinition::new("OpNull", NO_OPERANDS),
            OpCode::Equal => OpCodeDefinition::new("OpEqual", NO_OPERANDS),
            OpCode::NotEqual => OpCodeDefinition::new("OpNotEqual", NO_OPERANDS),
            OpCode::GreaterThan => OpCodeDefinition::new("OpGreaterThan", NO_OPERANDS),
            OpCode::Minus => OpCodeDefinition::new("OpMinus", NO_OPERANDS),
            OpCode::Bang => OpCodeDefinition::new("OpBang", NO_OPERANDS),
            OpCode::Jump => OpCodeDefinition::new("OpJump", ONE_U16),
            OpCode::JumpIfNotTrue => OpCodeDefinition::new("OpJumpIfNotTrue", ONE_U16),
            OpCode::SetGlobal => OpCodeDefinition::new("OpSetGlobal", ONE_U16),
            OpCode::GetGlobal => OpCodeDefinition::new("OpGetGlobal", ONE_U16),
            OpCode::Array => OpCodeDefinition::new("OpArray", ONE_U16),
            OpCode::HashMap => OpCodeDefinition::new("OpHashMap", ONE_U16),
            OpCode::Index => OpCodeDefinition::new("OpIndex", NO_OPERANDS),
        }
    }

    /// Get the number of operands for the opcode
    pub fn num_operands(&self) -> usize {
        self.definition().operand_widths.len()
    }

    /// Number of bytes the whole instruction occupies, opcode included
    pub fn instruction_width(&self) -> usize {
        OPCODE_WIDTH + self.definition().operand_bytes()
    }
}

impl TryFrom<u8> for OpCode {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        OpCode::from_byte(byte).ok_or(byte)
    }
}

impl From<OpCode> for u8 {
    fn from(opcode: OpCode) -> Self {
        opcode.to_byte()
    }
}
