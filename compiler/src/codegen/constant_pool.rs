use monkey::vm::Value;
use crate::codegen::CompileError;

/// Most entries a u16 `CONSTANT` operand can address
pub const MAX_CONSTANTS: usize = u16::MAX as usize + 1;

/// Append-only table of literal values referenced by `CONSTANT` instructions
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    constants: Vec<Value>,
}

impl ConstantPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` and return its index. Equal values are not deduplicated.
    pub fn add(&mut self, value: Value) -> Result<u16, CompileError> {
        let index = u16::try_from(self.constants.len())
            .map_err(|_| CompileError::TooManyConstants(MAX_CONSTANTS))?;
        self.constants.push(value);
        Ok(index)
    }

    pub fn get(&self, index: u16) -> Option<&Value> {
        self.constants.get(index as usize)
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    /// Copy of the pool in index order
    pub fn snapshot(&self) -> Vec<Value> {
        self.constants.clone()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.constants
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexes_follow_insertion_order() {
        let mut pool = ConstantPool::new();
        assert!(pool.is_empty());
        assert_eq!(pool.add(Value::Integer(7)), Ok(0));
        assert_eq!(pool.add(Value::from("seven")), Ok(1));
        assert_eq!(pool.get(1), Some(&Value::from("seven")));
        assert_eq!(pool.get(2), None);
    }

    #[test]
    fn test_no_deduplication() {
        let mut pool = ConstantPool::new();
        pool.add(Value::Integer(1)).unwrap();
        pool.add(Value::Integer(1)).unwrap();
        assert_eq!(pool.snapshot(), vec![Value::Integer(1), Value::Integer(1)]);
    }

    #[test]
    fn test_pool_is_bounded() {
        let mut pool = ConstantPool::new();
        for _ in 0..MAX_CONSTANTS {
            pool.add(Value::Null).unwrap();
        }
        assert_eq!(pool.add(Value::Null), Err(CompileError::TooManyConstants(MAX_CONSTANTS)));
        assert_eq!(pool.len(), MAX_CONSTANTS);
    }
}
