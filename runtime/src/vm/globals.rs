use crate::vm::{VMError, VMResult, Value};

/// Default number of global slots: every index a u16 operand can address
pub const DEFAULT_GLOBAL_CAPACITY: usize = u16::MAX as usize + 1;

/// Global variable slots, addressed by the index the compiler assigned.
///
/// Storage grows on first write instead of preallocating every slot; an
/// index stays bound to the same slot for the whole run.
#[derive(Debug, Clone)]
pub struct GlobalScope {
    slots: Vec<Option<Value>>,
    capacity: usize,
}

impl GlobalScope {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_GLOBAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Store `value` in slot `index`
    pub fn set(&mut self, index: u16, value: Value) -> VMResult<()> {
        let slot = index as usize;
        if slot >= self.capacity {
            return Err(VMError::InvalidGlobalIndex(index));
        }
        if self.slots.len() <= slot {
            self.slots.resize(slot + 1, None);
        }
        self.slots[slot] = Some(value);
        Ok(())
    }

    /// Read slot `index`; a slot never written reads as `Null`
    pub fn get(&self, index: u16) -> VMResult<Value> {
        let slot = index as usize;
        if slot >= self.capacity {
            return Err(VMError::InvalidGlobalIndex(index));
        }
        Ok(self.slots.get(slot).cloned().flatten().unwrap_or(Value::Null))
    }
}

impl Default for GlobalScope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_slot_reads_as_null() {
        let globals = GlobalScope::new();
        assert_eq!(globals.get(0), Ok(Value::Null));
        assert_eq!(globals.get(u16::MAX), Ok(Value::Null));
    }

    #[test]
    fn test_set_then_get() {
        let mut globals = GlobalScope::new();
        globals.set(3, Value::Integer(9)).unwrap();
        globals.set(3, Value::Integer(10)).unwrap();
        globals.set(u16::MAX, Value::from("last")).unwrap();

        assert_eq!(globals.get(3), Ok(Value::Integer(10)));
        assert_eq!(globals.get(2), Ok(Value::Null));
        assert_eq!(globals.get(u16::MAX), Ok(Value::from("last")));
    }

    #[test]
    fn test_capacity_is_enforced() {
        let mut globals = GlobalScope::with_capacity(2);
        assert!(globals.set(1, Value::Null).is_ok());
        assert_eq!(globals.set(2, Value::Null), Err(VMError::InvalidGlobalIndex(2)));
        assert_eq!(globals.get(5), Err(VMError::InvalidGlobalIndex(5)));
    }
}
