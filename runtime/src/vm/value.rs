use std::fmt;
use std::hash::Hasher;
use std::sync::Arc;
use rustc_hash::FxHasher;
use crate::vm::HashMapObject;

/// Type tags surfaced to boundary code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Null,
    Integer,
    Boolean,
    String,
    Array,
    HashMap,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Null => "NULL",
            ObjectType::Integer => "INTEGER",
            ObjectType::Boolean => "BOOLEAN",
            ObjectType::String => "STRING",
            ObjectType::Array => "ARRAY",
            ObjectType::HashMap => "HASHMAP",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a value in the VM
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Boolean(bool),
    String(String),
    Array(Arc<Vec<Value>>),
    HashMap(Arc<HashMapObject>),
}

/// The two boolean values; there are no others
pub const TRUE: Value = Value::Boolean(true);
pub const FALSE: Value = Value::Boolean(false);
pub const NULL: Value = Value::Null;

impl Value {
    /// The canonical boolean value for `b`
    pub fn from_bool(b: bool) -> Self {
        if b { TRUE } else { FALSE }
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            Value::Null => ObjectType::Null,
            Value::Integer(_) => ObjectType::Integer,
            Value::Boolean(_) => ObjectType::Boolean,
            Value::String(_) => ObjectType::String,
            Value::Array(_) => ObjectType::Array,
            Value::HashMap(_) => ObjectType::HashMap,
        }
    }

    /// Type tag as text, e.g. "INTEGER"
    pub fn type_name(&self) -> &'static str {
        self.object_type().as_str()
    }

    /// Checks if the value is truthy (used by conditional jumps).
    ///
    /// Integers are truthy only when strictly positive, so `0` and every
    /// negative number are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Integer(i) => *i > 0,
            Value::String(_) | Value::Array(_) | Value::HashMap(_) => true,
        }
    }

    /// Structural hash of the tagged contents, used to pick a hash map bucket
    pub fn hash_key(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.write_hash(&mut hasher);
        hasher.finish()
    }

    fn write_hash(&self, hasher: &mut FxHasher) {
        hasher.write_u8(self.object_type() as u8);
        match self {
            Value::Null => {},
            Value::Integer(i) => hasher.write_i64(*i),
            Value::Boolean(b) => hasher.write_u8(*b as u8),
            Value::String(s) => {
                hasher.write(s.as_bytes());
                hasher.write_u8(0xFF);
            },
            Value::Array(elements) => {
                hasher.write_usize(elements.len());
                for element in elements.iter() {
                    element.write_hash(hasher);
                }
            },
            Value::HashMap(map) => {
                // Entry order depends on bucket layout, so combine order-independently
                let combined = map
                    .iter()
                    .fold(0u64, |acc, (k, v)| acc.wrapping_add(k.hash_key() ^ v.hash_key().rotate_left(32)));
                hasher.write_usize(map.len());
                hasher.write_u64(combined);
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Array(arr) => {
                write!(f, "[")?;
                for (i, val) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", val)?;
                }
                write!(f, "]")
            }
            Value::HashMap(map) => write!(f, "{}", map),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::from_bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(elements: Vec<Value>) -> Self {
        Value::Array(Arc::new(elements))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Integer(-123).to_string(), "-123");
        assert_eq!(TRUE.to_string(), "true");
        assert_eq!(Value::from("hello world").to_string(), "\"hello world\"");
    }

    #[test]
    fn test_value_array_display() {
        let value = Value::from(vec![Value::Integer(1), Value::from("test"), TRUE]);
        assert_eq!(value.to_string(), "[1, \"test\", true]");
        assert_eq!(Value::from(vec![]).to_string(), "[]");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Null.type_name(), "NULL");
        assert_eq!(Value::Integer(1).type_name(), "INTEGER");
        assert_eq!(FALSE.type_name(), "BOOLEAN");
        assert_eq!(Value::from("x").type_name(), "STRING");
        assert_eq!(Value::from(vec![]).type_name(), "ARRAY");
        assert_eq!(Value::HashMap(Arc::new(HashMapObject::new())).type_name(), "HASHMAP");
    }

    #[test]
    fn test_value_is_truthy() {
        // Falsy values
        assert!(!Value::Null.is_truthy());
        assert!(!FALSE.is_truthy());
        assert!(!Value::Integer(0).is_truthy());
        assert!(!Value::Integer(-1).is_truthy());
        assert!(!Value::Integer(i64::MIN).is_truthy());

        // Truthy values
        assert!(TRUE.is_truthy());
        assert!(Value::Integer(1).is_truthy());
        assert!(Value::from("").is_truthy());
        assert!(Value::from(vec![]).is_truthy());
    }

    #[test]
    fn test_boolean_singletons_compare_equal() {
        assert_eq!(Value::from_bool(true), TRUE);
        assert_eq!(Value::from(false), FALSE);
        assert_ne!(TRUE, FALSE);
    }

    #[test]
    fn test_hash_key_is_structural() {
        assert_eq!(Value::Integer(7).hash_key(), Value::Integer(7).hash_key());
        assert_eq!(Value::from("abc").hash_key(), Value::from("abc").hash_key());
        assert_ne!(Value::Integer(1).hash_key(), TRUE.hash_key());

        let a = Value::from(vec![Value::Integer(1), Value::from("b")]);
        let b = Value::from(vec![Value::Integer(1), Value::from("b")]);
        assert_eq!(a.hash_key(), b.hash_key());
    }

    #[test]
    fn test_hash_key_ignores_map_insertion_order() {
        let mut first = HashMapObject::new();
        first.insert(Value::Integer(1), Value::from("one"));
        first.insert(Value::Integer(2), Value::from("two"));

        let mut second = HashMapObject::new();
        second.insert(Value::Integer(2), Value::from("two"));
        second.insert(Value::Integer(1), Value::from("one"));

        assert_eq!(
            Value::HashMap(Arc::new(first)).hash_key(),
            Value::HashMap(Arc::new(second)).hash_key()
        );
    }

    #[test]
    fn test_value_large_numbers() {
        assert_eq!(Value::Integer(i64::MAX).to_string(), i64::MAX.to_string());
        assert_eq!(Value::Integer(i64::MIN).to_string(), i64::MIN.to_string());
    }
}
