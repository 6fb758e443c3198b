//! Bucketed hash map used for `HashMap` runtime values.
//!
//! Keys are spread over a fixed bucket array by `hash_key() % buckets`.
//! Each bucket keeps a short list of entries, so two keys landing in the
//! same bucket are both retained and told apart by structural equality.

use std::fmt;
use crate::vm::Value;

/// Number of buckets allocated for a new map
pub const DEFAULT_BUCKETS: usize = 64;

#[derive(Clone, Debug)]
pub struct HashMapObject {
    buckets: Vec<Vec<(Value, Value)>>,
    len: usize,
}

impl HashMapObject {
    pub fn new() -> Self {
        Self::with_buckets(DEFAULT_BUCKETS)
    }

    /// Create a map with `count` buckets (at least one)
    pub fn with_buckets(count: usize) -> Self {
        Self {
            buckets: vec![Vec::new(); count.max(1)],
            len: 0,
        }
    }

    /// Bucket that `key` lands in
    pub fn bucket_index(&self, key: &Value) -> usize {
        (key.hash_key() % self.buckets.len() as u64) as usize
    }

    /// Insert or replace; returns the previous value for an equal key
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        let index = self.bucket_index(&key);
        let bucket = &mut self.buckets[index];
        if let Some(entry) = bucket.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(&mut entry.1, value));
        }
        bucket.push((key, value));
        self.len += 1;
        None
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.buckets[self.bucket_index(key)]
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.buckets.iter().flatten().map(|(k, v)| (k, v))
    }
}

impl Default for HashMapObject {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for HashMapObject {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl fmt::Display for HashMapObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        write!(f, "}}")
    }
}
