// Thu Oct 15 2026 - Alex

use serde::Serialize;
use std::fmt;

/// Identity of a live object. Two objects with identical field values are
/// still distinct refs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ObjectRef {
    value: u64,
}

impl ObjectRef {
    pub fn new(value: u64) -> Self {
        Self { value }
    }

    pub fn as_u64(&self) -> u64 {
        self.value
    }

    pub fn index(&self) -> usize {
        self.value as usize
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.value)
    }
}

impl fmt::LowerHex for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.value, f)
    }
}

impl From<u64> for ObjectRef {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl From<ObjectRef> for u64 {
    fn from(obj: ObjectRef) -> Self {
        obj.value
    }
}
