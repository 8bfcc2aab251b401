// Thu Oct 15 2026 - Alex

use crate::structure::ValueKind;
use serde::Serialize;
use std::fmt;

/// One instance field placed in byte-offset space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub declaring_type: String,
    pub offset: u64,
    pub size: u32,
    pub is_static: bool,
    pub kind: ValueKind,
}

impl FieldDescriptor {
    pub fn new(name: &str, declaring_type: &str, offset: u64, kind: ValueKind, reference_width: u32) -> Self {
        Self {
            name: name.to_string(),
            declaring_type: declaring_type.to_string(),
            offset,
            size: kind.size(reference_width),
            is_static: false,
            kind,
        }
    }

    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// `None` when the field would end past the addressable range.
    pub fn end_offset(&self) -> Option<u64> {
        self.offset.checked_add(self.size as u64)
    }

    pub fn is_reference(&self) -> bool {
        self.kind.is_reference()
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.declaring_type, self.name)
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}: {} ({} bytes)", self.qualified_name(), self.offset, self.kind, self.size)
    }
}
