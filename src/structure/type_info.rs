// Thu Oct 15 2026 - Alex

use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage kind of a field or of an array element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Float,
    Long,
    Double,
    Reference,
}

impl ValueKind {
    pub const PRIMITIVES: [ValueKind; 8] = [
        Self::Boolean,
        Self::Byte,
        Self::Short,
        Self::Char,
        Self::Int,
        Self::Float,
        Self::Long,
        Self::Double,
    ];

    /// Fixed byte width of a primitive kind; references depend on the runtime.
    pub fn primitive_size(self) -> Option<u32> {
        match self {
            Self::Boolean | Self::Byte => Some(1),
            Self::Short | Self::Char => Some(2),
            Self::Int | Self::Float => Some(4),
            Self::Long | Self::Double => Some(8),
            Self::Reference => None,
        }
    }

    pub fn size(self, reference_width: u32) -> u32 {
        self.primitive_size().unwrap_or(reference_width)
    }

    pub fn is_reference(self) -> bool {
        self == Self::Reference
    }

    pub fn is_primitive(self) -> bool {
        !self.is_reference()
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Char => "char",
            Self::Int => "int",
            Self::Float => "float",
            Self::Long => "long",
            Self::Double => "double",
            Self::Reference => "reference",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
