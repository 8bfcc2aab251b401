// Thu Oct 15 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    #[error("Unknown type: {0}")]
    UnknownType(String),
    #[error("Field not found: {type_name}.{field}")]
    FieldNotFound { type_name: String, field: String },
    #[error("Field offset conflict in {type_name}: {detail}")]
    FieldOffsetConflict { type_name: String, detail: String },
    #[error("Cyclic supertype chain through {0}")]
    InheritanceCycle(String),
    #[error("Invalid alignment: {0}")]
    InvalidAlignment(u64),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl StructureError {
    pub fn conflict(type_name: &str, detail: String) -> Self {
        Self::FieldOffsetConflict {
            type_name: type_name.to_string(),
            detail,
        }
    }

    pub fn is_offset_conflict(&self) -> bool {
        matches!(self, Self::FieldOffsetConflict { .. })
    }
}
