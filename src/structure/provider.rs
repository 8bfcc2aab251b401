// Thu Oct 15 2026 - Alex

use crate::structure::{StructureError, ValueKind};

/// Field metadata as enumerated from a type, before its offset is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldHandle {
    pub name: String,
    pub declaring_type: String,
    pub is_static: bool,
    pub kind: ValueKind,
}

/// Source of raw field facts. Implementations may sit on top of privileged
/// runtime access; the layout core only consumes the answers as data.
pub trait FieldOffsetProvider: Send + Sync {
    /// Fields declared directly by `type_name`, in declaration order.
    fn enumerate_fields(&self, type_name: &str) -> Result<Vec<FieldHandle>, StructureError>;
    fn offset_of(&self, field: &FieldHandle) -> Result<u64, StructureError>;
    fn super_type(&self, type_name: &str) -> Result<Option<String>, StructureError>;
    /// Element kind for array-like types, `None` for regular types.
    fn element_kind(&self, type_name: &str) -> Result<Option<ValueKind>, StructureError>;
    fn array_base_offset(&self, element: ValueKind) -> u64;
}
