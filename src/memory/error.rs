// Thu Oct 15 2026 - Alex

use crate::memory::ObjectRef;
use crate::structure::StructureError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Unknown object {0}")]
    UnknownObject(ObjectRef),
    #[error("Access denied reading {field} of {object}")]
    AccessDenied { object: ObjectRef, field: String },
    #[error("Field {field} is not a reference slot of {object}")]
    NotAReference { object: ObjectRef, field: String },
    #[error("Index {index} out of bounds for {object} of length {length}")]
    OutOfBounds { object: ObjectRef, index: u64, length: u64 },
    #[error("{0} is not an array")]
    NotAnArray(ObjectRef),
    #[error("Size of {0} does not fit in 64 bits")]
    SizeOverflow(ObjectRef),
    #[error("Cannot instantiate {type_name}: {reason}")]
    Instantiation { type_name: String, reason: String },
    #[error(transparent)]
    Structure(#[from] StructureError),
}

impl MemoryError {
    pub fn instantiation(type_name: &str, reason: &str) -> Self {
        Self::Instantiation {
            type_name: type_name.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }
}
