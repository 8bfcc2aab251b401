// Fri Oct 16 2026 - Alex

use crate::memory::MemoryError;
use crate::structure::StructureError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CensusError {
    #[error("Cannot instantiate {type_name}: {reason}")]
    Instantiation { type_name: String, reason: String },
    #[error(transparent)]
    Memory(#[from] MemoryError),
    #[error(transparent)]
    Structure(#[from] StructureError),
}

impl CensusError {
    /// Lifts a heap failure raised while constructing the root, keeping
    /// instantiation failures distinct from other heap errors.
    pub fn from_root(error: MemoryError) -> Self {
        match error {
            MemoryError::Instantiation { type_name, reason } => Self::Instantiation { type_name, reason },
            other => Self::Memory(other),
        }
    }
}
