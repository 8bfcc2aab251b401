// Thu Oct 15 2026 - Alex

use crate::memory::{MemoryError, ObjectRef};
use crate::structure::FieldDescriptor;

/// Read access to a quiescent object graph.
pub trait ObjectHeap {
    fn type_of(&self, obj: ObjectRef) -> Result<&str, MemoryError>;
    /// Element count for array-like objects, `None` for regular objects.
    fn array_length(&self, obj: ObjectRef) -> Result<Option<u64>, MemoryError>;
    fn read_reference(&self, obj: ObjectRef, field: &FieldDescriptor) -> Result<Option<ObjectRef>, MemoryError>;
    fn read_element(&self, obj: ObjectRef, index: u64) -> Result<Option<ObjectRef>, MemoryError>;

    /// Whole-object size reported by the runtime itself, when it can tell.
    fn precise_instance_size(&self, _obj: ObjectRef) -> Option<u64> {
        None
    }
}

/// Default construction of a fresh instance of a named type.
pub trait Instantiator {
    fn instantiate(&mut self, type_name: &str) -> Result<ObjectRef, MemoryError>;
}
