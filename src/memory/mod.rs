// Thu Oct 15 2026 - Alex

pub mod address;
pub mod error;
pub mod snapshot;
pub mod traits;

pub use address::ObjectRef;
pub use error::MemoryError;
pub use snapshot::{Factory, HeapSnapshot};
pub use traits::{Instantiator, ObjectHeap};
