// Fri Oct 16 2026 - Alex

pub mod entry;
pub mod error;
pub mod visited;
pub mod walker;

pub use entry::{Census, CensusEntry, CensusWarning, SizePolicy, WarningKind};
pub use error::CensusError;
pub use visited::VisitedSet;
pub use walker::HeapGraphWalker;
