// Tue Jan 15 2026 - Alex

pub mod census;
pub mod config;
pub mod inspector;
pub mod memory;
pub mod output;
pub mod structure;
pub mod ui;
pub mod utils;
pub mod vm;

pub use census::{Census, CensusEntry, HeapGraphWalker, SizePolicy};
pub use config::Config;
pub use inspector::ObjectInspector;
pub use memory::{HeapSnapshot, ObjectHeap, ObjectRef};
pub use structure::{FieldOffsetProvider, LayoutBuilder, SizeCalculator, TypeLayout, TypeRegistry};
pub use vm::{AlignmentDetector, AlignmentProfile, NativeProbe};
