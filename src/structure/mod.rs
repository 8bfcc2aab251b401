// Thu Oct 15 2026 - Alex

pub mod alignment;
pub mod builder;
pub mod cache;
pub mod calculator;
pub mod error;
pub mod field;
pub mod hierarchy;
pub mod layout;
pub mod provider;
pub mod registry;
pub mod type_info;

pub use alignment::Alignment;
pub use builder::LayoutBuilder;
pub use cache::LayoutCache;
pub use calculator::SizeCalculator;
pub use error::StructureError;
pub use field::FieldDescriptor;
pub use layout::{Gap, GapKind, TypeLayout};
pub use provider::{FieldHandle, FieldOffsetProvider};
pub use registry::{DeclaredField, FieldInit, TypeDescriptor, TypeRegistry};
pub use type_info::ValueKind;
