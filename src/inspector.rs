// Fri Oct 16 2026 - Alex

use crate::census::{Census, CensusError, HeapGraphWalker, SizePolicy};
use crate::memory::{Instantiator, MemoryError, ObjectHeap, ObjectRef};
use crate::structure::{FieldOffsetProvider, SizeCalculator, StructureError, TypeLayout};
use crate::vm::AlignmentProfile;
use log::info;
use std::sync::Arc;

/// Entry point bundling a field offset provider with the active profile.
/// Construct once and pass by reference; layouts are cached for its lifetime.
pub struct ObjectInspector<'a> {
    sizes: SizeCalculator<'a>,
    policy: SizePolicy,
}

impl<'a> ObjectInspector<'a> {
    pub fn new(provider: &'a dyn FieldOffsetProvider, profile: AlignmentProfile) -> Self {
        info!("{}", profile);
        Self {
            sizes: SizeCalculator::new(provider, profile),
            policy: SizePolicy::default(),
        }
    }

    pub fn with_size_policy(mut self, policy: SizePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn profile(&self) -> &AlignmentProfile {
        self.sizes.profile()
    }

    pub fn size_policy(&self) -> SizePolicy {
        self.policy
    }

    pub fn build_layout(&self, type_name: &str) -> Result<Arc<TypeLayout>, StructureError> {
        self.sizes.layout(type_name)
    }

    pub fn size_of(&self, heap: &dyn ObjectHeap, obj: ObjectRef) -> Result<u64, MemoryError> {
        self.sizes.size_of(heap, obj)
    }

    pub fn census(&self, heap: &dyn ObjectHeap, root: ObjectRef) -> Result<Census, CensusError> {
        HeapGraphWalker::new(heap, &self.sizes)
            .with_policy(self.policy)
            .census(root)
    }

    /// Default-constructs a root of `type_name` and takes its census.
    pub fn census_of_type<H>(&self, heap: &mut H, type_name: &str) -> Result<Census, CensusError>
    where
        H: ObjectHeap + Instantiator,
    {
        let root = heap.instantiate(type_name).map_err(CensusError::from_root)?;
        self.census(&*heap, root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::HeapSnapshot;
    use crate::structure::{FieldInit, TypeDescriptor, TypeRegistry, ValueKind};

    fn registry() -> Arc<TypeRegistry> {
        Arc::new(
            TypeRegistry::new()
                .with_type(
                    TypeDescriptor::class("Wrapper")
                        .field("flag", ValueKind::Boolean, 12)
                        .field_with_init(
                            "data",
                            ValueKind::Reference,
                            16,
                            FieldInit::Array { type_name: "long[]".to_string(), length: 4 },
                        ),
                )
                .with_type(TypeDescriptor::class("NoCtor").without_default_constructor())
                .with_type(TypeDescriptor::class("Orphan").with_super("Ghost"))
                .with_type(TypeDescriptor::class("Big").field_with_init(
                    "data",
                    ValueKind::Reference,
                    12,
                    FieldInit::Array { type_name: "long[]".to_string(), length: 1 << 62 },
                ))
                .with_type(TypeDescriptor::class("Endless").field_with_init(
                    "next",
                    ValueKind::Reference,
                    12,
                    FieldInit::New { type_name: "Endless".to_string() },
                ))
                .with_type(TypeDescriptor::array("long[]", ValueKind::Long)),
        )
    }

    #[test]
    fn test_layout_and_size() {
        let registry = registry();
        let inspector = ObjectInspector::new(registry.as_ref(), AlignmentProfile::compressed_64());

        let layout = inspector.build_layout("Wrapper").unwrap();
        assert_eq!(layout.raw_end(), 20);
        assert_eq!(layout.aligned_size(), 24);
        assert_eq!(layout.padding_bytes(), 3);
        assert!(Arc::ptr_eq(&layout, &inspector.build_layout("Wrapper").unwrap()));

        let mut heap = HeapSnapshot::new(registry.clone());
        let data = heap.allocate_array("long[]", 4).unwrap();
        assert_eq!(inspector.size_of(&heap, data).unwrap(), 48);
    }

    #[test]
    fn test_census_of_type() {
        let registry = registry();
        let inspector = ObjectInspector::new(registry.as_ref(), AlignmentProfile::compressed_64());
        let mut heap = HeapSnapshot::new(registry.clone());

        let census = inspector.census_of_type(&mut heap, "Wrapper").unwrap();
        assert_eq!(census.root_type(), "Wrapper");
        assert_eq!(census.total_count(), 2);
        assert_eq!(census.total_size(), 24 + 48);
    }

    #[test]
    fn test_instantiation_failures_abort() {
        let registry = registry();
        let inspector = ObjectInspector::new(registry.as_ref(), AlignmentProfile::compressed_64());
        let mut heap = HeapSnapshot::new(registry.clone());

        for type_name in ["NoCtor", "Endless", "Missing", "long[]", "Orphan"] {
            let err = inspector.census_of_type(&mut heap, type_name).unwrap_err();
            assert!(
                matches!(err, CensusError::Instantiation { .. }),
                "{} gave {:?}",
                type_name,
                err
            );
        }
        assert!(heap.is_empty());
    }

    #[test]
    fn test_oversized_array_degrades_its_entry() {
        let registry = registry();
        let inspector = ObjectInspector::new(registry.as_ref(), AlignmentProfile::compressed_64());
        let mut heap = HeapSnapshot::new(registry.clone());

        let census = inspector.census_of_type(&mut heap, "Big").unwrap();
        assert_eq!(census.total_count(), 2);
        assert_eq!(census.total_size(), 16);

        let data = census.get("long[]").unwrap();
        assert!(data.degraded);
        assert_eq!(data.aggregate_size, 0);
        assert!(!census.get("Big").unwrap().degraded);
    }
}
