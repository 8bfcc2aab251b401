// Fri Oct 16 2026 - Alex

use crate::memory::{MemoryError, ObjectHeap, ObjectRef};
use crate::structure::provider::FieldOffsetProvider;
use crate::structure::{LayoutBuilder, LayoutCache, StructureError, TypeLayout, ValueKind};
use crate::vm::AlignmentProfile;
use std::sync::Arc;

/// Footprint of single instances. Precedence: the runtime's own precise size,
/// then the array formula, then the type's layout.
pub struct SizeCalculator<'a> {
    provider: &'a dyn FieldOffsetProvider,
    profile: AlignmentProfile,
    layouts: LayoutCache,
}

impl<'a> SizeCalculator<'a> {
    pub fn new(provider: &'a dyn FieldOffsetProvider, profile: AlignmentProfile) -> Self {
        Self {
            provider,
            profile,
            layouts: LayoutCache::new(),
        }
    }

    pub fn provider(&self) -> &'a dyn FieldOffsetProvider {
        self.provider
    }

    pub fn profile(&self) -> &AlignmentProfile {
        &self.profile
    }

    pub fn layout(&self, type_name: &str) -> Result<Arc<TypeLayout>, StructureError> {
        self.layouts.get_or_try_insert(type_name, || {
            LayoutBuilder::new(self.provider, &self.profile).build(type_name)
        })
    }

    pub fn cached_layouts(&self) -> usize {
        self.layouts.size()
    }

    pub fn element_scale(&self, element: ValueKind) -> u64 {
        element.size(self.profile.reference_width()) as u64
    }

    /// `None` when the footprint overflows a u64.
    pub fn array_size(&self, element: ValueKind, length: u64) -> Option<u64> {
        let base = self.provider.array_base_offset(element);
        let payload = length.checked_mul(self.element_scale(element))?;
        self.profile.checked_align(base.checked_add(payload)?)
    }

    pub fn size_of(&self, heap: &dyn ObjectHeap, obj: ObjectRef) -> Result<u64, MemoryError> {
        if let Some(precise) = heap.precise_instance_size(obj) {
            return self.profile.checked_align(precise).ok_or(MemoryError::SizeOverflow(obj));
        }

        let type_name = heap.type_of(obj)?;
        if let Some(element) = self.provider.element_kind(type_name)? {
            let length = heap.array_length(obj)?.ok_or(MemoryError::NotAnArray(obj))?;
            return self.array_size(element, length).ok_or(MemoryError::SizeOverflow(obj));
        }

        Ok(self.layout(type_name)?.aligned_size())
    }
}
