// Thu Oct 15 2026 - Alex

use crate::structure::provider::FieldOffsetProvider;
use crate::structure::{FieldDescriptor, StructureError};
use std::collections::HashSet;

/// `type_name` followed by each of its ancestors, nearest first.
pub fn type_chain(provider: &dyn FieldOffsetProvider, type_name: &str) -> Result<Vec<String>, StructureError> {
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    let mut current = Some(type_name.to_string());

    while let Some(name) = current {
        if !seen.insert(name.clone()) {
            return Err(StructureError::InheritanceCycle(name));
        }
        current = provider.super_type(&name)?;
        chain.push(name);
    }

    Ok(chain)
}

/// Non-static fields of `type_name` and all of its ancestors, unsorted.
/// A field re-declared by a subtype stays a separate entry with its own
/// declaring type.
pub fn merged_fields(
    provider: &dyn FieldOffsetProvider,
    type_name: &str,
    reference_width: u32,
) -> Result<Vec<FieldDescriptor>, StructureError> {
    let mut fields = Vec::new();

    for owner in type_chain(provider, type_name)? {
        for handle in provider.enumerate_fields(&owner)? {
            if handle.is_static {
                continue;
            }
            let offset = provider.offset_of(&handle)?;
            fields.push(FieldDescriptor::new(
                &handle.name,
                &handle.declaring_type,
                offset,
                handle.kind,
                reference_width,
            ));
        }
    }

    Ok(fields)
}

/// Reference-kind subset of [`merged_fields`], in offset order.
pub fn reference_fields(
    provider: &dyn FieldOffsetProvider,
    type_name: &str,
    reference_width: u32,
) -> Result<Vec<FieldDescriptor>, StructureError> {
    let mut fields: Vec<FieldDescriptor> = merged_fields(provider, type_name, reference_width)?
        .into_iter()
        .filter(|f| f.is_reference())
        .collect();
    fields.sort_by_key(|f| f.offset);
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::{TypeDescriptor, TypeRegistry, ValueKind};

    fn registry() -> TypeRegistry {
        TypeRegistry::new()
            .with_type(TypeDescriptor::class("Base").field("id", ValueKind::Int, 12).field("owner", ValueKind::Reference, 16))
            .with_type(
                TypeDescriptor::class("Derived")
                    .with_super("Base")
                    .field("id", ValueKind::Int, 20)
                    .static_field("INSTANCES", ValueKind::Int, 112),
            )
    }

    #[test]
    fn test_type_chain_nearest_first() {
        let registry = registry();
        assert_eq!(type_chain(&registry, "Derived").unwrap(), vec!["Derived", "Base"]);
    }

    #[test]
    fn test_redeclared_field_keeps_both_owners() {
        let registry = registry();
        let fields = merged_fields(&registry, "Derived", 4).unwrap();
        assert_eq!(fields.len(), 3);

        let ids: Vec<(&str, u64)> = fields
            .iter()
            .filter(|f| f.name == "id")
            .map(|f| (f.declaring_type.as_str(), f.offset))
            .collect();
        assert_eq!(ids, vec![("Derived", 20), ("Base", 12)]);
        assert!(fields.iter().all(|f| !f.is_static));
    }

    #[test]
    fn test_reference_fields_include_ancestors() {
        let registry = registry();
        let refs = reference_fields(&registry, "Derived", 4).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].declaring_type, "Base");
        assert_eq!(refs[0].size, 4);
    }

    #[test]
    fn test_cycle_in_supertypes() {
        let registry = TypeRegistry::new()
            .with_type(TypeDescriptor::class("A").with_super("B"))
            .with_type(TypeDescriptor::class("B").with_super("A"));
        assert!(matches!(type_chain(&registry, "A"), Err(StructureError::InheritanceCycle(_))));
    }
}
