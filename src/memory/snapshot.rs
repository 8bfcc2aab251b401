// Thu Oct 15 2026 - Alex

use crate::memory::{Instantiator, MemoryError, ObjectHeap, ObjectRef};
use crate::structure::hierarchy;
use crate::structure::{FieldDescriptor, FieldInit, TypeRegistry, ValueKind};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub type Factory = Arc<dyn Fn(&mut HeapSnapshot) -> Result<ObjectRef, MemoryError> + Send + Sync>;

/// (declaring type, field name)
type SlotKey = (String, String);

#[derive(Debug, Clone)]
struct HeapObject {
    type_name: String,
    slots: HashMap<SlotKey, Option<ObjectRef>>,
    element: Option<ValueKind>,
    elements: Vec<Option<ObjectRef>>,
    length: Option<u64>,
    precise_size: Option<u64>,
}

/// Arena of objects described by a [`TypeRegistry`], addressed by index.
pub struct HeapSnapshot {
    registry: Arc<TypeRegistry>,
    objects: Vec<HeapObject>,
    denied: HashSet<SlotKey>,
    factories: HashMap<String, Factory>,
}

impl HeapSnapshot {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry,
            objects: Vec::new(),
            denied: HashSet::new(),
            factories: HashMap::new(),
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Raw allocation of a regular object with every reference slot null.
    /// No constructor logic runs.
    pub fn allocate(&mut self, type_name: &str) -> Result<ObjectRef, MemoryError> {
        let descriptor = self.registry.descriptor(type_name)?;
        if descriptor.is_array() {
            return Err(MemoryError::instantiation(type_name, "use allocate_array for array types"));
        }

        let mut slots = HashMap::new();
        for owner in hierarchy::type_chain(self.registry.as_ref(), type_name)? {
            let owner_descriptor = self.registry.descriptor(&owner)?;
            for field in owner_descriptor.fields.iter().filter(|f| !f.is_static && f.kind.is_reference()) {
                slots.insert((owner.clone(), field.name.clone()), None);
            }
        }

        Ok(self.push(HeapObject {
            type_name: type_name.to_string(),
            slots,
            element: None,
            elements: Vec::new(),
            length: None,
            precise_size: None,
        }))
    }

    pub fn allocate_array(&mut self, type_name: &str, length: u64) -> Result<ObjectRef, MemoryError> {
        let descriptor = self.registry.descriptor(type_name)?;
        let element = descriptor
            .element
            .ok_or_else(|| MemoryError::instantiation(type_name, "not an array type"))?;
        let mut elements = Vec::new();
        if element.is_reference() {
            let slots = usize::try_from(length)
                .map_err(|_| MemoryError::instantiation(type_name, "length exceeds the address space"))?;
            elements
                .try_reserve_exact(slots)
                .map_err(|e| MemoryError::instantiation(type_name, &e.to_string()))?;
            elements.resize(slots, None);
        }

        Ok(self.push(HeapObject {
            type_name: type_name.to_string(),
            slots: HashMap::new(),
            element: Some(element),
            elements,
            length: Some(length),
            precise_size: None,
        }))
    }

    /// Sets the reference field `name` as seen from the object's own type,
    /// i.e. the nearest declaration in its supertype chain.
    pub fn set_field(&mut self, obj: ObjectRef, name: &str, value: Option<ObjectRef>) -> Result<(), MemoryError> {
        let type_name = self.object(obj)?.type_name.clone();
        let owner = hierarchy::type_chain(self.registry.as_ref(), &type_name)?
            .into_iter()
            .find(|owner| self.object(obj).map(|o| o.slots.contains_key(&(owner.clone(), name.to_string()))).unwrap_or(false))
            .ok_or_else(|| MemoryError::NotAReference {
                object: obj,
                field: name.to_string(),
            })?;
        self.set_declared_field(obj, &owner, name, value)
    }

    pub fn set_declared_field(
        &mut self,
        obj: ObjectRef,
        declaring_type: &str,
        name: &str,
        value: Option<ObjectRef>,
    ) -> Result<(), MemoryError> {
        if let Some(target) = value {
            self.object(target)?;
        }
        let slot = self
            .object_mut(obj)?
            .slots
            .get_mut(&(declaring_type.to_string(), name.to_string()))
            .ok_or_else(|| MemoryError::NotAReference {
                object: obj,
                field: format!("{}.{}", declaring_type, name),
            })?;
        *slot = value;
        Ok(())
    }

    pub fn set_element(&mut self, obj: ObjectRef, index: u64, value: Option<ObjectRef>) -> Result<(), MemoryError> {
        if let Some(target) = value {
            self.object(target)?;
        }
        let object = self.object_mut(obj)?;
        let length = object.length.ok_or(MemoryError::NotAnArray(obj))?;
        let slot = object
            .elements
            .get_mut(index as usize)
            .ok_or(MemoryError::OutOfBounds { object: obj, index, length })?;
        *slot = value;
        Ok(())
    }

    pub fn set_precise_size(&mut self, obj: ObjectRef, size: u64) -> Result<(), MemoryError> {
        self.object_mut(obj)?.precise_size = Some(size);
        Ok(())
    }

    /// Makes reads of `declaring_type.name` fail with `AccessDenied`.
    pub fn deny_access(&mut self, declaring_type: &str, name: &str) {
        self.denied.insert((declaring_type.to_string(), name.to_string()));
    }

    pub fn register_factory<F>(&mut self, type_name: &str, factory: F)
    where
        F: Fn(&mut HeapSnapshot) -> Result<ObjectRef, MemoryError> + Send + Sync + 'static,
    {
        self.factories.insert(type_name.to_string(), Arc::new(factory));
    }

    fn push(&mut self, object: HeapObject) -> ObjectRef {
        let obj = ObjectRef::new(self.objects.len() as u64);
        self.objects.push(object);
        obj
    }

    fn object(&self, obj: ObjectRef) -> Result<&HeapObject, MemoryError> {
        self.objects.get(obj.index()).ok_or(MemoryError::UnknownObject(obj))
    }

    fn object_mut(&mut self, obj: ObjectRef) -> Result<&mut HeapObject, MemoryError> {
        self.objects.get_mut(obj.index()).ok_or(MemoryError::UnknownObject(obj))
    }

    fn construct(&mut self, type_name: &str, in_progress: &mut Vec<String>) -> Result<ObjectRef, MemoryError> {
        if let Some(factory) = self.factories.get(type_name).cloned() {
            return factory(self);
        }

        let registry = Arc::clone(&self.registry);
        let descriptor = registry
            .descriptor(type_name)
            .map_err(|e| MemoryError::instantiation(type_name, &e.to_string()))?;
        if descriptor.is_array() {
            return Err(MemoryError::instantiation(type_name, "array types have no default constructor"));
        }
        if !descriptor.default_constructible {
            return Err(MemoryError::instantiation(type_name, "no default constructor"));
        }
        if in_progress.iter().any(|t| t == type_name) {
            return Err(MemoryError::instantiation(type_name, "recursive default construction"));
        }

        in_progress.push(type_name.to_string());
        let result = self.populate(&registry, type_name, in_progress);
        in_progress.pop();

        result.map_err(|e| match e {
            MemoryError::Instantiation { .. } => e,
            other => MemoryError::instantiation(type_name, &other.to_string()),
        })
    }

    fn populate(
        &mut self,
        registry: &TypeRegistry,
        type_name: &str,
        in_progress: &mut Vec<String>,
    ) -> Result<ObjectRef, MemoryError> {
        let obj = self.allocate(type_name)?;

        for owner in hierarchy::type_chain(registry, type_name)? {
            let owner_descriptor = registry.descriptor(&owner)?;
            for field in owner_descriptor.fields.iter().filter(|f| !f.is_static && f.kind.is_reference()) {
                let value = match &field.init {
                    FieldInit::Null => None,
                    FieldInit::This => Some(obj),
                    FieldInit::New { type_name: nested } => Some(self.construct(nested, in_progress)?),
                    FieldInit::Array { type_name: nested, length } => Some(self.allocate_array(nested, *length)?),
                };
                self.set_declared_field(obj, &owner, &field.name, value)?;
            }
        }
        Ok(obj)
    }
}

impl ObjectHeap for HeapSnapshot {
    fn type_of(&self, obj: ObjectRef) -> Result<&str, MemoryError> {
        Ok(&self.object(obj)?.type_name)
    }

    fn array_length(&self, obj: ObjectRef) -> Result<Option<u64>, MemoryError> {
        Ok(self.object(obj)?.length)
    }

    fn read_reference(&self, obj: ObjectRef, field: &FieldDescriptor) -> Result<Option<ObjectRef>, MemoryError> {
        let object = self.object(obj)?;
        let key = (field.declaring_type.clone(), field.name.clone());
        if self.denied.contains(&key) {
            return Err(MemoryError::AccessDenied {
                object: obj,
                field: field.qualified_name(),
            });
        }
        object.slots.get(&key).copied().ok_or_else(|| MemoryError::NotAReference {
            object: obj,
            field: field.qualified_name(),
        })
    }

    fn read_element(&self, obj: ObjectRef, index: u64) -> Result<Option<ObjectRef>, MemoryError> {
        let object = self.object(obj)?;
        let length = object.length.ok_or(MemoryError::NotAnArray(obj))?;
        if object.element.map_or(false, |k| k.is_primitive()) {
            return Err(MemoryError::NotAReference {
                object: obj,
                field: format!("[{}]", index),
            });
        }
        object
            .elements
            .get(index as usize)
            .copied()
            .ok_or(MemoryError::OutOfBounds { object: obj, index, length })
    }

    fn precise_instance_size(&self, obj: ObjectRef) -> Option<u64> {
        self.object(obj).ok().and_then(|o| o.precise_size)
    }
}

impl Instantiator for HeapSnapshot {
    /// On failure the snapshot is rolled back to the objects it held before.
    fn instantiate(&mut self, type_name: &str) -> Result<ObjectRef, MemoryError> {
        let mut in_progress = Vec::new();
        let mark = self.objects.len();
        let obj = match self.construct(type_name, &mut in_progress) {
            Ok(obj) => obj,
            Err(e) => {
                self.objects.truncate(mark);
                return Err(e);
            }
        };
        log::debug!("Instantiated {} as {} ({} objects in snapshot)", type_name, obj, self.len());
        Ok(obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::TypeDescriptor;

    fn registry() -> Arc<TypeRegistry> {
        Arc::new(
            TypeRegistry::new()
                .with_type(
                    TypeDescriptor::class("Node")
                        .field("value", ValueKind::Int, 12)
                        .field("next", ValueKind::Reference, 16),
                )
                .with_type(TypeDescriptor::class("SelfLoop").field_with_init("me", ValueKind::Reference, 12, FieldInit::This))
                .with_type(TypeDescriptor::class("Chain").field_with_init(
                    "again",
                    ValueKind::Reference,
                    12,
                    FieldInit::New { type_name: "Chain".to_string() },
                ))
                .with_type(
                    TypeDescriptor::class("Holder")
                        .field_with_init("node", ValueKind::Reference, 12, FieldInit::New { type_name: "Node".to_string() })
                        .field_with_init(
                            "items",
                            ValueKind::Reference,
                            16,
                            FieldInit::Array { type_name: "Object[]".to_string(), length: 3 },
                        ),
                )
                .with_type(TypeDescriptor::class("Abstract").without_default_constructor())
                .with_type(TypeDescriptor::class("Orphan").with_super("Ghost"))
                .with_type(TypeDescriptor::class("Dangling").field_with_init(
                    "items",
                    ValueKind::Reference,
                    12,
                    FieldInit::Array { type_name: "Missing[]".to_string(), length: 2 },
                ))
                .with_type(TypeDescriptor::array("Object[]", ValueKind::Reference))
                .with_type(TypeDescriptor::array("int[]", ValueKind::Int)),
        )
    }

    fn field(heap: &HeapSnapshot, owner: &str, name: &str) -> FieldDescriptor {
        let declared = heap.registry().get(owner).unwrap().declared_field(name).unwrap();
        FieldDescriptor::new(name, owner, declared.offset, declared.kind, 4)
    }

    #[test]
    fn test_allocate_and_link() {
        let mut heap = HeapSnapshot::new(registry());
        let a = heap.allocate("Node").unwrap();
        let b = heap.allocate("Node").unwrap();
        assert_ne!(a, b);

        heap.set_field(a, "next", Some(b)).unwrap();
        let next = field(&heap, "Node", "next");
        assert_eq!(heap.read_reference(a, &next).unwrap(), Some(b));
        assert_eq!(heap.read_reference(b, &next).unwrap(), None);
        assert_eq!(heap.type_of(a).unwrap(), "Node");
        assert_eq!(heap.array_length(a).unwrap(), None);
    }

    #[test]
    fn test_primitive_field_is_not_a_slot() {
        let mut heap = HeapSnapshot::new(registry());
        let a = heap.allocate("Node").unwrap();
        assert!(matches!(heap.set_field(a, "value", None), Err(MemoryError::NotAReference { .. })));
    }

    #[test]
    fn test_arrays() {
        let mut heap = HeapSnapshot::new(registry());
        let node = heap.allocate("Node").unwrap();
        let refs = heap.allocate_array("Object[]", 2).unwrap();
        let ints = heap.allocate_array("int[]", 10).unwrap();

        heap.set_element(refs, 1, Some(node)).unwrap();
        assert_eq!(heap.read_element(refs, 0).unwrap(), None);
        assert_eq!(heap.read_element(refs, 1).unwrap(), Some(node));
        assert!(matches!(heap.read_element(refs, 2), Err(MemoryError::OutOfBounds { .. })));
        assert_eq!(heap.array_length(ints).unwrap(), Some(10));
        assert!(heap.read_element(ints, 0).is_err());
    }

    #[test]
    fn test_denied_access() {
        let mut heap = HeapSnapshot::new(registry());
        let a = heap.allocate("Node").unwrap();
        heap.deny_access("Node", "next");
        let err = heap.read_reference(a, &field(&heap, "Node", "next")).unwrap_err();
        assert!(err.is_access_denied());
    }

    #[test]
    fn test_instantiate_follows_inits() {
        let mut heap = HeapSnapshot::new(registry());
        let holder = heap.instantiate("Holder").unwrap();
        let node = heap.read_reference(holder, &field(&heap, "Holder", "node")).unwrap().unwrap();
        let items = heap.read_reference(holder, &field(&heap, "Holder", "items")).unwrap().unwrap();
        assert_eq!(heap.type_of(node).unwrap(), "Node");
        assert_eq!(heap.array_length(items).unwrap(), Some(3));
        assert_eq!(heap.len(), 3);
    }

    #[test]
    fn test_instantiate_self_reference() {
        let mut heap = HeapSnapshot::new(registry());
        let obj = heap.instantiate("SelfLoop").unwrap();
        assert_eq!(heap.read_reference(obj, &field(&heap, "SelfLoop", "me")).unwrap(), Some(obj));
    }

    #[test]
    fn test_instantiation_failures() {
        let mut heap = HeapSnapshot::new(registry());
        for type_name in ["Chain", "Abstract", "int[]", "Missing", "Orphan", "Dangling"] {
            assert!(
                matches!(heap.instantiate(type_name), Err(MemoryError::Instantiation { .. })),
                "{} should not be constructible",
                type_name
            );
        }
    }

    #[test]
    fn test_factory_takes_precedence() {
        let mut heap = HeapSnapshot::new(registry());
        heap.register_factory("Abstract", |heap| heap.allocate("Abstract"));
        let obj = heap.instantiate("Abstract").unwrap();
        assert_eq!(heap.type_of(obj).unwrap(), "Abstract");
    }

    #[test]
    fn test_failed_instantiation_leaves_snapshot_unchanged() {
        let mut heap = HeapSnapshot::new(registry());
        heap.allocate("Node").unwrap();

        assert!(heap.instantiate("Chain").is_err());
        assert!(heap.instantiate("Dangling").is_err());
        assert_eq!(heap.len(), 1);

        heap.instantiate("Holder").unwrap();
        assert_eq!(heap.len(), 4);
    }

    #[test]
    fn test_unallocatable_reference_array() {
        let mut heap = HeapSnapshot::new(registry());
        let err = heap.allocate_array("Object[]", u64::MAX).unwrap_err();
        assert!(matches!(err, MemoryError::Instantiation { .. }));
        assert!(heap.is_empty());

        let ints = heap.allocate_array("int[]", 1 << 62).unwrap();
        assert_eq!(heap.array_length(ints).unwrap(), Some(1 << 62));
    }
}
