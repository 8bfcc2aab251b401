// Fri Oct 16 2026 - Alex

use crate::census::{Census, CensusError, SizePolicy, VisitedSet, WarningKind};
use crate::memory::{MemoryError, ObjectHeap, ObjectRef};
use crate::structure::{hierarchy, FieldDescriptor, SizeCalculator, ValueKind};
use log::debug;
use std::collections::HashMap;
use std::rc::Rc;

/// Layered breadth-first walk over everything reachable from a root.
pub struct HeapGraphWalker<'h, 's, 'p> {
    heap: &'h dyn ObjectHeap,
    sizes: &'s SizeCalculator<'p>,
    policy: SizePolicy,
}

/// Per-type facts reused across instances of the same type.
#[derive(Default)]
struct WalkState {
    references: HashMap<String, Rc<Vec<FieldDescriptor>>>,
    elements: HashMap<String, Option<ValueKind>>,
    first_sizes: HashMap<String, Option<u64>>,
}

impl<'h, 's, 'p> HeapGraphWalker<'h, 's, 'p> {
    pub fn new(heap: &'h dyn ObjectHeap, sizes: &'s SizeCalculator<'p>) -> Self {
        Self {
            heap,
            sizes,
            policy: SizePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: SizePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> SizePolicy {
        self.policy
    }

    pub fn census(&self, root: ObjectRef) -> Result<Census, CensusError> {
        let root_type = self.heap.type_of(root)?.to_string();
        let mut census = Census::new(&root_type, self.policy);
        let mut state = WalkState::default();
        let mut visited = VisitedSet::new();

        visited.insert(root);
        self.visit(root, &mut census, &mut state)?;

        let mut frontier = vec![root];
        let mut depth = 0usize;
        while !frontier.is_empty() {
            let mut next_layer = Vec::new();
            for &obj in &frontier {
                for target in self.outgoing(obj, &mut census, &mut state)? {
                    if visited.insert(target) {
                        self.visit(target, &mut census, &mut state)?;
                        next_layer.push(target);
                    }
                }
            }
            debug!("Census layer {}: {} objects, {} discovered", depth, frontier.len(), next_layer.len());
            frontier = next_layer;
            depth += 1;
        }

        debug!(
            "Census of {} visited {} objects of {} types",
            root_type,
            visited.len(),
            census.type_count()
        );
        Ok(census)
    }

    fn visit(&self, obj: ObjectRef, census: &mut Census, state: &mut WalkState) -> Result<(), CensusError> {
        let type_name = self.heap.type_of(obj)?.to_string();

        let size = match self.policy {
            SizePolicy::FirstInstance => match state.first_sizes.get(&type_name) {
                Some(&memo) => memo,
                None => {
                    let size = self.measure(obj, &type_name, census);
                    state.first_sizes.insert(type_name.clone(), size);
                    size
                }
            },
            SizePolicy::PerInstance => self.measure(obj, &type_name, census),
        };

        census.record(&type_name, size);
        Ok(())
    }

    fn measure(&self, obj: ObjectRef, type_name: &str, census: &mut Census) -> Option<u64> {
        match self.sizes.size_of(self.heap, obj) {
            Ok(size) => Some(size),
            Err(e) => {
                census.warn(WarningKind::SizeUnavailable, type_name, format!("size of {} unavailable: {}", obj, e));
                None
            }
        }
    }

    /// Non-null references held by `obj`. Unreadable edges are skipped with a
    /// warning; only an unknown handle aborts the walk.
    fn outgoing(&self, obj: ObjectRef, census: &mut Census, state: &mut WalkState) -> Result<Vec<ObjectRef>, CensusError> {
        let type_name = self.heap.type_of(obj)?.to_string();
        let mut targets = Vec::new();

        let element = match state.elements.get(&type_name) {
            Some(&element) => element,
            None => {
                let element = self.sizes.provider().element_kind(&type_name)?;
                state.elements.insert(type_name.clone(), element);
                element
            }
        };

        if let Some(element) = element {
            if !element.is_reference() {
                return Ok(targets);
            }
            let length = self.heap.array_length(obj)?.unwrap_or(0);
            for index in 0..length {
                match self.heap.read_element(obj, index) {
                    Ok(Some(target)) => targets.push(target),
                    Ok(None) => {}
                    Err(e) => self.skip_edge(e, &type_name, census)?,
                }
            }
            return Ok(targets);
        }

        let fields = match state.references.get(&type_name) {
            Some(fields) => Rc::clone(fields),
            None => {
                let fields = Rc::new(hierarchy::reference_fields(
                    self.sizes.provider(),
                    &type_name,
                    self.sizes.profile().reference_width(),
                )?);
                state.references.insert(type_name.clone(), Rc::clone(&fields));
                fields
            }
        };

        for field in fields.iter() {
            match self.heap.read_reference(obj, field) {
                Ok(Some(target)) => targets.push(target),
                Ok(None) => {}
                Err(e) => self.skip_edge(e, &type_name, census)?,
            }
        }

        Ok(targets)
    }

    fn skip_edge(&self, error: MemoryError, type_name: &str, census: &mut Census) -> Result<(), CensusError> {
        match error {
            MemoryError::UnknownObject(_) => Err(error.into()),
            MemoryError::AccessDenied { .. } => {
                census.warn(WarningKind::AccessDenied, type_name, format!("{}, edge skipped", error));
                Ok(())
            }
            other => {
                census.warn(WarningKind::UnreadableReference, type_name, format!("{}, edge skipped", other));
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::HeapSnapshot;
    use crate::structure::{FieldInit, TypeDescriptor, TypeRegistry};
    use crate::vm::AlignmentProfile;
    use std::sync::Arc;

    fn registry() -> Arc<TypeRegistry> {
        Arc::new(
            TypeRegistry::new()
                .with_type(TypeDescriptor::class("Loop").field_with_init("me", ValueKind::Reference, 12, FieldInit::This))
                .with_type(
                    TypeDescriptor::class("Node")
                        .field("value", ValueKind::Int, 12)
                        .field("left", ValueKind::Reference, 16)
                        .field("right", ValueKind::Reference, 20),
                )
                .with_type(
                    TypeDescriptor::class("Buffers")
                        .field_with_init(
                            "bytes",
                            ValueKind::Reference,
                            12,
                            FieldInit::Array { type_name: "byte[]".to_string(), length: 245 },
                        )
                        .field_with_init(
                            "ints",
                            ValueKind::Reference,
                            16,
                            FieldInit::Array { type_name: "int[]".to_string(), length: 245 },
                        ),
                )
                .with_type(TypeDescriptor::class("Leaf").field("id", ValueKind::Long, 16))
                .with_type(TypeDescriptor::class("Clash").field("a", ValueKind::Int, 12).field("b", ValueKind::Int, 12))
                .with_type(TypeDescriptor::array("byte[]", ValueKind::Byte))
                .with_type(TypeDescriptor::array("int[]", ValueKind::Int))
                .with_type(TypeDescriptor::array("Object[]", ValueKind::Reference)),
        )
    }

    fn calculator(registry: &TypeRegistry) -> SizeCalculator<'_> {
        SizeCalculator::new(registry, AlignmentProfile::compressed_64())
    }

    #[test]
    fn test_self_reference_counted_once() {
        let registry = registry();
        let mut heap = HeapSnapshot::new(registry.clone());
        let root = crate::memory::Instantiator::instantiate(&mut heap, "Loop").unwrap();

        let sizes = calculator(&registry);
        let census = HeapGraphWalker::new(&heap, &sizes).census(root).unwrap();
        assert_eq!(census.get("Loop").unwrap().count, 1);
        assert_eq!(census.total_count(), 1);
        assert_eq!(census.total_size(), 16);
    }

    #[test]
    fn test_primitive_arrays_only() {
        let registry = registry();
        let mut heap = HeapSnapshot::new(registry.clone());
        let root = crate::memory::Instantiator::instantiate(&mut heap, "Buffers").unwrap();

        let sizes = calculator(&registry);
        let census = HeapGraphWalker::new(&heap, &sizes).census(root).unwrap();
        assert_eq!(census.type_count(), 3);
        assert_eq!(census.get("Buffers").unwrap().count, 1);

        let bytes = census.get("byte[]").unwrap();
        assert_eq!(bytes.count, 1);
        assert!(bytes.aggregate_size >= 245);
        assert_eq!(bytes.aggregate_size, 264);

        let ints = census.get("int[]").unwrap();
        assert!(ints.aggregate_size >= 245 * 4);
        assert_eq!(ints.aggregate_size, 1000);
    }

    #[test]
    fn test_diamond_and_cycle_visited_once() {
        let registry = registry();
        let mut heap = HeapSnapshot::new(registry.clone());
        let root = heap.allocate("Node").unwrap();
        let left = heap.allocate("Node").unwrap();
        let right = heap.allocate("Node").unwrap();
        let shared = heap.allocate("Node").unwrap();
        heap.set_field(root, "left", Some(left)).unwrap();
        heap.set_field(root, "right", Some(right)).unwrap();
        heap.set_field(left, "left", Some(shared)).unwrap();
        heap.set_field(right, "right", Some(shared)).unwrap();
        heap.set_field(shared, "left", Some(root)).unwrap();

        let sizes = calculator(&registry);
        let census = HeapGraphWalker::new(&heap, &sizes).census(root).unwrap();
        let nodes = census.get("Node").unwrap();
        assert_eq!(nodes.count, 4);
        assert_eq!(nodes.aggregate_size, 4 * 24);
        assert!(census.warnings().is_empty());
    }

    #[test]
    fn test_reference_array_slots_followed() {
        let registry = registry();
        let mut heap = HeapSnapshot::new(registry.clone());
        let array = heap.allocate_array("Object[]", 4).unwrap();
        let leaf = heap.allocate("Leaf").unwrap();
        let other = heap.allocate("Leaf").unwrap();
        heap.set_element(array, 0, Some(leaf)).unwrap();
        heap.set_element(array, 2, Some(leaf)).unwrap();
        heap.set_element(array, 3, Some(other)).unwrap();

        let sizes = calculator(&registry);
        let census = HeapGraphWalker::new(&heap, &sizes).census(array).unwrap();
        assert_eq!(census.root_type(), "Object[]");
        assert_eq!(census.get("Leaf").unwrap().count, 2);
        assert_eq!(census.get("Object[]").unwrap().aggregate_size, 32);
        assert_eq!(census.total_count(), 3);
    }

    #[test]
    fn test_access_denied_edge_skipped() {
        let registry = registry();
        let mut heap = HeapSnapshot::new(registry.clone());
        let root = heap.allocate("Node").unwrap();
        let hidden = heap.allocate("Node").unwrap();
        let visible = heap.allocate("Node").unwrap();
        heap.set_field(root, "left", Some(hidden)).unwrap();
        heap.set_field(root, "right", Some(visible)).unwrap();
        heap.deny_access("Node", "left");

        let sizes = calculator(&registry);
        let census = HeapGraphWalker::new(&heap, &sizes).census(root).unwrap();
        assert_eq!(census.get("Node").unwrap().count, 2);
        assert!(!census.warnings().is_empty());
        assert!(census.warnings().iter().all(|w| w.kind == WarningKind::AccessDenied));
    }

    #[test]
    fn test_size_failure_degrades_entry() {
        let registry = registry();
        let mut heap = HeapSnapshot::new(registry.clone());
        let root = heap.allocate_array("Object[]", 1).unwrap();
        let clash = heap.allocate("Clash").unwrap();
        heap.set_element(root, 0, Some(clash)).unwrap();

        let sizes = calculator(&registry);
        let census = HeapGraphWalker::new(&heap, &sizes).census(root).unwrap();
        let entry = census.get("Clash").unwrap();
        assert_eq!(entry.count, 1);
        assert_eq!(entry.aggregate_size, 0);
        assert!(entry.degraded);
        assert_eq!(census.warnings()[0].kind, WarningKind::SizeUnavailable);
        assert!(!census.get("Object[]").unwrap().degraded);
    }

    #[test]
    fn test_size_policies_on_variable_arrays() {
        let registry = registry();
        let mut heap = HeapSnapshot::new(registry.clone());
        let root = heap.allocate_array("Object[]", 2).unwrap();
        let short = heap.allocate_array("byte[]", 1).unwrap();
        let long = heap.allocate_array("byte[]", 100).unwrap();
        heap.set_element(root, 0, Some(short)).unwrap();
        heap.set_element(root, 1, Some(long)).unwrap();

        let sizes = calculator(&registry);
        let first = HeapGraphWalker::new(&heap, &sizes).census(root).unwrap();
        assert_eq!(first.policy(), SizePolicy::FirstInstance);
        assert_eq!(first.get("byte[]").unwrap().aggregate_size, 2 * 24);

        let exact = HeapGraphWalker::new(&heap, &sizes)
            .with_policy(SizePolicy::PerInstance)
            .census(root)
            .unwrap();
        assert_eq!(exact.get("byte[]").unwrap().aggregate_size, 24 + 120);
    }

    #[test]
    fn test_aggregates_are_consistent() {
        let registry = registry();
        let mut heap = HeapSnapshot::new(registry.clone());
        let root = heap.allocate_array("Object[]", 3).unwrap();
        let buffers = crate::memory::Instantiator::instantiate(&mut heap, "Buffers").unwrap();
        let node = heap.allocate("Node").unwrap();
        heap.set_element(root, 0, Some(buffers)).unwrap();
        heap.set_element(root, 1, Some(node)).unwrap();
        heap.set_element(root, 2, Some(root)).unwrap();

        let sizes = calculator(&registry);
        let census = HeapGraphWalker::new(&heap, &sizes)
            .with_policy(SizePolicy::PerInstance)
            .census(root)
            .unwrap();

        let count: u64 = census.entries().map(|(_, e)| e.count).sum();
        let size: u64 = census.entries().map(|(_, e)| e.aggregate_size).sum();
        assert_eq!(count, 5);
        assert_eq!(count, census.total_count());
        assert_eq!(size, census.total_size());
    }

    #[test]
    fn test_unknown_root_is_error() {
        let registry = registry();
        let heap = HeapSnapshot::new(registry.clone());
        let sizes = calculator(&registry);
        let err = HeapGraphWalker::new(&heap, &sizes).census(ObjectRef::new(42)).unwrap_err();
        assert_eq!(err, CensusError::Memory(MemoryError::UnknownObject(ObjectRef::new(42))));
    }
}
