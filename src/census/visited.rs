// Fri Oct 16 2026 - Alex

use crate::memory::ObjectRef;
use ahash::AHashSet;

/// Identity-keyed membership. Two objects that compare equal by content are
/// still distinct entries.
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: AHashSet<ObjectRef>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `obj` was not seen before.
    pub fn insert(&mut self, obj: ObjectRef) -> bool {
        self.seen.insert(obj)
    }

    pub fn contains(&self, obj: ObjectRef) -> bool {
        self.seen.contains(&obj)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
