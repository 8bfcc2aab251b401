// Thu Oct 15 2026 - Alex

use crate::structure::{StructureError, TypeLayout};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Built layouts by type name. Entries are immutable once inserted.
pub struct LayoutCache {
    cache: RwLock<HashMap<String, Arc<TypeLayout>>>,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, type_name: &str) -> Option<Arc<TypeLayout>> {
        self.cache.read().get(type_name).cloned()
    }

    /// Returns the cached layout or builds and caches it. Failed builds are
    /// not cached.
    pub fn get_or_try_insert<F>(&self, type_name: &str, build: F) -> Result<Arc<TypeLayout>, StructureError>
    where
        F: FnOnce() -> Result<TypeLayout, StructureError>,
    {
        if let Some(layout) = self.get(type_name) {
            return Ok(layout);
        }
        let layout = Arc::new(build()?);
        Ok(self
            .cache
            .write()
            .entry(type_name.to_string())
            .or_insert(layout)
            .clone())
    }

    pub fn clear(&self) {
        self.cache.write().clear();
    }

    pub fn size(&self) -> usize {
        self.cache.read().len()
    }
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}
