// Thu Oct 15 2026 - Alex

use crate::structure::provider::{FieldHandle, FieldOffsetProvider};
use crate::structure::{StructureError, ValueKind};
use crate::vm::CapturedRuntime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_ARRAY_BASE_OFFSET: u64 = 16;

/// Value a reference field takes when its owner is default-constructed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldInit {
    #[default]
    Null,
    This,
    New { type_name: String },
    Array { type_name: String, length: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredField {
    pub name: String,
    pub kind: ValueKind,
    pub offset: u64,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default, skip_serializing_if = "is_null_init")]
    pub init: FieldInit,
}

fn is_null_init(init: &FieldInit) -> bool {
    *init == FieldInit::Null
}

fn default_true() -> bool {
    true
}

/// Statically registered description of one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub name: String,
    #[serde(default)]
    pub super_type: Option<String>,
    #[serde(default)]
    pub fields: Vec<DeclaredField>,
    #[serde(default)]
    pub element: Option<ValueKind>,
    #[serde(default = "default_true")]
    pub default_constructible: bool,
}

impl TypeDescriptor {
    pub fn class(name: &str) -> Self {
        Self {
            name: name.to_string(),
            super_type: None,
            fields: Vec::new(),
            element: None,
            default_constructible: true,
        }
    }

    pub fn array(name: &str, element: ValueKind) -> Self {
        Self {
            element: Some(element),
            default_constructible: false,
            ..Self::class(name)
        }
    }

    pub fn with_super(mut self, super_type: &str) -> Self {
        self.super_type = Some(super_type.to_string());
        self
    }

    pub fn field(self, name: &str, kind: ValueKind, offset: u64) -> Self {
        self.field_with_init(name, kind, offset, FieldInit::Null)
    }

    pub fn field_with_init(mut self, name: &str, kind: ValueKind, offset: u64, init: FieldInit) -> Self {
        self.fields.push(DeclaredField {
            name: name.to_string(),
            kind,
            offset,
            is_static: false,
            init,
        });
        self
    }

    pub fn static_field(mut self, name: &str, kind: ValueKind, offset: u64) -> Self {
        self.fields.push(DeclaredField {
            name: name.to_string(),
            kind,
            offset,
            is_static: true,
            init: FieldInit::Null,
        });
        self
    }

    pub fn without_default_constructor(mut self) -> Self {
        self.default_constructible = false;
        self
    }

    pub fn is_array(&self) -> bool {
        self.element.is_some()
    }

    pub fn declared_field(&self, name: &str) -> Option<&DeclaredField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Per-type descriptor table, populated once at the integration boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeRegistry {
    #[serde(default)]
    runtime: Option<CapturedRuntime>,
    #[serde(default = "default_array_base_offset")]
    array_base_offset: u64,
    #[serde(default, with = "type_list")]
    types: IndexMap<String, TypeDescriptor>,
}

fn default_array_base_offset() -> u64 {
    DEFAULT_ARRAY_BASE_OFFSET
}

mod type_list {
    use super::TypeDescriptor;
    use indexmap::IndexMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(types: &IndexMap<String, TypeDescriptor>, serializer: S) -> Result<S::Ok, S::Error> {
        let list: Vec<&TypeDescriptor> = types.values().collect();
        list.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<IndexMap<String, TypeDescriptor>, D::Error> {
        let list = Vec::<TypeDescriptor>::deserialize(deserializer)?;
        Ok(list.into_iter().map(|t| (t.name.clone(), t)).collect())
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self {
            runtime: None,
            array_base_offset: DEFAULT_ARRAY_BASE_OFFSET,
            types: IndexMap::new(),
        }
    }

    pub fn with_array_base_offset(mut self, offset: u64) -> Self {
        self.array_base_offset = offset;
        self
    }

    pub fn with_runtime(mut self, runtime: CapturedRuntime) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn with_type(mut self, descriptor: TypeDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    pub fn register(&mut self, descriptor: TypeDescriptor) {
        if self.types.contains_key(&descriptor.name) {
            log::warn!("Replacing existing descriptor for {}", descriptor.name);
        }
        self.types.insert(descriptor.name.clone(), descriptor);
    }

    pub fn from_json(json: &str) -> Result<Self, StructureError> {
        serde_json::from_str(json).map_err(|e| StructureError::ParseError(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, StructureError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| StructureError::Io(format!("{}: {}", path.display(), e)))?;
        let registry = Self::from_json(&content)?;
        log::debug!("Loaded {} type descriptors from {}", registry.len(), path.display());
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    pub fn descriptor(&self, name: &str) -> Result<&TypeDescriptor, StructureError> {
        self.get(name).ok_or_else(|| StructureError::UnknownType(name.to_string()))
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }

    pub fn runtime(&self) -> Option<&CapturedRuntime> {
        self.runtime.as_ref()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldOffsetProvider for TypeRegistry {
    fn enumerate_fields(&self, type_name: &str) -> Result<Vec<FieldHandle>, StructureError> {
        let descriptor = self.descriptor(type_name)?;
        Ok(descriptor
            .fields
            .iter()
            .map(|f| FieldHandle {
                name: f.name.clone(),
                declaring_type: descriptor.name.clone(),
                is_static: f.is_static,
                kind: f.kind,
            })
            .collect())
    }

    fn offset_of(&self, field: &FieldHandle) -> Result<u64, StructureError> {
        self.descriptor(&field.declaring_type)?
            .declared_field(&field.name)
            .map(|f| f.offset)
            .ok_or_else(|| StructureError::FieldNotFound {
                type_name: field.declaring_type.clone(),
                field: field.name.clone(),
            })
    }

    fn super_type(&self, type_name: &str) -> Result<Option<String>, StructureError> {
        Ok(self.descriptor(type_name)?.super_type.clone())
    }

    fn element_kind(&self, type_name: &str) -> Result<Option<ValueKind>, StructureError> {
        Ok(self.descriptor(type_name)?.element)
    }

    fn array_base_offset(&self, _element: ValueKind) -> u64 {
        self.array_base_offset
    }
}
