// Thu Oct 15 2026 - Alex

use crate::structure::{Alignment, FieldDescriptor};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GapKind {
    /// Unused bytes between the header or a field and the next field.
    Padding,
    /// Bytes lost rounding the instance up to the next object boundary.
    AlignmentLoss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Gap {
    pub offset: u64,
    pub size: u64,
    pub kind: GapKind,
}

/// Ordered placement of a type's instance fields plus header and padding.
#[derive(Debug, Clone, Serialize)]
pub struct TypeLayout {
    pub(crate) type_name: String,
    pub(crate) header_size: u64,
    pub(crate) fields: Vec<FieldDescriptor>,
    pub(crate) gaps: Vec<Gap>,
    pub(crate) raw_end: u64,
    pub(crate) aligned_size: u64,
    pub(crate) granularity: Alignment,
}

impl TypeLayout {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn header_size(&self) -> u64 {
        self.header_size
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn gaps(&self) -> &[Gap] {
        &self.gaps
    }

    pub fn raw_end(&self) -> u64 {
        self.raw_end
    }

    pub fn aligned_size(&self) -> u64 {
        self.aligned_size
    }

    pub fn granularity(&self) -> Alignment {
        self.granularity
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn padding_gaps(&self) -> impl Iterator<Item = &Gap> {
        self.gaps.iter().filter(|g| g.kind == GapKind::Padding)
    }

    pub fn padding_bytes(&self) -> u64 {
        self.padding_gaps().map(|g| g.size).sum()
    }

    pub fn alignment_loss(&self) -> u64 {
        self.gaps
            .iter()
            .filter(|g| g.kind == GapKind::AlignmentLoss)
            .map(|g| g.size)
            .sum()
    }

    pub fn field_bytes(&self) -> u64 {
        self.fields.iter().map(|f| f.size as u64).sum()
    }

    pub fn reference_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_reference())
    }

    /// Total bytes not holding header or field data.
    pub fn wasted_bytes(&self) -> u64 {
        self.padding_bytes() + self.alignment_loss()
    }
}
