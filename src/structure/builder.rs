// Thu Oct 15 2026 - Alex

use crate::structure::hierarchy;
use crate::structure::layout::{Gap, GapKind, TypeLayout};
use crate::structure::provider::FieldOffsetProvider;
use crate::structure::{FieldDescriptor, StructureError};
use crate::vm::AlignmentProfile;

/// Turns raw offset facts into a padded, aligned [`TypeLayout`].
pub struct LayoutBuilder<'a> {
    provider: &'a dyn FieldOffsetProvider,
    profile: &'a AlignmentProfile,
}

impl<'a> LayoutBuilder<'a> {
    pub fn new(provider: &'a dyn FieldOffsetProvider, profile: &'a AlignmentProfile) -> Self {
        Self { provider, profile }
    }

    pub fn build(&self, type_name: &str) -> Result<TypeLayout, StructureError> {
        let fields = hierarchy::merged_fields(self.provider, type_name, self.profile.reference_width())?;
        let layout = Self::from_fields(type_name, fields, self.profile)?;
        log::debug!(
            "Built layout for {}: {} fields, {} bytes ({} raw)",
            type_name,
            layout.fields.len(),
            layout.aligned_size,
            layout.raw_end
        );
        Ok(layout)
    }

    /// Lays out an already merged field set. Static fields are dropped.
    pub fn from_fields(
        type_name: &str,
        fields: Vec<FieldDescriptor>,
        profile: &AlignmentProfile,
    ) -> Result<TypeLayout, StructureError> {
        let mut fields: Vec<FieldDescriptor> = fields.into_iter().filter(|f| !f.is_static).collect();
        fields.sort_by_key(|f| f.offset);

        for pair in fields.windows(2) {
            if pair[0].offset == pair[1].offset {
                return Err(StructureError::conflict(
                    type_name,
                    format!(
                        "{} and {} share offset {}",
                        pair[0].qualified_name(),
                        pair[1].qualified_name(),
                        pair[0].offset
                    ),
                ));
            }
        }

        let header_size = profile.header_size();
        let mut gaps = Vec::new();
        let mut next_free = header_size;
        let mut previous: Option<&FieldDescriptor> = None;

        for field in &fields {
            if field.offset < next_free {
                let occupant = match previous {
                    Some(p) => p.qualified_name(),
                    None => "the object header".to_string(),
                };
                return Err(StructureError::conflict(
                    type_name,
                    format!(
                        "{} at offset {} overlaps {} ending at {}",
                        field.qualified_name(),
                        field.offset,
                        occupant,
                        next_free
                    ),
                ));
            }
            if field.offset > next_free {
                gaps.push(Gap {
                    offset: next_free,
                    size: field.offset - next_free,
                    kind: GapKind::Padding,
                });
            }
            next_free = field.end_offset().ok_or_else(|| {
                StructureError::conflict(
                    type_name,
                    format!("{} at offset {} runs past the end of the address range", field.qualified_name(), field.offset),
                )
            })?;
            previous = Some(field);
        }

        let raw_end = next_free;
        let aligned_size = profile.checked_align(raw_end).ok_or_else(|| {
            StructureError::conflict(type_name, format!("instance ending at {} cannot be aligned", raw_end))
        })?;
        if aligned_size != raw_end {
            gaps.push(Gap {
                offset: raw_end,
                size: aligned_size - raw_end,
                kind: GapKind::AlignmentLoss,
            });
        }

        Ok(TypeLayout {
            type_name: type_name.to_string(),
            header_size,
            fields,
            gaps,
            raw_end,
            aligned_size,
            granularity: profile.granularity(),
        })
    }
}
