// Thu Oct 15 2026 - Alex

use crate::structure::StructureError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Power-of-two byte boundary that object sizes are rounded up to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Alignment {
    value: u64,
}

impl Alignment {
    pub fn new(value: u64) -> Self {
        assert!(value > 0 && value.is_power_of_two());
        Self { value }
    }

    pub fn try_new(value: u64) -> Result<Self, StructureError> {
        if value == 0 || !value.is_power_of_two() {
            return Err(StructureError::InvalidAlignment(value));
        }
        Ok(Self { value })
    }

    /// Largest power of two dividing `value`.
    pub fn largest_dividing(value: u64) -> Option<Self> {
        if value == 0 {
            return None;
        }
        Some(Self { value: value & value.wrapping_neg() })
    }

    pub fn as_u64(&self) -> u64 {
        self.value
    }

    pub fn log2(&self) -> u32 {
        self.value.trailing_zeros()
    }

    /// `None` when the shifted value no longer fits in a u64.
    pub fn shifted(&self, shift: u32) -> Option<Self> {
        let value = self.value.checked_shl(shift)?;
        (value >> shift == self.value).then_some(Self { value })
    }

    pub fn align(&self, offset: u64) -> u64 {
        (offset + self.value - 1) & !(self.value - 1)
    }

    pub fn checked_align(&self, offset: u64) -> Option<u64> {
        Some(offset.checked_add(self.value - 1)? & !(self.value - 1))
    }

    pub fn is_aligned(&self, offset: u64) -> bool {
        offset & (self.value - 1) == 0
    }
}

impl Default for Alignment {
    fn default() -> Self {
        Self::new(8)
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl TryFrom<u64> for Alignment {
    type Error = StructureError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<Alignment> for u64 {
    fn from(alignment: Alignment) -> Self {
        alignment.value
    }
}
