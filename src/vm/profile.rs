// Thu Oct 15 2026 - Alex

use crate::structure::{Alignment, StructureError};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Measured,
    /// Detection failed and fallback defaults were used.
    Unknown,
}

/// Where a profile's numbers came from. Auto-detected values are guesses and
/// must never be shown as if a trusted configuration query produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Provenance {
    Authoritative,
    AutoDetected { confidence: Confidence },
}

impl Provenance {
    pub fn measured() -> Self {
        Self::AutoDetected { confidence: Confidence::Measured }
    }

    pub fn unknown() -> Self {
        Self::AutoDetected { confidence: Confidence::Unknown }
    }
}

/// Reference width, header size and object alignment of a runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlignmentProfile {
    runtime: String,
    address_width: u32,
    reference_width: u32,
    header_size: u64,
    granularity: Alignment,
    compressed_shift: Option<u32>,
    provenance: Provenance,
}

impl AlignmentProfile {
    /// Uncompressed, authoritative profile: references are `address_width` wide.
    pub fn new(address_width: u32, header_size: u64, granularity: Alignment) -> Self {
        Self {
            runtime: "unknown".to_string(),
            address_width,
            reference_width: address_width,
            header_size,
            granularity,
            compressed_shift: None,
            provenance: Provenance::Authoritative,
        }
    }

    /// 64-bit runtime with 4-byte references shifted by 3 and a 12-byte header.
    pub fn compressed_64() -> Self {
        Self::new(8, 12, Alignment::new(8)).with_compressed_references(4, 3)
    }

    /// 64-bit runtime with full-width references and a 16-byte header.
    pub fn uncompressed_64() -> Self {
        Self::new(8, 16, Alignment::new(8))
    }

    pub fn with_compressed_references(mut self, reference_width: u32, shift: u32) -> Self {
        self.reference_width = reference_width;
        self.compressed_shift = Some(shift);
        self
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    pub fn with_runtime(mut self, runtime: &str) -> Self {
        self.runtime = runtime.to_string();
        self
    }

    pub fn with_header_size(mut self, header_size: u64) -> Self {
        self.header_size = header_size;
        self
    }

    pub fn runtime(&self) -> &str {
        &self.runtime
    }

    pub fn address_width(&self) -> u32 {
        self.address_width
    }

    pub fn reference_width(&self) -> u32 {
        self.reference_width
    }

    pub fn header_size(&self) -> u64 {
        self.header_size
    }

    pub fn granularity(&self) -> Alignment {
        self.granularity
    }

    pub fn compressed_shift(&self) -> Option<u32> {
        self.compressed_shift
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn is_compressed(&self) -> bool {
        self.reference_width < self.address_width
    }

    pub fn is_authoritative(&self) -> bool {
        self.provenance == Provenance::Authoritative
    }

    pub fn align(&self, size: u64) -> u64 {
        self.granularity.align(size)
    }

    pub fn checked_align(&self, size: u64) -> Option<u64> {
        self.granularity.checked_align(size)
    }
}

impl fmt::Display for AlignmentProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guessed = match self.provenance {
            Provenance::Authoritative => "",
            Provenance::AutoDetected { confidence: Confidence::Measured } => " (auto-detected, can be unreliable)",
            Provenance::AutoDetected { confidence: Confidence::Unknown } => " (detection failed, using defaults)",
        };
        write!(f, "Running {}-bit {} runtime.", self.address_width * 8, self.runtime)?;
        if self.is_compressed() {
            match self.compressed_shift {
                Some(shift) => write!(f, " Using compressed references with {}-bit shift.", shift)?,
                None => write!(f, " Using compressed references.")?,
            }
        }
        write!(
            f,
            " Objects have {}-byte headers and are {} bytes aligned{}.",
            self.header_size, self.granularity, guessed
        )
    }
}

/// Profile values recorded alongside a type registry, describing the runtime
/// the offsets were captured from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedRuntime {
    #[serde(default)]
    pub name: Option<String>,
    pub address_width: u32,
    pub reference_width: u32,
    pub header_size: u64,
    pub granularity: u64,
    #[serde(default)]
    pub compressed_shift: Option<u32>,
}

impl CapturedRuntime {
    pub fn to_profile(&self) -> Result<AlignmentProfile, StructureError> {
        let granularity = Alignment::try_new(self.granularity)?;
        let mut profile = AlignmentProfile::new(self.address_width, self.header_size, granularity)
            .with_runtime(self.name.as_deref().unwrap_or("captured"));
        if self.reference_width < self.address_width {
            let shift = self.compressed_shift.unwrap_or_else(|| granularity.log2());
            profile = profile.with_compressed_references(self.reference_width, shift);
        }
        Ok(profile)
    }
}
