// Fri Oct 16 2026 - Alex

use crate::structure::Alignment;
use crate::utils::MathUtils;
use crate::vm::{AlignmentProfile, DetectionError, Provenance};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Runtime settings reported by a trusted source. The header size is not part
/// of it and always comes from the probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeOptions {
    pub runtime: String,
    #[serde(default)]
    pub compressed_shift: Option<u32>,
    pub granularity: Alignment,
}

impl RuntimeOptions {
    pub fn into_profile(self, address_width: u32, header_size: u64) -> AlignmentProfile {
        let mut profile = AlignmentProfile::new(address_width, header_size, self.granularity)
            .with_runtime(&self.runtime)
            .with_provenance(Provenance::Authoritative);
        if let Some(shift) = self.compressed_shift {
            profile = profile.with_compressed_references(4, shift);
        }
        profile
    }
}

/// A trusted answer about the runtime configuration. `Ok(None)` means the
/// source does not apply to this runtime.
pub trait ConfigurationSource {
    fn name(&self) -> &str;
    fn query(&self) -> Result<Option<RuntimeOptions>, DetectionError>;
}

const COMPRESSED_OOPS: &str = "UseCompressedOops";
const OBJECT_ALIGNMENT: &str = "ObjectAlignmentInBytes";
const DEFAULT_OBJECT_ALIGNMENT: u64 = 8;

/// Table of VM options as reported by a diagnostic query.
#[derive(Debug, Clone, Default)]
pub struct VmOptionsSource {
    options: HashMap<String, String>,
}

impl VmOptionsSource {
    pub fn new(options: HashMap<String, String>) -> Self {
        Self { options }
    }

    pub fn with_option(mut self, name: &str, value: &str) -> Self {
        self.options.insert(name.to_string(), value.to_string());
        self
    }

    fn invalid(name: &str, value: &str) -> DetectionError {
        DetectionError::InvalidOption {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

impl ConfigurationSource for VmOptionsSource {
    fn name(&self) -> &str {
        "HotSpot"
    }

    fn query(&self) -> Result<Option<RuntimeOptions>, DetectionError> {
        let compressed = match self.options.get(COMPRESSED_OOPS) {
            Some(value) => value
                .trim()
                .parse::<bool>()
                .map_err(|_| Self::invalid(COMPRESSED_OOPS, value))?,
            None => return Ok(None),
        };

        let granularity = match self.options.get(OBJECT_ALIGNMENT) {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .ok()
                .and_then(|v| Alignment::try_new(v).ok())
                .ok_or_else(|| Self::invalid(OBJECT_ALIGNMENT, value))?,
            None => Alignment::new(DEFAULT_OBJECT_ALIGNMENT),
        };

        let compressed_shift = compressed.then(|| MathUtils::log2(granularity.as_u64()));
        Ok(Some(RuntimeOptions {
            runtime: self.name().to_string(),
            compressed_shift,
            granularity,
        }))
    }
}

const COMPRESSED_REFS_MARKER: &str = "CompRefs";
const COMPRESSED_REFS_PATTERN: &str = r"^(.*?)References are compressed, with heap base (.*?) and shift (.*?)\.$";

/// Text dump of a diagnostic "print VM state" command.
#[derive(Debug, Clone)]
pub struct VmStateSource {
    dump: String,
    granularity: Alignment,
    pattern: Regex,
}

impl VmStateSource {
    pub fn new(dump: &str) -> Result<Self, DetectionError> {
        let pattern = Regex::new(COMPRESSED_REFS_PATTERN).map_err(|e| DetectionError::SourceFailed {
            source_name: "JRockit".to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            dump: dump.to_string(),
            granularity: Alignment::new(DEFAULT_OBJECT_ALIGNMENT),
            pattern,
        })
    }

    pub fn with_granularity(mut self, granularity: Alignment) -> Self {
        self.granularity = granularity;
        self
    }
}

impl ConfigurationSource for VmStateSource {
    fn name(&self) -> &str {
        "JRockit"
    }

    fn query(&self) -> Result<Option<RuntimeOptions>, DetectionError> {
        let line = match self.dump.lines().find(|line| line.contains(COMPRESSED_REFS_MARKER)) {
            Some(line) => line.trim_end(),
            None => return Ok(None),
        };

        let compressed_shift = match self.pattern.captures(line) {
            Some(captures) => {
                let raw = captures.get(3).map(|m| m.as_str()).unwrap_or_default();
                let shift = raw
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| DetectionError::InvalidOption {
                        name: COMPRESSED_REFS_MARKER.to_string(),
                        value: raw.to_string(),
                    })?;
                Some(shift)
            }
            None => None,
        };

        Ok(Some(RuntimeOptions {
            runtime: self.name().to_string(),
            compressed_shift,
            granularity: self.granularity,
        }))
    }
}

/// Fixed options, typically taken from configuration.
#[derive(Debug, Clone)]
pub struct StaticSource {
    options: RuntimeOptions,
}

impl StaticSource {
    pub fn new(options: RuntimeOptions) -> Self {
        Self { options }
    }
}

impl ConfigurationSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    fn query(&self) -> Result<Option<RuntimeOptions>, DetectionError> {
        Ok(Some(self.options.clone()))
    }
}
