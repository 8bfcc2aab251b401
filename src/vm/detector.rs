// Fri Oct 16 2026 - Alex

use crate::structure::Alignment;
use crate::utils::MathUtils;
use crate::vm::probe::{RuntimeProbe, SUPPORTED_WIDTHS};
use crate::vm::{AlignmentProfile, DetectionError, Provenance};
use itertools::Itertools;

pub const DEFAULT_SAMPLE_SIZE: usize = 1_000_000;
pub const MIN_SAMPLE_SIZE: usize = 100_000;
pub const MAX_SAMPLE_SIZE: usize = 10_000_000;
/// Shift assumed for compressed references when no source reports one.
pub const DEFAULT_COMPRESSED_SHIFT: u32 = 3;

/// Empirical alignment: GCD of the positive deltas between sorted addresses.
/// Non-positive deltas come from duplicates or objects moved while sampling
/// and are ignored.
pub fn guess_alignment(addresses: &[u64]) -> Option<u64> {
    let deltas = addresses
        .iter()
        .copied()
        .sorted_unstable()
        .tuple_windows()
        .map(|(lo, hi)| hi as i128 - lo as i128)
        .filter(|&delta| delta > 0)
        .map(|delta| delta as u64);
    MathUtils::gcd_all(deltas)
}

#[derive(Debug, Clone)]
pub struct DetectionReport {
    pub profile: AlignmentProfile,
    pub warnings: Vec<String>,
}

pub struct AlignmentDetector<'a> {
    probe: &'a dyn RuntimeProbe,
    sample_size: usize,
    compressed_shift: u32,
    fallback: AlignmentProfile,
}

impl<'a> AlignmentDetector<'a> {
    pub fn new(probe: &'a dyn RuntimeProbe) -> Self {
        Self {
            probe,
            sample_size: DEFAULT_SAMPLE_SIZE,
            compressed_shift: DEFAULT_COMPRESSED_SHIFT,
            fallback: AlignmentProfile::compressed_64(),
        }
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub fn with_compressed_shift(mut self, shift: u32) -> Self {
        self.compressed_shift = shift;
        self
    }

    pub fn with_fallback(mut self, fallback: AlignmentProfile) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn fallback(&self) -> &AlignmentProfile {
        &self.fallback
    }

    pub fn probe(&self) -> &'a dyn RuntimeProbe {
        self.probe
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Never fails: problems degrade to the fallback profile, marked as
    /// unknown, with the reasons listed as warnings.
    pub fn detect(&self) -> DetectionReport {
        let mut warnings = Vec::new();
        let profile = match self.run(&mut warnings) {
            Ok(profile) => {
                log::info!("{}", profile);
                profile
            }
            Err(e) => {
                let message = format!("Alignment detection failed ({}), using fallback defaults", e);
                log::warn!("{}", message);
                warnings.push(message);
                self.fallback.clone().with_provenance(Provenance::unknown())
            }
        };
        DetectionReport { profile, warnings }
    }

    pub fn measure_header(&self) -> Result<u64, DetectionError> {
        self.probe.header_probe_offset()
    }

    fn run(&self, warnings: &mut Vec<String>) -> Result<AlignmentProfile, DetectionError> {
        let address_width = self.probe.native_address_width();
        if !SUPPORTED_WIDTHS.contains(&address_width) {
            return Err(DetectionError::UnsupportedAddressWidth(address_width));
        }

        let header_size = self.measure_header()?;
        let reference_width = self.measure_reference_width(address_width, warnings)?;
        let compressed = reference_width < address_width;

        let samples = self.probe.sample_addresses(self.sample_size, reference_width)?;
        let stride = guess_alignment(&samples).ok_or(DetectionError::EmptySample)?;
        let mut granularity = Alignment::largest_dividing(stride).ok_or(DetectionError::EmptySample)?;
        if granularity.as_u64() != stride {
            log::debug!("Sampled stride {} reduced to power of two {}", stride, granularity);
        }
        log::debug!(
            "Sampled {} addresses with {}-byte reads, stride {}",
            samples.len(),
            reference_width,
            stride
        );

        let mut profile_shift = None;
        if compressed {
            granularity = granularity
                .shifted(self.compressed_shift)
                .ok_or(DetectionError::ShiftOverflow {
                    granularity: granularity.as_u64(),
                    shift: self.compressed_shift,
                })?;
            profile_shift = Some(self.compressed_shift);
            warnings.push(format!(
                "Compressed references detected; assuming a {}-bit shift",
                self.compressed_shift
            ));
        }

        let mut profile = AlignmentProfile::new(address_width, header_size, granularity)
            .with_runtime(self.probe.name())
            .with_provenance(Provenance::measured());
        if let Some(shift) = profile_shift {
            profile = profile.with_compressed_references(reference_width, shift);
        }
        Ok(profile)
    }

    fn measure_reference_width(&self, address_width: u32, warnings: &mut Vec<String>) -> Result<u32, DetectionError> {
        let (first, second) = self.probe.reference_pair_offsets()?;
        let distance = first.abs_diff(second);

        if distance == 0 || distance > address_width as u64 {
            let message = format!(
                "Reference probe fields are {} bytes apart; assuming {}-byte references",
                distance, address_width
            );
            log::warn!("{}", message);
            warnings.push(message);
            return Ok(address_width);
        }

        let width = distance as u32;
        if !SUPPORTED_WIDTHS.contains(&width) {
            return Err(DetectionError::UnsupportedAddressWidth(width));
        }
        Ok(width)
    }
}
