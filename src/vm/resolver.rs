// Fri Oct 16 2026 - Alex

use crate::vm::detector::{AlignmentDetector, DetectionReport};
use crate::vm::source::ConfigurationSource;
use log::{debug, warn};

/// Picks the profile for the current runtime: the first trusted source that
/// answers wins, otherwise the detector guesses.
pub struct ProfileResolver<'a> {
    sources: Vec<Box<dyn ConfigurationSource + 'a>>,
    detector: AlignmentDetector<'a>,
}

impl<'a> ProfileResolver<'a> {
    pub fn new(detector: AlignmentDetector<'a>) -> Self {
        Self {
            sources: Vec::new(),
            detector,
        }
    }

    pub fn with_source<S: ConfigurationSource + 'a>(mut self, source: S) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn resolve(&self) -> DetectionReport {
        let mut warnings = Vec::new();

        for source in &self.sources {
            match source.query() {
                Ok(Some(options)) => {
                    debug!("Configuration source {} answered: {:?}", source.name(), options);
                    let probe = self.detector.probe();
                    let header_size = match self.detector.measure_header() {
                        Ok(header) => header,
                        Err(e) => {
                            let fallback = self.detector.fallback().header_size();
                            let message = format!("Header probe failed ({}), using fallback header size {}", e, fallback);
                            warn!("{}", message);
                            warnings.push(message);
                            fallback
                        }
                    };
                    let profile = options.into_profile(probe.native_address_width(), header_size);
                    return DetectionReport { profile, warnings };
                }
                Ok(None) => debug!("Configuration source {} does not apply", source.name()),
                Err(e) => {
                    let message = format!("Configuration source {} failed: {}", source.name(), e);
                    warn!("{}", message);
                    warnings.push(message);
                }
            }
        }

        let mut report = self.detector.detect();
        warnings.append(&mut report.warnings);
        report.warnings = warnings;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::Alignment;
    use crate::vm::probe::RuntimeProbe;
    use crate::vm::source::{RuntimeOptions, StaticSource, VmOptionsSource};
    use crate::vm::{AlignmentProfile, DetectionError, Provenance};

    #[derive(Default)]
    struct FixedProbe {
        header_fails: bool,
    }

    impl RuntimeProbe for FixedProbe {
        fn name(&self) -> &str {
            "fixed"
        }

        fn native_address_width(&self) -> u32 {
            8
        }

        fn header_probe_offset(&self) -> Result<u64, DetectionError> {
            if self.header_fails {
                return Err(DetectionError::ProbeFailed("header sample vanished".to_string()));
            }
            Ok(12)
        }

        fn reference_pair_offsets(&self) -> Result<(u64, u64), DetectionError> {
            Ok((12, 16))
        }

        fn sample_addresses(&self, count: usize, _width: u32) -> Result<Vec<u64>, DetectionError> {
            Ok((0..count as u64).map(|i| i * 2).collect())
        }
    }

    struct BrokenSource;

    impl ConfigurationSource for BrokenSource {
        fn name(&self) -> &str {
            "broken"
        }

        fn query(&self) -> Result<Option<RuntimeOptions>, DetectionError> {
            Err(DetectionError::ProbeFailed("no diagnostic bean".to_string()))
        }
    }

    #[test]
    fn test_first_answer_wins() {
        let probe = FixedProbe::default();
        let resolver = ProfileResolver::new(AlignmentDetector::new(&probe).with_sample_size(100))
            .with_source(VmOptionsSource::default())
            .with_source(BrokenSource)
            .with_source(StaticSource::new(RuntimeOptions {
                runtime: "pinned".to_string(),
                compressed_shift: None,
                granularity: Alignment::new(16),
            }));

        let report = resolver.resolve();
        assert_eq!(report.profile.runtime(), "pinned");
        assert_eq!(report.profile.header_size(), 12);
        assert_eq!(report.profile.granularity().as_u64(), 16);
        assert!(report.profile.is_authoritative());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_detection_when_no_source_answers() {
        let probe = FixedProbe::default();
        let resolver =
            ProfileResolver::new(AlignmentDetector::new(&probe).with_sample_size(100)).with_source(BrokenSource);

        let report = resolver.resolve();
        assert_eq!(report.profile.provenance(), Provenance::measured());
        // stride 2 shifted by the assumed 3 bits
        assert_eq!(report.profile.granularity().as_u64(), 16);
        assert!(report.warnings[0].contains("broken"));
    }

    #[test]
    fn test_failed_header_probe_uses_fallback_header() {
        let probe = FixedProbe { header_fails: true };
        let detector = AlignmentDetector::new(&probe).with_fallback(AlignmentProfile::uncompressed_64());
        let resolver = ProfileResolver::new(detector).with_source(StaticSource::new(RuntimeOptions {
            runtime: "pinned".to_string(),
            compressed_shift: None,
            granularity: Alignment::new(8),
        }));

        let report = resolver.resolve();
        assert_eq!(report.profile.header_size(), 16);
        assert!(report.profile.is_authoritative());
        assert!(report.warnings[0].contains("Header probe failed"));
    }
}
