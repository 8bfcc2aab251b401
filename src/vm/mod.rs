// Fri Oct 16 2026 - Alex

pub mod detector;
pub mod error;
pub mod probe;
pub mod profile;
pub mod resolver;
pub mod source;

pub use detector::{guess_alignment, AlignmentDetector, DetectionReport};
pub use error::DetectionError;
pub use probe::{NativeProbe, RuntimeProbe};
pub use profile::{AlignmentProfile, CapturedRuntime, Confidence, Provenance};
pub use resolver::ProfileResolver;
pub use source::{ConfigurationSource, RuntimeOptions, StaticSource, VmOptionsSource, VmStateSource};
