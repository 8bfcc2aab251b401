// Fri Oct 16 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectionError {
    #[error("Unsupported address width: {0} bytes")]
    UnsupportedAddressWidth(u32),
    #[error("Address sample has no positive deltas")]
    EmptySample,
    #[error("Granularity {granularity} cannot be shifted by {shift} bits")]
    ShiftOverflow { granularity: u64, shift: u32 },
    #[error("Probe failed: {0}")]
    ProbeFailed(String),
    #[error("Invalid value {value:?} for option {name}")]
    InvalidOption { name: String, value: String },
    #[error("Configuration source {source_name} failed: {reason}")]
    SourceFailed { source_name: String, reason: String },
}
