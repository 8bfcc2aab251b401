// Tue Jan 13 2026 - Alex

pub mod report;

pub use report::{ReportFormat, ReportGenerator};
