// Tue Jan 13 2026 - Alex

use crate::census::Census;
use crate::structure::{GapKind, TypeLayout};
use crate::vm::DetectionReport;
use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

pub struct ReportGenerator {
    format: ReportFormat,
    include_warnings: bool,
}

impl ReportGenerator {
    pub fn new(format: ReportFormat) -> Self {
        Self {
            format,
            include_warnings: true,
        }
    }

    pub fn with_warnings(mut self, include: bool) -> Self {
        self.include_warnings = include;
        self
    }

    pub fn format(&self) -> ReportFormat {
        self.format
    }

    pub fn layout(&self, layout: &TypeLayout) -> Result<String, serde_json::Error> {
        match self.format {
            ReportFormat::Text => Ok(self.text_layout(layout)),
            ReportFormat::Json => self.json(layout),
        }
    }

    pub fn census(&self, census: &Census) -> Result<String, serde_json::Error> {
        match self.format {
            ReportFormat::Text => Ok(self.text_census(census)),
            ReportFormat::Json => self.json(census),
        }
    }

    pub fn detection(&self, report: &DetectionReport) -> Result<String, serde_json::Error> {
        match self.format {
            ReportFormat::Text => Ok(self.text_detection(report)),
            ReportFormat::Json => self.json(&report.profile),
        }
    }

    fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(value)
    }

    fn text_layout(&self, layout: &TypeLayout) -> String {
        let type_width = layout
            .fields()
            .iter()
            .map(|f| f.kind.name().len())
            .max()
            .unwrap_or(0)
            .max(4);

        let mut rows: Vec<(u64, String, String, String)> = Vec::new();
        rows.push((
            0,
            layout.header_size().to_string(),
            String::new(),
            "(object header)".to_string(),
        ));
        for gap in layout.padding_gaps() {
            rows.push((gap.offset, gap.size.to_string(), String::new(), "(alignment/padding gap)".to_string()));
        }
        for field in layout.fields() {
            rows.push((
                field.offset,
                field.size.to_string(),
                field.kind.name().to_string(),
                field.qualified_name(),
            ));
        }
        rows.sort_by_key(|row| row.0);
        for gap in layout.gaps().iter().filter(|g| g.kind == GapKind::AlignmentLoss) {
            rows.push((
                gap.offset,
                gap.size.to_string(),
                String::new(),
                "(loss due to the next object alignment)".to_string(),
            ));
        }
        rows.push((
            layout.aligned_size(),
            String::new(),
            String::new(),
            "(object boundary, size estimate)".to_string(),
        ));

        let mut text = String::new();
        let _ = writeln!(text, "{}", layout.type_name().bold());
        let _ = writeln!(text, " {:>6} {:>5} {:>w$} {}", "offset", "size", "type", "description", w = type_width);
        for (offset, size, kind, description) in rows {
            let _ = writeln!(text, " {:>6} {:>5} {:>w$} {}", offset, size, kind, description, w = type_width);
        }
        let _ = writeln!(
            text,
            "Instance size: {} bytes ({} bytes wasted)",
            layout.aligned_size(),
            layout.wasted_bytes()
        );
        text
    }

    fn text_census(&self, census: &Census) -> String {
        let mut text = String::new();
        let _ = writeln!(text, "{} instance:", census.root_type().bold());
        let _ = writeln!(text, " {:>5} {:>5} {:>5} {}", "count", "size", "avg", "description");
        for (type_name, entry) in census.entries() {
            let marker = if entry.degraded { " (size unavailable)" } else { "" };
            let _ = writeln!(
                text,
                " {:>5} {:>5} {:>5} {}{}",
                entry.count,
                entry.aggregate_size,
                entry.average_size(),
                type_name,
                marker
            );
        }
        let _ = writeln!(
            text,
            " {:>5} {:>5} {:>5} {}",
            census.total_count(),
            census.total_size(),
            "",
            "(total)"
        );

        if self.include_warnings && !census.warnings().is_empty() {
            let _ = writeln!(text, "{}", "Warnings:".yellow());
            for warning in census.warnings() {
                let _ = writeln!(text, "  {}", warning);
            }
        }
        text
    }

    fn text_detection(&self, report: &DetectionReport) -> String {
        let mut text = String::new();
        let _ = writeln!(text, "{}", report.profile);
        if self.include_warnings {
            for warning in &report.warnings {
                let _ = writeln!(text, "{} {}", "[WARN]".yellow(), warning);
            }
        }
        text
    }
}
