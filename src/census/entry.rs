// Fri Oct 16 2026 - Alex

use crate::utils::Multiset;
use indexmap::IndexSet;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How instance sizes are aggregated per type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizePolicy {
    /// Size computed for the first instance of a type and reused for every
    /// later one. Variable-length arrays are approximated.
    #[default]
    FirstInstance,
    /// Every instance sized on its own.
    PerInstance,
}

impl fmt::Display for SizePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizePolicy::FirstInstance => write!(f, "first-instance"),
            SizePolicy::PerInstance => write!(f, "per-instance"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    AccessDenied,
    UnreadableReference,
    SizeUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CensusWarning {
    pub kind: WarningKind,
    pub type_name: String,
    pub detail: String,
}

impl fmt::Display for CensusWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.type_name, self.detail)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CensusEntry {
    pub count: u64,
    pub aggregate_size: u64,
    /// At least one instance could not be sized and counted as 0 bytes.
    pub degraded: bool,
}

impl CensusEntry {
    pub fn average_size(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            self.aggregate_size / self.count
        }
    }
}

/// Instance counts and sizes per type for everything reachable from a root.
#[derive(Debug, Clone, Serialize)]
pub struct Census {
    root_type: String,
    policy: SizePolicy,
    counts: Multiset<String>,
    sizes: Multiset<String>,
    degraded: IndexSet<String>,
    warnings: Vec<CensusWarning>,
}

impl Census {
    pub(crate) fn new(root_type: &str, policy: SizePolicy) -> Self {
        Self {
            root_type: root_type.to_string(),
            policy,
            counts: Multiset::new(),
            sizes: Multiset::new(),
            degraded: IndexSet::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, type_name: &str, size: Option<u64>) {
        self.counts.add(type_name.to_string());
        self.sizes.add_count(type_name.to_string(), size.unwrap_or(0));
        if size.is_none() {
            self.degraded.insert(type_name.to_string());
        }
    }

    pub(crate) fn warn(&mut self, kind: WarningKind, type_name: &str, detail: String) {
        log::warn!("{}: {}", type_name, detail);
        self.warnings.push(CensusWarning {
            kind,
            type_name: type_name.to_string(),
            detail,
        });
    }

    pub fn root_type(&self) -> &str {
        &self.root_type
    }

    pub fn policy(&self) -> SizePolicy {
        self.policy
    }

    pub fn warnings(&self) -> &[CensusWarning] {
        &self.warnings
    }

    pub fn get(&self, type_name: &str) -> Option<CensusEntry> {
        let key = type_name.to_string();
        if !self.counts.contains(&key) {
            return None;
        }
        Some(CensusEntry {
            count: self.counts.count(&key),
            aggregate_size: self.sizes.count(&key),
            degraded: self.degraded.contains(type_name),
        })
    }

    /// Entries in discovery order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, CensusEntry)> + '_ {
        self.counts
            .keys()
            .filter_map(move |name| self.get(name).map(|entry| (name.as_str(), entry)))
    }

    /// Entries by descending aggregate size, ties by name.
    pub fn sorted_entries(&self) -> Vec<(&str, CensusEntry)> {
        self.entries()
            .sorted_by(|a, b| b.1.aggregate_size.cmp(&a.1.aggregate_size).then_with(|| a.0.cmp(b.0)))
            .collect()
    }

    pub fn type_count(&self) -> usize {
        self.counts.len()
    }

    pub fn total_count(&self) -> u64 {
        self.counts.total()
    }

    pub fn total_size(&self) -> u64 {
        self.sizes.total()
    }

    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_totals() {
        let mut census = Census::new("Root", SizePolicy::FirstInstance);
        census.record("Root", Some(24));
        census.record("int[]", Some(56));
        census.record("int[]", Some(56));
        census.record("Opaque", None);

        assert_eq!(census.total_count(), 4);
        assert_eq!(census.total_size(), 136);
        assert_eq!(census.type_count(), 3);

        let arrays = census.get("int[]").unwrap();
        assert_eq!(arrays.count, 2);
        assert_eq!(arrays.average_size(), 56);

        let opaque = census.get("Opaque").unwrap();
        assert!(opaque.degraded);
        assert_eq!(opaque.aggregate_size, 0);
        assert!(census.is_degraded());
        assert!(census.get("Missing").is_none());
    }

    #[test]
    fn test_entry_order() {
        let mut census = Census::new("A", SizePolicy::PerInstance);
        census.record("A", Some(16));
        census.record("B", Some(64));
        census.record("C", Some(16));

        let discovered: Vec<&str> = census.entries().map(|(name, _)| name).collect();
        assert_eq!(discovered, vec!["A", "B", "C"]);

        let by_size: Vec<&str> = census.sorted_entries().into_iter().map(|(name, _)| name).collect();
        assert_eq!(by_size, vec!["B", "A", "C"]);
    }
}
