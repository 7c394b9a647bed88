//! Outcome report shared by merge and combine.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An error tied to the document or entry it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportError {
    /// Where the problem was found, e.g. a file name or `incoming[3]`
    pub source: String,
    pub error: Error,
}

/// Counts of what an operation did, plus every recoverable error it hit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    /// Dealers appended under a new name
    pub added: usize,
    /// Existing dealers replaced by an incoming one
    pub overwritten: usize,
    /// Conflicts where the existing dealer was kept
    pub kept: usize,
    /// Conflicts resolved by shallow field merge
    pub merged: usize,
    /// Conflicts refused by the reject policy
    pub rejected: usize,
    /// Entries dropped because they were malformed or duplicated
    pub skipped_invalid: usize,
    /// Whether the user stopped the merge early
    pub cancelled: bool,
    pub errors: Vec<ReportError>,
}

impl ReconciliationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_error(&mut self, source: impl Into<String>, error: Error) {
        self.errors.push(ReportError {
            source: source.into(),
            error,
        });
    }

    /// Record a dropped entry: counts it and keeps the reason.
    pub fn record_skipped(&mut self, source: impl Into<String>, error: Error) {
        self.skipped_invalid += 1;
        self.record_error(source, error);
    }

    /// Number of name conflicts that were resolved one way or another.
    pub fn conflicts(&self) -> usize {
        self.overwritten + self.kept + self.merged + self.rejected
    }

    /// True when nothing was skipped, refused or cancelled.
    pub fn is_clean(&self) -> bool {
        !self.cancelled && self.errors.is_empty() && self.skipped_invalid == 0
    }

    /// Fold another report into this one.
    pub fn absorb(&mut self, other: ReconciliationReport) {
        self.added += other.added;
        self.overwritten += other.overwritten;
        self.kept += other.kept;
        self.merged += other.merged;
        self.rejected += other.rejected;
        self.skipped_invalid += other.skipped_invalid;
        self.cancelled |= other.cancelled;
        self.errors.extend(other.errors);
    }
}

impl fmt::Display for ReconciliationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "added {}, overwritten {}, kept {}, merged {}, rejected {}, skipped {}",
            self.added, self.overwritten, self.kept, self.merged, self.rejected, self.skipped_invalid
        )?;
        if self.cancelled {
            write!(f, " (cancelled)")?;
        }
        if !self.errors.is_empty() {
            write!(f, "; {} error(s)", self.errors.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_report_is_clean() {
        let report = ReconciliationReport::new();
        assert!(report.is_clean());
        assert_eq!(report.conflicts(), 0);
    }

    #[test]
    fn record_skipped_counts_and_keeps_reason() {
        let mut report = ReconciliationReport::new();
        report.record_skipped("ray_dealer.json", Error::MissingName { index: 0 });

        assert_eq!(report.skipped_invalid, 1);
        assert_eq!(report.errors[0].source, "ray_dealer.json");
        assert!(!report.is_clean());
    }

    #[test]
    fn absorb_sums_counters() {
        let mut a = ReconciliationReport {
            added: 2,
            kept: 1,
            ..Default::default()
        };
        let mut b = ReconciliationReport {
            overwritten: 3,
            cancelled: true,
            ..Default::default()
        };
        b.record_error("b.json", Error::UserCancelled { name: "A".into() });

        a.absorb(b);
        assert_eq!(a.added, 2);
        assert_eq!(a.conflicts(), 4);
        assert!(a.cancelled);
        assert_eq!(a.errors.len(), 1);
    }

    #[test]
    fn display_summary() {
        let report = ReconciliationReport {
            added: 1,
            overwritten: 2,
            cancelled: true,
            ..Default::default()
        };
        assert_eq!(
            report.to_string(),
            "added 1, overwritten 2, kept 0, merged 0, rejected 0, skipped 0 (cancelled)"
        );
    }

    #[test]
    fn serializes_camel_case() {
        let report = ReconciliationReport {
            skipped_invalid: 1,
            ..Default::default()
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["skippedInvalid"], 1);
        assert_eq!(json["cancelled"], false);
    }
}
