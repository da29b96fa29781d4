//! Classifying period-over-period changes in report counts.
//!
//! Transparency reports disagree with NCMEC's numbers surprisingly often.
//! The classifier bins the absolute percentage difference between the two
//! sources into severities, and each severity maps to fixed SGR codes and
//! CSS for terminal and HTML highlighting respectively.

use serde::{Deserialize, Serialize};

use crate::data::{ColumnData, Table};

/// How far a percentage difference strays from agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Within 5 percent: no highlighting.
    Low,
    /// More than 5 and up to 30 percent.
    Medium,
    /// More than 30 and up to 100 percent.
    High,
    /// More than 100 percent.
    Critical,
}

impl Severity {
    /// Classifies a percentage difference by its magnitude. `None` cells
    /// and NaN have no severity.
    pub fn classify(value: Option<f64>) -> Option<Severity> {
        let magnitude = value?.abs();
        if magnitude.is_nan() {
            None
        } else if magnitude <= 5.0 {
            Some(Severity::Low)
        } else if magnitude <= 30.0 {
            Some(Severity::Medium)
        } else if magnitude <= 100.0 {
            Some(Severity::High)
        } else {
            Some(Severity::Critical)
        }
    }

    /// The SGR codes highlighting a cell run of this severity, as an
    /// (opening, closing) pair without the `ESC [`/`m` framing. `Low`
    /// needs no highlighting.
    pub const fn sgr(self) -> Option<(&'static str, &'static str)> {
        match self {
            Severity::Low => None,
            Severity::Medium => Some(("1;38;5;202", "39;0")),
            Severity::High => Some(("1;38;5;160", "39;0")),
            Severity::Critical => Some(("1;38;5;126", "39;0")),
        }
    }

    /// The CSS declarations highlighting a cell of this severity.
    pub const fn css(self) -> &'static str {
        match self {
            Severity::Low => "",
            Severity::Medium => "color: #d95100; background-color: #ffeada;",
            Severity::High => "color: #f4002a; background-color: #ffe8e7;",
            Severity::Critical => "color: #d900c7; background-color: #ffe5fa;",
        }
    }
}

/// The column names that identify a report-comparison table.
pub(crate) const REPORTS: &str = "reports";
pub(crate) const DELTA_PERCENT: &str = "Δ%";
pub(crate) const NCMEC: &str = "NCMEC";

/// Checks whether the table compares report counts and hence may contain
/// outliers worth highlighting. The heuristic requires the `reports`,
/// `Δ%`, and `NCMEC` verticals, with `Δ%` holding floats.
pub fn maybe_has_outliers(table: &Table) -> bool {
    table.vertical(REPORTS).is_some()
        && table.vertical(NCMEC).is_some()
        && table
            .vertical(DELTA_PERCENT)
            .is_some_and(|column| matches!(column.data, ColumnData::Float(_)))
}
