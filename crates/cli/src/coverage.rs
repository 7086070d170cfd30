// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Coverage summary parsing and threshold checking.
//!
//! Reads the istanbul-style `coverage-summary.json` produced by the test
//! runner and compares each of the four whole-repository metrics against
//! the configured minimum percentage. A missing artifact fails the stage
//! with an explicit message rather than being silently skipped.

use std::path::Path;

use serde::Deserialize;

use crate::config::CoverageConfig;

/// One metric: covered count, total count, percentage.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Metric {
    pub total: u64,
    pub covered: u64,
    pub pct: f64,
}

/// Whole-repository totals for the four tracked metrics.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MetricTotals {
    pub lines: Metric,
    pub statements: Metric,
    pub functions: Metric,
    pub branches: Metric,
}

/// Top-level shape of `coverage-summary.json`. Per-file entries are ignored.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CoverageSummary {
    pub total: MetricTotals,
}

impl MetricTotals {
    /// Metrics as (name, value) pairs, in report order.
    pub fn named(&self) -> [(&'static str, Metric); 4] {
        [
            ("lines", self.lines),
            ("statements", self.statements),
            ("functions", self.functions),
            ("branches", self.branches),
        ]
    }
}

/// Outcome of the threshold stage.
#[derive(Debug, Clone)]
pub struct CoverageOutcome {
    /// Every metric met the threshold.
    pub passed: bool,
    /// Parsed summary, when the artifact was readable.
    pub summary: Option<CoverageSummary>,
    /// Human-readable explanation of the outcome.
    pub message: String,
}

impl CoverageOutcome {
    fn failed(summary: Option<CoverageSummary>, message: impl Into<String>) -> Self {
        Self {
            passed: false,
            summary,
            message: message.into(),
        }
    }
}

/// Check the coverage summary at its configured location against the
/// configured threshold.
pub fn check_threshold(root: &Path, config: &CoverageConfig) -> CoverageOutcome {
    let path = root.join(&config.summary);

    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(_) => {
            return CoverageOutcome::failed(
                None,
                format!("coverage report not found at {}", config.summary.display()),
            );
        }
    };

    let summary: CoverageSummary = match serde_json::from_str(&content) {
        Ok(s) => s,
        Err(e) => {
            return CoverageOutcome::failed(None, format!("failed to parse coverage report: {}", e));
        }
    };

    let below: Vec<String> = summary
        .total
        .named()
        .iter()
        .filter(|(_, metric)| metric.pct < config.threshold)
        .map(|(name, metric)| format!("{}: {:.2}% < {:.2}%", name, metric.pct, config.threshold))
        .collect();

    if below.is_empty() {
        CoverageOutcome {
            passed: true,
            summary: Some(summary),
            message: format!("all coverage metrics meet the {:.0}% threshold", config.threshold),
        }
    } else {
        CoverageOutcome::failed(
            Some(summary),
            format!(
                "coverage below {:.0}% threshold: {}",
                config.threshold,
                below.join(", ")
            ),
        )
    }
}

#[cfg(test)]
#[path = "coverage_tests.rs"]
mod tests;
