//! Text rendering of the enforcement verdict.
//!
//! Format:
//! ```text
//! <n> commit(s) in range:
//!   1. abc1234 subject (2026-03-01 12:00:00)
//! function coverage: FAIL
//!   src/math.ts: add: no test file
//!     Add a test file matching one of the configured templates.
//! ...
//! enforcement failed
//! ```

use std::io::Write;

use chrono::DateTime;
use termcolor::{ColorChoice, StandardStream, WriteColor};

use crate::color::scheme;
use crate::enforce::{EnforcementVerdict, FailureCategory, FunctionFailure};

/// Streaming writer for the verdict report.
pub struct Reporter {
    stdout: StandardStream,
    skip_label: String,
}

impl Reporter {
    pub fn new(color_choice: ColorChoice, skip_label: impl Into<String>) -> Self {
        Self {
            stdout: StandardStream::stdout(color_choice),
            skip_label: skip_label.into(),
        }
    }

    /// Write the whole report for one verdict.
    pub fn write_verdict(&mut self, verdict: &EnforcementVerdict) -> std::io::Result<()> {
        if verdict.bypassed {
            writeln!(
                self.stdout,
                "\"{}\" label found, skipping test enforcement",
                self.skip_label
            )?;
            return Ok(());
        }

        self.write_commits(verdict)?;
        self.write_functions(verdict)?;
        self.write_suite(verdict)?;
        self.write_coverage(verdict)?;
        self.write_summary(verdict)?;
        Ok(())
    }

    fn write_commits(&mut self, verdict: &EnforcementVerdict) -> std::io::Result<()> {
        if verdict.commits.is_empty() {
            writeln!(self.stdout, "no commits in range")?;
            return Ok(());
        }

        writeln!(self.stdout, "{} commit(s) in range:", verdict.commits.len())?;
        for (i, commit) in verdict.commits.iter().enumerate() {
            write!(self.stdout, "  {}. ", i + 1)?;
            self.stdout.set_color(&scheme::hash())?;
            write!(self.stdout, "{}", commit.short_hash())?;
            self.stdout.reset()?;
            writeln!(self.stdout, " {} ({})", commit.message, format_time(commit.timestamp))?;
        }
        Ok(())
    }

    fn write_functions(&mut self, verdict: &EnforcementVerdict) -> std::io::Result<()> {
        self.write_stage_header("function coverage", verdict.functions_passed())?;

        for covered in &verdict.covered {
            write!(self.stdout, "  ")?;
            self.stdout.set_color(&scheme::path())?;
            write!(self.stdout, "{}", covered.file.display())?;
            self.stdout.reset()?;
            write!(
                self.stdout,
                ": {}: covered by {}",
                covered.function,
                covered.test_file.display()
            )?;
            if let Some(updated) = &covered.test_updated {
                write!(self.stdout, " (updated in {})", updated.short_hash())?;
            }
            writeln!(self.stdout)?;
        }

        for failure in &verdict.failures {
            self.write_failure(failure)?;
        }
        Ok(())
    }

    fn write_failure(&mut self, failure: &FunctionFailure) -> std::io::Result<()> {
        write!(self.stdout, "  ")?;
        self.stdout.set_color(&scheme::path())?;
        write!(self.stdout, "{}", failure.file.display())?;
        self.stdout.reset()?;
        writeln!(
            self.stdout,
            ": {}: {} (last modified in {})",
            failure.function,
            failure.category.describe(),
            failure.last_change.short_hash()
        )?;

        writeln!(self.stdout, "    {}", advice_for(failure))?;
        Ok(())
    }

    fn write_suite(&mut self, verdict: &EnforcementVerdict) -> std::io::Result<()> {
        let Some(suite) = &verdict.suite else {
            return Ok(());
        };

        self.write_stage_header("test execution", suite.passed)?;
        if !suite.passed {
            if let Some(error) = &suite.error {
                writeln!(self.stdout, "  {}", error)?;
            }
            // Raw runner output, surfaced verbatim
            for line in suite.output.lines() {
                writeln!(self.stdout, "  {}", line)?;
            }
        }
        Ok(())
    }

    fn write_coverage(&mut self, verdict: &EnforcementVerdict) -> std::io::Result<()> {
        let Some(coverage) = &verdict.coverage else {
            return Ok(());
        };

        self.write_stage_header("coverage threshold", coverage.passed)?;
        if let Some(summary) = &coverage.summary {
            for (name, metric) in summary.total.named() {
                let label = format!("{}:", name);
                writeln!(
                    self.stdout,
                    "  {:<11} {:>6.2}% ({}/{})",
                    label, metric.pct, metric.covered, metric.total
                )?;
            }
        }
        if !coverage.passed {
            writeln!(self.stdout, "  {}", coverage.message)?;
        }
        Ok(())
    }

    fn write_stage_header(&mut self, name: &str, passed: bool) -> std::io::Result<()> {
        self.stdout.set_color(&scheme::section())?;
        write!(self.stdout, "{}", name)?;
        self.stdout.reset()?;
        write!(self.stdout, ": ")?;
        if passed {
            self.stdout.set_color(&scheme::pass())?;
            write!(self.stdout, "PASS")?;
        } else {
            self.stdout.set_color(&scheme::fail())?;
            write!(self.stdout, "FAIL")?;
        }
        self.stdout.reset()?;
        writeln!(self.stdout)?;
        Ok(())
    }

    fn write_summary(&mut self, verdict: &EnforcementVerdict) -> std::io::Result<()> {
        if verdict.passed() {
            self.stdout.set_color(&scheme::pass())?;
            write!(self.stdout, "enforcement passed")?;
            self.stdout.reset()?;
            writeln!(
                self.stdout,
                ": {} modified function(s) have up-to-date test coverage",
                verdict.covered.len()
            )?;
            return Ok(());
        }

        self.stdout.set_color(&scheme::fail())?;
        write!(self.stdout, "enforcement failed")?;
        self.stdout.reset()?;
        writeln!(self.stdout)?;

        writeln!(self.stdout, "Options:")?;
        writeln!(
            self.stdout,
            "  1. Add or update test cases for the affected functions"
        )?;
        writeln!(
            self.stdout,
            "  2. Add the \"{}\" label to bypass this check",
            self.skip_label
        )?;
        Ok(())
    }
}

/// Remediation line for one failing function.
fn advice_for(failure: &FunctionFailure) -> String {
    match failure.category {
        FailureCategory::NoTestFile => {
            "Add a test file matching one of the configured templates.".to_string()
        }
        FailureCategory::NoCoverage => match &failure.test_file {
            Some(test_file) => format!("Add tests to: {}", test_file.display()),
            None => "Add tests for this function.".to_string(),
        },
        FailureCategory::TestNotUpdated => match &failure.test_file {
            Some(test_file) => format!(
                "Update {} to reflect the function changes.",
                test_file.display()
            ),
            None => "Update the tests to reflect the function changes.".to_string(),
        },
    }
}

/// Epoch seconds to a human-readable UTC timestamp.
fn format_time(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
