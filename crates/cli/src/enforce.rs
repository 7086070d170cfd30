// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Enforcement orchestration.
//!
//! One linear pass per invocation:
//! bypass check -> per-commit scan -> final validation -> optional suite
//! execution -> optional coverage threshold -> verdict composition.
//! No state is revisited and nothing persists between runs; re-running on
//! identical inputs reproduces the same verdict.
//!
//! The per-commit scan walks commits strictly oldest first and records, per
//! `(file, function)` key, the index of the most recent commit touching the
//! function. Interim status during the scan is logged but not trusted: a
//! function touched again in a later commit gets its truth recomputed in
//! final validation from current repository state.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::coverage::{self, CoverageOutcome};
use crate::error::{Error, Result};
use crate::history::{CommitRecord, History, detect_base_ref};
use crate::suite::{self, SuiteResult};
use crate::symbols::FunctionParser;
use crate::{detect, diff, locate, resolve};

/// Why a changed function fails enforcement. The categories are mutually
/// exclusive and reported as such.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    /// No file matched any test template.
    NoTestFile,
    /// A test file exists but never mentions the function.
    NoCoverage,
    /// The test covers the function but was last modified before the
    /// function's last change.
    TestNotUpdated,
}

impl FailureCategory {
    /// Short description for the report.
    pub fn describe(&self) -> &'static str {
        match self {
            FailureCategory::NoTestFile => "no test file",
            FailureCategory::NoCoverage => "test file exists but no coverage",
            FailureCategory::TestNotUpdated => "test not updated after change",
        }
    }
}

/// A changed function that failed final validation.
#[derive(Debug, Clone)]
pub struct FunctionFailure {
    pub file: PathBuf,
    pub function: String,
    pub category: FailureCategory,
    /// Resolved test file, absent for `NoTestFile`.
    pub test_file: Option<PathBuf>,
    /// The function's last in-range modifying commit.
    pub last_change: CommitRecord,
}

/// A changed function whose test obligations are met.
#[derive(Debug, Clone)]
pub struct CoveredFunction {
    pub file: PathBuf,
    pub function: String,
    pub test_file: PathBuf,
    pub last_change: CommitRecord,
    /// The test file's last in-range modifying commit.
    pub test_updated: Option<CommitRecord>,
}

/// Aggregate outcome of one enforcement run.
#[derive(Debug, Clone, Default)]
pub struct EnforcementVerdict {
    /// Skip label short-circuited the run.
    pub bypassed: bool,
    /// Commits in the enforced range, oldest first.
    pub commits: Vec<CommitRecord>,
    pub covered: Vec<CoveredFunction>,
    pub failures: Vec<FunctionFailure>,
    /// Suite execution outcome; absent when no command is configured.
    pub suite: Option<SuiteResult>,
    /// Coverage threshold outcome; absent when the stage is disabled.
    pub coverage: Option<CoverageOutcome>,
}

impl EnforcementVerdict {
    fn bypass() -> Self {
        Self {
            bypassed: true,
            ..Self::default()
        }
    }

    /// Every recorded function met its test obligations.
    pub fn functions_passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Suite stage passed (vacuously true when skipped).
    pub fn suite_passed(&self) -> bool {
        self.suite.as_ref().is_none_or(|s| s.passed)
    }

    /// Coverage stage passed (vacuously true when skipped).
    pub fn coverage_passed(&self) -> bool {
        self.coverage.as_ref().is_none_or(|c| c.passed)
    }

    /// Overall outcome: the logical AND of all stages.
    pub fn passed(&self) -> bool {
        self.bypassed
            || (self.functions_passed() && self.suite_passed() && self.coverage_passed())
    }
}

/// The enforcement engine. Holds the never-mutated configuration and the
/// pluggable source parser; the repository is opened only after the bypass
/// check so a bypassed run touches no git state at all.
pub struct Enforcer<'a> {
    root: &'a Path,
    config: &'a Config,
    parser: &'a dyn FunctionParser,
}

/// Recorded scan state: most recent commit index per changed function.
type LastSeen = BTreeMap<(PathBuf, String), usize>;

impl<'a> Enforcer<'a> {
    pub fn new(root: &'a Path, config: &'a Config, parser: &'a dyn FunctionParser) -> Self {
        Self {
            root,
            config,
            parser,
        }
    }

    /// Run the full enforcement pass for the given CI label set.
    pub fn run(&self, labels: &[String]) -> Result<EnforcementVerdict> {
        if labels.iter().any(|l| l == &self.config.skip_label) {
            tracing::info!("\"{}\" label found, bypassing enforcement", self.config.skip_label);
            return Ok(EnforcementVerdict::bypass());
        }

        let base = self.resolve_base()?;
        tracing::debug!("enforcing range {}..HEAD", base);
        let history = History::open(self.root, &base)?;

        let last_seen = self.scan_commits(&history);
        let (covered, failures) = self.validate(&history, last_seen);

        let suite = self
            .config
            .tests
            .command
            .as_deref()
            .map(|command| suite::run_suite(self.root, command));

        let coverage = self
            .config
            .coverage
            .check
            .then(|| coverage::check_threshold(self.root, &self.config.coverage));

        Ok(EnforcementVerdict {
            bypassed: false,
            commits: history.commits().to_vec(),
            covered,
            failures,
            suite,
            coverage,
        })
    }

    fn resolve_base(&self) -> Result<String> {
        if let Some(base) = &self.config.base {
            return Ok(base.clone());
        }
        detect_base_ref(self.root).ok_or_else(|| Error::Config {
            message: "no base ref configured and none of origin/main, main, master exist"
                .to_string(),
            path: None,
        })
    }

    /// Stage 2: walk commits oldest first, recording the latest commit index
    /// for every changed exported function in scope.
    fn scan_commits(&self, history: &History) -> LastSeen {
        let mut last_seen = LastSeen::new();

        for (index, commit) in history.commits().iter().enumerate() {
            tracing::debug!(
                "commit {}/{}: {} {}",
                index + 1,
                history.commits().len(),
                commit.short_hash(),
                commit.message
            );

            for file in history.files_touched_by(&commit.hash) {
                if !self.in_scope(&file) {
                    continue;
                }

                let names = self.changed_functions_in_commit(history, &commit.hash, &file);
                if names.is_empty() {
                    tracing::debug!("{}: no exported functions modified", file.display());
                    continue;
                }

                tracing::info!("{}: changed functions: {}", file.display(), names.join(", "));
                let test_file =
                    locate::find_test_file(self.root, &file, &self.config.test_patterns);

                for name in names {
                    self.log_interim_status(history, commit, &file, &name, test_file.as_deref());
                    last_seen.insert((file.clone(), name), index);
                }
            }
        }

        last_seen
    }

    /// In scope: enforceable extension, not excluded, still on disk.
    fn in_scope(&self, file: &Path) -> bool {
        self.config.is_source_file(file)
            && !self.config.is_excluded(file)
            && self.root.join(file).is_file()
    }

    /// Changed exported function names for one file in one commit. Parse
    /// failures contribute zero functions rather than aborting the run.
    fn changed_functions_in_commit(
        &self,
        history: &History,
        hash: &str,
        file: &Path,
    ) -> Vec<String> {
        let Some(diff_text) = history.diff_for_file(hash, file) else {
            return Vec::new();
        };
        let changed = diff::changed_lines(&diff_text);
        if changed.is_empty() {
            return Vec::new();
        }

        let source = match std::fs::read_to_string(self.root.join(file)) {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!("cannot read {}: {}", file.display(), e);
                return Vec::new();
            }
        };
        let extension = file.extension().and_then(|e| e.to_str()).unwrap_or("");

        let symbols = match self.parser.parse_source(&source, extension) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("could not analyze {}: {}", file.display(), e);
                return Vec::new();
            }
        };

        let line_count = source.lines().count() as u32;
        resolve::changed_functions(&symbols, &changed, line_count)
    }

    /// Interim status line during the scan. Logging only: a function may be
    /// touched again later, so this is never final truth.
    fn log_interim_status(
        &self,
        history: &History,
        commit: &CommitRecord,
        file: &Path,
        function: &str,
        test_file: Option<&Path>,
    ) {
        let Some(test_file) = test_file else {
            tracing::info!("{}: {}: no test file found", file.display(), function);
            return;
        };

        let has_test = detect::covers_function(&self.root.join(test_file), function);
        let updated = history.was_modified_at_or_after(test_file, &commit.hash);

        match (has_test, updated) {
            (true, true) => tracing::info!(
                "{}: {}: test updated in/after {}",
                file.display(),
                function,
                commit.short_hash()
            ),
            (true, false) => tracing::info!(
                "{}: {}: test NOT updated in/after {}",
                file.display(),
                function,
                commit.short_hash()
            ),
            (false, _) => {
                tracing::info!("{}: {}: missing test coverage", file.display(), function);
            }
        }
    }

    /// Stage 3: recompute truth for every recorded function from current
    /// state. A function passes iff a test file exists, currently covers it,
    /// and was last modified at or after the function's last change.
    fn validate(
        &self,
        history: &History,
        last_seen: LastSeen,
    ) -> (Vec<CoveredFunction>, Vec<FunctionFailure>) {
        let mut covered = Vec::new();
        let mut failures = Vec::new();

        for ((file, function), commit_index) in last_seen {
            let Some(last_change) = history.commits().get(commit_index).cloned() else {
                continue;
            };

            let Some(test_file) =
                locate::find_test_file(self.root, &file, &self.config.test_patterns)
            else {
                failures.push(FunctionFailure {
                    file,
                    function,
                    category: FailureCategory::NoTestFile,
                    test_file: None,
                    last_change,
                });
                continue;
            };

            if !detect::covers_function(&self.root.join(&test_file), &function) {
                failures.push(FunctionFailure {
                    file,
                    function,
                    category: FailureCategory::NoCoverage,
                    test_file: Some(test_file),
                    last_change,
                });
                continue;
            }

            if history.was_modified_at_or_after(&test_file, &last_change.hash) {
                let test_updated = history.last_commit_touching(&test_file).cloned();
                covered.push(CoveredFunction {
                    file,
                    function,
                    test_file,
                    last_change,
                    test_updated,
                });
            } else {
                failures.push(FunctionFailure {
                    file,
                    function,
                    category: FailureCategory::TestNotUpdated,
                    test_file: Some(test_file),
                    last_change,
                });
            }
        }

        (covered, failures)
    }
}

#[cfg(test)]
#[path = "enforce_tests.rs"]
mod tests;
