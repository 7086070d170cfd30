// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration parsing and discovery.
//!
//! Handles testgate.toml parsing with per-field defaults. The config value
//! is built once at startup and never mutated afterwards; every knob the
//! enforcement engine consults lives here rather than in CLI flags.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Full configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Baseline git ref; the enforced range is `(base, HEAD]`.
    /// When absent, `origin/main`, `main`, then `master` are tried in order.
    #[serde(default)]
    pub base: Option<String>,

    /// File extensions (without dot) treated as enforceable source.
    #[serde(default = "default_source_extensions")]
    pub source_extensions: Vec<String>,

    /// Ordered test-file templates with `{name}`/`{ext}` placeholders,
    /// resolved relative to the source file's directory. Order is significant.
    #[serde(default = "default_test_patterns")]
    pub test_patterns: Vec<String>,

    /// Path substrings that exempt a file from enforcement.
    #[serde(default = "default_exclude_paths")]
    pub exclude_paths: Vec<String>,

    /// CI label that bypasses enforcement entirely.
    #[serde(default = "default_skip_label")]
    pub skip_label: String,

    /// Test-suite execution stage.
    #[serde(default)]
    pub tests: TestsConfig,

    /// Coverage-threshold stage.
    #[serde(default)]
    pub coverage: CoverageConfig,
}

/// Configuration for the optional suite-execution stage.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestsConfig {
    /// Shell command that runs the suite with coverage instrumentation.
    /// The stage is skipped when no command is configured.
    #[serde(default)]
    pub command: Option<String>,
}

/// Configuration for the optional coverage-threshold stage.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoverageConfig {
    /// Whether the threshold check runs at all.
    #[serde(default)]
    pub check: bool,

    /// Minimum percentage each metric must reach.
    #[serde(default = "default_coverage_threshold")]
    pub threshold: f64,

    /// Location of the structured coverage summary, relative to the root.
    #[serde(default = "default_coverage_summary")]
    pub summary: PathBuf,
}

fn default_source_extensions() -> Vec<String> {
    vec![
        "ts".to_string(),
        "tsx".to_string(),
        "js".to_string(),
        "jsx".to_string(),
    ]
}

fn default_test_patterns() -> Vec<String> {
    vec![
        "{name}.test.{ext}".to_string(),
        "{name}.spec.{ext}".to_string(),
        "__tests__/{name}.{ext}".to_string(),
        "tests/{name}.test.{ext}".to_string(),
    ]
}

fn default_exclude_paths() -> Vec<String> {
    vec![
        "node_modules/".to_string(),
        "dist/".to_string(),
        "build/".to_string(),
        ".test.".to_string(),
        ".spec.".to_string(),
    ]
}

fn default_skip_label() -> String {
    "no-test-needed".to_string()
}

fn default_coverage_threshold() -> f64 {
    70.0
}

fn default_coverage_summary() -> PathBuf {
    PathBuf::from("coverage/coverage-summary.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base: None,
            source_extensions: default_source_extensions(),
            test_patterns: default_test_patterns(),
            exclude_paths: default_exclude_paths(),
            skip_label: default_skip_label(),
            tests: TestsConfig::default(),
            coverage: CoverageConfig::default(),
        }
    }
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            check: false,
            threshold: default_coverage_threshold(),
            summary: default_coverage_summary(),
        }
    }
}

impl Config {
    /// True if the path has an enforceable source extension.
    pub fn is_source_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.source_extensions.iter().any(|s| s == ext))
    }

    /// True if any configured exclude substring appears in the path.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let text = path.to_string_lossy();
        self.exclude_paths.iter().any(|sub| text.contains(sub))
    }
}

/// Load a config file.
pub fn load(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(|e| Error::Config {
        message: e.to_string(),
        path: Some(path.to_path_buf()),
    })
}

/// Find testgate.toml starting from `start_dir` and walking up to git root.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join("testgate.toml");
        if config_path.exists() {
            return Some(config_path);
        }

        // Stop at git root
        if current.join(".git").exists() {
            return None;
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => return None,
        }
    }
}

/// Resolve the effective config for a root directory: discovered file, or
/// defaults when none exists.
pub fn resolve(root: &Path) -> Result<Config> {
    match find_config(root) {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            load(&path)
        }
        None => {
            tracing::debug!("no config found, using defaults");
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
