// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Test suite execution.
//!
//! Runs the configured test command and reports pass/fail based on exit
//! code. A failing or unrunnable command is a recorded stage failure, never
//! fatal to the enforcement run itself.

use std::path::Path;
use std::process::{Command, Stdio};

/// Outcome of running the external test suite.
#[derive(Debug, Clone)]
pub struct SuiteResult {
    /// Command exited zero.
    pub passed: bool,
    /// Combined stdout/stderr, surfaced verbatim on failure.
    pub output: String,
    /// Spawn or wait error, if the command never produced an exit status.
    pub error: Option<String>,
}

impl SuiteResult {
    fn failed(output: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            passed: false,
            output: output.into(),
            error: Some(error.into()),
        }
    }
}

/// Execute `command` through the shell with `root` as working directory.
pub fn run_suite(root: &Path, command: &str) -> SuiteResult {
    tracing::info!("running test suite: {}", command);

    let output = if cfg!(target_os = "windows") {
        Command::new("cmd")
            .args(["/C", command])
            .current_dir(root)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
    } else {
        Command::new("sh")
            .args(["-c", command])
            .current_dir(root)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
    };

    match output {
        Ok(out) => {
            let mut text = String::from_utf8_lossy(&out.stdout).into_owned();
            let stderr = String::from_utf8_lossy(&out.stderr);
            if !stderr.is_empty() {
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(&stderr);
            }

            if out.status.success() {
                SuiteResult {
                    passed: true,
                    output: text,
                    error: None,
                }
            } else {
                let code = out
                    .status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string());
                SuiteResult::failed(text, format!("test command exited with code {}", code))
            }
        }
        Err(e) => SuiteResult::failed("", format!("failed to execute test command: {}", e)),
    }
}

#[cfg(test)]
#[path = "suite_tests.rs"]
mod tests;
