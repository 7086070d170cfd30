// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Color detection and terminal styling.
//!
//! Detection order:
//! 1. NO_COLOR env var -> no color
//! 2. COLOR env var -> force color
//! 3. default: color only when stdout is a TTY and no CI-ish env is set

use std::io::IsTerminal;

use termcolor::ColorChoice;

/// Resolve the color choice for stdout output.
pub fn resolve_color() -> ColorChoice {
    if std::env::var("NO_COLOR").is_ok_and(|v| !v.is_empty()) {
        return ColorChoice::Never;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return ColorChoice::Always;
    }
    if !std::io::stdout().is_terminal() || std::env::var_os("CI").is_some() {
        return ColorChoice::Never;
    }
    ColorChoice::Auto
}

/// termcolor specs for report output.
pub mod scheme {
    use termcolor::{Color, ColorSpec};

    /// Section headers: bold.
    pub fn section() -> ColorSpec {
        let mut spec = ColorSpec::new();
        spec.set_bold(true);
        spec
    }

    /// PASS markers: bold green.
    pub fn pass() -> ColorSpec {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Green)).set_bold(true);
        spec
    }

    /// FAIL markers: bold red.
    pub fn fail() -> ColorSpec {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Red)).set_bold(true);
        spec
    }

    /// File paths: cyan.
    pub fn path() -> ColorSpec {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Cyan));
        spec
    }

    /// Commit hashes: yellow.
    pub fn hash() -> ColorSpec {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Yellow));
        spec
    }
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
