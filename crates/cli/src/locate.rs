// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Test file location.
//!
//! Maps a source file to its candidate test file by substituting the base
//! name and extension into an ordered template list. The first template
//! whose rendered path exists wins; template order is significant and must
//! be preserved exactly as configured.

use std::path::{Path, PathBuf};

/// Render a template for one source file.
///
/// `{name}` is the file stem, `{ext}` the extension without dot; the result
/// is joined onto the source file's directory.
fn render_template(template: &str, dir: &Path, name: &str, ext: &str) -> PathBuf {
    let rendered = template.replace("{name}", name).replace("{ext}", ext);
    dir.join(rendered)
}

/// Candidate test paths for a source file, in template order.
pub fn candidate_test_paths(source: &Path, templates: &[String]) -> Vec<PathBuf> {
    let Some(name) = source.file_stem().and_then(|s| s.to_str()) else {
        return Vec::new();
    };
    let ext = source.extension().and_then(|e| e.to_str()).unwrap_or("");
    let dir = source.parent().unwrap_or(Path::new(""));

    templates
        .iter()
        .map(|t| render_template(t, dir, name, ext))
        .collect()
}

/// First existing candidate test file for `source`, resolved against `root`.
///
/// Returns the root-relative path. Deterministic for a fixed template list
/// and filesystem state.
pub fn find_test_file(root: &Path, source: &Path, templates: &[String]) -> Option<PathBuf> {
    candidate_test_paths(source, templates)
        .into_iter()
        .find(|candidate| root.join(candidate).is_file())
}

#[cfg(test)]
#[path = "locate_tests.rs"]
mod tests;
