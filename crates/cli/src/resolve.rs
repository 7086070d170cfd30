// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Change-to-function resolution.
//!
//! Intersects a changed-line set with symbol ranges. A symbol's range runs
//! from its start line to the line before the next symbol, or to end of
//! file for the last one; the ranges partition the file. Attribution is
//! purely positional: renames and moves look like delete+add.

use std::collections::BTreeSet;

use crate::symbols::FunctionSymbol;

/// Names of exported functions whose range contains at least one changed
/// line, in declaration order, unique.
///
/// Non-exported symbols still terminate their predecessor's range; they are
/// just never reported (internal implementation detail by policy).
pub fn changed_functions(
    symbols: &[FunctionSymbol],
    changed: &BTreeSet<u32>,
    file_line_count: u32,
) -> Vec<String> {
    if symbols.is_empty() || changed.is_empty() {
        return Vec::new();
    }

    let mut names = Vec::new();

    for (i, symbol) in symbols.iter().enumerate() {
        let start = symbol.start_line;
        let end = symbols
            .get(i + 1)
            .map(|next| next.start_line.saturating_sub(1))
            .unwrap_or(file_line_count);

        // Sibling declarations on one line produce an inverted range
        if end < start {
            continue;
        }

        let touched = changed.range(start..=end).next().is_some();
        if touched && symbol.exported && !names.contains(&symbol.name) {
            names.push(symbol.name.clone());
        }
    }

    names
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
