// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Unified-diff line mapping.
//!
//! Turns a single-file unified diff into the set of line numbers touched in
//! the new revision. Only additions count: deleted lines belong to the old
//! revision and context lines merely advance the cursor.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

/// Hunk header: `@@ -oldStart[,oldCount] +newStart[,newCount] @@`.
/// Counts default to 1 when omitted; only the new start position matters here.
fn hunk_header() -> &'static Regex {
    static HUNK: OnceLock<Regex> = OnceLock::new();
    HUNK.get_or_init(|| {
        // Pattern is a compile-time constant
        #[allow(clippy::unwrap_used)]
        let re = Regex::new(r"^@@ -\d+(?:,\d+)? \+(\d+)(?:,\d+)? @@").unwrap();
        re
    })
}

/// Extract the set of new-revision line numbers touched by a unified diff.
///
/// A diff with zero hunks yields an empty set. Lines preceding the first
/// hunk header (`diff --git`, `index`, file headers) are ignored.
pub fn changed_lines(diff: &str) -> BTreeSet<u32> {
    let mut changed = BTreeSet::new();
    let mut cursor: u32 = 0;
    let mut in_hunk = false;

    for line in diff.lines() {
        if let Some(caps) = hunk_header().captures(line) {
            cursor = caps
                .get(1)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0);
            in_hunk = true;
            continue;
        }

        if !in_hunk {
            continue;
        }

        if line.starts_with('+') && !line.starts_with("+++") {
            changed.insert(cursor);
            cursor += 1;
        } else if line.starts_with('-') && !line.starts_with("---") {
            // Deletion: old-revision line, cursor stays put
        } else {
            cursor += 1;
        }
    }

    changed
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod tests;
