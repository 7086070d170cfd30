// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Test coverage detection.
//!
//! Decides whether a test file exercises a given function by parsing the
//! file and inspecting the description strings of `describe`/`test`/`it`
//! calls. A function counts as covered when its name appears (case
//! insensitively) inside any description. The walk stops at the first
//! match. Unreadable or unparseable test files degrade to "not covered",
//! never to an error.

use std::path::Path;

use tree_sitter::Node;

/// Test-framework entry points whose first argument names what is tested.
const TEST_ENTRY_POINTS: [&str; 3] = ["describe", "test", "it"];

/// True if `test_file` appears to exercise `function_name`.
pub fn covers_function(test_file: &Path, function_name: &str) -> bool {
    let source = match std::fs::read_to_string(test_file) {
        Ok(s) => s,
        Err(e) => {
            tracing::debug!("cannot read test file {}: {}", test_file.display(), e);
            return false;
        }
    };

    let extension = test_file
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("ts");

    covers_in_source(&source, extension, function_name)
}

/// Structural match over already-loaded test source.
pub fn covers_in_source(source: &str, extension: &str, function_name: &str) -> bool {
    let language: tree_sitter::Language = match extension {
        "tsx" | "jsx" => tree_sitter_typescript::LANGUAGE_TSX.into(),
        _ => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
    };

    let mut parser = tree_sitter::Parser::new();
    if parser.set_language(&language).is_err() {
        return false;
    }

    let Some(tree) = parser.parse(source, None) else {
        return false;
    };
    let root = tree.root_node();
    if root.has_error() {
        return false;
    }

    let needle = function_name.to_lowercase();
    find_matching_call(root, source, &needle)
}

/// Depth-first search for a test call whose description contains the needle.
fn find_matching_call(node: Node, source: &str, needle: &str) -> bool {
    if node.kind() == "call_expression"
        && let Some(description) = call_description(node, source)
        && description.to_lowercase().contains(needle)
    {
        return true;
    }

    let mut cursor = node.walk();
    node.children(&mut cursor)
        .any(|child| find_matching_call(child, source, needle))
}

/// Literal description of a test call, if this is one.
///
/// Requires the callee to be a bare `describe`/`test`/`it` identifier and
/// the first argument to be a plain string or a substitution-free template
/// literal.
fn call_description(call: Node, source: &str) -> Option<String> {
    let callee = call.child_by_field_name("function")?;
    if callee.kind() != "identifier" {
        return None;
    }
    let name = callee.utf8_text(source.as_bytes()).ok()?;
    if !TEST_ENTRY_POINTS.contains(&name) {
        return None;
    }

    let arguments = call.child_by_field_name("arguments")?;
    let first = arguments.named_child(0)?;
    literal_text(first, source)
}

/// Literal text of a string or simple template literal, quotes stripped.
fn literal_text(node: Node, source: &str) -> Option<String> {
    match node.kind() {
        "string" => {
            let raw = node.utf8_text(source.as_bytes()).ok()?;
            Some(strip_delimiters(raw))
        }
        "template_string" => {
            // Template literals with substitutions have no single literal text
            let mut cursor = node.walk();
            if node
                .children(&mut cursor)
                .any(|c| c.kind() == "template_substitution")
            {
                return None;
            }
            let raw = node.utf8_text(source.as_bytes()).ok()?;
            Some(strip_delimiters(raw))
        }
        _ => None,
    }
}

fn strip_delimiters(raw: &str) -> String {
    raw.trim_matches(|c| c == '"' || c == '\'' || c == '`').to_string()
}

#[cfg(test)]
#[path = "detect_tests.rs"]
mod tests;
