// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Function symbol extraction.
//!
//! Parses source text into an ordered list of named top-level functions.
//! The parser sits behind the `FunctionParser` trait so the enforcement
//! engine never depends on a concrete grammar; the shipped implementation
//! uses tree-sitter with the TypeScript grammars.
//!
//! Two syntactic shapes are recognized:
//! - named function declarations: `function foo() {}`
//! - name-bound function values: `const foo = () => {}` / `= function () {}`

use tree_sitter::Node;

/// A named function found in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSymbol {
    /// Bound name of the function.
    pub name: String,
    /// 1-based line of the declaration.
    pub start_line: u32,
    /// Reachable from a module-level export statement.
    pub exported: bool,
    /// Declared async.
    pub is_async: bool,
}

/// Typed failure for unparseable source.
///
/// Callers must treat a failed file as contributing zero changed functions,
/// never abort the run.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Grammar rejected by the tree-sitter runtime.
    #[error("parser initialization failed: {0}")]
    ParserInit(String),

    /// The parser produced no tree at all.
    #[error("source could not be parsed")]
    ParseFailed,

    /// The tree contains syntax errors.
    #[error("source contains syntax errors")]
    Syntax,
}

/// Pluggable source parser.
pub trait FunctionParser {
    /// Parse source text into symbols sorted by start line.
    ///
    /// `extension` (without dot) selects the dialect.
    fn parse_source(
        &self,
        source: &str,
        extension: &str,
    ) -> Result<Vec<FunctionSymbol>, ParseError>;
}

/// tree-sitter based parser for the TypeScript family.
#[derive(Debug, Default)]
pub struct TsFunctionParser;

impl FunctionParser for TsFunctionParser {
    fn parse_source(
        &self,
        source: &str,
        extension: &str,
    ) -> Result<Vec<FunctionSymbol>, ParseError> {
        // JSX needs the TSX grammar; plain JS parses fine as TypeScript.
        let language: tree_sitter::Language = match extension {
            "tsx" | "jsx" => tree_sitter_typescript::LANGUAGE_TSX.into(),
            _ => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        };

        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| ParseError::ParserInit(e.to_string()))?;

        let tree = parser.parse(source, None).ok_or(ParseError::ParseFailed)?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(ParseError::Syntax);
        }

        let mut symbols = Vec::new();
        collect_functions(root, source, &mut symbols);
        symbols.sort_by_key(|s| s.start_line);
        Ok(symbols)
    }
}

/// Recursive walk collecting the two recognized function shapes.
fn collect_functions(node: Node, source: &str, out: &mut Vec<FunctionSymbol>) {
    match node.kind() {
        "function_declaration" | "generator_function_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = node_text(name_node, source);
                if !name.is_empty() {
                    out.push(FunctionSymbol {
                        name,
                        start_line: start_line(node),
                        exported: has_export_ancestor(node),
                        is_async: has_async_child(node),
                    });
                }
            }
        }
        "variable_declarator" => {
            if let (Some(name_node), Some(value)) = (
                node.child_by_field_name("name"),
                node.child_by_field_name("value"),
            ) && name_node.kind() == "identifier"
                && matches!(
                    value.kind(),
                    "arrow_function" | "function_expression" | "function"
                )
            {
                let name = node_text(name_node, source);
                if !name.is_empty() {
                    out.push(FunctionSymbol {
                        name,
                        start_line: start_line(node),
                        exported: has_export_ancestor(node),
                        is_async: has_async_child(value),
                    });
                }
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_functions(child, source, out);
    }
}

fn node_text(node: Node, source: &str) -> String {
    node.utf8_text(source.as_bytes()).unwrap_or("").to_string()
}

fn start_line(node: Node) -> u32 {
    node.start_position().row as u32 + 1
}

/// Exported iff some ancestor is a module-level export statement. Covers both
/// `export function foo` and `export const foo = ...`.
fn has_export_ancestor(node: Node) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        if parent.kind() == "export_statement" {
            return true;
        }
        current = parent.parent();
    }
    false
}

/// The `async` keyword shows up as a named token child of the function node.
fn has_async_child(node: Node) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|c| c.kind() == "async")
}

#[cfg(test)]
#[path = "symbols_tests.rs"]
mod tests;
