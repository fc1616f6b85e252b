// src/source/mod.rs

//! Go source rewriting for the implementation package
//!
//! Each source file is parsed into a tree-sitter syntax tree and
//! rewritten with three point edits:
//!
//! - the `main` package clause is renamed to `impl`
//! - the top-level `func main` entry point is renamed to `Main` so it
//!   becomes externally callable (a no-op if already renamed)
//! - every import path with a registered replacement is redirected;
//!   imports without one are left untouched, since they may be genuine
//!   third-party dependencies
//!
//! The rewritten text is a deterministic splice of non-overlapping byte
//! edits over the original source. Exhaustiveness of the ledger is
//! asserted by the caller once the whole package has been processed,
//! because an import may legitimately appear in only one file.

use crate::error::{Error, Result};
use crate::ledger::ReplacementLedger;
use std::io::Write;
use std::ops::Range;
use std::path::Path;
use tree_sitter::{Node, Parser};

/// Package name the implementation is renamed to
const IMPL_PACKAGE: &str = "impl";

/// The conventional program-start symbol and its export-safe name
const ENTRY_POINT: &str = "main";
const EXPORTED_ENTRY_POINT: &str = "Main";

/// A rewritten source file, held in memory until written
#[derive(Debug)]
pub struct RewrittenSource {
    text: String,
}

impl RewrittenSource {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Write with atomic-replace discipline: temp file in the target
    /// directory, then rename. Callers never observe a partial write.
    pub fn write(&self, path: &Path) -> Result<()> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp =
            tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::path_io(path, e))?;
        tmp.write_all(self.text.as_bytes())
            .map_err(|e| Error::path_io(path, e))?;
        tmp.persist(path)
            .map_err(|e| Error::path_io(path, e.error))?;
        Ok(())
    }
}

/// Rewrite the source file at `path` against the ledger
pub fn rewrite_file(path: &Path, ledger: &mut ReplacementLedger) -> Result<RewrittenSource> {
    let src = std::fs::read_to_string(path).map_err(|e| Error::path_io(path, e))?;
    rewrite_text(&src, path, ledger)
}

/// Rewrite source text; `path` is used for diagnostics only
pub fn rewrite_text(
    src: &str,
    path: &Path,
    ledger: &mut ReplacementLedger,
) -> Result<RewrittenSource> {
    let tree = parse(src, path)?;
    let mut edits: Vec<(Range<usize>, String)> = Vec::new();

    collect_edits(tree.root_node(), src, ledger, &mut edits);

    Ok(RewrittenSource {
        text: splice(src, edits),
    })
}

/// Parse the file at `path` and return its declared package name
pub fn declared_package(path: &Path) -> Result<String> {
    let src = std::fs::read_to_string(path).map_err(|e| Error::path_io(path, e))?;
    let tree = parse(&src, path)?;
    let root = tree.root_node();
    child_of_kind(root, "package_clause")
        .and_then(|clause| child_of_kind(clause, "package_identifier"))
        .map(|ident| text(ident, &src).to_string())
        .ok_or_else(|| Error::Package {
            problems: vec![format!("{}: missing package clause", path.display())],
        })
}

/// Parse Go source, failing with location diagnostics on syntax errors
fn parse(src: &str, path: &Path) -> Result<tree_sitter::Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| Error::Internal(format!("loading Go grammar: {e}")))?;

    let tree = parser.parse(src, None).ok_or_else(|| Error::SourceParse {
        path: path.to_path_buf(),
        row: 0,
        column: 0,
    })?;

    if tree.root_node().has_error() {
        let point = first_error(tree.root_node())
            .map(|n| n.start_position())
            .unwrap_or_default();
        return Err(Error::SourceParse {
            path: path.to_path_buf(),
            row: point.row + 1,
            column: point.column + 1,
        });
    }

    Ok(tree)
}

fn first_error<'tree>(node: Node<'tree>) -> Option<Node<'tree>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            if let Some(found) = first_error(child) {
                return Some(found);
            }
        }
    }
    None
}

/// Walk the tree collecting the point edits for this file
fn collect_edits(
    root: Node<'_>,
    src: &str,
    ledger: &mut ReplacementLedger,
    edits: &mut Vec<(Range<usize>, String)>,
) {
    let mut cursor = root.walk();
    for decl in root.children(&mut cursor) {
        match decl.kind() {
            "package_clause" => {
                if let Some(ident) = child_of_kind(decl, "package_identifier") {
                    if text(ident, src) == ENTRY_POINT {
                        edits.push((ident.byte_range(), IMPL_PACKAGE.to_string()));
                    }
                }
            }
            "function_declaration" => {
                if let Some(name) = decl.child_by_field_name("name") {
                    if text(name, src) == ENTRY_POINT {
                        edits.push((name.byte_range(), EXPORTED_ENTRY_POINT.to_string()));
                    }
                }
            }
            "import_declaration" => {
                collect_import_edits(decl, src, ledger, edits);
            }
            _ => {}
        }
    }
}

/// Rewrite every import spec under an import declaration (grouped or
/// single) whose path has a registered replacement
fn collect_import_edits(
    decl: Node<'_>,
    src: &str,
    ledger: &mut ReplacementLedger,
    edits: &mut Vec<(Range<usize>, String)>,
) {
    let mut stack = vec![decl];
    while let Some(node) = stack.pop() {
        if node.kind() == "import_spec" {
            let Some(path_node) = node.child_by_field_name("path") else {
                continue;
            };
            let import_path = text(path_node, src).trim_matches('"');
            if let Some(replacement) = ledger.lookup(import_path) {
                if let Some(target) = &replacement.target {
                    edits.push((path_node.byte_range(), format!("\"{target}\"")));
                }
            }
            continue;
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            stack.push(child);
        }
    }
}

fn child_of_kind<'tree>(node: Node<'tree>, kind: &str) -> Option<Node<'tree>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|c| c.kind() == kind);
    found
}

fn text<'a>(node: Node<'_>, src: &'a str) -> &'a str {
    &src[node.byte_range()]
}

/// Apply non-overlapping byte edits; deterministic for a given tree
fn splice(src: &str, mut edits: Vec<(Range<usize>, String)>) -> String {
    edits.sort_by_key(|(range, _)| range.start);
    let mut out = String::with_capacity(src.len());
    let mut pos = 0;
    for (range, replacement) in edits {
        debug_assert!(range.start >= pos, "overlapping edits");
        out.push_str(&src[pos..range.start]);
        out.push_str(&replacement);
        pos = range.end;
    }
    out.push_str(&src[pos..]);
    out
}
