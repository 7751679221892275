use crate::error::ScanResult;
use crate::model::{CallSite, MethodDecl, TypeDecl, UnitInfo};
use std::path::Path;

/// Result of parsing one source file.
///
/// Ids inside are local to the unit (starting at 0); the model remaps them
/// when the unit is added.
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    pub info: UnitInfo,
    pub types: Vec<TypeDecl>,
    pub methods: Vec<MethodDecl>,
    pub calls: Vec<CallSite>,

    /// Number of syntax error or missing nodes in the tree
    pub syntax_errors: usize,
}

impl CompilationUnit {
    pub fn new(info: UnitInfo) -> Self {
        Self {
            info,
            types: Vec::new(),
            methods: Vec::new(),
            calls: Vec::new(),
            syntax_errors: 0,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.syntax_errors > 0
    }
}

/// Trait for language-specific parsers
pub trait Parser {
    /// Parse a source file into declarations and call sites
    fn parse(&self, path: &Path, contents: &str) -> ScanResult<CompilationUnit>;
}

/// 1-indexed first and last line of a node
pub fn line_range(node: tree_sitter::Node) -> (usize, usize) {
    (node.start_position().row + 1, node.end_position().row + 1)
}

/// Extract text from a node; the slice borrows from `source`, not the tree
pub fn node_text<'s>(node: tree_sitter::Node, source: &'s str) -> &'s str {
    &source[node.start_byte()..node.end_byte()]
}

pub fn is_comment(node: tree_sitter::Node) -> bool {
    matches!(node.kind(), "line_comment" | "block_comment" | "comment")
}

/// Named children, comments left out
pub fn named_children(node: tree_sitter::Node) -> Vec<tree_sitter::Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !is_comment(*child))
        .collect()
}

/// Iterator over a node and all its descendants, depth first
pub fn descendants(node: tree_sitter::Node) -> impl Iterator<Item = tree_sitter::Node> {
    DescendantIterator::new(node)
}

struct DescendantIterator<'a> {
    cursor: tree_sitter::TreeCursor<'a>,
    done: bool,
}

impl<'a> DescendantIterator<'a> {
    fn new(node: tree_sitter::Node<'a>) -> Self {
        Self {
            cursor: node.walk(),
            done: false,
        }
    }
}

impl<'a> Iterator for DescendantIterator<'a> {
    type Item = tree_sitter::Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let node = self.cursor.node();

        if self.cursor.goto_first_child() {
            return Some(node);
        }

        loop {
            if self.cursor.goto_next_sibling() {
                return Some(node);
            }
            if !self.cursor.goto_parent() {
                self.done = true;
                return Some(node);
            }
        }
    }
}

/// Count syntax error and missing nodes below `root`
pub fn count_syntax_errors(root: tree_sitter::Node) -> usize {
    if !root.has_error() {
        return 0;
    }
    descendants(root)
        .filter(|n| n.is_error() || n.is_missing())
        .count()
}
