//! [`SyntaxTree`] → Python source.
//!
//! Imports are rendered canonically from their keys, one binding per line.
//! Declarations and other statements are emitted verbatim. Spacing follows
//! PEP 8 at the top level: two blank lines around definitions, one blank line
//! after the import block.

use crate::merge::MergedTree;
use crate::model::{ImportNode, Node, SyntaxTree};

/// Render a tree as Python source ending in a single newline.
///
/// Empty trees render as the empty string.
#[must_use]
pub fn unparse(tree: &SyntaxTree) -> String {
    let mut out = String::new();
    let mut previous: Option<&Node> = None;

    for node in &tree.nodes {
        let Some(text) = render(node) else { continue };
        if let Some(previous) = previous {
            out.push_str(separator(previous, node));
        }
        out.push_str(&text);
        previous = Some(node);
    }

    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Render a merged tree: the import block, then the merged body.
#[must_use]
pub fn unparse_merged(merged: &MergedTree) -> String {
    unparse(&merged.to_syntax_tree())
}

fn render(node: &Node) -> Option<String> {
    let text = match node {
        Node::Import(stmt) => stmt
            .names
            .iter()
            .filter_map(ImportNode::key)
            .map(|key| key.to_string())
            .collect::<Vec<_>>()
            .join("\n"),
        Node::Declaration(decl) => decl.source.trim_end().to_owned(),
        Node::Other(other) => other.source.trim_end().to_owned(),
    };
    (!text.is_empty()).then_some(text)
}

fn separator(previous: &Node, next: &Node) -> &'static str {
    match (previous, next) {
        // A comment belongs to whatever follows it.
        (Node::Other(other), _) if other.is_comment() => "\n",
        (Node::Declaration(_), _) | (_, Node::Declaration(_)) => "\n\n\n",
        (Node::Import(_), Node::Other(_)) => "\n\n",
        (Node::Import(_) | Node::Other(_), Node::Import(_) | Node::Other(_)) => "\n",
    }
}
