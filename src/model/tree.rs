//! Top-level syntax tree of one source file.
//!
//! A [`SyntaxTree`] is a flat, owned sequence of top-level [`Node`]s. There
//! are no parent links: nested structure lives inside each node's source
//! text and is never inspected by the merge.

use std::fmt;
use std::ops::Range;

use serde::Serialize;

use super::import::{ImportKey, ImportNode};

/// Which of the two merge inputs a node came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeOrigin {
    /// The vendor-prescribed skeleton. Always wins on collisions.
    Template,
    /// The caller-supplied, type-specific logic.
    User,
}

impl fmt::Display for TreeOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template => write!(f, "template"),
            Self::User => write!(f, "user"),
        }
    }
}

/// One parsed source file as an ordered list of top-level statements.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyntaxTree {
    pub nodes: Vec<Node>,
}

impl SyntaxTree {
    #[must_use]
    pub const fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Top-level declarations in source order.
    pub fn declarations(&self) -> impl Iterator<Item = &DeclarationNode> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Declaration(decl) => Some(decl),
            Node::Import(_) | Node::Other(_) => None,
        })
    }

    /// Names of the named top-level declarations, in source order.
    #[must_use]
    pub fn declaration_names(&self) -> Vec<&str> {
        self.declarations()
            .filter_map(|decl| decl.name.as_deref())
            .collect()
    }

    /// First declaration with the given name.
    #[must_use]
    pub fn declaration(&self, name: &str) -> Option<&DeclarationNode> {
        self.declarations()
            .find(|decl| decl.name.as_deref() == Some(name))
    }

    /// Keys of every well-formed import binding, in source order, duplicates included.
    #[must_use]
    pub fn import_keys(&self) -> Vec<ImportKey> {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                Node::Import(stmt) => Some(stmt.names.iter().filter_map(ImportNode::key)),
                Node::Declaration(_) | Node::Other(_) => None,
            })
            .flatten()
            .collect()
    }
}

/// A top-level statement, classified for the merge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Import(ImportStatement),
    Declaration(DeclarationNode),
    Other(OtherNode),
}

impl From<ImportStatement> for Node {
    fn from(stmt: ImportStatement) -> Self {
        Self::Import(stmt)
    }
}

impl From<DeclarationNode> for Node {
    fn from(decl: DeclarationNode) -> Self {
        Self::Declaration(decl)
    }
}

impl From<OtherNode> for Node {
    fn from(other: OtherNode) -> Self {
        Self::Other(other)
    }
}

/// An import statement, already flattened into one binding per name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportStatement {
    pub names: Vec<ImportNode>,
}

impl ImportStatement {
    #[must_use]
    pub const fn new(names: Vec<ImportNode>) -> Self {
        Self { names }
    }

    /// A statement binding exactly one name.
    #[must_use]
    pub fn single(name: ImportNode) -> Self {
        Self { names: vec![name] }
    }
}

/// Kind of a top-level named definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    /// `def` or `async def`, decorated or not.
    Function,
    /// `class`, decorated or not.
    Class,
}

impl DeclarationKind {
    /// The Python keyword that introduces the definition header.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Function => "def",
            Self::Class => "class",
        }
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function => write!(f, "function"),
            Self::Class => write!(f, "class"),
        }
    }
}

/// A top-level function or class definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclarationNode {
    pub kind: DeclarationKind,
    /// Declared name. `None` only for malformed input.
    pub name: Option<String>,
    /// Byte range of the name inside `source`, when the front end knows it.
    pub name_span: Option<Range<usize>>,
    /// Full definition text, decorators included.
    pub source: String,
}

impl DeclarationNode {
    /// A function declaration without a recorded name span.
    #[must_use]
    pub fn function(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            kind: DeclarationKind::Function,
            name: Some(name.into()),
            name_span: None,
            source: source.into(),
        }
    }

    /// A class declaration without a recorded name span.
    #[must_use]
    pub fn class(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            kind: DeclarationKind::Class,
            name: Some(name.into()),
            name_span: None,
            source: source.into(),
        }
    }

    /// Copy of this declaration whose header declares `new_name` instead.
    ///
    /// Only the definition header changes; references to the old name in the
    /// body are left alone. Returns `None` if the name cannot be located.
    #[must_use]
    pub fn renamed(&self, new_name: &str) -> Option<Self> {
        let name = self.name.as_deref()?;
        let span = self
            .name_span
            .clone()
            .filter(|span| self.source.get(span.clone()) == Some(name))
            .or_else(|| locate_header_name(&self.source, self.kind.keyword(), name))?;

        let mut source = String::with_capacity(self.source.len() + new_name.len());
        source.push_str(self.source.get(..span.start)?);
        source.push_str(new_name);
        source.push_str(self.source.get(span.end..)?);

        Some(Self {
            kind: self.kind,
            name: Some(new_name.to_owned()),
            name_span: Some(span.start..span.start + new_name.len()),
            source,
        })
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Find `<keyword> <name>` where both are whole identifiers.
fn locate_header_name(source: &str, keyword: &str, name: &str) -> Option<Range<usize>> {
    let mut from = 0;
    while let Some(found) = source.get(from..)?.find(keyword) {
        let keyword_start = from + found;
        let after_keyword = keyword_start + keyword.len();
        from = after_keyword;

        let starts_word = source
            .get(..keyword_start)?
            .chars()
            .next_back()
            .is_none_or(|c| !is_identifier_char(c));
        let rest = source.get(after_keyword..)?;
        let trimmed = rest.trim_start_matches([' ', '\t']);
        let gap = rest.len() - trimmed.len();
        if !starts_word || gap == 0 || !trimmed.starts_with(name) {
            continue;
        }
        let ends_word = trimmed
            .get(name.len()..)?
            .chars()
            .next()
            .is_none_or(|c| !is_identifier_char(c));
        if ends_word {
            let start = after_keyword + gap;
            return Some(start..start + name.len());
        }
    }
    None
}

/// Any other top-level statement, kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OtherNode {
    /// Grammar node kind, e.g. `expression_statement` or `comment`.
    pub kind: String,
    pub source: String,
}

impl OtherNode {
    #[must_use]
    pub fn new(kind: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            source: source.into(),
        }
    }

    #[must_use]
    pub fn is_comment(&self) -> bool {
        self.kind == "comment"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_uses_recorded_span() {
        let decl = DeclarationNode {
            kind: DeclarationKind::Function,
            name: Some("validate".to_owned()),
            name_span: Some(4..12),
            source: "def validate(x):\n    return validate(x - 1)".to_owned(),
        };
        let renamed = decl.renamed("validate_user").unwrap();
        assert_eq!(renamed.name.as_deref(), Some("validate_user"));
        assert_eq!(
            renamed.source,
            "def validate_user(x):\n    return validate(x - 1)"
        );
        assert_eq!(renamed.name_span, Some(4..17));
    }

    #[test]
    fn rename_searches_header_without_span() {
        let decl = DeclarationNode::function(
            "handler",
            "@wraps(define_handler)\nasync def handler(event):\n    pass",
        );
        let renamed = decl.renamed("handler_user").unwrap();
        assert_eq!(
            renamed.source,
            "@wraps(define_handler)\nasync def handler_user(event):\n    pass"
        );
    }

    #[test]
    fn rename_skips_prefix_matches() {
        let decl = DeclarationNode::class("Point", "class Points:\n    pass\nclass Point:\n    pass");
        let renamed = decl.renamed("Point2").unwrap();
        assert_eq!(
            renamed.source,
            "class Points:\n    pass\nclass Point2:\n    pass"
        );
    }

    #[test]
    fn rename_fails_when_header_is_missing() {
        let decl = DeclarationNode::function("ghost", "x = 1");
        assert_eq!(decl.renamed("ghost_user"), None);

        let unnamed = DeclarationNode {
            name: None,
            ..DeclarationNode::function("f", "def f(): pass")
        };
        assert_eq!(unnamed.renamed("g"), None);
    }

    #[test]
    fn tree_queries_follow_source_order() {
        let tree = SyntaxTree::new(vec![
            ImportStatement::new(vec![
                ImportNode::module("os"),
                ImportNode::module("sys"),
            ])
            .into(),
            DeclarationNode::function("b", "def b(): pass").into(),
            OtherNode::new("expression_statement", "x = 1").into(),
            DeclarationNode::class("A", "class A: pass").into(),
            ImportStatement::single(ImportNode::module("os")).into(),
        ]);
        assert_eq!(tree.declaration_names(), vec!["b", "A"]);
        assert_eq!(
            tree.import_keys(),
            vec![
                ImportKey::module("os"),
                ImportKey::module("sys"),
                ImportKey::module("os"),
            ]
        );
        assert_eq!(
            tree.declaration("A").map(|d| d.kind),
            Some(DeclarationKind::Class)
        );
        assert!(!tree.is_empty());
    }
}
