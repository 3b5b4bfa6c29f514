//! Python source → [`SyntaxTree`] via tree-sitter.
//!
//! Only the module's direct children are classified. Everything nested stays
//! inside the owning node's source text.

use tree_sitter::{Node as TsNode, Parser};

use crate::error::ParseError;
use crate::model::{
    DeclarationKind, DeclarationNode, ImportNode, ImportStatement, Node, OtherNode, SyntaxTree,
    import::WILDCARD,
};

/// Name used in errors when the caller does not identify the source.
const ANONYMOUS: &str = "<source>";

/// Parse Python source into a top-level [`SyntaxTree`].
///
/// # Errors
/// Returns [`ParseError`] if the source is not syntactically valid Python.
pub fn parse(source: &str) -> Result<SyntaxTree, ParseError> {
    parse_named(source, ANONYMOUS)
}

/// Parse Python source, naming it `name` in any error.
///
/// # Errors
/// Returns [`ParseError`] if the grammar cannot be loaded or the source
/// contains a syntax error. The error points at the first `ERROR` or
/// `MISSING` node in document order.
pub fn parse_named(source: &str, name: &str) -> Result<SyntaxTree, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| ParseError::Setup {
            name: name.to_owned(),
            message: e.to_string(),
        })?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ParseError::Aborted {
            name: name.to_owned(),
        })?;

    let root = tree.root_node();
    if root.has_error() {
        let offending = first_error(root).unwrap_or(root);
        let position = offending.start_position();
        let message = if offending.is_missing() {
            format!("expected `{}`", offending.kind())
        } else {
            "invalid syntax".to_owned()
        };
        return Err(ParseError::Syntax {
            name: name.to_owned(),
            line: position.row + 1,
            column: position.column + 1,
            message,
        });
    }

    let mut cursor = root.walk();
    let nodes = root
        .named_children(&mut cursor)
        .map(|child| classify(child, source))
        .collect();

    tracing::debug!(name, "parsed source");
    Ok(SyntaxTree::new(nodes))
}

fn first_error(node: TsNode<'_>) -> Option<TsNode<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<TsNode<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

fn text<'s>(node: TsNode<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or_default()
}

/// Dotted path with whitespace and line continuations removed, so
/// `os . path` and `os.path` produce the same key.
fn normalized(node: TsNode<'_>, source: &str) -> Option<String> {
    let path: String = text(node, source)
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\\')
        .collect();
    (!path.is_empty()).then_some(path)
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

fn classify(node: TsNode<'_>, source: &str) -> Node {
    match node.kind() {
        "import_statement" => ImportStatement::new(plain_imports(node, source)).into(),
        "import_from_statement" => {
            let module = node
                .child_by_field_name("module_name")
                .and_then(|m| normalized(m, source));
            ImportStatement::new(from_imports(node, module, source)).into()
        }
        "future_import_statement" => {
            ImportStatement::new(from_imports(node, Some("__future__".to_owned()), source)).into()
        }
        "function_definition" | "class_definition" => declaration(node, node, source),
        "decorated_definition" => match node.child_by_field_name("definition") {
            Some(definition)
                if matches!(definition.kind(), "function_definition" | "class_definition") =>
            {
                declaration(node, definition, source)
            }
            _ => other(node, source),
        },
        _ => other(node, source),
    }
}

fn other(node: TsNode<'_>, source: &str) -> Node {
    OtherNode::new(node.kind(), text(node, source)).into()
}

/// `outer` spans the whole statement (decorators included); `definition` is
/// the `def`/`class` node carrying the name.
fn declaration(outer: TsNode<'_>, definition: TsNode<'_>, source: &str) -> Node {
    let kind = if definition.kind() == "class_definition" {
        DeclarationKind::Class
    } else {
        DeclarationKind::Function
    };
    let name_node = definition.child_by_field_name("name");
    let name = name_node.map(|n| text(n, source).to_owned());
    let name_span = name_node.map(|n| {
        let offset = outer.start_byte();
        n.start_byte() - offset..n.end_byte() - offset
    });

    DeclarationNode {
        kind,
        name,
        name_span,
        source: text(outer, source).to_owned(),
    }
    .into()
}

/// `import a.b, c as d` → one binding per name.
fn plain_imports(node: TsNode<'_>, source: &str) -> Vec<ImportNode> {
    let mut cursor = node.walk();
    node.children_by_field_name("name", &mut cursor)
        .map(|name| {
            let (module, alias) = split_alias(name, source);
            ImportNode {
                module,
                symbol: None,
                alias,
            }
        })
        .collect()
}

/// `from m import a, b as c` / `from m import *` → one binding per name.
fn from_imports(node: TsNode<'_>, module: Option<String>, source: &str) -> Vec<ImportNode> {
    let mut cursor = node.walk();
    let wildcard = node
        .named_children(&mut cursor)
        .any(|child| child.kind() == "wildcard_import");
    if wildcard {
        return vec![ImportNode {
            module,
            symbol: Some(WILDCARD.to_owned()),
            alias: None,
        }];
    }

    let mut cursor = node.walk();
    node.children_by_field_name("name", &mut cursor)
        .map(|name| {
            let (symbol, alias) = split_alias(name, source);
            ImportNode {
                module: module.clone(),
                symbol,
                alias,
            }
        })
        .collect()
}

/// `dotted_name` → (name, None); `aliased_import` → (name, alias).
fn split_alias(node: TsNode<'_>, source: &str) -> (Option<String>, Option<String>) {
    if node.kind() == "aliased_import" {
        let name = node
            .child_by_field_name("name")
            .and_then(|n| normalized(n, source));
        let alias = node
            .child_by_field_name("alias")
            .map(|a| text(a, source).to_owned());
        (name, alias)
    } else {
        (normalized(node, source), None)
    }
}
