//! Error types for parsing and merging.
//!
//! [`ParseError`] means a source file is not valid Python and the merge never
//! started. [`StructuralError`] means a tree contains a node the merge cannot
//! classify; the merge is aborted and no partial tree is produced. Name
//! collisions are not errors at all, see [`crate::merge::MergeReport`].

use thiserror::Error;

use crate::model::TreeOrigin;

/// A source file could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The grammar could not be loaded into the parser.
    #[error("{name}: parser setup failed: {message}")]
    Setup {
        /// File identity (path or `template`/`user`).
        name: String,
        message: String,
    },

    /// The parser gave up without producing a tree.
    #[error("{name}: parsing was aborted")]
    Aborted { name: String },

    /// The source contains a syntax error.
    #[error("{name}:{line}:{column}: {message}")]
    Syntax {
        name: String,
        /// 1-based line of the first offending node.
        line: usize,
        /// 1-based column of the first offending node.
        column: usize,
        message: String,
    },
}

/// What is wrong with a node the merge could not classify.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum StructuralDefect {
    #[error("import binding has no module path")]
    MissingModulePath,
    #[error("import statement binds no names")]
    EmptyImport,
    #[error("declaration has no name")]
    MissingDeclarationName,
}

/// A top-level node that cannot take part in the merge.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{origin} tree, top-level statement #{position}: {defect}")]
pub struct StructuralError {
    /// Tree containing the offending node.
    pub origin: TreeOrigin,
    /// Zero-based index of the node among its tree's top-level statements.
    pub position: usize,
    pub defect: StructuralDefect,
}

impl StructuralError {
    #[must_use]
    pub const fn new(origin: TreeOrigin, position: usize, defect: StructuralDefect) -> Self {
        Self {
            origin,
            position,
            defect,
        }
    }
}

/// Any failure of the parse → merge → unparse pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Structural(#[from] StructuralError),
}
