//! Tree model shared by the front end and the merge.

pub mod import;
pub mod tree;

pub use import::{ImportKey, ImportNode};
pub use tree::{
    DeclarationKind, DeclarationNode, ImportStatement, Node, OtherNode, SyntaxTree, TreeOrigin,
};
