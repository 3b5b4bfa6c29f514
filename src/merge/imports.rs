//! Import unification.
//!
//! Pulls every import binding out of both trees (template first, each in
//! source order) and keeps the first occurrence of each [`ImportKey`]. Later
//! duplicates are discarded silently and recorded in the report.

use std::collections::BTreeSet;

use crate::error::{StructuralDefect, StructuralError};
use crate::model::{ImportKey, Node, SyntaxTree, TreeOrigin};

use super::types::{DuplicateImport, ImportBlock};

/// Output of [`unify_imports`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnifiedImports {
    pub block: ImportBlock,
    /// Template tree with its import statements removed.
    pub template: SyntaxTree,
    /// User tree with its import statements removed.
    pub user: SyntaxTree,
    pub discarded: Vec<DuplicateImport>,
}

/// Build the deduplicated import block and strip imports from both trees.
///
/// # Errors
/// Returns [`StructuralError`] for an import statement that binds nothing or
/// a binding without a module path. Positions refer to the input trees.
pub fn unify_imports(
    template: SyntaxTree,
    user: SyntaxTree,
) -> Result<UnifiedImports, StructuralError> {
    let mut unifier = Unifier::default();
    let template = unifier.strip(template, TreeOrigin::Template)?;
    let user = unifier.strip(user, TreeOrigin::User)?;

    tracing::debug!(
        kept = unifier.keys.len(),
        discarded = unifier.discarded.len(),
        "imports unified"
    );

    Ok(UnifiedImports {
        block: ImportBlock::from_unique(unifier.keys),
        template,
        user,
        discarded: unifier.discarded,
    })
}

/// First-seen ordered set of import keys.
#[derive(Default)]
struct Unifier {
    seen: BTreeSet<ImportKey>,
    keys: Vec<ImportKey>,
    discarded: Vec<DuplicateImport>,
}

impl Unifier {
    fn strip(
        &mut self,
        tree: SyntaxTree,
        origin: TreeOrigin,
    ) -> Result<SyntaxTree, StructuralError> {
        let mut kept = Vec::with_capacity(tree.nodes.len());
        for (position, node) in tree.nodes.into_iter().enumerate() {
            let Node::Import(stmt) = node else {
                kept.push(node);
                continue;
            };
            if stmt.names.is_empty() {
                return Err(StructuralError::new(
                    origin,
                    position,
                    StructuralDefect::EmptyImport,
                ));
            }
            for binding in &stmt.names {
                let key = binding.key().ok_or_else(|| {
                    StructuralError::new(origin, position, StructuralDefect::MissingModulePath)
                })?;
                self.insert(key, origin, position);
            }
        }
        Ok(SyntaxTree::new(kept))
    }

    fn insert(&mut self, key: ImportKey, origin: TreeOrigin, position: usize) {
        if self.seen.contains(&key) {
            tracing::debug!(import = %key, %origin, position, "duplicate import discarded");
            self.discarded.push(DuplicateImport {
                key,
                origin,
                position,
            });
        } else {
            self.seen.insert(key.clone());
            self.keys.push(key);
        }
    }
}
