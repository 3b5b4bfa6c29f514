//! Template/user merge engine.
//!
//! Runs two phases over a pair of owned trees:
//!
//! - **imports**: flatten and deduplicate every import of both trees into one
//!   block, first-seen order, template before user ([`imports`]).
//! - **declarations**: concatenate the import-stripped bodies, template first,
//!   and resolve top-level name collisions first-come-first-served
//!   ([`declarations`]).
//!
//! The result is `[import block] ++ [template body] ++ [user body]`.
//!
//! # Determinism guarantee
//!
//! The merge is a pure function of its inputs. Value-equal trees always
//! produce value-equal [`MergedTree`]s: iteration order is fixed (template,
//! then user, each in source order) and no hashing order, clock, or
//! filesystem state is consulted.

pub mod declarations;
pub mod imports;
pub mod types;


pub use declarations::{MergedDeclarations, merge_declarations};
pub use imports::{UnifiedImports, unify_imports};
pub use types::{
    Collision, CollisionPolicy, DEFAULT_RENAME_SUFFIX, DuplicateImport, ImportBlock,
    MergeOptions, MergeOutcome, MergeReport, MergedTree, Resolution,
};

use crate::error::{Error, StructuralDefect, StructuralError};
use crate::model::{Node, SyntaxTree, TreeOrigin};
use crate::python;

/// Merge `template` and `user` with the default (drop) collision policy.
///
/// # Errors
/// Returns [`StructuralError`] if either tree holds a node that cannot be
/// classified. No partial tree is returned.
pub fn merge(template: SyntaxTree, user: SyntaxTree) -> Result<MergedTree, StructuralError> {
    merge_with_options(template, user, &MergeOptions::default()).map(|outcome| outcome.tree)
}

/// Merge `template` and `user`, reporting every discarded import and every
/// resolved collision.
///
/// # Errors
/// Returns [`StructuralError`] naming the offending tree and the node's
/// top-level position in that tree as it was passed in.
pub fn merge_with_options(
    template: SyntaxTree,
    user: SyntaxTree,
    options: &MergeOptions,
) -> Result<MergeOutcome, StructuralError> {
    let span = tracing::info_span!(
        "merge",
        template_nodes = template.nodes.len(),
        user_nodes = user.nodes.len()
    );
    let _guard = span.enter();

    // Validate both trees before touching either, so positions refer to the
    // caller's trees rather than the import-stripped ones.
    check_structure(&template, TreeOrigin::Template)?;
    check_structure(&user, TreeOrigin::User)?;

    let unified = unify_imports(template, user)?;
    let merged = merge_declarations(unified.template, unified.user, &options.collision)?;

    let report = MergeReport {
        imports_kept: unified.block.len(),
        duplicate_imports: unified.discarded,
        collisions: merged.collisions,
    };
    tracing::info!(
        imports = report.imports_kept,
        duplicate_imports = report.duplicate_imports.len(),
        collisions = report.collisions.len(),
        "merge complete"
    );

    Ok(MergeOutcome {
        tree: MergedTree {
            imports: unified.block,
            body: merged.body,
        },
        report,
    })
}

/// Parse both sources, merge them, and render the result.
///
/// `template_name` and `user_name` identify the files in parse errors.
///
/// # Errors
/// Returns [`Error::Parse`] if either source is invalid Python, or
/// [`Error::Structural`] if the merge rejects a node.
pub fn merge_sources(
    (template_name, template_source): (&str, &str),
    (user_name, user_source): (&str, &str),
    options: &MergeOptions,
) -> Result<(String, MergeReport), Error> {
    let template = python::parse_named(template_source, template_name)?;
    let user = python::parse_named(user_source, user_name)?;
    let outcome = merge_with_options(template, user, options)?;
    Ok((python::unparse_merged(&outcome.tree), outcome.report))
}

/// Reject nodes the merge cannot classify.
fn check_structure(tree: &SyntaxTree, origin: TreeOrigin) -> Result<(), StructuralError> {
    for (position, node) in tree.nodes.iter().enumerate() {
        let defect = match node {
            Node::Import(stmt) if stmt.names.is_empty() => Some(StructuralDefect::EmptyImport),
            Node::Import(stmt) if stmt.names.iter().any(|name| name.key().is_none()) => {
                Some(StructuralDefect::MissingModulePath)
            }
            Node::Declaration(decl) if decl.name.as_deref().is_none_or(str::is_empty) => {
                Some(StructuralDefect::MissingDeclarationName)
            }
            Node::Import(_) | Node::Declaration(_) | Node::Other(_) => None,
        };
        if let Some(defect) = defect {
            return Err(StructuralError::new(origin, position, defect));
        }
    }
    Ok(())
}
