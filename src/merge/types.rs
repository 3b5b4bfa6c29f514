//! Types produced by the merge: the merged tree, its import block, the
//! collision policy, and the report of everything that was discarded.

use serde::Serialize;

use crate::model::{DeclarationKind, ImportKey, ImportStatement, Node, SyntaxTree, TreeOrigin};

// ---------------------------------------------------------------------------
// ImportBlock
// ---------------------------------------------------------------------------

/// Deduplicated imports of both trees, in first-seen order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportBlock(Vec<ImportKey>);

impl ImportBlock {
    /// Wrap keys that are already known to be unique.
    pub(crate) const fn from_unique(keys: Vec<ImportKey>) -> Self {
        Self(keys)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains(&self, key: &ImportKey) -> bool {
        self.0.contains(key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ImportKey> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ImportKey] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a ImportBlock {
    type Item = &'a ImportKey;
    type IntoIter = std::slice::Iter<'a, ImportKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ---------------------------------------------------------------------------
// MergedTree
// ---------------------------------------------------------------------------

/// `[import block] ++ [template body] ++ [user body]`, imports stripped from
/// both bodies and collisions resolved.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergedTree {
    pub imports: ImportBlock,
    pub body: Vec<Node>,
}

impl MergedTree {
    /// Names of the top-level declarations in output order.
    #[must_use]
    pub fn declaration_names(&self) -> Vec<&str> {
        self.body
            .iter()
            .filter_map(|node| match node {
                Node::Declaration(decl) => decl.name.as_deref(),
                Node::Import(_) | Node::Other(_) => None,
            })
            .collect()
    }

    /// Materialise as a plain tree: one single-binding import statement per
    /// block entry, followed by the body.
    #[must_use]
    pub fn to_syntax_tree(&self) -> SyntaxTree {
        self.clone().into()
    }
}

impl From<MergedTree> for SyntaxTree {
    fn from(merged: MergedTree) -> Self {
        let mut nodes = Vec::with_capacity(merged.imports.len() + merged.body.len());
        nodes.extend(
            merged
                .imports
                .iter()
                .map(|key| Node::Import(ImportStatement::single(key.to_node()))),
        );
        nodes.extend(merged.body);
        Self::new(nodes)
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Suffix appended to renamed user declarations by default.
pub const DEFAULT_RENAME_SUFFIX: &str = "_user";

/// How a later declaration that reuses an earlier name is resolved.
///
/// The earlier declaration always keeps its name. Template declarations are
/// never renamed; a name declared twice inside the template keeps only the
/// first definition under either policy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Drop the later declaration.
    #[default]
    Drop,
    /// Keep the later user declaration under `<name><suffix>` (then `_2`, `_3`, ...).
    Rename { suffix: String },
}

impl CollisionPolicy {
    #[must_use]
    pub fn rename() -> Self {
        Self::Rename {
            suffix: DEFAULT_RENAME_SUFFIX.to_owned(),
        }
    }
}

/// Knobs for [`crate::merge::merge_with_options`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeOptions {
    pub collision: CollisionPolicy,
}

impl MergeOptions {
    /// Build from the `[merge]` section of the configuration file.
    #[must_use]
    pub fn from_config(config: &crate::config::MergeConfig) -> Self {
        use crate::config::CollisionMode;
        let collision = match config.collision {
            CollisionMode::Drop => CollisionPolicy::Drop,
            CollisionMode::Rename => CollisionPolicy::Rename {
                suffix: config.rename_suffix.clone(),
            },
        };
        Self { collision }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// An import binding discarded because an equal key was already seen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DuplicateImport {
    pub key: ImportKey,
    pub origin: TreeOrigin,
    /// Top-level position of the statement that carried the binding.
    pub position: usize,
}

/// What happened to a colliding declaration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Resolution {
    Dropped,
    Renamed { to: String },
}

/// A later declaration that reused an already-registered name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub name: String,
    pub kind: DeclarationKind,
    /// Tree of the losing declaration.
    pub origin: TreeOrigin,
    /// Position of the losing declaration in its import-stripped tree.
    pub position: usize,
    pub resolution: Resolution,
}

/// Everything the merge discarded or rewrote.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub imports_kept: usize,
    pub duplicate_imports: Vec<DuplicateImport>,
    pub collisions: Vec<Collision>,
}

impl MergeReport {
    #[must_use]
    pub fn dropped(&self) -> impl Iterator<Item = &Collision> {
        self.collisions
            .iter()
            .filter(|c| c.resolution == Resolution::Dropped)
    }

    #[must_use]
    pub fn renamed(&self) -> impl Iterator<Item = &Collision> {
        self.collisions
            .iter()
            .filter(|c| matches!(c.resolution, Resolution::Renamed { .. }))
    }
}

/// Result of [`crate::merge::merge_with_options`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeOutcome {
    pub tree: MergedTree,
    pub report: MergeReport,
}
