//! Declaration deconfliction.
//!
//! Concatenates the import-stripped template and user bodies and resolves
//! top-level name collisions first-come-first-served: names are registered
//! walking the template and then the user tree, each in source order, and the
//! first registration of a name keeps it. That walk order is the whole
//! conflict policy.

use std::collections::BTreeSet;

use crate::error::{StructuralDefect, StructuralError};
use crate::model::{DeclarationNode, Node, SyntaxTree, TreeOrigin};

use super::types::{Collision, CollisionPolicy, Resolution};

/// Output of [`merge_declarations`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergedDeclarations {
    /// Template body followed by the user body, collisions resolved.
    pub body: Vec<Node>,
    pub collisions: Vec<Collision>,
}

/// Merge two import-stripped trees into one top-level sequence.
///
/// # Errors
/// Returns [`StructuralError`] if either tree contains a declaration without
/// a name. Nothing is merged in that case.
pub fn merge_declarations(
    template: SyntaxTree,
    user: SyntaxTree,
    policy: &CollisionPolicy,
) -> Result<MergedDeclarations, StructuralError> {
    let mut reserved = declared_names(&template, TreeOrigin::Template)?;
    reserved.extend(declared_names(&user, TreeOrigin::User)?);

    let mut registry = Registry {
        policy,
        reserved,
        registered: BTreeSet::new(),
        body: Vec::with_capacity(template.nodes.len() + user.nodes.len()),
        collisions: Vec::new(),
    };
    registry.extend(template, TreeOrigin::Template);
    registry.extend(user, TreeOrigin::User);

    Ok(MergedDeclarations {
        body: registry.body,
        collisions: registry.collisions,
    })
}

fn declared_names(
    tree: &SyntaxTree,
    origin: TreeOrigin,
) -> Result<BTreeSet<String>, StructuralError> {
    let mut names = BTreeSet::new();
    for (position, node) in tree.nodes.iter().enumerate() {
        if let Node::Declaration(decl) = node {
            let name = declaration_name(decl).ok_or_else(|| {
                StructuralError::new(origin, position, StructuralDefect::MissingDeclarationName)
            })?;
            names.insert(name.to_owned());
        }
    }
    Ok(names)
}

fn declaration_name(decl: &DeclarationNode) -> Option<&str> {
    decl.name.as_deref().filter(|name| !name.is_empty())
}

struct Registry<'p> {
    policy: &'p CollisionPolicy,
    /// Names that a rename must not produce.
    reserved: BTreeSet<String>,
    /// Names already emitted.
    registered: BTreeSet<String>,
    body: Vec<Node>,
    collisions: Vec<Collision>,
}

impl Registry<'_> {
    fn extend(&mut self, tree: SyntaxTree, origin: TreeOrigin) {
        for (position, node) in tree.nodes.into_iter().enumerate() {
            match node {
                Node::Declaration(decl) => self.register(decl, origin, position),
                other @ (Node::Import(_) | Node::Other(_)) => self.body.push(other),
            }
        }
    }

    fn register(&mut self, decl: DeclarationNode, origin: TreeOrigin, position: usize) {
        // Names were validated up front.
        let Some(name) = declaration_name(&decl).map(str::to_owned) else {
            return;
        };

        if self.registered.insert(name.clone()) {
            self.body.push(Node::Declaration(decl));
            return;
        }

        let renamed = match (self.policy, origin) {
            (CollisionPolicy::Rename { suffix }, TreeOrigin::User) => {
                let fresh = self.fresh_name(&name, suffix);
                decl.renamed(&fresh)
            }
            (CollisionPolicy::Rename { .. }, TreeOrigin::Template) | (CollisionPolicy::Drop, _) => {
                None
            }
        };

        let resolution = match renamed {
            Some(renamed) => {
                let to = renamed.name.clone().unwrap_or_default();
                self.reserved.insert(to.clone());
                self.registered.insert(to.clone());
                self.body.push(Node::Declaration(renamed));
                Resolution::Renamed { to }
            }
            None => Resolution::Dropped,
        };

        match &resolution {
            Resolution::Dropped => tracing::warn!(
                name = %name,
                kind = %decl.kind,
                %origin,
                position,
                "dropping declaration that reuses an earlier top-level name"
            ),
            Resolution::Renamed { to } => tracing::warn!(
                name = %name,
                to = %to,
                kind = %decl.kind,
                %origin,
                position,
                "renaming declaration that reuses an earlier top-level name"
            ),
        }

        self.collisions.push(Collision {
            name,
            kind: decl.kind,
            origin,
            position,
            resolution,
        });
    }

    /// `<name><suffix>`, then `<name><suffix>_2`, `_3`, ... until unused.
    fn fresh_name(&self, name: &str, suffix: &str) -> String {
        let base = format!("{name}{suffix}");
        if !self.reserved.contains(&base) {
            return base;
        }
        (2_usize..)
            .map(|n| format!("{base}_{n}"))
            .find(|candidate| !self.reserved.contains(candidate))
            .unwrap_or(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OtherNode;

    fn func(name: &str, body: &str) -> Node {
        DeclarationNode::function(name, format!("def {name}():\n    {body}")).into()
    }

    fn other(text: &str) -> Node {
        OtherNode::new("expression_statement", text).into()
    }

    fn names(body: &[Node]) -> Vec<&str> {
        body.iter()
            .filter_map(|node| match node {
                Node::Declaration(decl) => decl.name.as_deref(),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn template_wins_collision_and_user_copy_is_dropped() {
        let template = SyntaxTree::new(vec![func("validate", "return True")]);
        let user = SyntaxTree::new(vec![func("validate", "return False"), func("extra", "pass")]);

        let merged = merge_declarations(template, user, &CollisionPolicy::Drop).unwrap();
        assert_eq!(names(&merged.body), vec!["validate", "extra"]);
        assert_eq!(merged.body[0], func("validate", "return True"));
        assert_eq!(
            merged.collisions,
            vec![Collision {
                name: "validate".to_owned(),
                kind: crate::model::DeclarationKind::Function,
                origin: TreeOrigin::User,
                position: 0,
                resolution: Resolution::Dropped,
            }]
        );
    }

    #[test]
    fn other_statements_pass_through_in_order() {
        let template = SyntaxTree::new(vec![other("A = 1"), func("f", "pass"), other("B = 2")]);
        let user = SyntaxTree::new(vec![other("A = 1"), func("g", "pass")]);

        let merged = merge_declarations(template, user, &CollisionPolicy::Drop).unwrap();
        assert_eq!(
            merged.body,
            vec![
                other("A = 1"),
                func("f", "pass"),
                other("B = 2"),
                other("A = 1"),
                func("g", "pass"),
            ]
        );
        assert!(merged.collisions.is_empty());
    }

    #[test]
    fn user_only_declarations_keep_relative_order() {
        let user = SyntaxTree::new(vec![func("z", "pass"), func("a", "pass"), func("m", "pass")]);
        let merged =
            merge_declarations(SyntaxTree::default(), user, &CollisionPolicy::Drop).unwrap();
        assert_eq!(names(&merged.body), vec!["z", "a", "m"]);
    }

    #[test]
    fn template_internal_duplicate_keeps_first() {
        let template = SyntaxTree::new(vec![func("f", "return 1"), func("f", "return 2")]);
        let merged =
            merge_declarations(template, SyntaxTree::default(), &CollisionPolicy::rename())
                .unwrap();
        assert_eq!(merged.body, vec![func("f", "return 1")]);
        assert_eq!(merged.collisions[0].origin, TreeOrigin::Template);
        assert_eq!(merged.collisions[0].resolution, Resolution::Dropped);
    }

    #[test]
    fn class_and_function_share_one_namespace() {
        let template = SyntaxTree::new(vec![
            DeclarationNode::class("Handler", "class Handler:\n    pass").into(),
        ]);
        let user = SyntaxTree::new(vec![func("Handler", "pass")]);

        let merged = merge_declarations(template, user, &CollisionPolicy::Drop).unwrap();
        assert_eq!(merged.body.len(), 1);
        assert_eq!(merged.collisions.len(), 1);
    }

    #[test]
    fn rename_policy_keeps_user_copy_under_fresh_name() {
        let template = SyntaxTree::new(vec![func("validate", "return True")]);
        let user = SyntaxTree::new(vec![func("validate", "return False")]);

        let merged = merge_declarations(template, user, &CollisionPolicy::rename()).unwrap();
        assert_eq!(names(&merged.body), vec!["validate", "validate_user"]);
        assert_eq!(merged.body[0], func("validate", "return True"));
        let Node::Declaration(renamed) = &merged.body[1] else {
            panic!("expected declaration");
        };
        assert_eq!(renamed.source, "def validate_user():\n    return False");
        assert_eq!(
            merged.collisions[0].resolution,
            Resolution::Renamed {
                to: "validate_user".to_owned()
            }
        );
    }

    #[test]
    fn rename_avoids_names_declared_anywhere() {
        let template = SyntaxTree::new(vec![func("f", "pass"), func("f_user", "pass")]);
        let user = SyntaxTree::new(vec![func("f", "pass"), func("f_user_2", "pass"), func("f", "pass")]);

        let merged = merge_declarations(template, user, &CollisionPolicy::rename()).unwrap();
        assert_eq!(
            names(&merged.body),
            vec!["f", "f_user", "f_user_3", "f_user_2", "f_user_4"]
        );
    }

    #[test]
    fn unrenamable_declaration_falls_back_to_drop() {
        let template = SyntaxTree::new(vec![func("f", "pass")]);
        let user = SyntaxTree::new(vec![
            DeclarationNode::function("f", "lambda_like = 1").into(),
        ]);

        let merged = merge_declarations(template, user, &CollisionPolicy::rename()).unwrap();
        assert_eq!(merged.body.len(), 1);
        assert_eq!(merged.collisions[0].resolution, Resolution::Dropped);
    }

    #[test]
    fn unnamed_declaration_is_structural() {
        let user = SyntaxTree::new(vec![
            other("x = 1"),
            DeclarationNode {
                name: None,
                ..DeclarationNode::function("f", "def f(): pass")
            }
            .into(),
        ]);

        let err = merge_declarations(SyntaxTree::default(), user, &CollisionPolicy::Drop)
            .unwrap_err();
        assert_eq!(
            err,
            StructuralError::new(TreeOrigin::User, 1, StructuralDefect::MissingDeclarationName)
        );
    }
}
