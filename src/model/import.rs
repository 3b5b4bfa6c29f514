//! Import bindings and their deduplication keys.
//!
//! The front end flattens every import statement into one [`ImportNode`] per
//! bound name, so `import os, sys as system` yields two nodes. Two nodes are
//! the same import iff their [`ImportKey`]s are equal; spelling, spacing, and
//! parenthesisation of the original statement do not matter.

use std::fmt;

use serde::Serialize;

/// Symbol recorded for `from module import *`.
pub const WILDCARD: &str = "*";

/// A single imported module or symbol, with its optional local alias.
///
/// `module` is optional because the node mirrors what the front end found;
/// the merge rejects bindings without a module path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImportNode {
    /// Dotted module path. Relative imports keep their leading dots (`..pkg`).
    pub module: Option<String>,
    /// Imported symbol for `from` imports; `None` for plain `import m`.
    pub symbol: Option<String>,
    /// Local alias (`as name`).
    pub alias: Option<String>,
}

impl ImportNode {
    /// `import <module>`
    #[must_use]
    pub fn module(module: impl Into<String>) -> Self {
        Self {
            module: Some(module.into()),
            symbol: None,
            alias: None,
        }
    }

    /// `from <module> import <symbol>`
    #[must_use]
    pub fn from_module(module: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            module: Some(module.into()),
            symbol: Some(symbol.into()),
            alias: None,
        }
    }

    /// Attach an `as <alias>` clause.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The deduplication key, or `None` when the module path is missing.
    #[must_use]
    pub fn key(&self) -> Option<ImportKey> {
        let module = self.module.as_deref().filter(|m| !m.is_empty())?;
        Some(ImportKey {
            module: module.to_owned(),
            symbol: self.symbol.clone(),
            alias: self.alias.clone(),
        })
    }
}

/// Identity of an import: (module path, imported symbol or `*`, alias).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ImportKey {
    pub module: String,
    pub symbol: Option<String>,
    pub alias: Option<String>,
}

impl ImportKey {
    /// Key for `import <module>`.
    #[must_use]
    pub fn module(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            symbol: None,
            alias: None,
        }
    }

    /// Key for `from <module> import <symbol>`.
    #[must_use]
    pub fn from_module(module: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            symbol: Some(symbol.into()),
            alias: None,
        }
    }

    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.symbol.as_deref() == Some(WILDCARD)
    }

    /// Turn the key back into a node, e.g. when re-materialising a merged tree.
    #[must_use]
    pub fn to_node(&self) -> ImportNode {
        ImportNode {
            module: Some(self.module.clone()),
            symbol: self.symbol.clone(),
            alias: self.alias.clone(),
        }
    }
}

/// Renders the canonical single-binding Python statement for this key.
impl fmt::Display for ImportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.symbol {
            Some(symbol) => write!(f, "from {} import {symbol}", self.module)?,
            None => write!(f, "import {}", self.module)?,
        }
        if let Some(alias) = &self.alias {
            write!(f, " as {alias}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_requires_module_path() {
        let node = ImportNode {
            module: None,
            symbol: Some("x".to_owned()),
            alias: None,
        };
        assert_eq!(node.key(), None);

        let empty = ImportNode {
            module: Some(String::new()),
            symbol: None,
            alias: None,
        };
        assert_eq!(empty.key(), None);
    }

    #[test]
    fn alias_is_part_of_the_key() {
        let plain = ImportNode::module("json").key();
        let aliased = ImportNode::module("json").with_alias("j").key();
        assert_ne!(plain, aliased);
    }

    #[test]
    fn display_renders_python_statements() {
        assert_eq!(ImportKey::module("os").to_string(), "import os");
        assert_eq!(
            ImportKey::module("json").with_alias("j").to_string(),
            "import json as j"
        );
        assert_eq!(
            ImportKey::from_module("..pkg", "thing").to_string(),
            "from ..pkg import thing"
        );
        assert_eq!(
            ImportKey::from_module("typing", "List")
                .with_alias("L")
                .to_string(),
            "from typing import List as L"
        );
        assert_eq!(
            ImportKey::from_module("helpers", WILDCARD).to_string(),
            "from helpers import *"
        );
    }

    #[test]
    fn to_node_round_trips_through_key() {
        let key = ImportKey::from_module("os", "path").with_alias("p");
        assert_eq!(key.to_node().key(), Some(key.clone()));
        assert!(!key.is_wildcard());
    }
}
