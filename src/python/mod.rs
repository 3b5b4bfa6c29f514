//! Python front end: tree-sitter backed `parse` and a source-preserving
//! `unparse`.
//!
//! `unparse` is a left inverse of `parse` up to formatting: re-parsing its
//! output yields the same import keys and the same declaration names and
//! sources.

mod parse;
mod unparse;

pub use parse::{parse, parse_named};
pub use unparse::{unparse, unparse_merged};

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = r#"import boto3
import logging
import os

logger = logging.getLogger()
logger.setLevel(logging.INFO)


def lambda_handler(event, context):
    arn = event['SecretId']
    step = event['Step']
    if step == "createSecret":
        create_secret(arn)


def create_secret(arn):
    pass
"#;

    #[test]
    fn reparse_preserves_imports_and_declarations() {
        let tree = parse(TEMPLATE).unwrap();
        let reparsed = parse(&unparse(&tree)).unwrap();
        assert_eq!(tree.import_keys(), reparsed.import_keys());
        assert_eq!(tree.declaration_names(), reparsed.declaration_names());
        assert_eq!(tree, reparsed);
    }

    #[test]
    fn canonical_source_is_a_fixed_point() {
        let rendered = unparse(&parse(TEMPLATE).unwrap());
        assert_eq!(rendered, TEMPLATE);
        assert_eq!(unparse(&parse(&rendered).unwrap()), rendered);
    }
}
