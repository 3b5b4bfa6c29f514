//! End-to-end merge scenarios through the library: parse, merge, unparse.
//!
//! Coverage:
//! - shared import, disjoint functions: one import, both functions
//! - colliding function: exactly one copy, the template's
//! - alias distinguishes import keys
//! - empty user: template content preserved
//! - vendor lambda template with user overrides (drop and rename)
//! - invalid Python and structural failures produce no output

mod common;

use common::{LAMBDA_TEMPLATE, USER_SOURCE};
use spinning_wheel::error::Error;
use spinning_wheel::merge::{
    CollisionPolicy, MergeOptions, Resolution, merge, merge_sources, merge_with_options,
};
use spinning_wheel::model::{ImportKey, Node, SyntaxTree, TreeOrigin};
use spinning_wheel::python::{parse, unparse_merged};

fn merge_text(template: &str, user: &str) -> String {
    let (merged, _report) =
        merge_sources(("template.py", template), ("user.py", user), &MergeOptions::default())
            .expect("merge should succeed");
    merged
}

#[test]
fn shared_import_and_disjoint_functions() {
    let merged = merge_text(
        "import os\n\ndef handler(event, context):\n    return os.getcwd()\n",
        "import os\n\ndef set_secret():\n    pass\n",
    );

    assert_eq!(merged.matches("import os").count(), 1, "merged:\n{merged}");
    assert!(merged.contains("def handler(event, context):"));
    assert!(merged.contains("def set_secret():"));
    assert!(merged.find("def handler").unwrap() < merged.find("def set_secret").unwrap());
}

#[test]
fn colliding_function_keeps_template_text() {
    let template_validate = "def validate(x):\n    return x > 0";
    let merged = merge_text(
        &format!("{template_validate}\n"),
        "def validate(x):\n    return True\n",
    );

    assert_eq!(merged.matches("def validate").count(), 1, "merged:\n{merged}");
    assert!(merged.contains(template_validate));
    assert!(!merged.contains("return True"));
}

#[test]
fn alias_distinguishes_import_keys() {
    let template = parse("import json as j\n").unwrap();
    let user = parse("import json\n").unwrap();

    let merged = merge(template, user).unwrap();
    assert_eq!(
        merged.imports.as_slice(),
        &[ImportKey::module("json").with_alias("j"), ImportKey::module("json")]
    );

    let text = unparse_merged(&merged);
    assert_eq!(text, "import json as j\nimport json\n");
}

#[test]
fn empty_user_preserves_template() {
    let template = parse(LAMBDA_TEMPLATE).unwrap();
    let merged = merge(template.clone(), SyntaxTree::default()).unwrap();

    assert_eq!(merged.imports.as_slice(), template.import_keys().as_slice());
    let body: Vec<&Node> = template
        .nodes
        .iter()
        .filter(|node| !matches!(node, Node::Import(_)))
        .collect();
    assert_eq!(merged.body.iter().collect::<Vec<_>>(), body);

    // Rendering the merge is a fixed point for an already-canonical template.
    assert_eq!(unparse_merged(&merged), LAMBDA_TEMPLATE);
}

#[test]
fn empty_user_text_is_valid() {
    let merged = merge_text(LAMBDA_TEMPLATE, "");
    assert_eq!(merged, LAMBDA_TEMPLATE);
}

#[test]
fn lambda_template_wins_on_overrides() {
    let (merged, report) = merge_sources(
        ("lambda_function.py", LAMBDA_TEMPLATE),
        ("user.py", USER_SOURCE),
        &MergeOptions::default(),
    )
    .unwrap();

    // Template functions are all present, user overrides are dropped.
    for name in ["lambda_handler", "create_secret", "set_secret", "test_secret"] {
        assert_eq!(
            merged.matches(&format!("def {name}(")).count(),
            1,
            "{name} in:\n{merged}"
        );
    }
    assert!(!merged.contains("secret set"));
    assert!(!merged.contains("secret tested"));
    assert!(merged.contains("def get_connection(secret_dict):"));

    // One flattened import block: template first, then new user imports.
    assert!(merged.starts_with(
        "import boto3\nimport logging\nimport os\nimport json\nfrom botocore.exceptions import ClientError\n"
    ));
    assert_eq!(report.imports_kept, 5);
    assert_eq!(report.duplicate_imports.len(), 1);
    assert_eq!(report.duplicate_imports[0].origin, TreeOrigin::User);

    let dropped: Vec<&str> = report.dropped().map(|c| c.name.as_str()).collect();
    assert_eq!(dropped, ["set_secret", "test_secret"]);
}

#[test]
fn lambda_rename_keeps_user_overrides() {
    let options = MergeOptions {
        collision: CollisionPolicy::rename(),
    };
    let (merged, report) = merge_sources(
        ("lambda_function.py", LAMBDA_TEMPLATE),
        ("user.py", USER_SOURCE),
        &options,
    )
    .unwrap();

    assert!(merged.contains("def set_secret(service_client, arn):\n    raise NotImplementedError"));
    assert!(merged.contains("def set_secret_user(service_client, arn):\n    print(\"secret set\")"));
    assert!(merged.contains("def test_secret_user(service_client, arn):"));

    let renamed: Vec<(&str, &Resolution)> = report
        .renamed()
        .map(|c| (c.name.as_str(), &c.resolution))
        .collect();
    assert_eq!(renamed.len(), 2);
    assert_eq!(
        renamed[0],
        (
            "set_secret",
            &Resolution::Renamed {
                to: "set_secret_user".to_owned()
            }
        )
    );

    // The renamed output parses back with unique names.
    let reparsed = parse(&merged).unwrap();
    let names = reparsed.declaration_names();
    let mut unique = names.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), names.len());
}

#[test]
fn merged_output_is_stable_under_reparse() {
    let first = merge_text(LAMBDA_TEMPLATE, USER_SOURCE);
    let second = merge_text(&first, "");
    assert_eq!(first, second);
}

#[test]
fn invalid_user_python_is_a_parse_error() {
    let err = merge_sources(
        ("template.py", LAMBDA_TEMPLATE),
        ("user.py", "def broken(:\n    pass\n"),
        &MergeOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(err, Error::Parse(_)), "got {err:?}");
    assert!(err.to_string().starts_with("user.py:"), "got {err}");
}

#[test]
fn merge_is_repeatable() {
    let options = MergeOptions {
        collision: CollisionPolicy::rename(),
    };
    let template = parse(LAMBDA_TEMPLATE).unwrap();
    let user = parse(USER_SOURCE).unwrap();

    let first = merge_with_options(template.clone(), user.clone(), &options).unwrap();
    let second = merge_with_options(template, user, &options).unwrap();
    assert_eq!(first, second);
}
