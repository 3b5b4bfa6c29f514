//! Shared test helpers for spinning-wheel integration tests.
//!
//! All tests use temp directories. The binary never reaches the network:
//! every CLI test passes a local `--template`.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// A trimmed copy of the vendor rotation template.
pub const LAMBDA_TEMPLATE: &str = r#"import boto3
import logging
import os

logger = logging.getLogger()
logger.setLevel(logging.INFO)


def lambda_handler(event, context):
    arn = event['SecretId']
    step = event['Step']
    service_client = boto3.client('secretsmanager', endpoint_url=os.environ['SECRETS_MANAGER_ENDPOINT'])
    if step == "createSecret":
        create_secret(service_client, arn)
    elif step == "setSecret":
        set_secret(service_client, arn)
    elif step == "testSecret":
        test_secret(service_client, arn)
    else:
        raise ValueError("Invalid step parameter")


def create_secret(service_client, arn):
    logger.info("createSecret: %s" % arn)


def set_secret(service_client, arn):
    raise NotImplementedError


def test_secret(service_client, arn):
    raise NotImplementedError
"#;

/// User logic that redefines two template functions and adds a helper.
pub const USER_SOURCE: &str = r#"import json
import os
from botocore.exceptions import ClientError


def set_secret(service_client, arn):
    print("secret set")


def test_secret(service_client, arn):
    print("secret tested")


def get_connection(secret_dict):
    return json.dumps(secret_dict)
"#;

/// Fresh temp dir holding `template.py` and `user.py`.
pub fn setup_sources() -> TempDir {
    let dir = TempDir::new().expect("failed to create temp dir");
    write(dir.path(), "template.py", LAMBDA_TEMPLATE);
    write(dir.path(), "user.py", USER_SOURCE);
    dir
}

/// Write `contents` to `<dir>/<relative>`, creating parent directories.
pub fn write(dir: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("failed to create parent dir");
    }
    std::fs::write(&path, contents).expect("failed to write file");
    path
}

/// Read `<dir>/<relative>` to a string.
pub fn read(dir: &Path, relative: &str) -> String {
    std::fs::read_to_string(dir.join(relative))
        .unwrap_or_else(|e| panic!("failed to read {relative}: {e}"))
}

/// Run spinning-wheel in `dir` with a clean environment.
pub fn wheel_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_spinning-wheel"))
        .args(args)
        .current_dir(dir)
        .env_remove("SPINNING_WHEEL_CONFIG")
        .env_remove("OTEL_EXPORTER_OTLP_ENDPOINT")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute spinning-wheel")
}

/// Run spinning-wheel and assert it succeeds. Returns stdout as string.
pub fn wheel_ok(dir: &Path, args: &[&str]) -> String {
    let out = wheel_in(dir, args);
    let stderr = String::from_utf8_lossy(&out.stderr);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        out.status.success(),
        "spinning-wheel {} failed:\nstdout: {stdout}\nstderr: {stderr}",
        args.join(" "),
    );
    stdout.to_string()
}

/// Run spinning-wheel and assert it fails. Returns stderr as string.
pub fn wheel_fails(dir: &Path, args: &[&str]) -> String {
    let out = wheel_in(dir, args);
    assert!(
        !out.status.success(),
        "Expected spinning-wheel {} to fail, but it succeeded.\nstdout: {}",
        args.join(" "),
        String::from_utf8_lossy(&out.stdout),
    );
    String::from_utf8_lossy(&out.stderr).to_string()
}
