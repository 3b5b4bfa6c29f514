//! Tool configuration (`spinning-wheel.toml`).
//!
//! Defines where the template comes from and how name collisions are
//! resolved. Every field has a default, and a missing file means all defaults.

use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Deserialize;

use crate::merge::DEFAULT_RENAME_SUFFIX;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "spinning-wheel.toml";

/// Repository holding the vendor secret-rotation lambda template.
pub const DEFAULT_TEMPLATE_REPO: &str =
    "https://github.com/aws-samples/aws-secrets-manager-rotation-lambdas.git";

/// Directory of the template inside [`DEFAULT_TEMPLATE_REPO`].
pub const DEFAULT_TEMPLATE_DIRECTORY: &str = "SecretsManagerRotationTemplate";

/// Template file name inside [`DEFAULT_TEMPLATE_DIRECTORY`].
pub const DEFAULT_TEMPLATE_FILE: &str = "lambda_function.py";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level configuration.
///
/// ```toml
/// [template]
/// path = "vendor/lambda_function.py"
/// repo = "https://github.com/aws-samples/aws-secrets-manager-rotation-lambdas.git"
/// directory = "SecretsManagerRotationTemplate"
/// file = "lambda_function.py"
///
/// [merge]
/// collision = "rename"
/// rename_suffix = "_user"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WheelConfig {
    /// Where the template source comes from.
    #[serde(default)]
    pub template: TemplateConfig,

    /// Merge behaviour.
    #[serde(default)]
    pub merge: MergeConfig,
}

// ---------------------------------------------------------------------------
// TemplateConfig
// ---------------------------------------------------------------------------

/// Template location. A local `path` takes precedence over the git settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateConfig {
    /// Local template file. Skips cloning when set.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Git URL to clone the template from.
    #[serde(default = "default_repo")]
    pub repo: String,

    /// Directory name the template file lives in.
    #[serde(default = "default_directory")]
    pub directory: String,

    /// Template file name.
    #[serde(default = "default_file")]
    pub file: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            path: None,
            repo: default_repo(),
            directory: default_directory(),
            file: default_file(),
        }
    }
}

fn default_repo() -> String {
    DEFAULT_TEMPLATE_REPO.to_owned()
}

fn default_directory() -> String {
    DEFAULT_TEMPLATE_DIRECTORY.to_owned()
}

fn default_file() -> String {
    DEFAULT_TEMPLATE_FILE.to_owned()
}

// ---------------------------------------------------------------------------
// MergeConfig
// ---------------------------------------------------------------------------

/// Merge settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeConfig {
    /// What happens to a user declaration whose name the template already uses.
    #[serde(default)]
    pub collision: CollisionMode,

    /// Suffix for renamed declarations when `collision = "rename"`.
    #[serde(default = "default_rename_suffix")]
    pub rename_suffix: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            collision: CollisionMode::default(),
            rename_suffix: default_rename_suffix(),
        }
    }
}

fn default_rename_suffix() -> String {
    DEFAULT_RENAME_SUFFIX.to_owned()
}

/// Collision resolution mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionMode {
    /// Drop the later declaration.
    #[default]
    Drop,
    /// Keep the later user declaration under a suffixed name.
    Rename,
}

impl fmt::Display for CollisionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Drop => write!(f, "drop"),
            Self::Rename => write!(f, "rename"),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Error loading a configuration file.
#[derive(Debug)]
pub struct ConfigError {
    /// The path that was being loaded (if available).
    pub path: Option<PathBuf>,
    /// Human-readable message with line-level detail when possible.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(p) = &self.path {
            write!(f, "{}: {}", p.display(), self.message)
        } else {
            write!(f, "config error: {}", self.message)
        }
    }
}

impl std::error::Error for ConfigError {}

impl WheelConfig {
    /// Load configuration from a TOML file.
    ///
    /// - If the file does not exist, returns all defaults (not an error).
    /// - If the file exists but contains invalid TOML or unknown fields,
    ///   returns a [`ConfigError`] with line-level detail.
    ///
    /// # Errors
    /// Returns `ConfigError` on I/O errors (other than not-found) or parse errors.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError {
                    path: Some(path.to_owned()),
                    message: format!("could not read file: {e}"),
                });
            }
        };
        Self::parse(&contents).map_err(|mut e| {
            e.path = Some(path.to_owned());
            e
        })
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ConfigError` on invalid TOML or unknown fields.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| {
            let mut message = e.message().to_owned();
            if let Some(span) = e.span() {
                let line = toml_str
                    .get(..span.start)
                    .unwrap_or(toml_str)
                    .chars()
                    .filter(|&c| c == '\n')
                    .count()
                    + 1;
                message = format!("line {line}: {message}");
            }
            ConfigError {
                path: None,
                message,
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
