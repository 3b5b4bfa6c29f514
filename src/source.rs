//! Reading the two merge inputs from disk or from a git repository.
//!
//! The template is either a local file or a file inside a git repository,
//! found by directory and file name after a shallow clone into a temporary
//! directory. The clone is removed when the fetch returns.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use crate::config::TemplateConfig;

/// Errors reading merge inputs.
#[derive(Debug, Error)]
pub enum SourceError {
    /// A local source file does not exist.
    #[error("source file expected at {} but not found", path.display())]
    Missing { path: PathBuf },

    /// A local source file exists but could not be read.
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `git clone` failed.
    #[error("git clone of `{repo}` failed (exit code {exit_code:?}): {stderr}")]
    Clone {
        repo: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The clone does not contain the expected file.
    #[error("cannot locate `{file}` under a `{directory}` directory in `{repo}`")]
    NotFound {
        repo: String,
        directory: String,
        file: String,
    },

    /// The search pattern built from the directory and file names is invalid.
    #[error("invalid template search pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// I/O failure around the temporary checkout or spawning git.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where the template comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplateSource {
    /// A file on the local filesystem.
    Local(PathBuf),
    /// A file inside a git repository.
    Git {
        repo: String,
        directory: String,
        file: String,
    },
}

impl TemplateSource {
    /// Build from the `[template]` section. A local path wins over git.
    #[must_use]
    pub fn from_config(config: &TemplateConfig) -> Self {
        config.path.as_ref().map_or_else(
            || Self::Git {
                repo: config.repo.clone(),
                directory: config.directory.clone(),
                file: config.file.clone(),
            },
            |path| Self::Local(path.clone()),
        )
    }

    /// Short human-readable identity, used in parse errors.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            Self::Local(path) => path.display().to_string(),
            Self::Git {
                repo,
                directory,
                file,
            } => format!("{repo}:{directory}/{file}"),
        }
    }

    /// Read the template text.
    ///
    /// # Errors
    /// Returns [`SourceError`] if the file is missing, unreadable, or the
    /// repository cannot be cloned or does not contain the file.
    pub fn fetch(&self) -> Result<String, SourceError> {
        match self {
            Self::Local(path) => read_local(path),
            Self::Git {
                repo,
                directory,
                file,
            } => fetch_git(repo, directory, file),
        }
    }
}

/// Read a local source file, distinguishing "missing" from other failures.
///
/// # Errors
/// Returns [`SourceError::Missing`] if the file does not exist and
/// [`SourceError::Read`] for any other I/O failure.
pub fn read_local(path: &Path) -> Result<String, SourceError> {
    std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            SourceError::Missing {
                path: path.to_owned(),
            }
        } else {
            SourceError::Read {
                path: path.to_owned(),
                source,
            }
        }
    })
}

fn fetch_git(repo: &str, directory: &str, file: &str) -> Result<String, SourceError> {
    let checkout = tempfile::tempdir()?;
    let span = tracing::info_span!("clone_template", repo, directory, file);
    let _guard = span.enter();

    let out = Command::new("git")
        .args(["clone", "--depth", "1", "--quiet", repo])
        .arg(checkout.path())
        .output()?;
    if !out.status.success() {
        return Err(SourceError::Clone {
            repo: repo.to_owned(),
            exit_code: out.status.code(),
            stderr: String::from_utf8_lossy(&out.stderr).trim().to_owned(),
        });
    }

    let path = locate(checkout.path(), directory, file)?.ok_or_else(|| SourceError::NotFound {
        repo: repo.to_owned(),
        directory: directory.to_owned(),
        file: file.to_owned(),
    })?;
    tracing::debug!(path = %path.display(), "template located");
    read_local(&path)
}

/// Find `<root>/**/<directory>/<file>`.
///
/// When several directories match, the lexicographically first path wins so
/// the choice does not depend on filesystem iteration order.
///
/// # Errors
/// Returns [`SourceError::Pattern`] if the names produce an invalid pattern.
pub fn locate(root: &Path, directory: &str, file: &str) -> Result<Option<PathBuf>, SourceError> {
    let pattern = format!(
        "{}/**/{}/{}",
        glob::Pattern::escape(&root.to_string_lossy()),
        glob::Pattern::escape(directory),
        glob::Pattern::escape(file),
    );
    let mut matches: Vec<PathBuf> = glob::glob(&pattern)?
        .filter_map(Result::ok)
        .filter(|path| path.is_file())
        .collect();
    matches.sort();
    Ok(matches.into_iter().next())
}
