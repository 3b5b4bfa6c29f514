//! `spinning-wheel merge`: merge one user source file into the template.
//!
//! Also holds the template/policy flags shared with `spinning-wheel batch`
//! and the per-file merge step both commands run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use spinning_wheel::config::{CollisionMode, DEFAULT_CONFIG_FILE, WheelConfig};
use spinning_wheel::merge::{MergeOptions, MergeReport, Resolution, merge_sources};
use spinning_wheel::model::TreeOrigin;
use spinning_wheel::source::{self, TemplateSource};

use crate::format::OutputFormat;

/// Merge a user source file with the template
///
/// Imports from both files are flattened into one deduplicated block. When
/// both files define the same top-level function or class, the template's
/// definition wins and the user's is dropped (or renamed with
/// `--collision rename`).
///
/// Examples:
///   spinning-wheel merge rotate_postgres.py lambda_function.py
///   spinning-wheel merge user.py out.py --template vendor/lambda_function.py
///   spinning-wheel merge user.py out.py --collision rename --format json
#[derive(Args, Debug)]
#[command(verbatim_doc_comment)]
pub struct MergeArgs {
    /// User source file with the type-specific rotation logic
    pub user_source: PathBuf,

    /// Where to write the merged source
    pub output: PathBuf,

    #[command(flatten)]
    pub settings: MergeSettings,
}

/// Template location, collision policy, and report format.
///
/// Flags override values from the config file.
#[derive(Args, Debug, Clone)]
pub struct MergeSettings {
    /// Local template file (skips cloning)
    #[arg(long, value_name = "PATH")]
    pub template: Option<PathBuf>,

    /// Git repository to clone the template from
    #[arg(long, value_name = "URL")]
    pub template_repo: Option<String>,

    /// Directory containing the template inside the repository
    #[arg(long, value_name = "DIR")]
    pub template_dir: Option<String>,

    /// Template file name inside that directory
    #[arg(long, value_name = "NAME")]
    pub template_file: Option<String>,

    /// How to resolve a user declaration whose name the template already uses
    #[arg(long, value_enum)]
    pub collision: Option<CollisionMode>,

    /// Suffix for renamed declarations (with `--collision rename`)
    #[arg(long, value_name = "SUFFIX")]
    pub rename_suffix: Option<String>,

    /// Configuration file (missing file means defaults)
    #[arg(long, env = "SPINNING_WHEEL_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl MergeSettings {
    /// Load the config file and apply command-line overrides.
    pub fn resolve(&self) -> Result<WheelConfig> {
        let mut config = WheelConfig::load(&self.config)?;
        if let Some(path) = &self.template {
            config.template.path = Some(path.clone());
        }
        if let Some(repo) = &self.template_repo {
            config.template.repo.clone_from(repo);
            // An explicit repository means "clone", even if the file names a path.
            if self.template.is_none() {
                config.template.path = None;
            }
        }
        if let Some(dir) = &self.template_dir {
            config.template.directory.clone_from(dir);
        }
        if let Some(file) = &self.template_file {
            config.template.file.clone_from(file);
        }
        if let Some(mode) = self.collision {
            config.merge.collision = mode;
        }
        if let Some(suffix) = &self.rename_suffix {
            config.merge.rename_suffix.clone_from(suffix);
        }
        Ok(config)
    }
}

/// The fetched template, ready to merge against any number of user files.
pub struct Template {
    pub name: String,
    pub text: String,
}

impl Template {
    pub fn fetch(source: &TemplateSource) -> Result<Self> {
        let name = source.display_name();
        let text = source
            .fetch()
            .with_context(|| format!("failed to fetch template from {name}"))?;
        Ok(Self { name, text })
    }
}

/// Result of merging one user file.
#[derive(Debug, Serialize)]
pub struct MergeSummary {
    pub template: String,
    pub user: PathBuf,
    pub output: PathBuf,
    #[serde(flatten)]
    pub report: MergeReport,
}

impl MergeSummary {
    pub fn to_text(&self) -> String {
        let mut lines = vec![
            format!(
                "merged {} into {} (template: {})",
                self.user.display(),
                self.output.display(),
                self.template
            ),
            format!(
                "  imports: {} kept, {} duplicate(s) discarded",
                self.report.imports_kept,
                self.report.duplicate_imports.len()
            ),
        ];
        for collision in &self.report.collisions {
            let origin = match collision.origin {
                TreeOrigin::Template => "duplicate template",
                TreeOrigin::User => "user",
            };
            lines.push(match &collision.resolution {
                Resolution::Dropped => format!(
                    "  dropped {origin} {} `{}`",
                    collision.kind, collision.name
                ),
                Resolution::Renamed { to } => format!(
                    "  renamed {origin} {} `{}` to `{to}`",
                    collision.kind, collision.name
                ),
            });
        }
        lines.join("\n")
    }
}

/// Read `user`, merge it into `template`, and write the result to `output`.
pub fn merge_file(
    template: &Template,
    user: &Path,
    output: &Path,
    options: &MergeOptions,
) -> Result<MergeSummary> {
    let user_name = user.display().to_string();
    let user_text = source::read_local(user)?;

    let (merged, report) = merge_sources(
        (template.name.as_str(), template.text.as_str()),
        (user_name.as_str(), user_text.as_str()),
        options,
    )
    .with_context(|| format!("failed to merge {user_name} into the template"))?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(output, merged)
        .with_context(|| format!("failed to write {}", output.display()))?;

    Ok(MergeSummary {
        template: template.name.clone(),
        user: user.to_owned(),
        output: output.to_owned(),
        report,
    })
}

pub fn run(args: &MergeArgs) -> Result<()> {
    let config = args.settings.resolve()?;
    let template = Template::fetch(&TemplateSource::from_config(&config.template))?;
    let options = MergeOptions::from_config(&config.merge);

    let summary = merge_file(&template, &args.user_source, &args.output, &options)?;
    println!(
        "{}",
        args.settings.format.render(&summary, MergeSummary::to_text)?
    );
    Ok(())
}
