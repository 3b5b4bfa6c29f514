//! `spinning-wheel batch`: merge many user files against one template.
//!
//! The template is fetched once. Each user file is merged on its own worker
//! thread; merges share nothing but the read-only template text, so they
//! run fully in parallel. Results are reported in argument order.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::Args;
use serde::Serialize;

use spinning_wheel::merge::{MergeOptions, MergeReport};
use spinning_wheel::source::TemplateSource;

use crate::merge_cmd::{MergeSettings, MergeSummary, Template, merge_file};

/// Merge several user source files with the same template
///
/// Each merged file is written to OUTPUT_DIR under the user file's name.
/// A failing file does not stop the others; the command fails at the end
/// if any merge failed.
///
/// Examples:
///   spinning-wheel batch build/ rotators/postgres.py rotators/mysql.py
///   spinning-wheel batch build/ rotators/*.py --template vendor/lambda_function.py
#[derive(Args, Debug)]
#[command(verbatim_doc_comment)]
pub struct BatchArgs {
    /// Directory to write merged files into
    pub output_dir: PathBuf,

    /// User source files
    #[arg(required = true)]
    pub user_sources: Vec<PathBuf>,

    #[command(flatten)]
    pub settings: MergeSettings,
}

#[derive(Debug, Serialize)]
struct BatchEntry {
    user: PathBuf,
    output: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<MergeReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl BatchEntry {
    fn new(user: PathBuf, output: PathBuf, result: Result<MergeSummary>) -> Self {
        match result {
            Ok(summary) => Self {
                user,
                output,
                report: Some(summary.report),
                error: None,
            },
            Err(e) => Self {
                user,
                output,
                report: None,
                error: Some(format!("{e:#}")),
            },
        }
    }
}

fn entries_to_text(entries: &[BatchEntry]) -> String {
    entries
        .iter()
        .map(|entry| match (&entry.report, &entry.error) {
            (_, Some(error)) => format!("FAILED {}: {error}", entry.user.display()),
            (Some(report), None) => format!(
                "ok     {} -> {} ({} collision(s), {} duplicate import(s))",
                entry.user.display(),
                entry.output.display(),
                report.collisions.len(),
                report.duplicate_imports.len()
            ),
            (None, None) => format!("?      {}", entry.user.display()),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn run(args: &BatchArgs) -> Result<()> {
    let targets = output_targets(args)?;

    let config = args.settings.resolve()?;
    let template = Template::fetch(&TemplateSource::from_config(&config.template))?;
    let options = MergeOptions::from_config(&config.merge);

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("failed to create {}", args.output_dir.display()))?;

    let results: Vec<Result<MergeSummary>> = std::thread::scope(|scope| {
        let template = &template;
        let options = &options;
        let handles: Vec<_> = targets
            .iter()
            .map(|(user, output)| scope.spawn(move || merge_file(template, user, output, options)))
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(anyhow!("merge worker panicked")))
            })
            .collect()
    });

    let entries: Vec<BatchEntry> = targets
        .into_iter()
        .zip(results)
        .map(|((user, output), result)| BatchEntry::new(user, output, result))
        .collect();
    let failed = entries.iter().filter(|e| e.error.is_some()).count();

    println!("{}", args.settings.format.render(&entries, |e| entries_to_text(e))?);

    if failed > 0 {
        bail!("{failed} of {} merge(s) failed", entries.len());
    }
    Ok(())
}

/// Pair each user file with its output path, rejecting colliding names.
fn output_targets(args: &BatchArgs) -> Result<Vec<(PathBuf, PathBuf)>> {
    let mut seen = BTreeSet::new();
    let mut targets = Vec::with_capacity(args.user_sources.len());
    for user in &args.user_sources {
        let name = user
            .file_name()
            .ok_or_else(|| anyhow!("'{}' does not name a file", user.display()))?;
        if !seen.insert(name.to_owned()) {
            bail!(
                "more than one user source is named '{}'; their outputs would overwrite each other",
                name.to_string_lossy()
            );
        }
        targets.push((user.clone(), args.output_dir.join(name)));
    }
    Ok(targets)
}
