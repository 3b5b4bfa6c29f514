//! `spinning-wheel check`: parse files and show what a merge would see.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use spinning_wheel::model::{DeclarationKind, ImportKey, Node, SyntaxTree};
use spinning_wheel::python;
use spinning_wheel::source;

use crate::format::OutputFormat;

/// Parse source files and list their imports and top-level declarations
///
/// Fails on the first file that is not valid Python.
///
/// Examples:
///   spinning-wheel check lambda_function.py
///   spinning-wheel check rotators/*.py --format json
#[derive(Args, Debug)]
#[command(verbatim_doc_comment)]
pub struct CheckArgs {
    /// Source files to inspect
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct FileOutline {
    path: PathBuf,
    imports: Vec<ImportKey>,
    declarations: Vec<DeclarationOutline>,
    other_statements: usize,
}

#[derive(Debug, Serialize)]
struct DeclarationOutline {
    name: String,
    kind: DeclarationKind,
}

impl FileOutline {
    fn new(path: PathBuf, tree: &SyntaxTree) -> Self {
        let declarations = tree
            .declarations()
            .map(|decl| DeclarationOutline {
                name: decl.name.clone().unwrap_or_default(),
                kind: decl.kind,
            })
            .collect();
        let other_statements = tree
            .nodes
            .iter()
            .filter(|node| matches!(node, Node::Other(_)))
            .count();
        Self {
            path,
            imports: tree.import_keys(),
            declarations,
            other_statements,
        }
    }

    fn to_text(&self) -> String {
        let mut lines = vec![format!("{}:", self.path.display())];
        for key in &self.imports {
            lines.push(format!("  {key}"));
        }
        for decl in &self.declarations {
            lines.push(format!("  {} {}", decl.kind, decl.name));
        }
        lines.push(format!("  {} other statement(s)", self.other_statements));
        lines.join("\n")
    }
}

fn outlines_to_text(outlines: &[FileOutline]) -> String {
    outlines
        .iter()
        .map(FileOutline::to_text)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn run(args: &CheckArgs) -> Result<()> {
    let mut outlines = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let text = source::read_local(path)?;
        let name = path.display().to_string();
        let tree = python::parse_named(&text, &name)
            .with_context(|| format!("{name} is not valid Python"))?;
        outlines.push(FileOutline::new(path.clone(), &tree));
    }

    println!(
        "{}",
        args.format.render(&outlines, |o| outlines_to_text(o))?
    );
    Ok(())
}
