use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

/// Output format for command reports
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text, one line per event
    #[default]
    Text,
    /// JSON, machine-parseable
    Json,
}

impl OutputFormat {
    /// Render `data` as pretty JSON, or through `text` for plain output
    pub fn render<T: Serialize>(self, data: &T, text: impl FnOnce(&T) -> String) -> Result<String> {
        match self {
            Self::Json => serde_json::to_string_pretty(data).context("JSON serialization failed"),
            Self::Text => Ok(text(data)),
        }
    }
}
