//! Output module for exporting extraction results
//!
//! This module handles:
//! - Writing field results as JSON, CSV or plain text
//! - Writing tables and link lists in the same formats
//! - Choosing a writer from an [`OutputFormat`]

mod csv_output;
mod json_output;
mod text_output;

pub use csv_output::{write_results_csv, write_tables_csv};
pub use json_output::{write_links_json, write_results_json, write_tables_json};
pub use text_output::{write_links_text, write_results_text, write_tables_text};

use crate::extract::{ExtractionResult, Table};
use crate::OutputResult;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Export format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
    Text,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "text",
        };
        f.write_str(name)
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "text" | "txt" => Ok(Self::Text),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

/// Writes field results in the given format
pub fn write_results<W: Write>(
    results: &[ExtractionResult],
    format: OutputFormat,
    writer: W,
) -> OutputResult<()> {
    match format {
        OutputFormat::Json => write_results_json(results, writer),
        OutputFormat::Csv => write_results_csv(results, writer),
        OutputFormat::Text => write_results_text(results, writer),
    }
}

/// Writes tables in the given format
pub fn write_tables<W: Write>(tables: &[Table], format: OutputFormat, writer: W) -> OutputResult<()> {
    match format {
        OutputFormat::Json => write_tables_json(tables, writer),
        OutputFormat::Csv => write_tables_csv(tables, writer),
        OutputFormat::Text => write_tables_text(tables, writer),
    }
}

/// Writes links in the given format
///
/// CSV has no structure to add over one URL per line, so it matches text.
pub fn write_links<W: Write>(links: &[String], format: OutputFormat, writer: W) -> OutputResult<()> {
    match format {
        OutputFormat::Json => write_links_json(links, writer),
        OutputFormat::Csv | OutputFormat::Text => write_links_text(links, writer),
    }
}
