//! JSON export

use crate::extract::{ExtractionResult, Table};
use crate::OutputResult;
use serde::Serialize;
use std::io::Write;

/// Writes results as a pretty-printed JSON array of flat objects
pub fn write_results_json<W: Write>(results: &[ExtractionResult], writer: W) -> OutputResult<()> {
    write_pretty(results, writer)
}

/// Writes tables as a JSON array of row arrays
pub fn write_tables_json<W: Write>(tables: &[Table], writer: W) -> OutputResult<()> {
    write_pretty(tables, writer)
}

/// Writes links as a JSON array of strings
pub fn write_links_json<W: Write>(links: &[String], writer: W) -> OutputResult<()> {
    write_pretty(links, writer)
}

fn write_pretty<T: Serialize + ?Sized, W: Write>(value: &T, mut writer: W) -> OutputResult<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
