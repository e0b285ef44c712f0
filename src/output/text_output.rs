//! Plain-text export for terminals and shell pipelines

use crate::extract::{ExtractionResult, FieldValue, Table};
use crate::OutputResult;
use std::io::Write;

/// Writes one URL per line
pub fn write_links_text<W: Write>(links: &[String], mut writer: W) -> OutputResult<()> {
    for link in links {
        writeln!(writer, "{}", link)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes each result as a URL line followed by indented `field: value` lines
pub fn write_results_text<W: Write>(results: &[ExtractionResult], mut writer: W) -> OutputResult<()> {
    for (index, result) in results.iter().enumerate() {
        if index > 0 {
            writeln!(writer)?;
        }
        writeln!(writer, "{}", result.url())?;
        for (name, value) in result.fields() {
            match value {
                FieldValue::Null => writeln!(writer, "  {}: -", name)?,
                FieldValue::Single(text) => writeln!(writer, "  {}: {}", name, text)?,
                FieldValue::Multiple(texts) => {
                    writeln!(writer, "  {}:", name)?;
                    for text in texts {
                        writeln!(writer, "    - {}", text)?;
                    }
                }
            }
        }
    }
    writer.flush()?;
    Ok(())
}

/// Writes tables as tab-separated rows, one blank line between tables
pub fn write_tables_text<W: Write>(tables: &[Table], mut writer: W) -> OutputResult<()> {
    for (index, table) in tables.iter().enumerate() {
        if index > 0 {
            writeln!(writer)?;
        }
        for row in table.rows() {
            writeln!(writer, "{}", row.join("\t"))?;
        }
    }
    writer.flush()?;
    Ok(())
}
