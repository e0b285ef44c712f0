//! CSV export
//!
//! Results become one row per page with a `url` column followed by every
//! field name seen across the results, in first-seen order. Multi-valued
//! fields are joined with `"; "` and null fields are left empty.

use crate::extract::{ExtractionResult, Table};
use crate::OutputResult;
use csv::WriterBuilder;
use std::io::Write;

/// Writes results as CSV with a header row
pub fn write_results_csv<W: Write>(results: &[ExtractionResult], writer: W) -> OutputResult<()> {
    let columns = field_columns(results);

    let mut wtr = WriterBuilder::new().from_writer(writer);

    let mut header = Vec::with_capacity(columns.len() + 1);
    header.push("url");
    header.extend(columns.iter().map(String::as_str));
    wtr.write_record(&header)?;

    for result in results {
        let mut record = Vec::with_capacity(columns.len() + 1);
        record.push(result.url().to_string());
        for column in &columns {
            record.push(
                result
                    .get(column)
                    .map(|value| value.to_flat_string())
                    .unwrap_or_default(),
            );
        }
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes tables as CSV blocks separated by a blank line
///
/// Rows keep their own length; tables rarely have uniform column counts.
pub fn write_tables_csv<W: Write>(tables: &[Table], mut writer: W) -> OutputResult<()> {
    for (index, table) in tables.iter().enumerate() {
        if index > 0 {
            writer.write_all(b"\n")?;
        }

        let mut wtr = WriterBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_writer(&mut writer);
        for row in table.rows() {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
    }

    writer.flush()?;
    Ok(())
}

/// Union of field names across results, in first-seen order
fn field_columns(results: &[ExtractionResult]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for result in results {
        for (name, _) in result.fields() {
            if !columns.iter().any(|c| c == name) {
                columns.push(name.to_string());
            }
        }
    }
    columns
}
