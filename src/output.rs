//! Dataset serialization and human-readable output.
//!
//! The library returns plain rows; these helpers write them as JSON Lines
//! or CSV, and [`PrettyPrint`] renders single records for a terminal.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::Value;

use crate::download::DataRow;
use crate::error::Result;
use crate::models::RawRecord;

/// Write one JSON object per line.
///
/// # Errors
///
/// Returns an error if writing or serialization fails.
pub fn write_jsonl<W: Write>(rows: &[DataRow], mut writer: W) -> Result<()> {
    for row in rows {
        serde_json::to_writer(&mut writer, row)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Write rows as CSV with a header taken from the first row.
///
/// With no rows there is no header to take, so nothing is written and the
/// call still succeeds; an empty dataset becomes an empty file.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_csv<W: Write>(rows: &[DataRow], mut writer: W) -> Result<()> {
    let Some(first) = rows.first() else {
        return Ok(());
    };
    let columns: Vec<&String> = first.keys().collect();

    let header: Vec<String> = columns.iter().map(|c| csv_field(c)).collect();
    writeln!(writer, "{}", header.join(","))?;

    for row in rows {
        let fields: Vec<String> = columns
            .iter()
            .map(|column| match row.get(column.as_str()) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => csv_field(s),
                Some(other) => csv_field(&other.to_string()),
            })
            .collect();
        writeln!(writer, "{}", fields.join(","))?;
    }

    writer.flush()?;
    Ok(())
}

/// Write rows to `path`, as CSV for a `.csv` extension and JSON Lines
/// otherwise. Parent directories are created as needed.
///
/// # Errors
///
/// Returns an error if the file can't be created or written.
pub fn write_to_path(rows: &[DataRow], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let writer = BufWriter::new(File::create(path)?);
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        write_csv(rows, writer)
    } else {
        write_jsonl(rows, writer)
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Trait for human-readable key-value output.
///
/// Implemented by record types to provide formatted output suitable for
/// terminal display when `--json` is not specified.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

impl PrettyPrint for RawRecord {
    fn pretty_print(&self) -> String {
        let header = format!("{} {}", self.kind, self.id);
        let divider = "─".repeat(header.len().max(30));

        let mut lines = vec![header, divider];

        if let Some(rating) = self.attribute("rating") {
            lines.push(format!("Rating:         {}", rating));
        }
        if let Some(title) = self.attribute_str("title") {
            lines.push(format!("Title:          {}", title));
        }
        if let Some(created) = self.attribute_str("createdDate") {
            lines.push(format!("Created:        {}", created));
        }
        if let Some(territory) = self.attribute_str("territory") {
            lines.push(format!("Territory:      {}", territory));
        }
        if let Some(body) = self.attribute_str("body") {
            lines.push(String::new());
            lines.push(body.to_string());
        }

        lines.join("\n")
    }
}
