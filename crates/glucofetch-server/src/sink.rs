//! Tabular output sink for fetched readings.
//!
//! Readings are opaque JSON objects, so the column set is the union of keys
//! across the batch (sorted for determinism). The file is overwritten on
//! every fetch; an empty batch produces a header-only (possibly empty) file
//! so the export always reflects the latest retrieval.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use glucofetch_provider::Reading;

/// CSV sink at a fixed path.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    /// Creates a sink writing to the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the output path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the batch, replacing any previous file.
    pub fn write(&self, readings: &[Reading]) -> io::Result<()> {
        let columns: BTreeSet<&str> = readings
            .iter()
            .flat_map(|r| r.keys().map(String::as_str))
            .collect();

        let mut out = String::new();
        if !columns.is_empty() {
            let header: Vec<&str> = columns.iter().copied().collect();
            out.push_str(&join_row(&header.iter().map(|c| escape(c)).collect::<Vec<_>>()));
        }

        for reading in readings {
            let row: Vec<String> = columns
                .iter()
                .map(|column| cell(reading.get(*column)))
                .collect();
            out.push_str(&join_row(&row));
        }

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, out)?;
        debug!(count = readings.len(), path = %self.path.display(), "wrote readings");
        Ok(())
    }
}

fn join_row(fields: &[String]) -> String {
    let mut row = fields.join(",");
    row.push('\n');
    row
}

/// Renders one cell: strings verbatim, everything else as JSON.
fn cell(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => escape(s),
        Some(other) => escape(&other.to_string()),
    }
}

fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
