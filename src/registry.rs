//! Model registry ledger
//!
//! A human-readable Markdown table, one row per training run, newest first.
//! Rows are only ever inserted directly under the table header; existing
//! rows are never touched. A registry without the expected header marker is
//! rejected before anything is written, leaving the file byte-for-byte
//! unchanged.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// First cells of the registry table header; used to locate the table.
pub const HEADER_MARKER: &str = "| Version |";

const HEADER: &str =
    "| Version | Date | Dataset | Samples | Accuracy | F1 (weighted) | Trees | Note |";
const SEPARATOR: &str =
    "|---------|------|---------|---------|----------|---------------|-------|------|";

/// One registry row.
#[derive(Clone, Debug)]
pub struct RegistryEntry {
    pub version: String,
    pub date: String,
    pub dataset_file: String,
    pub samples: usize,
    pub accuracy: f64,
    pub f1_weighted: f64,
    pub n_estimators: usize,
    pub note: String,
}

impl RegistryEntry {
    fn to_row(&self) -> String {
        format!(
            "| {} | {} | {} | {} | {:.1}% | {:.3} | {} | {} |",
            self.version,
            self.date,
            self.dataset_file,
            self.samples,
            self.accuracy * 100.0,
            self.f1_weighted,
            self.n_estimators,
            self.note,
        )
    }
}

/// Insert `entry` directly under the table header of the registry at `path`.
///
/// A missing registry file is bootstrapped with the canonical header. A
/// present file without [`HEADER_MARKER`] fails with
/// [`Error::RegistryFormat`] and is not modified.
pub fn append_entry(path: &Path, entry: &RegistryEntry) -> Result<()> {
    if !path.exists() {
        let content = format!(
            "# Model Registry\n\n{HEADER}\n{SEPARATOR}\n{}\n",
            entry.to_row()
        );
        fs::write(path, content)?;
        return Ok(());
    }

    let original = fs::read_to_string(path)?;
    let lines: Vec<&str> = original.lines().collect();

    let header_idx = lines
        .iter()
        .position(|l| l.trim_start().starts_with(HEADER_MARKER))
        .ok_or_else(|| Error::RegistryFormat(path.to_path_buf()))?;

    // Skip the separator row when present.
    let mut insert_at = header_idx + 1;
    if let Some(next) = lines.get(insert_at) {
        let t = next.trim_start();
        if t.starts_with('|') && t.contains('-') {
            insert_at += 1;
        }
    }

    let mut updated: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
    updated.insert(insert_at.min(updated.len()), entry.to_row());

    let mut content = updated.join("\n");
    if original.ends_with('\n') {
        content.push('\n');
    }
    fs::write(path, content)?;
    Ok(())
}
