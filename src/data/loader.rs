//! Dataset loading and label validation
//!
//! Reads the exported skill-demand CSV, drops rows whose label is outside
//! the fixed domain, and hands the caller an owned table. The loader prints
//! a warning with the dropped-row count; the count is also kept on the
//! dataset so the metadata recorder can include it in dataset statistics.

use std::path::{Path, PathBuf};

use crate::data::schema::{NeedLevel, LABEL_COLUMN};
use crate::error::{Error, Result};

/// A validated, label-filtered training table.
///
/// Owns its rows; mutating or dropping it cannot affect the source file or
/// any other load of the same file.
#[derive(Clone, Debug)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    labels: Vec<NeedLevel>,
    dropped_rows: usize,
    source: PathBuf,
}

impl Dataset {
    /// Load and validate a CSV dataset.
    ///
    /// Fails with [`Error::DatasetNotFound`] when the path does not exist,
    /// [`Error::MissingLabelColumn`] when the header lacks the label column,
    /// and [`Error::NoValidRows`] when no row carries a label in the
    /// {LOW, MEDIUM, HIGH} domain.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::DatasetNotFound(path.to_path_buf()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)?;

        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        let label_idx = headers
            .iter()
            .position(|h| h == LABEL_COLUMN)
            .ok_or_else(|| Error::MissingLabelColumn(LABEL_COLUMN.to_string()))?;

        let mut rows = Vec::new();
        let mut labels = Vec::new();
        let mut dropped = 0usize;

        for record in reader.records() {
            let record = record?;
            let raw_label = record.get(label_idx).unwrap_or("");
            match raw_label.parse::<NeedLevel>() {
                Ok(label) => {
                    rows.push(record.iter().map(String::from).collect());
                    labels.push(label);
                }
                Err(()) => dropped += 1,
            }
        }

        if dropped > 0 {
            println!("WARNING: dropped {dropped} row(s) with labels outside {{LOW, MEDIUM, HIGH}}");
        }

        if rows.is_empty() {
            return Err(Error::NoValidRows { dropped });
        }

        Ok(Self {
            headers,
            rows,
            labels,
            dropped_rows: dropped,
            source: path.to_path_buf(),
        })
    }

    /// Number of retained rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows dropped at load time for carrying an out-of-domain label.
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    /// Path the dataset was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Label of every retained row, parallel to the row order.
    pub fn labels(&self) -> &[NeedLevel] {
        &self.labels
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Raw string values of a column, or `None` if the column is absent.
    pub fn column_values(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }

    /// Parse a declared-numeric column, failing fast on the first cell that
    /// does not hold a number.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| Error::SchemaMismatch {
                column: name.to_string(),
                row: 0,
                value: "<column absent>".to_string(),
            })?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row, r)| {
                r[idx]
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| Error::SchemaMismatch {
                        column: name.to_string(),
                        row,
                        value: r[idx].clone(),
                    })
            })
            .collect()
    }

    /// Per-class row counts, descending by count; ties keep canonical label
    /// order. The metadata recorder preserves this ordering verbatim.
    pub fn class_distribution(&self) -> Vec<(NeedLevel, usize)> {
        let mut counts = [0usize; NeedLevel::ALL.len()];
        for label in &self.labels {
            counts[label.index()] += 1;
        }
        let mut dist: Vec<(NeedLevel, usize)> = NeedLevel::ALL
            .iter()
            .map(|&l| (l, counts[l.index()]))
            .filter(|(_, c)| *c > 0)
            .collect();
        dist.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.index().cmp(&b.0.index())));
        dist
    }

    /// Most frequent class count over least frequent, among present classes.
    pub fn imbalance_ratio(&self) -> f64 {
        let dist = self.class_distribution();
        match (dist.first(), dist.last()) {
            (Some((_, max)), Some((_, min))) if *min > 0 => *max as f64 / *min as f64,
            _ => 1.0,
        }
    }
}
