//! Preprocessing transforms
//!
//! One-hot encoding for categorical columns and standardization for numeric
//! columns. Both are fit on the training partition only and serialized as
//! part of the pipeline artifact, so serving-time inputs go through the
//! exact transform the classifier was trained on.

use serde::{Deserialize, Serialize};

/// One-hot encoder over a fixed set of categorical columns.
///
/// Categories are the sorted distinct values observed in the training
/// partition. A value unseen at fit time encodes to the all-zero vector for
/// its column instead of failing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    columns: Vec<String>,
    categories: Vec<Vec<String>>,
}

impl OneHotEncoder {
    /// Fit category vocabularies from the training rows.
    ///
    /// `values[c]` holds the full column for `columns[c]`; only the rows in
    /// `rows` contribute categories.
    pub fn fit(columns: &[String], values: &[Vec<&str>], rows: &[usize]) -> Self {
        let categories = values
            .iter()
            .map(|column| {
                let mut cats: Vec<String> =
                    rows.iter().map(|&i| column[i].to_string()).collect();
                cats.sort_unstable();
                cats.dedup();
                cats
            })
            .collect();
        Self {
            columns: columns.to_vec(),
            categories,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Total width of the encoded block.
    pub fn width(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    /// Expanded feature names, `column=category`, in column-then-category
    /// order. Parallel to the encoded block layout.
    pub fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .zip(&self.categories)
            .flat_map(|(col, cats)| cats.iter().map(move |c| format!("{col}={c}")))
            .collect()
    }

    /// Encode one row's categorical values into `out`, which must be
    /// [`width`](Self::width) long. Unknown values leave their column's
    /// block at zero.
    pub fn encode_row(&self, raw: &[&str], out: &mut [f64]) {
        debug_assert_eq!(raw.len(), self.columns.len());
        debug_assert_eq!(out.len(), self.width());

        out.fill(0.0);
        let mut offset = 0;
        for (value, cats) in raw.iter().zip(&self.categories) {
            if let Ok(pos) = cats.binary_search_by(|c| c.as_str().cmp(*value)) {
                out[offset + pos] = 1.0;
            }
            offset += cats.len();
        }
    }
}

/// Per-column standardization to zero mean and unit variance.
///
/// Statistics come from the training partition. A constant column keeps a
/// divisor of 1 so it passes through centered but unscaled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    columns: Vec<String>,
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl StandardScaler {
    /// Fit mean and standard deviation per column from the training rows.
    pub fn fit(columns: &[String], values: &[Vec<f64>], rows: &[usize]) -> Self {
        let n = rows.len().max(1) as f64;
        let mut means = Vec::with_capacity(values.len());
        let mut stds = Vec::with_capacity(values.len());

        for column in values {
            let mean = rows.iter().map(|&i| column[i]).sum::<f64>() / n;
            let var = rows
                .iter()
                .map(|&i| {
                    let d = column[i] - mean;
                    d * d
                })
                .sum::<f64>()
                / n;
            let std = var.sqrt();
            means.push(mean);
            stds.push(if std > f64::EPSILON { std } else { 1.0 });
        }

        Self {
            columns: columns.to_vec(),
            means,
            stds,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn transform(&self, column: usize, value: f64) -> f64 {
        (value - self.means[column]) / self.stds[column]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn fit_encoder() -> OneHotEncoder {
        let columns = vec!["department".to_string()];
        let values = vec![vec!["eng", "sales", "eng", "hr", "sales"]];
        OneHotEncoder::fit(&columns, &values, &[0, 1, 2, 3, 4])
    }

    #[test]
    fn test_one_hot_categories_sorted_unique() {
        let enc = fit_encoder();
        assert_eq!(enc.width(), 3);
        assert_eq!(
            enc.feature_names(),
            vec!["department=eng", "department=hr", "department=sales"]
        );
    }

    #[test]
    fn test_one_hot_encodes_known_value() {
        let enc = fit_encoder();
        let mut out = vec![0.0; enc.width()];
        enc.encode_row(&["sales"], &mut out);
        assert_eq!(out, vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_one_hot_unseen_value_is_all_zero() {
        let enc = fit_encoder();
        let mut out = vec![9.0; enc.width()];
        enc.encode_row(&["legal"], &mut out);
        assert_eq!(out, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_one_hot_vocab_from_training_rows_only() {
        let columns = vec!["department".to_string()];
        let values = vec![vec!["eng", "sales", "hr"]];
        let enc = OneHotEncoder::fit(&columns, &values, &[0, 1]);
        assert_eq!(enc.feature_names(), vec!["department=eng", "department=sales"]);

        // "hr" was only in the held-out rows: encodes to zeros.
        let mut out = vec![0.0; enc.width()];
        enc.encode_row(&["hr"], &mut out);
        assert_eq!(out, vec![0.0, 0.0]);
    }

    #[test]
    fn test_scaler_zero_mean_unit_variance() {
        let columns = vec!["trend_score".to_string()];
        let values = vec![vec![1.0, 2.0, 3.0, 4.0]];
        let rows = [0, 1, 2, 3];
        let scaler = StandardScaler::fit(&columns, &values, &rows);

        let scaled: Vec<f64> = rows.iter().map(|&i| scaler.transform(0, values[0][i])).collect();
        let mean = scaled.iter().sum::<f64>() / 4.0;
        let var = scaled.iter().map(|v| v * v).sum::<f64>() / 4.0;
        assert_relative_eq!(mean, 0.0, epsilon = 1e-12);
        assert_relative_eq!(var, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_scaler_statistics_from_training_rows_only() {
        let columns = vec!["x".to_string()];
        let values = vec![vec![0.0, 10.0, 1000.0]];
        let scaler = StandardScaler::fit(&columns, &values, &[0, 1]);
        assert_relative_eq!(scaler.transform(0, 5.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_scaler_constant_column() {
        let columns = vec!["x".to_string()];
        let values = vec![vec![3.0, 3.0, 3.0]];
        let scaler = StandardScaler::fit(&columns, &values, &[0, 1, 2]);
        assert_relative_eq!(scaler.transform(0, 3.0), 0.0, epsilon = 1e-12);
        assert_relative_eq!(scaler.transform(0, 4.0), 1.0, epsilon = 1e-12);
    }
}
