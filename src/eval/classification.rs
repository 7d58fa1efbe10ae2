//! Classification metrics over the fixed label set
//!
//! Confusion-matrix based accuracy, support-weighted precision/recall/F1,
//! and per-class accuracy for the ordered {LOW, MEDIUM, HIGH} domain.
//!
//! Per-class accuracy skips classes with zero test-partition support rather
//! than reporting 0% or N/A; the upstream system behaves the same way and
//! downstream readers of the metadata rely on the key simply being absent.

use crate::data::schema::NeedLevel;

/// Confusion matrix over class indices.
///
/// `matrix[i][j]` counts samples with true class `i` predicted as `j`.
#[derive(Clone, Debug)]
pub struct ConfusionMatrix {
    matrix: Vec<Vec<usize>>,
    n_classes: usize,
}

impl ConfusionMatrix {
    /// Tally predictions against ground truth. Both slices hold class
    /// indices below `n_classes` and must be the same length.
    pub fn from_predictions(y_true: &[usize], y_pred: &[usize], n_classes: usize) -> Self {
        debug_assert_eq!(y_true.len(), y_pred.len());
        let mut matrix = vec![vec![0usize; n_classes]; n_classes];
        for (&t, &p) in y_true.iter().zip(y_pred) {
            if t < n_classes && p < n_classes {
                matrix[t][p] += 1;
            }
        }
        Self { matrix, n_classes }
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn get(&self, true_class: usize, predicted_class: usize) -> usize {
        self.matrix[true_class][predicted_class]
    }

    /// True-instance count for a class (row sum).
    pub fn support(&self, class: usize) -> usize {
        self.matrix[class].iter().sum()
    }

    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: usize = (0..self.n_classes).map(|i| self.matrix[i][i]).sum();
        correct as f64 / total as f64
    }

    fn true_positives(&self, class: usize) -> usize {
        self.matrix[class][class]
    }

    fn false_positives(&self, class: usize) -> usize {
        (0..self.n_classes)
            .filter(|&i| i != class)
            .map(|i| self.matrix[i][class])
            .sum()
    }

    /// Diagonal over row sum per class, skipping zero-support classes.
    /// Returned in class-index order.
    pub fn per_class_accuracy(&self) -> Vec<(usize, f64)> {
        (0..self.n_classes)
            .filter_map(|class| {
                let support = self.support(class);
                (support > 0)
                    .then(|| (class, self.true_positives(class) as f64 / support as f64))
            })
            .collect()
    }
}

/// Support-weighted precision, recall, and F1 across all classes.
#[derive(Clone, Copy, Debug)]
pub struct WeightedMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl WeightedMetrics {
    pub fn from_confusion_matrix(cm: &ConfusionMatrix) -> Self {
        let total = cm.total();
        if total == 0 {
            return Self {
                precision: 0.0,
                recall: 0.0,
                f1: 0.0,
            };
        }

        let mut precision = 0.0;
        let mut recall = 0.0;
        let mut f1 = 0.0;

        for class in 0..cm.n_classes() {
            let support = cm.support(class);
            if support == 0 {
                continue;
            }
            let tp = cm.true_positives(class) as f64;
            let fp = cm.false_positives(class) as f64;
            let fn_ = support as f64 - tp;

            let p = if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 };
            let r = tp / (tp + fn_);
            let f = if p + r > 0.0 {
                2.0 * p * r / (p + r)
            } else {
                0.0
            };

            let weight = support as f64 / total as f64;
            precision += weight * p;
            recall += weight * r;
            f1 += weight * f;
        }

        Self {
            precision,
            recall,
            f1,
        }
    }
}

/// Per-class accuracy keyed by label name, preserving canonical class order
/// and skipping zero-support classes.
pub fn per_class_accuracy_by_label(cm: &ConfusionMatrix) -> Vec<(String, f64)> {
    cm.per_class_accuracy()
        .into_iter()
        .map(|(class, acc)| (NeedLevel::ALL[class].as_str().to_string(), acc))
        .collect()
}
