//! Classification metrics

use crate::error::{MaintenanceError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary confusion matrix laid out as `[[TN, FP], [FN, TP]]`:
/// rows are actual labels, columns are predicted labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub matrix: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    /// Count outcomes for labels in {0, 1}
    pub fn from_predictions(y_true: &Array1<i64>, y_pred: &Array1<i64>) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(MaintenanceError::ShapeError {
                expected: format!("{} predictions", y_true.len()),
                actual: format!("{} predictions", y_pred.len()),
            });
        }

        let mut matrix = [[0usize; 2]; 2];
        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            let (t, p) = match (binary_index(t), binary_index(p)) {
                (Some(t), Some(p)) => (t, p),
                _ => {
                    return Err(MaintenanceError::InvalidInput(format!(
                        "expected binary labels 0/1, got actual={} predicted={}",
                        t, p
                    )))
                }
            };
            matrix[t][p] += 1;
        }

        Ok(Self { matrix })
    }

    pub fn tn(&self) -> usize {
        self.matrix[0][0]
    }

    pub fn fp(&self) -> usize {
        self.matrix[0][1]
    }

    pub fn fn_(&self) -> usize {
        self.matrix[1][0]
    }

    pub fn tp(&self) -> usize {
        self.matrix[1][1]
    }

    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    /// Each row divided by its sum; empty rows stay zero
    pub fn normalized(&self) -> [[f64; 2]; 2] {
        let mut out = [[0.0; 2]; 2];
        for (r, row) in self.matrix.iter().enumerate() {
            let sum: usize = row.iter().sum();
            if sum > 0 {
                for (c, &v) in row.iter().enumerate() {
                    out[r][c] = v as f64 / sum as f64;
                }
            }
        }
        out
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .matrix
            .iter()
            .flatten()
            .map(|v| v.to_string().len())
            .max()
            .unwrap_or(1);
        writeln!(f, "[[{:>w$} {:>w$}]", self.tn(), self.fp(), w = width)?;
        write!(f, " [{:>w$} {:>w$}]]", self.fn_(), self.tp(), w = width)
    }
}

fn binary_index(label: i64) -> Option<usize> {
    match label {
        0 => Some(0),
        1 => Some(1),
        _ => None,
    }
}

/// Precision / recall / F1 for one class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Per-class metrics with accuracy and macro / weighted averages.
/// Divisions by zero yield 0.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    }
}

impl ClassificationReport {
    pub fn from_confusion_matrix(cm: &ConfusionMatrix) -> Self {
        let total = cm.total();

        let classes: Vec<ClassMetrics> = (0..2)
            .map(|k| {
                let tp = cm.matrix[k][k];
                let predicted: usize = (0..2).map(|r| cm.matrix[r][k]).sum();
                let support: usize = cm.matrix[k].iter().sum();
                let precision = ratio(tp, predicted);
                let recall = ratio(tp, support);
                ClassMetrics {
                    label: k.to_string(),
                    precision,
                    recall,
                    f1_score: f1(precision, recall),
                    support,
                }
            })
            .collect();

        let n_classes = classes.len() as f64;
        let macro_avg = ClassMetrics {
            label: "macro avg".to_string(),
            precision: classes.iter().map(|c| c.precision).sum::<f64>() / n_classes,
            recall: classes.iter().map(|c| c.recall).sum::<f64>() / n_classes,
            f1_score: classes.iter().map(|c| c.f1_score).sum::<f64>() / n_classes,
            support: total,
        };

        let weighted = |get: fn(&ClassMetrics) -> f64| -> f64 {
            if total == 0 {
                return 0.0;
            }
            classes
                .iter()
                .map(|c| get(c) * c.support as f64)
                .sum::<f64>()
                / total as f64
        };
        let weighted_avg = ClassMetrics {
            label: "weighted avg".to_string(),
            precision: weighted(|c| c.precision),
            recall: weighted(|c| c.recall),
            f1_score: weighted(|c| c.f1_score),
            support: total,
        };

        Self {
            accuracy: ratio(cm.tn() + cm.tp(), total),
            classes,
            macro_avg,
            weighted_avg,
        }
    }

    /// Metrics for the positive class (label 1)
    pub fn positive(&self) -> &ClassMetrics {
        &self.classes[1]
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(|c| c.label.len())
            .chain(std::iter::once(self.weighted_avg.label.len()))
            .max()
            .unwrap_or(12);

        writeln!(
            f,
            "{:>w$}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support",
            w = width
        )?;
        writeln!(f)?;

        for class in &self.classes {
            write_row(f, class, width)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>w$}  {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support,
            w = width
        )?;
        write_row(f, &self.macro_avg, width)?;
        write_row(f, &self.weighted_avg, width)
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, m: &ClassMetrics, width: usize) -> fmt::Result {
    writeln!(
        f,
        "{:>w$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
        m.label, m.precision, m.recall, m.f1_score, m.support,
        w = width
    )
}
