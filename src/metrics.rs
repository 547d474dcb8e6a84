//! Offline model performance figures.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::ChurnClass;

/// 2×2 confusion matrix; rows are actual classes, columns predicted classes,
/// both ordered no-churn then churn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfusionMatrix([[u64; 2]; 2]);

impl ConfusionMatrix {
    /// Matrix from counts indexed `[actual][predicted]`.
    pub fn new(counts: [[u64; 2]; 2]) -> Self {
        Self(counts)
    }

    /// Counts predicted/actual class codes pairwise.
    pub fn from_predictions(predicted: &[usize], actual: &[usize]) -> Self {
        let mut counts = [[0u64; 2]; 2];
        for (&p, &a) in predicted.iter().zip(actual) {
            let row = ChurnClass::from_code(a).code();
            let col = ChurnClass::from_code(p).code();
            counts[row][col] += 1;
        }
        Self(counts)
    }

    /// Raw counts indexed `[actual][predicted]`.
    pub fn counts(&self) -> [[u64; 2]; 2] {
        self.0
    }

    /// Count of rows with the given actual and predicted class.
    pub fn get(&self, actual: ChurnClass, predicted: ChurnClass) -> u64 {
        self.0[actual.code()][predicted.code()]
    }

    /// Stayed, predicted stay.
    pub fn true_negatives(&self) -> u64 {
        self.0[0][0]
    }

    /// Stayed, predicted churn.
    pub fn false_positives(&self) -> u64 {
        self.0[0][1]
    }

    /// Churned, predicted stay.
    pub fn false_negatives(&self) -> u64 {
        self.0[1][0]
    }

    /// Churned, predicted churn.
    pub fn true_positives(&self) -> u64 {
        self.0[1][1]
    }

    /// Totals per actual class.
    pub fn row_totals(&self) -> [u64; 2] {
        [self.0[0][0] + self.0[0][1], self.0[1][0] + self.0[1][1]]
    }

    /// Totals per predicted class.
    pub fn column_totals(&self) -> [u64; 2] {
        [self.0[0][0] + self.0[1][0], self.0[0][1] + self.0[1][1]]
    }

    /// Number of evaluated rows.
    pub fn total(&self) -> u64 {
        self.row_totals().iter().sum()
    }
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

/// Accuracy, precision, recall and F1 of the positive class, plus the
/// confusion matrix they were derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    #[serde(rename = "Accuracy")]
    pub accuracy: f64,
    #[serde(rename = "Precision")]
    pub precision: f64,
    #[serde(rename = "Recall")]
    pub recall: f64,
    #[serde(rename = "F1 Score")]
    pub f1: f64,
    #[serde(rename = "Confusion Matrix")]
    pub confusion_matrix: ConfusionMatrix,
}

impl MetricsSnapshot {
    /// Accuracy, precision, recall and F1 for the churn class.
    pub fn from_confusion(cm: ConfusionMatrix) -> Self {
        let tp = cm.true_positives();
        let precision = ratio(tp, tp + cm.false_positives());
        let recall = ratio(tp, tp + cm.false_negatives());
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };

        Self {
            accuracy: ratio(tp + cm.true_negatives(), cm.total()),
            precision,
            recall,
            f1,
            confusion_matrix: cm,
        }
    }
}

const CLASS_LABELS: [&str; 2] = ["No Churn", "Churn"];

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.row_totals();
        let cols = self.column_totals();

        writeln!(
            f,
            "{:>18} | {:>10} {:>10} | {:>10}",
            "Actual \\ Predicted", CLASS_LABELS[0], CLASS_LABELS[1], "Total"
        )?;
        for (i, label) in CLASS_LABELS.iter().enumerate() {
            writeln!(
                f,
                "{:>18} | {:>10} {:>10} | {:>10}",
                label, self.0[i][0], self.0[i][1], rows[i]
            )?;
        }
        write!(
            f,
            "{:>18} | {:>10} {:>10} | {:>10}",
            "Total",
            cols[0],
            cols[1],
            self.total()
        )
    }
}
