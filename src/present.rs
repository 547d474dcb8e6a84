//! Human-readable output.

use std::fmt::Write;

use crate::encoder::StrategyKind;
use crate::metrics::MetricsSnapshot;
use crate::model::{ChurnClass, Prediction};

pub const MODEL_NAME: &str = "Logistic Regression";

/// Renders a prediction. The label-encoded flow reports the probability of
/// the predicted outcome; the one-hot flow reports the outcome alone.
pub fn render_prediction(prediction: &Prediction, strategy: StrategyKind) -> String {
    match (strategy, prediction.class) {
        (StrategyKind::LabelEncoded, ChurnClass::Churn) => format!(
            "⚠️ Customer is likely to churn. (Probability: {:.2})",
            prediction.confidence()
        ),
        (StrategyKind::LabelEncoded, ChurnClass::Stay) => format!(
            "✅ Customer is likely to stay. (Probability: {:.2})",
            prediction.confidence()
        ),
        (StrategyKind::OneHot, ChurnClass::Churn) => {
            "⚠️ This customer is likely to churn.".to_string()
        }
        (StrategyKind::OneHot, ChurnClass::Stay) => {
            "✅ This customer is likely to stay.".to_string()
        }
    }
}

/// Renders the stored metrics panel.
pub fn render_metrics(metrics: &MetricsSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "📊 Model performance ({MODEL_NAME})");
    let _ = writeln!(out);
    let _ = writeln!(out, "🧪 Classification Metrics");
    let _ = writeln!(out, "Accuracy: {:.2}", metrics.accuracy);
    let _ = writeln!(out, "Precision: {:.2}", metrics.precision);
    let _ = writeln!(out, "Recall: {:.2}", metrics.recall);
    let _ = writeln!(out, "F1 Score: {:.2}", metrics.f1);
    let _ = writeln!(out);
    let _ = writeln!(out, "🌀 Confusion Matrix");
    let _ = writeln!(out, "{}", metrics.confusion_matrix);
    out
}
