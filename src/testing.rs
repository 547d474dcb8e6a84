//! Artifact fixtures shaped like the ones exported for the Telco churn model.
//!
//! Used by the unit tests, integration tests and benchmarks.

use crate::encoder::{FeatureSchema, LabelEncoder, LabelEncoders, LABEL_ENCODED_COLUMNS};
use crate::metrics::{ConfusionMatrix, MetricsSnapshot};
use crate::model::LogisticModel;

/// Drop-first dummy columns of the full customer table.
pub const TELCO_FEATURES: [&str; 30] = [
    "SeniorCitizen",
    "tenure",
    "MonthlyCharges",
    "TotalCharges",
    "gender_Male",
    "Partner_Yes",
    "Dependents_Yes",
    "PhoneService_Yes",
    "MultipleLines_No phone service",
    "MultipleLines_Yes",
    "InternetService_Fiber optic",
    "InternetService_No",
    "OnlineSecurity_No internet service",
    "OnlineSecurity_Yes",
    "OnlineBackup_No internet service",
    "OnlineBackup_Yes",
    "DeviceProtection_No internet service",
    "DeviceProtection_Yes",
    "TechSupport_No internet service",
    "TechSupport_Yes",
    "StreamingTV_No internet service",
    "StreamingTV_Yes",
    "StreamingMovies_No internet service",
    "StreamingMovies_Yes",
    "Contract_One year",
    "Contract_Two year",
    "PaperlessBilling_Yes",
    "PaymentMethod_Credit card (automatic)",
    "PaymentMethod_Electronic check",
    "PaymentMethod_Mailed check",
];

/// Ordered one-hot feature list of the Telco churn dataset.
pub fn telco_feature_schema() -> FeatureSchema {
    FeatureSchema::new(TELCO_FEATURES)
}

/// Encoders with sorted classes, as a fitted label encoder stores them.
pub fn telco_label_encoders() -> LabelEncoders {
    let mut encoders = LabelEncoders::default();
    encoders.insert("gender", LabelEncoder::new(["Female", "Male"]));
    encoders.insert("Partner", LabelEncoder::new(["No", "Yes"]));
    encoders.insert("Dependents", LabelEncoder::new(["No", "Yes"]));
    encoders.insert(
        "Contract",
        LabelEncoder::new(["Month-to-month", "One year", "Two year"]),
    );
    encoders.insert("PaperlessBilling", LabelEncoder::new(["No", "Yes"]));
    encoders.insert(
        "PaymentMethod",
        LabelEncoder::new([
            "Bank transfer (automatic)",
            "Credit card (automatic)",
            "Electronic check",
            "Mailed check",
        ]),
    );
    encoders
}

/// Model over the one-hot layout: short tenure, fiber and electronic checks
/// push towards churn, long contracts away from it.
pub fn telco_one_hot_model() -> LogisticModel {
    let mut coefficients = vec![0.0; TELCO_FEATURES.len()];
    for (name, weight) in [
        ("SeniorCitizen", 0.3),
        ("tenure", -0.06),
        ("MonthlyCharges", 0.01),
        ("InternetService_Fiber optic", 0.9),
        ("InternetService_No", -0.6),
        ("Contract_One year", -0.8),
        ("Contract_Two year", -1.5),
        ("PaperlessBilling_Yes", 0.35),
        ("PaymentMethod_Electronic check", 0.4),
    ] {
        if let Some(i) = TELCO_FEATURES.iter().position(|f| *f == name) {
            coefficients[i] = weight;
        }
    }
    LogisticModel::new(coefficients, -0.2).with_feature_names(TELCO_FEATURES)
}

/// Model over the label-encoded layout.
pub fn telco_label_model() -> LogisticModel {
    LogisticModel::new(
        vec![0.02, 0.4, -0.1, -0.2, -0.05, 0.02, -0.0002, -0.9, 0.3, 0.05],
        -0.3,
    )
    .with_feature_names(LABEL_ENCODED_COLUMNS)
}

/// Stored metrics of a Telco churn model.
pub fn sample_metrics() -> MetricsSnapshot {
    MetricsSnapshot {
        accuracy: 0.8045,
        precision: 0.6485,
        recall: 0.5668,
        f1: 0.6049,
        confusion_matrix: ConfusionMatrix::new([[920, 113], [162, 212]]),
    }
}
