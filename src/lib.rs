//! # churn-predict 📱📉
//!
//! Predict whether a telecom customer is likely to churn, using a logistic
//! regression model trained offline and exported as plain artifacts.
//!
//! The crate turns a customer's attributes into the exact feature vector the
//! model was fit on, runs the model, and renders the outcome together with the
//! model's stored performance figures.
//!
//! ## Features
//! - Closed enums for every categorical attribute, so invalid input cannot be built
//! - Label-encoded or one-hot feature layouts, picked from the artifacts on disk
//! - Zero-filled alignment against the model's ordered feature names
//! - Schema checks at load time, before any prediction runs
//! - Artifacts as JSON or MessagePack (`rmp-serde`)
//! - Offline evaluation of a labeled CSV into a metrics snapshot
//! - Benchmarkable with [Criterion](https://crates.io/crates/criterion)
//!
//! ## Example
//! ```rust,no_run
//! use churn_predict::{ArtifactConfig, ChurnPredictor, RawInputRecord};
//! use churn_predict::record::{Contract, InternetService};
//!
//! let predictor = ChurnPredictor::load(&ArtifactConfig::from_dir("artifacts"))?;
//! let record = RawInputRecord {
//!     tenure: 3,
//!     internet_service: InternetService::FiberOptic,
//!     contract: Contract::MonthToMonth,
//!     ..Default::default()
//! };
//! let prediction = predictor.predict(&record)?;
//! println!("{:?} (P_churn = {:.2})", prediction.class, prediction.churn_probability);
//! # Ok::<(), churn_predict::ChurnError>(())
//! ```

pub mod artifacts;
pub mod collect;
pub mod config;
pub mod dataset;
pub mod encoder;
pub mod error;
pub mod metrics;
pub mod model;
pub mod present;
pub mod record;
#[doc(hidden)]
pub mod testing;

use std::path::Path;

use linfa::Dataset;
use linfa::traits::Predict;
use ndarray::{Array1, Array2};

use crate::artifacts::{read_artifact, read_optional_artifact};
pub use crate::config::{ArtifactConfig, StrategyChoice};
pub use crate::dataset::LabeledRecords;
pub use crate::encoder::{EncodedFeatureVector, FeatureEncoder, StrategyKind};
pub use crate::error::{ChurnError, Result};
pub use crate::metrics::{ConfusionMatrix, MetricsSnapshot};
pub use crate::model::{ChurnClass, LogisticModel, Prediction};
pub use crate::record::RawInputRecord;

use crate::encoder::StandardScaler;

/// Loaded model, encoder and metrics. Immutable once built and safe to share
/// between any number of readers.
#[derive(Debug, Clone)]
pub struct ChurnPredictor {
    encoder: FeatureEncoder,
    model: LogisticModel,
    metrics: Option<MetricsSnapshot>,
}

impl ChurnPredictor {
    /// Pairs an encoder with a model, rejecting layouts the model was not fit on.
    pub fn new(
        encoder: FeatureEncoder,
        model: LogisticModel,
        metrics: Option<MetricsSnapshot>,
    ) -> Result<Self> {
        model.check_schema(encoder.feature_names())?;
        Ok(Self {
            encoder,
            model,
            metrics,
        })
    }

    /// Loads every artifact named by `config`. Any problem is fatal here so
    /// that no request is served against an inconsistent model.
    pub fn load(config: &ArtifactConfig) -> Result<Self> {
        tracing::info!(model = %config.model.display(), "loading churn model");
        let model: LogisticModel = read_artifact(&config.model)?;

        let mut encoder = load_encoder(config)?;
        if config.scale {
            match read_optional_artifact::<StandardScaler>(&config.scaler)? {
                Some(scaler) => encoder = encoder.with_scaler(scaler)?,
                None => tracing::warn!(
                    scaler = %config.scaler.display(),
                    "scaling requested but no scaler artifact found"
                ),
            }
        }

        let metrics = read_optional_artifact(&config.metrics)?;
        if metrics.is_none() {
            tracing::debug!("no metrics artifact; performance panel unavailable");
        }

        let predictor = Self::new(encoder, model, metrics)?;
        tracing::info!(
            strategy = predictor.strategy().name(),
            features = predictor.encoder.len(),
            "model ready"
        );
        Ok(predictor)
    }

    /// Feature layout this predictor encodes with.
    pub fn strategy(&self) -> StrategyKind {
        self.encoder.kind()
    }

    /// The loaded feature encoder.
    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    /// The loaded classifier.
    pub fn model(&self) -> &LogisticModel {
        &self.model
    }

    /// Stored evaluation metrics, if the artifact was present.
    pub fn metrics(&self) -> Result<&MetricsSnapshot> {
        self.metrics.as_ref().ok_or(ChurnError::MetricsUnavailable)
    }

    /// Encodes one record into the model's feature layout.
    pub fn encode(&self, record: &RawInputRecord) -> Result<EncodedFeatureVector> {
        self.encoder.encode(record)
    }

    /// Encodes one record and runs it through the model as a single-row batch.
    pub fn predict(&self, record: &RawInputRecord) -> Result<Prediction> {
        let vector = self.encoder.encode(record)?;
        self.predict_encoded(&vector)
    }

    /// Predicts from an already encoded vector.
    pub fn predict_encoded(&self, vector: &EncodedFeatureVector) -> Result<Prediction> {
        self.model.predict_one(vector.as_row())
    }

    /// Encodes records into a `(rows, features)` matrix.
    pub fn encode_batch(&self, records: &[RawInputRecord]) -> Result<Array2<f64>> {
        let mut x = Array2::zeros((records.len(), self.encoder.len()));
        for (mut row, record) in x.rows_mut().into_iter().zip(records) {
            row.assign(&self.encoder.encode(record)?.values());
        }
        Ok(x)
    }

    /// Predicted class codes for many records.
    pub fn predict_batch(&self, records: &[RawInputRecord]) -> Result<Array1<usize>> {
        let x = self.encode_batch(records)?;
        Ok(self.model.predict(&x))
    }

    /// Computes metrics for labeled records.
    pub fn evaluate(&self, data: &LabeledRecords) -> Result<MetricsSnapshot> {
        let dataset = Dataset::new(
            self.encode_batch(&data.records)?,
            Array1::from(data.labels.clone()),
        );

        let predicted: Array1<usize> = self.model.predict(&dataset);
        let cm = ConfusionMatrix::from_predictions(&predicted.to_vec(), &data.labels);

        tracing::info!(rows = data.len(), "evaluated labeled records");
        Ok(MetricsSnapshot::from_confusion(cm))
    }

    /// Evaluates a labeled CSV file in the training dataset's layout.
    pub fn evaluate_csv(&self, path: &Path) -> Result<MetricsSnapshot> {
        let data = LabeledRecords::from_csv(path)?;
        if data.is_empty() {
            return Err(ChurnError::Dataset {
                path: path.to_path_buf(),
                reason: "no rows".to_string(),
            });
        }
        self.evaluate(&data)
    }
}

fn load_encoder(config: &ArtifactConfig) -> Result<FeatureEncoder> {
    let one_hot_missing = ChurnError::StrategyArtifactMissing {
        strategy: "one-hot",
        artifact: "feature-name list",
    };
    let label_missing = ChurnError::StrategyArtifactMissing {
        strategy: "label",
        artifact: "label encoder",
    };

    match config.strategy {
        StrategyChoice::OneHot => {
            let schema = read_optional_artifact(&config.features)?.ok_or(one_hot_missing)?;
            Ok(FeatureEncoder::one_hot(schema))
        }
        StrategyChoice::Label => {
            let encoders = read_optional_artifact(&config.label_encoders)?.ok_or(label_missing)?;
            FeatureEncoder::label_encoded(encoders)
        }
        StrategyChoice::Auto => {
            if let Some(schema) = read_optional_artifact(&config.features)? {
                return Ok(FeatureEncoder::one_hot(schema));
            }
            match read_optional_artifact(&config.label_encoders)? {
                Some(encoders) => FeatureEncoder::label_encoded(encoders),
                None => Err(ChurnError::NoEncodingArtifacts),
            }
        }
    }
}
