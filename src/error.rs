use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading artifacts, encoding records or predicting.
#[derive(Debug, Error)]
pub enum ChurnError {
    #[error("failed to read artifact {path}: {source}")]
    ArtifactIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed artifact {path}: {reason}")]
    ArtifactFormat { path: PathBuf, reason: String },

    #[error("failed to write {path}: {reason}")]
    ArtifactWrite { path: PathBuf, reason: String },

    #[error("no encoding artifacts found: expected a feature-name list or label encoders")]
    NoEncodingArtifacts,

    #[error("encoding strategy `{strategy}` requires the {artifact} artifact, which is missing")]
    StrategyArtifactMissing {
        strategy: &'static str,
        artifact: &'static str,
    },

    #[error("no label encoder for categorical column `{column}`")]
    MissingEncoder { column: String },

    #[error("label encoder for `{column}` does not know value `{value}`")]
    UnknownCategory { column: String, value: String },

    #[error("`{column}` is not a customer attribute")]
    UnknownColumn { column: String },

    #[error("scaler lists {columns} columns but {mean} means and {scale} scales")]
    ScalerShape {
        columns: usize,
        mean: usize,
        scale: usize,
    },

    #[error("scaler column `{column}` is not part of the feature layout")]
    UnknownScalerColumn { column: String },

    #[error("scaler for `{column}` has a zero or non-finite scale")]
    InvalidScale { column: String },

    #[error("schema mismatch: model expects {expected} features, encoder produces {found}")]
    SchemaMismatch { expected: usize, found: usize },

    #[error("expected a single row, got {rows}")]
    NotSingleRow { rows: usize },

    #[error("schema mismatch at position {position}: model expects `{expected}`, encoder produces `{found}`")]
    FeatureOrderMismatch {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("metrics artifact is not available")]
    MetricsUnavailable,

    #[error("invalid dataset {path}: {reason}")]
    Dataset { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, ChurnError>;
