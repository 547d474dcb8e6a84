use std::path::{Path, PathBuf};

use clap::ValueEnum;

pub const DEFAULT_ARTIFACT_DIR: &str = "artifacts";

pub const MODEL_FILE: &str = "logistic_model.json";
pub const LABEL_ENCODERS_FILE: &str = "label_encoders.json";
pub const FEATURES_FILE: &str = "features.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const METRICS_FILE: &str = "model_metrics.json";

/// How the encoding strategy is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StrategyChoice {
    /// Feature-name list if present, otherwise label encoders.
    #[default]
    Auto,
    /// Label-encoder lookup.
    Label,
    /// One-hot indicators aligned to the feature-name list.
    OneHot,
}

/// Where the trained artifacts live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactConfig {
    pub model: PathBuf,
    pub label_encoders: PathBuf,
    pub features: PathBuf,
    pub scaler: PathBuf,
    pub metrics: PathBuf,
    pub strategy: StrategyChoice,
    /// Standardize numeric columns with the scaler artifact. Off by default.
    pub scale: bool,
}

impl ArtifactConfig {
    /// Uses the default file names inside `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            model: dir.join(MODEL_FILE),
            label_encoders: dir.join(LABEL_ENCODERS_FILE),
            features: dir.join(FEATURES_FILE),
            scaler: dir.join(SCALER_FILE),
            metrics: dir.join(METRICS_FILE),
            strategy: StrategyChoice::Auto,
            scale: false,
        }
    }

    /// Overrides how the encoding strategy is chosen.
    pub fn with_strategy(mut self, strategy: StrategyChoice) -> Self {
        self.strategy = strategy;
        self
    }

    /// Turns standardization with the scaler artifact on or off.
    pub fn with_scaling(mut self, scale: bool) -> Self {
        self.scale = scale;
        self
    }
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self::from_dir(DEFAULT_ARTIFACT_DIR)
    }
}
