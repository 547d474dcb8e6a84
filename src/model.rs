//! The trained classifier, treated as an opaque decision function.

use linfa::traits::PredictInplace;
use ndarray::{Array1, ArrayBase, ArrayView1, ArrayView2, Data, Ix2};
use serde::{Deserialize, Serialize};

use crate::error::{ChurnError, Result};

/// Predicted outcome for one customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChurnClass {
    Stay,
    Churn,
}

impl ChurnClass {
    /// Class for a model output code; anything but 1 is stay.
    pub fn from_code(code: usize) -> Self {
        if code == 1 {
            ChurnClass::Churn
        } else {
            ChurnClass::Stay
        }
    }

    /// Integer code the model uses for this class.
    pub fn code(self) -> usize {
        match self {
            ChurnClass::Stay => 0,
            ChurnClass::Churn => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub class: ChurnClass,
    /// Probability of the positive (churn) class.
    pub churn_probability: f64,
}

impl Prediction {
    /// Probability of the predicted class.
    pub fn confidence(&self) -> f64 {
        match self.class {
            ChurnClass::Churn => self.churn_probability,
            ChurnClass::Stay => 1.0 - self.churn_probability,
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Binary logistic model exported as coefficients and intercept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    coefficients: Vec<f64>,
    intercept: f64,
    /// Column names the model was fit on, when the exporter kept them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    feature_names: Option<Vec<String>>,
}

impl LogisticModel {
    /// Model from fitted coefficients and intercept.
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
            feature_names: None,
        }
    }

    /// Attaches the feature names the model was fit on.
    pub fn with_feature_names<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        self.feature_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Number of input features.
    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Fitted intercept.
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Feature names the model was fit on, when exported.
    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn weights(&self) -> ArrayView1<'_, f64> {
        ArrayView1::from(self.coefficients.as_slice())
    }

    /// Checks that an encoder layout matches what the model was fit on.
    pub fn check_schema(&self, names: &[String]) -> Result<()> {
        if names.len() != self.n_features() {
            return Err(ChurnError::SchemaMismatch {
                expected: self.n_features(),
                found: names.len(),
            });
        }

        if let Some(fitted) = &self.feature_names {
            if fitted.len() != self.n_features() {
                return Err(ChurnError::SchemaMismatch {
                    expected: self.n_features(),
                    found: fitted.len(),
                });
            }
            if let Some((position, (expected, found))) = fitted
                .iter()
                .zip(names)
                .enumerate()
                .find(|(_, (a, b))| a != b)
            {
                return Err(ChurnError::FeatureOrderMismatch {
                    position,
                    expected: expected.clone(),
                    found: found.clone(),
                });
            }
        }
        Ok(())
    }

    fn check_shape(&self, x: &ArrayView2<'_, f64>) -> Result<()> {
        if x.ncols() != self.n_features() {
            return Err(ChurnError::SchemaMismatch {
                expected: self.n_features(),
                found: x.ncols(),
            });
        }
        Ok(())
    }

    /// Signed distance to the decision boundary, one value per row.
    pub fn decision_function(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        self.check_shape(&x)?;
        Ok(x.dot(&self.weights()) + self.intercept)
    }

    /// Churn probability, one value per row.
    pub fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        Ok(self.decision_function(x)?.mapv(sigmoid))
    }

    /// Class and probability for a single-row batch.
    pub fn predict_one(&self, x: ArrayView2<'_, f64>) -> Result<Prediction> {
        if x.nrows() != 1 {
            return Err(ChurnError::NotSingleRow { rows: x.nrows() });
        }
        let z = self.decision_function(x)?[0];
        Ok(Prediction {
            class: if z > 0.0 {
                ChurnClass::Churn
            } else {
                ChurnClass::Stay
            },
            churn_probability: sigmoid(z),
        })
    }
}

impl<D: Data<Elem = f64>> PredictInplace<ArrayBase<D, Ix2>, Array1<usize>> for LogisticModel {
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<usize>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );
        assert_eq!(
            x.ncols(),
            self.n_features(),
            "The number of features must match the model."
        );

        let weights = self.weights();
        for (row, target) in x.rows().into_iter().zip(y.iter_mut()) {
            *target = usize::from(row.dot(&weights) + self.intercept > 0.0);
        }
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<usize> {
        Array1::zeros(x.nrows())
    }
}
