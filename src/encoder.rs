//! Turns a [`RawInputRecord`] into the exact numeric layout a trained model
//! was fit on.
//!
//! Two layouts are supported:
//!
//! * **label-encoded**: a fixed ten-column layout where every categorical
//!   value is replaced by its integer code from a fitted label encoder;
//! * **one-hot**: one indicator per categorical value, aligned to the ordered
//!   feature-name list the model was fit on. Names the record does not produce
//!   are zero-filled, indicators the list does not mention are dropped.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{ChurnError, Result};
use crate::record::{COLUMNS, ColumnKind, FieldValue, RawInputRecord, column, columns};

/// Column order of the label-encoded layout.
pub const LABEL_ENCODED_COLUMNS: [&str; 10] = [
    columns::GENDER,
    columns::SENIOR_CITIZEN,
    columns::PARTNER,
    columns::DEPENDENTS,
    columns::TENURE,
    columns::MONTHLY_CHARGES,
    columns::TOTAL_CHARGES,
    columns::CONTRACT,
    columns::PAPERLESS_BILLING,
    columns::PAYMENT_METHOD,
];

/// Name of the one-hot indicator for `value` of `column`.
pub fn indicator_name(column: &str, value: &str) -> String {
    format!("{column}_{value}")
}

/// A fitted categorical-to-integer mapping; the code is the class position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Encoder whose codes follow the order of `classes`.
    pub fn new<S: Into<String>>(classes: impl IntoIterator<Item = S>) -> Self {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    /// Known classes in code order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Code for `value`, or `None` if it was never seen in training.
    pub fn transform(&self, value: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == value)
    }
}

/// Label encoders keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelEncoders(BTreeMap<String, LabelEncoder>);

impl LabelEncoders {
    /// Adds or replaces the encoder for `column`.
    pub fn insert(&mut self, column: impl Into<String>, encoder: LabelEncoder) {
        self.0.insert(column.into(), encoder);
    }

    /// Encoder for `column`, if one was exported.
    pub fn get(&self, column: &str) -> Option<&LabelEncoder> {
        self.0.get(column)
    }

    /// Column names that have an encoder.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Every categorical column of the label-encoded layout must have an
    /// encoder, and every value the collector can produce must be known to it.
    pub fn validate_coverage(&self) -> Result<()> {
        for name in LABEL_ENCODED_COLUMNS {
            let spec = column(name).ok_or_else(|| ChurnError::UnknownColumn {
                column: name.to_string(),
            })?;
            let ColumnKind::Categorical(options) = spec.kind else {
                continue;
            };

            let encoder = self.get(name).ok_or_else(|| ChurnError::MissingEncoder {
                column: name.to_string(),
            })?;
            if let Some(value) = options.iter().find(|v| encoder.transform(v).is_none()) {
                return Err(ChurnError::UnknownCategory {
                    column: name.to_string(),
                    value: value.to_string(),
                });
            }
        }

        for extra in self.columns().filter(|c| !LABEL_ENCODED_COLUMNS.contains(c)) {
            tracing::debug!(column = extra, "label encoder not used by the layout");
        }
        Ok(())
    }
}

/// Ordered feature names the model was fit on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSchema(Vec<String>);

impl FeatureSchema {
    /// Schema from an ordered list of feature names.
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// Feature names in model order.
    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Number of features the model was fit on.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the schema lists no features.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Names that no record can ever set; they are always zero.
    pub fn unreachable_names(&self) -> Vec<&str> {
        let producible = producible_names();
        self.0
            .iter()
            .map(String::as_str)
            .filter(|n| !producible.contains(*n))
            .collect()
    }
}

/// Every name the one-hot expansion can emit.
fn producible_names() -> HashSet<String> {
    let mut names = HashSet::new();
    for spec in &COLUMNS {
        match spec.kind {
            ColumnKind::Numeric => {
                names.insert(spec.name.to_string());
            }
            ColumnKind::Categorical(options) => {
                names.extend(options.iter().map(|v| indicator_name(spec.name, v)));
            }
        }
    }
    names
}

/// Per-column standardization applied after encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub columns: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScaledColumn {
    index: usize,
    mean: f64,
    scale: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    LabelEncoded,
    OneHot,
}

impl StrategyKind {
    /// Short name used in logs and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::LabelEncoded => "label",
            StrategyKind::OneHot => "one-hot",
        }
    }
}

#[derive(Debug, Clone)]
enum Strategy {
    LabelEncoded(LabelEncoders),
    OneHot,
}

/// A record encoded into model input order.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFeatureVector {
    names: Arc<[String]>,
    values: Array1<f64>,
}

impl EncodedFeatureVector {
    /// Number of features.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the vector has no features.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Feature names, aligned with [`values`](Self::values).
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Feature values in model order.
    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    /// Value of the named feature, if it is part of the layout.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    /// The vector as a single-row batch.
    pub fn as_row(&self) -> ArrayView2<'_, f64> {
        self.values.view().insert_axis(Axis(0))
    }

    /// Consumes the vector, returning its values.
    pub fn into_values(self) -> Array1<f64> {
        self.values
    }
}

/// Builds model input vectors from records using one of the two layouts.
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    strategy: Strategy,
    names: Arc<[String]>,
    scaled: Vec<ScaledColumn>,
}

impl FeatureEncoder {
    /// Label-encoded layout. Fails if an encoder is missing or incomplete.
    pub fn label_encoded(encoders: LabelEncoders) -> Result<Self> {
        encoders.validate_coverage()?;
        let names: Arc<[String]> = LABEL_ENCODED_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .collect();

        tracing::info!(features = names.len(), "using label-encoded layout");
        Ok(Self {
            strategy: Strategy::LabelEncoded(encoders),
            names,
            scaled: Vec::new(),
        })
    }

    /// One-hot layout aligned to `schema`.
    pub fn one_hot(schema: FeatureSchema) -> Self {
        for name in schema.unreachable_names() {
            tracing::warn!(feature = name, "feature is never produced and will always be zero");
        }

        let names: Arc<[String]> = schema.0.into();
        tracing::info!(features = names.len(), "using one-hot layout");
        Self {
            strategy: Strategy::OneHot,
            names,
            scaled: Vec::new(),
        }
    }

    /// Standardizes the scaler's columns after encoding.
    pub fn with_scaler(mut self, scaler: StandardScaler) -> Result<Self> {
        let StandardScaler {
            columns,
            mean,
            scale,
        } = scaler;
        if columns.len() != mean.len() || columns.len() != scale.len() {
            return Err(ChurnError::ScalerShape {
                columns: columns.len(),
                mean: mean.len(),
                scale: scale.len(),
            });
        }

        let mut scaled = Vec::with_capacity(columns.len());
        for ((name, mean), scale) in columns.into_iter().zip(mean).zip(scale) {
            let index = self
                .names
                .iter()
                .position(|n| *n == name)
                .ok_or_else(|| ChurnError::UnknownScalerColumn {
                    column: name.clone(),
                })?;
            if scale == 0.0 || !scale.is_finite() {
                return Err(ChurnError::InvalidScale { column: name });
            }
            scaled.push(ScaledColumn { index, mean, scale });
        }

        tracing::debug!(columns = scaled.len(), "scaler attached");
        self.scaled = scaled;
        Ok(self)
    }

    /// Which layout this encoder produces.
    pub fn kind(&self) -> StrategyKind {
        match self.strategy {
            Strategy::LabelEncoded(_) => StrategyKind::LabelEncoded,
            Strategy::OneHot => StrategyKind::OneHot,
        }
    }

    /// Feature names in the order `encode` emits them.
    pub fn feature_names(&self) -> &[String] {
        &self.names
    }

    /// Width of the encoded vector.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the layout has no features.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Encodes one record. Dependent services are reconciled first, so the
    /// output never depends on answers that the parent service makes moot.
    pub fn encode(&self, record: &RawInputRecord) -> Result<EncodedFeatureVector> {
        let record = record.clone().reconciled();
        let mut values = match &self.strategy {
            Strategy::LabelEncoded(encoders) => encode_labels(encoders, &record)?,
            Strategy::OneHot => self.encode_one_hot(&record),
        };

        for col in &self.scaled {
            values[col.index] = (values[col.index] - col.mean) / col.scale;
        }

        Ok(EncodedFeatureVector {
            names: Arc::clone(&self.names),
            values,
        })
    }

    fn encode_one_hot(&self, record: &RawInputRecord) -> Array1<f64> {
        let indicators = one_hot_indicators(record);

        let mut zero_filled = 0usize;
        let values = self
            .names
            .iter()
            .map(|name| match indicators.get(name) {
                Some(&v) => v,
                None => {
                    zero_filled += 1;
                    0.0
                }
            })
            .collect::<Array1<f64>>();

        tracing::trace!(zero_filled, "one-hot projection");
        values
    }
}

fn encode_labels(encoders: &LabelEncoders, record: &RawInputRecord) -> Result<Array1<f64>> {
    let mut values = Vec::with_capacity(LABEL_ENCODED_COLUMNS.len());
    for name in LABEL_ENCODED_COLUMNS {
        let field = record.field(name).ok_or_else(|| ChurnError::UnknownColumn {
            column: name.to_string(),
        })?;
        let value = match field {
            FieldValue::Number(n) => n,
            FieldValue::Category { value, .. } => {
                let encoder = encoders.get(name).ok_or_else(|| ChurnError::MissingEncoder {
                    column: name.to_string(),
                })?;
                let code =
                    encoder
                        .transform(value)
                        .ok_or_else(|| ChurnError::UnknownCategory {
                            column: name.to_string(),
                            value: value.to_string(),
                        })?;
                code as f64
            }
        };
        values.push(value);
    }
    Ok(Array1::from(values))
}

/// Numeric columns under their own name plus one indicator per categorical
/// value. The keys are a superset of any drop-first one-hot schema.
pub fn one_hot_indicators(record: &RawInputRecord) -> HashMap<String, f64> {
    let mut indicators = HashMap::new();
    for field in record.fields() {
        match field.value {
            FieldValue::Number(n) => {
                indicators.insert(field.column.to_string(), n);
            }
            FieldValue::Category { value, options } => {
                for option in options {
                    let hot = if *option == value { 1.0 } else { 0.0 };
                    indicators.insert(indicator_name(field.column, option), hot);
                }
            }
        }
    }
    indicators
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::*;
    use crate::testing::{telco_feature_schema, telco_label_encoders};
    use proptest::prelude::*;
    use proptest::sample::select;

    fn one_hot() -> FeatureEncoder {
        FeatureEncoder::one_hot(telco_feature_schema())
    }

    fn scenario_one() -> RawInputRecord {
        RawInputRecord {
            gender: Gender::Male,
            senior_citizen: false,
            partner: YesNo::Yes,
            dependents: YesNo::No,
            tenure: 12,
            monthly_charges: 70.0,
            total_charges: 2500.0,
            contract: Contract::MonthToMonth,
            paperless_billing: YesNo::Yes,
            payment_method: PaymentMethod::ElectronicCheck,
            ..Default::default()
        }
    }

    #[test]
    fn label_encoded_reference_record() {
        let encoder = FeatureEncoder::label_encoded(telco_label_encoders()).unwrap();
        let vector = encoder.encode(&scenario_one()).unwrap();

        assert_eq!(vector.names(), LABEL_ENCODED_COLUMNS);
        assert_eq!(
            vector.values().to_vec(),
            vec![1.0, 0.0, 1.0, 0.0, 12.0, 70.0, 2500.0, 0.0, 1.0, 2.0]
        );
    }

    #[test]
    fn missing_encoder_is_rejected_at_load() {
        let mut encoders = LabelEncoders::default();
        encoders.insert("gender", LabelEncoder::new(["Female", "Male"]));
        let err = FeatureEncoder::label_encoded(encoders).unwrap_err();
        assert!(matches!(err, ChurnError::MissingEncoder { column } if column == "Partner"));
    }

    #[test]
    fn incomplete_encoder_is_rejected_at_load() {
        let mut encoders = telco_label_encoders();
        encoders.insert(
            "Contract",
            LabelEncoder::new(["Month-to-month", "One year"]),
        );
        let err = FeatureEncoder::label_encoded(encoders).unwrap_err();
        assert!(
            matches!(err, ChurnError::UnknownCategory { column, value } if column == "Contract" && value == "Two year")
        );
    }

    #[test]
    fn one_hot_contract_indicators() {
        let vector = one_hot()
            .encode(&RawInputRecord {
                contract: Contract::TwoYear,
                ..Default::default()
            })
            .unwrap();

        assert_eq!(vector.get("Contract_Two year"), Some(1.0));
        assert_eq!(vector.get("Contract_One year"), Some(0.0));
        // reference category is dropped from the schema
        assert_eq!(vector.get("Contract_Month-to-month"), None);
    }

    #[test]
    fn no_internet_sets_every_dependent_indicator() {
        let vector = one_hot()
            .encode(&RawInputRecord {
                internet_service: InternetService::No,
                online_security: AddOn::Yes,
                ..Default::default()
            })
            .unwrap();

        assert_eq!(vector.get("InternetService_No"), Some(1.0));
        assert_eq!(vector.get("InternetService_Fiber optic"), Some(0.0));
        for addon in [
            "OnlineSecurity",
            "OnlineBackup",
            "DeviceProtection",
            "TechSupport",
            "StreamingTV",
            "StreamingMovies",
        ] {
            assert_eq!(
                vector.get(&indicator_name(addon, "No internet service")),
                Some(1.0),
                "{addon}"
            );
            assert_eq!(vector.get(&indicator_name(addon, "Yes")), Some(0.0), "{addon}");
        }
    }

    #[test]
    fn unknown_schema_names_are_zero_filled() {
        let schema = FeatureSchema::new(["tenure", "customerAge", "gender_Male"]);
        assert_eq!(schema.unreachable_names(), vec!["customerAge"]);

        let encoder = FeatureEncoder::one_hot(schema);
        let vector = encoder
            .encode(&RawInputRecord {
                gender: Gender::Male,
                tenure: 30,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(vector.values().to_vec(), vec![30.0, 0.0, 1.0]);
    }

    #[test]
    fn boundary_values_encode() {
        let encoders = [
            one_hot(),
            FeatureEncoder::label_encoded(telco_label_encoders()).unwrap(),
        ];
        for encoder in &encoders {
            for (tenure, monthly) in [(0, 0.0), (TENURE_MAX, MONTHLY_CHARGES_MAX)] {
                let record = RawInputRecord {
                    tenure,
                    monthly_charges: monthly,
                    total_charges: 0.0,
                    ..Default::default()
                };
                let vector = encoder.encode(&record).unwrap();
                assert_eq!(vector.len(), encoder.len());
                assert_eq!(vector.get("tenure"), Some(f64::from(tenure)));
            }
        }
    }

    #[test]
    fn scaler_standardizes_listed_columns() {
        let encoder = one_hot()
            .with_scaler(StandardScaler {
                columns: vec!["tenure".into(), "MonthlyCharges".into()],
                mean: vec![32.0, 65.0],
                scale: vec![24.0, 30.0],
            })
            .unwrap();
        let vector = encoder
            .encode(&RawInputRecord {
                tenure: 56,
                monthly_charges: 35.0,
                ..Default::default()
            })
            .unwrap();

        assert_eq!(vector.get("tenure"), Some(1.0));
        assert_eq!(vector.get("MonthlyCharges"), Some(-1.0));
        assert_eq!(vector.get("TotalCharges"), Some(2500.0));
    }

    #[test]
    fn scaler_validation() {
        let bad_column = one_hot().with_scaler(StandardScaler {
            columns: vec!["Age".into()],
            mean: vec![0.0],
            scale: vec![1.0],
        });
        assert!(matches!(bad_column, Err(ChurnError::UnknownScalerColumn { .. })));

        let zero_scale = one_hot().with_scaler(StandardScaler {
            columns: vec!["tenure".into()],
            mean: vec![0.0],
            scale: vec![0.0],
        });
        assert!(matches!(zero_scale, Err(ChurnError::InvalidScale { .. })));

        let ragged = one_hot().with_scaler(StandardScaler {
            columns: vec!["tenure".into()],
            mean: vec![],
            scale: vec![1.0],
        });
        assert!(matches!(ragged, Err(ChurnError::ScalerShape { .. })));
    }

    prop_compose! {
        fn any_record()(
            (gender, senior_citizen, partner, dependents, tenure, phone_service, multiple_lines, internet_service) in (
                select(Gender::ALL),
                any::<bool>(),
                select(YesNo::ALL),
                select(YesNo::ALL),
                0u32..=TENURE_MAX,
                select(YesNo::ALL),
                select(MultipleLines::ALL),
                select(InternetService::ALL),
            ),
            (online_security, online_backup, device_protection, tech_support, streaming_tv, streaming_movies) in (
                select(AddOn::ALL),
                select(AddOn::ALL),
                select(AddOn::ALL),
                select(AddOn::ALL),
                select(AddOn::ALL),
                select(AddOn::ALL),
            ),
            (contract, paperless_billing, payment_method, monthly_charges, total_charges) in (
                select(Contract::ALL),
                select(YesNo::ALL),
                select(PaymentMethod::ALL),
                0.0f64..=MONTHLY_CHARGES_MAX,
                0.0f64..=TOTAL_CHARGES_MAX,
            ),
        ) -> RawInputRecord {
            RawInputRecord {
                gender,
                senior_citizen,
                partner,
                dependents,
                tenure,
                phone_service,
                multiple_lines,
                internet_service,
                online_security,
                online_backup,
                device_protection,
                tech_support,
                streaming_tv,
                streaming_movies,
                contract,
                paperless_billing,
                payment_method,
                monthly_charges,
                total_charges,
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn prop_one_hot_length_matches_schema(record in any_record()) {
            let schema = telco_feature_schema();
            let vector = one_hot().encode(&record).unwrap();
            prop_assert_eq!(vector.len(), schema.len());
            prop_assert_eq!(vector.names(), schema.names());
        }

        #[test]
        fn prop_exactly_one_indicator_per_group(record in any_record()) {
            let indicators = one_hot_indicators(&record.clone().reconciled());
            for spec in &COLUMNS {
                if let ColumnKind::Categorical(options) = spec.kind {
                    let hot: f64 = options
                        .iter()
                        .map(|v| indicators[&indicator_name(spec.name, v)])
                        .sum();
                    prop_assert_eq!(hot, 1.0, "{}", spec.name);
                }
            }
        }

        #[test]
        fn prop_encoding_is_deterministic(record in any_record()) {
            let encoder = one_hot();
            prop_assert_eq!(encoder.encode(&record).unwrap(), encoder.encode(&record).unwrap());

            let label = FeatureEncoder::label_encoded(telco_label_encoders()).unwrap();
            prop_assert_eq!(label.encode(&record).unwrap(), label.encode(&record).unwrap());
        }

        #[test]
        fn prop_label_encoding_never_fails(record in any_record()) {
            let label = FeatureEncoder::label_encoded(telco_label_encoders()).unwrap();
            let vector = label.encode(&record).unwrap();
            prop_assert_eq!(vector.len(), LABEL_ENCODED_COLUMNS.len());
        }
    }
}
