//! Labeled customer tables in the training dataset's CSV layout.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{ChurnError, Result};
use crate::record::{Categorical, RawInputRecord, YesNo, columns};

/// Records with their observed outcome (1 = churned).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledRecords {
    pub records: Vec<RawInputRecord>,
    pub labels: Vec<usize>,
}

impl LabeledRecords {
    /// Number of labeled rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no rows were read.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Loads a CSV file with a header row and a `Churn` column of `Yes`/`No`.
    /// Extra columns such as `customerID` are ignored.
    pub fn from_csv(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| ChurnError::ArtifactIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file).map_err(|reason| ChurnError::Dataset {
            path: path.to_path_buf(),
            reason,
        })
    }

    fn from_reader<R: Read>(reader: R) -> std::result::Result<Self, String> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);
        let headers = rdr.headers().map_err(|e| e.to_string())?.clone();
        let churn_idx = headers
            .iter()
            .position(|h| h == columns::CHURN)
            .ok_or_else(|| format!("missing `{}` column", columns::CHURN))?;

        let mut out = Self::default();
        for (line, row) in rdr.records().enumerate() {
            let row = row.map_err(|e| e.to_string())?;
            let record: RawInputRecord = row
                .deserialize(Some(&headers))
                .map_err(|e| format!("row {}: {e}", line + 1))?;
            let label = match YesNo::from_label(&row[churn_idx]) {
                Some(YesNo::Yes) => 1,
                Some(YesNo::No) => 0,
                None => {
                    return Err(format!(
                        "row {}: invalid churn label `{}`",
                        line + 1,
                        &row[churn_idx]
                    ));
                }
            };
            out.records.push(record);
            out.labels.push(label);
        }

        tracing::debug!(rows = out.len(), "read labeled dataset");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Contract, InternetService};

    const SAMPLE: &str = "\
customerID,gender,SeniorCitizen,Partner,Dependents,tenure,PhoneService,MultipleLines,InternetService,OnlineSecurity,OnlineBackup,DeviceProtection,TechSupport,StreamingTV,StreamingMovies,Contract,PaperlessBilling,PaymentMethod,MonthlyCharges,TotalCharges,Churn
7590-VHVEG,Female,0,Yes,No,1,No,No phone service,DSL,No,Yes,No,No,No,No,Month-to-month,Yes,Electronic check,29.85,29.85,No
3668-QPYBK,Male,0,No,No,2,Yes,No,DSL,Yes,Yes,No,No,No,No,Month-to-month,Yes,Mailed check,53.85,108.15,Yes
4472-LVYGI,Female,0,Yes,Yes,0,No,No phone service,DSL,Yes,No,Yes,Yes,Yes,No,Two year,Yes,Bank transfer (automatic),52.55, ,No
";

    #[test]
    fn reads_telco_layout() {
        let data = LabeledRecords::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data.labels, vec![0, 1, 0]);
        assert_eq!(data.records[1].monthly_charges, 53.85);
        assert_eq!(data.records[2].contract, Contract::TwoYear);
        assert_eq!(data.records[2].total_charges, 0.0);
        assert_eq!(data.records[0].internet_service, InternetService::Dsl);
    }

    #[test]
    fn rejects_missing_target() {
        let csv = "gender,tenure\nMale,3\n";
        let err = LabeledRecords::from_reader(csv.as_bytes()).unwrap_err();
        assert!(err.contains("Churn"));
    }

    #[test]
    fn rejects_unknown_category() {
        let bad = SAMPLE.replace("Two year", "Three year");
        let err = LabeledRecords::from_reader(bad.as_bytes()).unwrap_err();
        assert!(err.starts_with("row 3"), "{err}");
    }
}
