//! Customer attributes as captured by the input collector.
//!
//! Every categorical attribute is a closed enum whose variants serialize to the
//! spelling used by the training dataset, so a [`RawInputRecord`] can only ever
//! hold values the encoders know about.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Dataset column names.
pub mod columns {
    pub const GENDER: &str = "gender";
    pub const SENIOR_CITIZEN: &str = "SeniorCitizen";
    pub const PARTNER: &str = "Partner";
    pub const DEPENDENTS: &str = "Dependents";
    pub const TENURE: &str = "tenure";
    pub const PHONE_SERVICE: &str = "PhoneService";
    pub const MULTIPLE_LINES: &str = "MultipleLines";
    pub const INTERNET_SERVICE: &str = "InternetService";
    pub const ONLINE_SECURITY: &str = "OnlineSecurity";
    pub const ONLINE_BACKUP: &str = "OnlineBackup";
    pub const DEVICE_PROTECTION: &str = "DeviceProtection";
    pub const TECH_SUPPORT: &str = "TechSupport";
    pub const STREAMING_TV: &str = "StreamingTV";
    pub const STREAMING_MOVIES: &str = "StreamingMovies";
    pub const CONTRACT: &str = "Contract";
    pub const PAPERLESS_BILLING: &str = "PaperlessBilling";
    pub const PAYMENT_METHOD: &str = "PaymentMethod";
    pub const MONTHLY_CHARGES: &str = "MonthlyCharges";
    pub const TOTAL_CHARGES: &str = "TotalCharges";
    /// Target column of labeled datasets.
    pub const CHURN: &str = "Churn";
}

pub const TENURE_MAX: u32 = 72;
pub const MONTHLY_CHARGES_MAX: f64 = 150.0;
pub const TOTAL_CHARGES_MAX: f64 = 10_000.0;

/// A closed set of dataset values for one attribute.
pub trait Categorical: Copy + Eq + fmt::Debug + 'static {
    fn options() -> &'static [Self];
    fn labels() -> &'static [&'static str];
    fn label(self) -> &'static str;

    fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::options()
            .iter()
            .copied()
            .find(|v| v.label().eq_ignore_ascii_case(label))
    }
}

macro_rules! categorical {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
            pub const LABELS: &'static [&'static str] = &[$($label),+];

            /// Dataset spelling of the value.
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl Categorical for $name {
            fn options() -> &'static [Self] {
                Self::ALL
            }

            fn labels() -> &'static [&'static str] {
                Self::LABELS
            }

            fn label(self) -> &'static str {
                $name::label(self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

categorical!(Gender {
    Female => "Female",
    Male => "Male",
});

categorical!(
    /// Plain two-way answer used by partner, dependents, phone service and billing.
    YesNo {
        Yes => "Yes",
        No => "No",
    }
);

categorical!(MultipleLines {
    Yes => "Yes",
    No => "No",
    NoPhoneService => "No phone service",
});

categorical!(InternetService {
    Dsl => "DSL",
    FiberOptic => "Fiber optic",
    No => "No",
});

categorical!(
    /// Answer for the services that only exist on top of an internet subscription.
    AddOn {
        Yes => "Yes",
        No => "No",
        NoInternetService => "No internet service",
    }
);

categorical!(Contract {
    MonthToMonth => "Month-to-month",
    OneYear => "One year",
    TwoYear => "Two year",
});

categorical!(PaymentMethod {
    ElectronicCheck => "Electronic check",
    MailedCheck => "Mailed check",
    BankTransfer => "Bank transfer (automatic)",
    CreditCard => "Credit card (automatic)",
});

/// Shape of one dataset column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnKind {
    Categorical(&'static [&'static str]),
    Numeric,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn categorical_column(name: &'static str, options: &'static [&'static str]) -> ColumnSpec {
    ColumnSpec {
        name,
        kind: ColumnKind::Categorical(options),
    }
}

const fn numeric_column(name: &'static str) -> ColumnSpec {
    ColumnSpec {
        name,
        kind: ColumnKind::Numeric,
    }
}

/// Every input column in dataset order.
pub static COLUMNS: [ColumnSpec; 19] = [
    categorical_column(columns::GENDER, Gender::LABELS),
    numeric_column(columns::SENIOR_CITIZEN),
    categorical_column(columns::PARTNER, YesNo::LABELS),
    categorical_column(columns::DEPENDENTS, YesNo::LABELS),
    numeric_column(columns::TENURE),
    categorical_column(columns::PHONE_SERVICE, YesNo::LABELS),
    categorical_column(columns::MULTIPLE_LINES, MultipleLines::LABELS),
    categorical_column(columns::INTERNET_SERVICE, InternetService::LABELS),
    categorical_column(columns::ONLINE_SECURITY, AddOn::LABELS),
    categorical_column(columns::ONLINE_BACKUP, AddOn::LABELS),
    categorical_column(columns::DEVICE_PROTECTION, AddOn::LABELS),
    categorical_column(columns::TECH_SUPPORT, AddOn::LABELS),
    categorical_column(columns::STREAMING_TV, AddOn::LABELS),
    categorical_column(columns::STREAMING_MOVIES, AddOn::LABELS),
    categorical_column(columns::CONTRACT, Contract::LABELS),
    categorical_column(columns::PAPERLESS_BILLING, YesNo::LABELS),
    categorical_column(columns::PAYMENT_METHOD, PaymentMethod::LABELS),
    numeric_column(columns::MONTHLY_CHARGES),
    numeric_column(columns::TOTAL_CHARGES),
];

/// Looks up a column by its dataset name.
pub fn column(name: &str) -> Option<&'static ColumnSpec> {
    COLUMNS.iter().find(|c| c.name == name)
}

/// A captured value, ready for encoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Category {
        value: &'static str,
        options: &'static [&'static str],
    },
    Number(f64),
}

impl FieldValue {
    fn category<T: Categorical>(value: T) -> Self {
        FieldValue::Category {
            value: value.label(),
            options: T::labels(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field {
    pub column: &'static str,
    pub value: FieldValue,
}

/// One customer's attributes, one value per form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInputRecord {
    #[serde(rename = "gender")]
    pub gender: Gender,
    #[serde(rename = "SeniorCitizen", with = "senior_flag")]
    pub senior_citizen: bool,
    #[serde(rename = "Partner")]
    pub partner: YesNo,
    #[serde(rename = "Dependents")]
    pub dependents: YesNo,
    #[serde(rename = "tenure")]
    pub tenure: u32,
    #[serde(rename = "PhoneService")]
    pub phone_service: YesNo,
    #[serde(rename = "MultipleLines")]
    pub multiple_lines: MultipleLines,
    #[serde(rename = "InternetService")]
    pub internet_service: InternetService,
    #[serde(rename = "OnlineSecurity")]
    pub online_security: AddOn,
    #[serde(rename = "OnlineBackup")]
    pub online_backup: AddOn,
    #[serde(rename = "DeviceProtection")]
    pub device_protection: AddOn,
    #[serde(rename = "TechSupport")]
    pub tech_support: AddOn,
    #[serde(rename = "StreamingTV")]
    pub streaming_tv: AddOn,
    #[serde(rename = "StreamingMovies")]
    pub streaming_movies: AddOn,
    #[serde(rename = "Contract")]
    pub contract: Contract,
    #[serde(rename = "PaperlessBilling")]
    pub paperless_billing: YesNo,
    #[serde(rename = "PaymentMethod")]
    pub payment_method: PaymentMethod,
    #[serde(rename = "MonthlyCharges", deserialize_with = "blank_as_zero")]
    pub monthly_charges: f64,
    #[serde(rename = "TotalCharges", deserialize_with = "blank_as_zero")]
    pub total_charges: f64,
}

impl Default for RawInputRecord {
    fn default() -> Self {
        Self {
            gender: Gender::Female,
            senior_citizen: false,
            partner: YesNo::Yes,
            dependents: YesNo::Yes,
            tenure: 12,
            phone_service: YesNo::Yes,
            multiple_lines: MultipleLines::Yes,
            internet_service: InternetService::Dsl,
            online_security: AddOn::Yes,
            online_backup: AddOn::Yes,
            device_protection: AddOn::Yes,
            tech_support: AddOn::Yes,
            streaming_tv: AddOn::Yes,
            streaming_movies: AddOn::Yes,
            contract: Contract::MonthToMonth,
            paperless_billing: YesNo::Yes,
            payment_method: PaymentMethod::ElectronicCheck,
            monthly_charges: 70.0,
            total_charges: 2500.0,
        }
    }
}

impl RawInputRecord {
    /// Makes dependent services agree with the service they hang off.
    ///
    /// Without phone service, multiple lines is `No phone service`; without
    /// internet service, every add-on is `No internet service`. The reverse
    /// placeholders are turned into a plain `No` when the parent service exists.
    pub fn reconciled(mut self) -> Self {
        if self.phone_service == YesNo::No {
            self.multiple_lines = MultipleLines::NoPhoneService;
        } else if self.multiple_lines == MultipleLines::NoPhoneService {
            self.multiple_lines = MultipleLines::No;
        }

        let no_internet = self.internet_service == InternetService::No;
        for addon in self.internet_addons_mut() {
            if no_internet {
                *addon = AddOn::NoInternetService;
            } else if *addon == AddOn::NoInternetService {
                *addon = AddOn::No;
            }
        }
        self
    }

    fn internet_addons_mut(&mut self) -> [&mut AddOn; 6] {
        [
            &mut self.online_security,
            &mut self.online_backup,
            &mut self.device_protection,
            &mut self.tech_support,
            &mut self.streaming_tv,
            &mut self.streaming_movies,
        ]
    }

    /// All fields in dataset column order.
    pub fn fields(&self) -> [Field; 19] {
        use FieldValue::Number;
        let field = |column, value| Field { column, value };
        [
            field(columns::GENDER, FieldValue::category(self.gender)),
            field(
                columns::SENIOR_CITIZEN,
                Number(if self.senior_citizen { 1.0 } else { 0.0 }),
            ),
            field(columns::PARTNER, FieldValue::category(self.partner)),
            field(columns::DEPENDENTS, FieldValue::category(self.dependents)),
            field(columns::TENURE, Number(f64::from(self.tenure))),
            field(columns::PHONE_SERVICE, FieldValue::category(self.phone_service)),
            field(columns::MULTIPLE_LINES, FieldValue::category(self.multiple_lines)),
            field(columns::INTERNET_SERVICE, FieldValue::category(self.internet_service)),
            field(columns::ONLINE_SECURITY, FieldValue::category(self.online_security)),
            field(columns::ONLINE_BACKUP, FieldValue::category(self.online_backup)),
            field(columns::DEVICE_PROTECTION, FieldValue::category(self.device_protection)),
            field(columns::TECH_SUPPORT, FieldValue::category(self.tech_support)),
            field(columns::STREAMING_TV, FieldValue::category(self.streaming_tv)),
            field(columns::STREAMING_MOVIES, FieldValue::category(self.streaming_movies)),
            field(columns::CONTRACT, FieldValue::category(self.contract)),
            field(columns::PAPERLESS_BILLING, FieldValue::category(self.paperless_billing)),
            field(columns::PAYMENT_METHOD, FieldValue::category(self.payment_method)),
            field(columns::MONTHLY_CHARGES, Number(self.monthly_charges)),
            field(columns::TOTAL_CHARGES, Number(self.total_charges)),
        ]
    }

    /// Value of one column by its dataset name.
    pub fn field(&self, column: &str) -> Option<FieldValue> {
        self.fields()
            .into_iter()
            .find(|f| f.column == column)
            .map(|f| f.value)
    }
}

/// `SeniorCitizen` is stored as 0/1 in the dataset; "Yes"/"No" and booleans
/// are accepted as well.
mod senior_flag {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &bool, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        use serde::de::Error;
        match Flag::deserialize(d)? {
            Flag::Bool(b) => Ok(b),
            Flag::Int(0) => Ok(false),
            Flag::Int(1) => Ok(true),
            Flag::Int(n) => Err(D::Error::custom(format!("senior flag must be 0 or 1, got {n}"))),
            Flag::Text(t) => match t.trim() {
                "0" | "No" | "no" => Ok(false),
                "1" | "Yes" | "yes" => Ok(true),
                other => Err(D::Error::custom(format!("invalid senior flag `{other}`"))),
            },
        }
    }
}

/// Reads a charge column, treating blank cells as zero.
fn blank_as_zero<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Charge {
        Number(f64),
        Text(String),
        Empty,
    }

    match Charge::deserialize(d)? {
        Charge::Number(n) => Ok(n),
        Charge::Empty => Ok(0.0),
        Charge::Text(t) if t.trim().is_empty() => Ok(0.0),
        Charge::Text(t) => t
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("invalid charge `{t}`"))),
    }
}
