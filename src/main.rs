use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use churn_predict::artifacts::write_artifact;
use churn_predict::collect::Prompter;
use churn_predict::config::DEFAULT_ARTIFACT_DIR;
use churn_predict::present::{render_metrics, render_prediction};
use churn_predict::record::{
    AddOn, Contract, Gender, InternetService, MONTHLY_CHARGES_MAX, MultipleLines, PaymentMethod,
    TENURE_MAX, TOTAL_CHARGES_MAX, YesNo,
};
use churn_predict::{ArtifactConfig, ChurnPredictor, RawInputRecord, StrategyChoice};

/// 📱 Customer churn prediction
#[derive(Debug, Parser)]
#[command(name = "churn-predict", version, about)]
struct Cli {
    #[command(flatten)]
    artifacts: ArtifactArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct ArtifactArgs {
    /// Directory holding the exported model artifacts
    #[arg(long, global = true, env = "CHURN_ARTIFACT_DIR", default_value = DEFAULT_ARTIFACT_DIR)]
    artifacts: PathBuf,

    /// Feature layout to use
    #[arg(long, global = true, env = "CHURN_STRATEGY", value_enum, default_value_t = StrategyChoice::Auto)]
    strategy: StrategyChoice,

    /// Classifier file, overriding the one in the artifact directory
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Ordered feature-name list, overriding the one in the artifact directory
    #[arg(long, global = true)]
    features: Option<PathBuf>,

    /// Label encoders, overriding the ones in the artifact directory
    #[arg(long, global = true)]
    label_encoders: Option<PathBuf>,

    /// Numeric scaler, overriding the one in the artifact directory
    #[arg(long, global = true)]
    scaler: Option<PathBuf>,

    /// Metrics snapshot, overriding the one in the artifact directory
    #[arg(long, global = true)]
    metrics: Option<PathBuf>,

    /// Standardize numeric features with the scaler artifact
    #[arg(long, global = true, env = "CHURN_SCALE")]
    scale: bool,
}

impl ArtifactArgs {
    fn config(&self) -> ArtifactConfig {
        let mut config = ArtifactConfig::from_dir(&self.artifacts)
            .with_strategy(self.strategy)
            .with_scaling(self.scale);
        let overrides = [
            (&self.model, &mut config.model),
            (&self.features, &mut config.features),
            (&self.label_encoders, &mut config.label_encoders),
            (&self.scaler, &mut config.scaler),
            (&self.metrics, &mut config.metrics),
        ];
        for (value, slot) in overrides {
            if let Some(path) = value {
                *slot = path.clone();
            }
        }
        config
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Predict churn for one customer described by flags
    Predict(PredictArgs),
    /// Ask for customer details on the terminal, predicting after each one
    Interactive,
    /// Show the stored model performance metrics
    Metrics,
    /// Compute metrics for a labeled CSV file
    Evaluate {
        /// CSV in the training dataset's column layout, with a `Churn` column
        #[arg(long)]
        data: PathBuf,
        /// Write the resulting metrics snapshot here
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show the selected feature layout
    Inspect,
}

#[derive(Debug, Args)]
struct PredictArgs {
    #[arg(long, value_enum, default_value_t = Gender::Female)]
    gender: Gender,
    #[arg(long, value_enum, default_value_t = YesNo::No)]
    senior_citizen: YesNo,
    #[arg(long, value_enum, default_value_t = YesNo::Yes)]
    partner: YesNo,
    #[arg(long, value_enum, default_value_t = YesNo::Yes)]
    dependents: YesNo,
    /// Months with the company
    #[arg(long, default_value_t = 12, value_parser = clap::value_parser!(u32).range(0..=i64::from(TENURE_MAX)))]
    tenure: u32,
    #[arg(long, value_enum, default_value_t = YesNo::Yes)]
    phone_service: YesNo,
    #[arg(long, value_enum, default_value_t = MultipleLines::Yes)]
    multiple_lines: MultipleLines,
    #[arg(long, value_enum, default_value_t = InternetService::Dsl)]
    internet_service: InternetService,
    #[arg(long, value_enum, default_value_t = AddOn::Yes)]
    online_security: AddOn,
    #[arg(long, value_enum, default_value_t = AddOn::Yes)]
    online_backup: AddOn,
    #[arg(long, value_enum, default_value_t = AddOn::Yes)]
    device_protection: AddOn,
    #[arg(long, value_enum, default_value_t = AddOn::Yes)]
    tech_support: AddOn,
    #[arg(long, value_enum, default_value_t = AddOn::Yes)]
    streaming_tv: AddOn,
    #[arg(long, value_enum, default_value_t = AddOn::Yes)]
    streaming_movies: AddOn,
    #[arg(long, value_enum, default_value_t = Contract::MonthToMonth)]
    contract: Contract,
    #[arg(long, value_enum, default_value_t = YesNo::Yes)]
    paperless_billing: YesNo,
    #[arg(long, value_enum, default_value_t = PaymentMethod::ElectronicCheck)]
    payment_method: PaymentMethod,
    #[arg(long, default_value_t = 70.0, value_parser = monthly_charges)]
    monthly_charges: f64,
    #[arg(long, default_value_t = 2500.0, value_parser = total_charges)]
    total_charges: f64,

    /// Also print the stored performance metrics
    #[arg(long)]
    show_metrics: bool,
}

fn bounded_charge(s: &str, max: f64) -> std::result::Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if (0.0..=max).contains(&value) {
        Ok(value)
    } else {
        Err(format!("must be between 0 and {max}"))
    }
}

fn monthly_charges(s: &str) -> std::result::Result<f64, String> {
    bounded_charge(s, MONTHLY_CHARGES_MAX)
}

fn total_charges(s: &str) -> std::result::Result<f64, String> {
    bounded_charge(s, TOTAL_CHARGES_MAX)
}

impl From<&PredictArgs> for RawInputRecord {
    fn from(args: &PredictArgs) -> Self {
        RawInputRecord {
            gender: args.gender,
            senior_citizen: args.senior_citizen == YesNo::Yes,
            partner: args.partner,
            dependents: args.dependents,
            tenure: args.tenure,
            phone_service: args.phone_service,
            multiple_lines: args.multiple_lines,
            internet_service: args.internet_service,
            online_security: args.online_security,
            online_backup: args.online_backup,
            device_protection: args.device_protection,
            tech_support: args.tech_support,
            streaming_tv: args.streaming_tv,
            streaming_movies: args.streaming_movies,
            contract: args.contract,
            paperless_billing: args.paperless_billing,
            payment_method: args.payment_method,
            monthly_charges: args.monthly_charges,
            total_charges: args.total_charges,
        }
        .reconciled()
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("churn_predict=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn load(args: &ArtifactArgs) -> Result<ChurnPredictor> {
    let config = args.config();
    ChurnPredictor::load(&config)
        .with_context(|| format!("failed to load artifacts from {}", args.artifacts.display()))
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match &cli.command {
        Command::Predict(args) => {
            let predictor = load(&cli.artifacts)?;
            let record = RawInputRecord::from(args);
            let prediction = predictor.predict(&record).context("prediction failed")?;
            println!("{}", render_prediction(&prediction, predictor.strategy()));

            if args.show_metrics {
                println!();
                println!("{}", render_metrics(predictor.metrics()?));
            }
        }
        Command::Interactive => {
            let predictor = load(&cli.artifacts)?;
            println!("📱 Customer Churn Prediction");
            println!("Enter customer details to predict if they are likely to churn (or 'exit').");

            let stdin = io::stdin();
            let mut prompter = Prompter::new(stdin.lock(), io::stdout());
            while let Some(record) = prompter.collect_record()? {
                match predictor.predict(&record) {
                    Ok(prediction) => writeln!(
                        prompter.output(),
                        "\n{}\n",
                        render_prediction(&prediction, predictor.strategy())
                    )?,
                    Err(e) => {
                        tracing::error!(error = %e, "prediction failed");
                        writeln!(prompter.output(), "\n❌ {e}\n")?;
                    }
                }
            }
        }
        Command::Metrics => {
            let predictor = load(&cli.artifacts)?;
            print!("{}", render_metrics(predictor.metrics()?));
        }
        Command::Evaluate { data, out } => {
            let predictor = load(&cli.artifacts)?;
            let metrics = predictor
                .evaluate_csv(data)
                .with_context(|| format!("failed to evaluate {}", data.display()))?;
            print!("{}", render_metrics(&metrics));

            if let Some(out) = out {
                write_artifact(out, &metrics)?;
                println!("💾 Saved metrics to {}", out.display());
            }
        }
        Command::Inspect => {
            let predictor = load(&cli.artifacts)?;
            println!("strategy: {}", predictor.strategy().name());
            println!("features: {}", predictor.encoder().len());
            for (i, name) in predictor.encoder().feature_names().iter().enumerate() {
                println!("{i:>4}  {name}");
            }
        }
    }

    Ok(())
}
