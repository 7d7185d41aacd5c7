//! Command-line interface definitions and argument parsing

use crate::data::ColumnRoles;
use crate::model::Hyperparameters;
use clap::Parser;

/// Customer churn prediction CLI using from-scratch logistic regression
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CSV file
    #[arg(short, long, default_value = "telco_churn.csv")]
    pub input: String,

    /// Column holding the unique customer identifier
    #[arg(long, default_value = "customer_id")]
    pub id_column: String,

    /// Column holding the binary churn label
    #[arg(long, default_value = "churn")]
    pub label_column: String,

    /// Comma-separated list of numeric predictor columns
    /// Example: --numeric-columns "age,tenure_months,monthly_charges"
    #[arg(
        long,
        default_value = "age,tenure_months,monthly_charges,total_charges"
    )]
    pub numeric_columns: String,

    /// Fraction of rows held out for evaluation, in (0, 1)
    #[arg(short, long, default_value = "0.2")]
    pub test_fraction: f64,

    /// Seed for the train/test split permutation
    #[arg(short, long, default_value = "42")]
    pub seed: u64,

    /// Maximum iterations for the solver
    #[arg(long, default_value = "100")]
    pub max_iters: usize,

    /// Inverse regularization strength (larger means weaker penalty)
    #[arg(short = 'c', long, default_value = "1.0")]
    pub regularization: f64,

    /// Output path for the trained model artifact
    #[arg(long, default_value = "model.json")]
    pub model_out: String,

    /// Output path for the metrics JSON
    #[arg(long, default_value = "metrics.json")]
    pub metrics_out: String,

    /// Output path for the ROC curve plot
    #[arg(short, long, default_value = "roc_curve.png")]
    pub roc_out: String,

    /// Evaluate-only mode: path to a previously saved model artifact
    #[arg(short, long)]
    pub evaluate: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parse the numeric predictor columns from the comma-separated list.
    pub fn parse_numeric_columns(&self) -> crate::Result<Vec<String>> {
        let columns: Vec<String> = self
            .numeric_columns
            .split(',')
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        if columns.is_empty() {
            anyhow::bail!("at least one numeric predictor column is required");
        }

        Ok(columns)
    }

    /// Column roles for the cleaning and encoding stages.
    pub fn column_roles(&self) -> crate::Result<ColumnRoles> {
        Ok(ColumnRoles {
            identifier: self.id_column.clone(),
            label: self.label_column.clone(),
            numeric: self.parse_numeric_columns()?,
        })
    }

    /// Training hyperparameters.
    pub fn hyperparameters(&self) -> Hyperparameters {
        Hyperparameters {
            max_iterations: self.max_iters,
            regularization_strength: self.regularization,
        }
    }
}
