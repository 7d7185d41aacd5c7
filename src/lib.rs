//! ChurnForge: A Rust CLI application for customer churn prediction
//!
//! This library provides a full churn-modelling pipeline: cleaning a raw
//! customer table, dummy-encoding it into a fixed feature schema, splitting
//! it deterministically, training a regularized logistic regression from
//! scratch, and scoring the result with a confusion matrix and ROC curve.

pub mod cli;
pub mod data;
pub mod encode;
pub mod error;
pub mod metrics;
pub mod model;
pub mod split;
pub mod viz;

// Re-export public items for easier access
pub use cli::Args;
pub use data::{clean, load_raw_table, CleaningReport, ColumnRoles, Dataset, RawTable, Value};
pub use encode::{encode, fit_schema, FeatureColumn, FeatureMatrix, FeatureSchema};
pub use error::PipelineError;
pub use metrics::{evaluate, ConfusionMatrix, Metrics, RocCurve, RocPoint};
pub use model::{fit, Hyperparameters, LogisticModel};
pub use split::split;

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
