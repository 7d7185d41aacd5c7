//! ChurnForge: Customer churn prediction CLI using logistic regression
//!
//! This is the main entrypoint that orchestrates data cleaning, encoding,
//! splitting, training, evaluation, and report generation.

use anyhow::Result;
use churnforge::{clean, encode, evaluate, fit, fit_schema, load_raw_table, split, viz};
use churnforge::{Args, CleaningReport, LogisticModel};
use clap::Parser;
use std::fs;
use std::time::Instant;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    if args.verbose {
        println!("ChurnForge - Customer Churn Prediction");
        println!("======================================\n");
    }

    // Check if in evaluate-only mode
    if let Some(ref model_path) = args.evaluate {
        run_evaluation_mode(&args, model_path)?;
    } else {
        run_training_pipeline(&args)?;
    }

    Ok(())
}

/// Run the full pipeline: clean, encode, split, train, evaluate, report.
fn run_training_pipeline(args: &Args) -> Result<()> {
    println!("=== Training Pipeline ===\n");

    let start_time = Instant::now();
    let roles = args.column_roles()?;
    let hyperparameters = args.hyperparameters();

    // Step 1: Load and clean the raw table
    if args.verbose {
        println!("Step 1: Loading and cleaning data");
        println!("  Input file: {}", args.input);
    }

    let raw = load_raw_table(&args.input)?;
    let (dataset, report) = clean(&raw, &roles)?;
    print_cleaning_report(&report);

    // Step 2: Encode features and split
    let schema = fit_schema(&dataset);
    let matrix = encode(&dataset, &schema)?;
    let (train, test) = split(&matrix, args.test_fraction, args.seed)?;

    println!(
        "✓ Encoded {} feature columns; {} train rows, {} test rows",
        schema.len(),
        train.n_rows(),
        test.n_rows()
    );
    if args.verbose {
        println!("  Feature columns: {:?}", schema.column_names());
        println!("  Split seed: {}, test fraction: {}", args.seed, args.test_fraction);
    }

    // Step 3: Train the model
    if args.verbose {
        println!("\nStep 2: Training logistic regression");
        println!("  Max iterations: {}", hyperparameters.max_iterations);
        println!(
            "  Regularization strength: {}",
            hyperparameters.regularization_strength
        );
    }

    let model_start = Instant::now();
    let model = fit(&train, &schema, &hyperparameters)?;
    let model_time = model_start.elapsed();

    println!(
        "✓ Model fitted in {} iterations ({})",
        model.iterations,
        if model.converged {
            "converged"
        } else {
            "iteration cap reached"
        }
    );
    if args.verbose {
        println!("  Training time: {:.2}s", model_time.as_secs_f64());
    }

    // Step 4: Evaluate on the held-out partition
    let (metrics, curve) = evaluate(&model, &test)?;
    viz::print_evaluation_report(&metrics, &model);

    // Step 5: Persist outputs
    save_outputs(args, &model, &metrics)?;
    viz::plot_roc_curve(&curve, &metrics, &args.roc_out)?;

    let total_time = start_time.elapsed();
    println!("\n=== Pipeline Complete ===");
    println!("Total processing time: {:.2}s", total_time.as_secs_f64());
    println!("Model saved to: {}", args.model_out);
    println!("Metrics saved to: {}", args.metrics_out);

    Ok(())
}

/// Re-evaluate a previously saved model against the input table.
///
/// The input is re-cleaned and encoded against the schema stored in the
/// artifact, then split with the same seed and test fraction so the same
/// held-out rows are scored.
fn run_evaluation_mode(args: &Args, model_path: &str) -> Result<()> {
    println!("=== Evaluation Mode ===");
    println!("Model artifact: {}", model_path);

    let start_time = Instant::now();
    let roles = args.column_roles()?;

    let bytes = fs::read(model_path)?;
    let model = LogisticModel::from_bytes(&bytes)?;
    if args.verbose {
        println!(
            "Restored model: {} feature columns, trained with {:?}",
            model.schema.len(),
            model.hyperparameters
        );
    }

    let raw = load_raw_table(&args.input)?;
    let (dataset, report) = clean(&raw, &roles)?;
    print_cleaning_report(&report);

    // The stored schema drives encoding; it is never re-derived here
    let matrix = encode(&dataset, &model.schema)?;
    let (_, test) = split(&matrix, args.test_fraction, args.seed)?;

    let (metrics, curve) = evaluate(&model, &test)?;
    viz::print_evaluation_report(&metrics, &model);

    fs::write(&args.metrics_out, serde_json::to_string_pretty(&metrics)?)?;
    viz::plot_roc_curve(&curve, &metrics, &args.roc_out)?;

    let elapsed = start_time.elapsed();
    println!("\n✓ Evaluation complete in {:.2}s", elapsed.as_secs_f64());
    println!("Metrics saved to: {}", args.metrics_out);

    Ok(())
}

/// Emit the row-count deltas observed while cleaning.
fn print_cleaning_report(report: &CleaningReport) {
    println!(
        "✓ Data cleaned: {} rows loaded, {} after missing-value drop, {} after dedup",
        report.rows_loaded, report.rows_after_missing_drop, report.rows_after_dedup
    );
}

fn save_outputs(args: &Args, model: &LogisticModel, metrics: &churnforge::Metrics) -> Result<()> {
    fs::write(&args.model_out, model.to_bytes()?)?;
    fs::write(&args.metrics_out, serde_json::to_string_pretty(metrics)?)?;
    Ok(())
}
