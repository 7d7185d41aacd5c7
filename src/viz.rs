//! Visualization functions using Plotters for model evaluation

use crate::metrics::{Metrics, RocCurve};
use crate::model::LogisticModel;
use plotters::prelude::*;

/// Render the ROC curve as a PNG.
///
/// # Arguments
/// * `curve` - ROC points from the metrics engine
/// * `metrics` - Used for the AUC shown in the legend
/// * `output_path` - Path to save the PNG plot
pub fn plot_roc_curve(
    curve: &RocCurve,
    metrics: &Metrics,
    output_path: &str,
) -> crate::Result<()> {
    let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("ROC Curve - Telco Churn Model", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0f64..1.0, 0.0f64..1.0)?;

    chart
        .configure_mesh()
        .x_desc("False Positive Rate")
        .y_desc("True Positive Rate")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    let roc_points: Vec<(f64, f64)> = curve
        .points
        .iter()
        .map(|p| (p.false_positive_rate, p.true_positive_rate))
        .collect();

    let auc_label = if metrics.roc_auc.is_nan() {
        "ROC curve (AUC undefined)".to_string()
    } else {
        format!("ROC curve (AUC = {:.3})", metrics.roc_auc)
    };

    chart
        .draw_series(LineSeries::new(roc_points, &RED))?
        .label(auc_label)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], &RED));

    // Chance-level diagonal for reference
    chart
        .draw_series(LineSeries::new(
            vec![(0.0, 0.0), (1.0, 1.0)],
            &BLACK.mix(0.4),
        ))?
        .label("Random")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], &BLACK.mix(0.4)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .draw()?;

    root.present()?;
    println!("ROC curve saved to: {}", output_path);

    Ok(())
}

/// Print the evaluation summary to the console.
pub fn print_evaluation_report(metrics: &Metrics, model: &LogisticModel) {
    println!("\n=== Evaluation Report ===");
    println!("Feature columns: {}", model.schema.len());
    println!(
        "Solver: {} after {} iterations",
        if model.converged { "converged" } else { "hit iteration cap" },
        model.iterations
    );

    println!("\nMetrics:");
    println!("  Accuracy:  {:.4}", metrics.accuracy);
    println!("  Precision: {:.4}", metrics.precision);
    println!("  Recall:    {:.4}", metrics.recall);
    println!("  F1 score:  {:.4}", metrics.f1_score);
    if metrics.roc_auc.is_nan() {
        println!("  ROC AUC:   undefined (single-class test partition)");
    } else {
        println!("  ROC AUC:   {:.4}", metrics.roc_auc);
    }
}
