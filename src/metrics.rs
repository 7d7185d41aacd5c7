//! Model evaluation: confusion-matrix metrics and the ROC curve

use crate::encode::FeatureMatrix;
use crate::error::PipelineError;
use crate::model::LogisticModel;
use ndarray::Array1;
use serde::Serialize;

/// Counts of prediction outcomes at the 0.5 threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
}

impl ConfusionMatrix {
    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }
}

/// Scalar quality metrics, each in [0, 1].
///
/// `roc_auc` is NaN when the test partition contains only one class; the
/// others fall back to 0 when their denominator is 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub roc_auc: f64,
}

/// One point of the ROC curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RocPoint {
    pub false_positive_rate: f64,
    pub true_positive_rate: f64,
    /// Decision threshold; predicted positive means probability >= threshold
    pub threshold: f64,
}

/// The ROC curve, thresholds strictly decreasing from +inf.
///
/// Starts at (0, 0) and, whenever both classes are present, ends at (1, 1)
/// once the smallest predicted probability has been swept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RocCurve {
    pub points: Vec<RocPoint>,
}

impl RocCurve {
    /// Area under the curve by trapezoidal integration over the
    /// false-positive rate.
    pub fn area_under(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| {
                (w[1].false_positive_rate - w[0].false_positive_rate)
                    * (w[1].true_positive_rate + w[0].true_positive_rate)
                    / 2.0
            })
            .sum()
    }
}

/// Score a fitted model against a held-out feature matrix.
///
/// Fails with a schema mismatch if the matrix width disagrees with the
/// schema the model was trained against.
pub fn evaluate(
    model: &LogisticModel,
    test: &FeatureMatrix,
) -> crate::Result<(Metrics, RocCurve)> {
    if test.features.ncols() != model.schema.len() {
        return Err(PipelineError::SchemaMismatch(format!(
            "test matrix has {} columns for {} schema columns",
            test.features.ncols(),
            model.schema.len()
        ))
        .into());
    }

    let probabilities = model.predict_probabilities(&test.features);
    let confusion = confusion_matrix(&test.labels, &probabilities);

    let accuracy = rate(
        confusion.true_positive + confusion.true_negative,
        confusion.total(),
    );
    let precision = rate(
        confusion.true_positive,
        confusion.true_positive + confusion.false_positive,
    );
    let recall = rate(
        confusion.true_positive,
        confusion.true_positive + confusion.false_negative,
    );
    let f1_score = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };

    let positives = test.labels.iter().filter(|&&y| y == 1.0).count();
    let negatives = test.labels.len() - positives;
    let curve = roc_curve(&test.labels, &probabilities);
    // AUC is undefined with a single class; report a sentinel, not an error
    let roc_auc = if positives == 0 || negatives == 0 {
        f64::NAN
    } else {
        curve.area_under()
    };

    Ok((
        Metrics {
            accuracy,
            precision,
            recall,
            f1_score,
            roc_auc,
        },
        curve,
    ))
}

/// Confusion matrix of hard labels at the 0.5 threshold.
pub fn confusion_matrix(labels: &Array1<f64>, probabilities: &Array1<f64>) -> ConfusionMatrix {
    let mut confusion = ConfusionMatrix {
        true_positive: 0,
        false_positive: 0,
        true_negative: 0,
        false_negative: 0,
    };
    for (&label, &p) in labels.iter().zip(probabilities.iter()) {
        let predicted_positive = p >= 0.5;
        match (label == 1.0, predicted_positive) {
            (true, true) => confusion.true_positive += 1,
            (false, true) => confusion.false_positive += 1,
            (false, false) => confusion.true_negative += 1,
            (true, false) => confusion.false_negative += 1,
        }
    }
    confusion
}

/// Sweep every distinct predicted probability as a decision threshold,
/// highest first, accumulating true/false-positive rates against the fixed
/// ground truth.
fn roc_curve(labels: &Array1<f64>, probabilities: &Array1<f64>) -> RocCurve {
    let positives = labels.iter().filter(|&&y| y == 1.0).count();
    let negatives = labels.len() - positives;

    let mut pairs: Vec<(f64, f64)> = probabilities
        .iter()
        .copied()
        .zip(labels.iter().copied())
        .collect();
    pairs.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut points = vec![RocPoint {
        false_positive_rate: 0.0,
        true_positive_rate: 0.0,
        threshold: f64::INFINITY,
    }];

    let mut true_positive = 0usize;
    let mut false_positive = 0usize;
    let mut i = 0;
    while i < pairs.len() {
        let threshold = pairs[i].0;
        // Consume every sample tied at this probability before emitting
        while i < pairs.len() && pairs[i].0 == threshold {
            if pairs[i].1 == 1.0 {
                true_positive += 1;
            } else {
                false_positive += 1;
            }
            i += 1;
        }
        points.push(RocPoint {
            false_positive_rate: rate(false_positive, negatives),
            true_positive_rate: rate(true_positive, positives),
            threshold,
        });
    }

    RocCurve { points }
}

fn rate(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
