//! Regularized logistic regression trained from scratch

use crate::encode::{FeatureMatrix, FeatureSchema};
use crate::error::PipelineError;
use ndarray::{s, Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// Parameter-update magnitude below which the solver is considered stable.
pub const CONVERGENCE_TOLERANCE: f64 = 1e-6;

const MODEL_FORMAT_TAG: &str = "churnforge.logistic-model";
const MODEL_FORMAT_VERSION: u32 = 1;

/// Training hyperparameters, constructed once and passed by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// Iteration cap for the solver
    pub max_iterations: usize,
    /// Inverse of the L2 penalty weight (sklearn's `C`)
    pub regularization_strength: f64,
}

impl Hyperparameters {
    pub fn validate(&self) -> crate::Result<()> {
        if self.max_iterations == 0 {
            return Err(
                PipelineError::Config("max_iterations must be positive".to_string()).into(),
            );
        }
        if !(self.regularization_strength > 0.0) {
            return Err(PipelineError::Config(format!(
                "regularization_strength must be positive, got {}",
                self.regularization_strength
            ))
            .into());
        }
        Ok(())
    }
}

/// A fitted binary classifier: `p(x) = sigmoid(w . x + b)`.
///
/// Immutable once produced by [`fit`]. The feature schema it was trained
/// against and the hyperparameters used are carried along for provenance;
/// `converged` reports whether the solver stopped on tolerance rather than
/// on the iteration cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub weights: Array1<f64>,
    pub bias: f64,
    pub schema: FeatureSchema,
    pub hyperparameters: Hyperparameters,
    pub converged: bool,
    pub iterations: usize,
}

impl LogisticModel {
    /// Predicted churn probability for a single feature vector.
    pub fn predict_probability(&self, x: ArrayView1<f64>) -> f64 {
        sigmoid(self.weights.dot(&x) + self.bias)
    }

    /// Hard 0/1 label at the 0.5 threshold.
    pub fn predict(&self, x: ArrayView1<f64>) -> u8 {
        u8::from(self.predict_probability(x) >= 0.5)
    }

    /// Predicted probabilities for every row of a feature matrix.
    pub fn predict_probabilities(&self, features: &Array2<f64>) -> Array1<f64> {
        (features.dot(&self.weights) + self.bias).mapv(sigmoid)
    }

    /// Reject any schema that differs from the one the model was trained
    /// against. Names and order must match exactly; equal length alone is
    /// not compatibility.
    pub fn check_schema(&self, schema: &FeatureSchema) -> crate::Result<()> {
        if self.schema.column_names() != schema.column_names() {
            return Err(PipelineError::SchemaMismatch(format!(
                "model was trained against columns {:?}, got {:?}",
                self.schema.column_names(),
                schema.column_names()
            ))
            .into());
        }
        Ok(())
    }

    /// Serialize into a tagged, versioned JSON envelope with the feature
    /// schema inline.
    pub fn to_bytes(&self) -> crate::Result<Vec<u8>> {
        let envelope = ModelEnvelope {
            format: MODEL_FORMAT_TAG.to_string(),
            version: MODEL_FORMAT_VERSION,
            model: self.clone(),
        };
        Ok(serde_json::to_vec_pretty(&envelope)?)
    }

    /// Restore a model from [`LogisticModel::to_bytes`] output, validating
    /// compatibility before any prediction can be attempted.
    pub fn from_bytes(bytes: &[u8]) -> crate::Result<LogisticModel> {
        let envelope: ModelEnvelope = serde_json::from_slice(bytes).map_err(|e| {
            PipelineError::SchemaMismatch(format!("unreadable model artifact: {}", e))
        })?;
        if envelope.format != MODEL_FORMAT_TAG {
            return Err(PipelineError::SchemaMismatch(format!(
                "unknown artifact format tag '{}'",
                envelope.format
            ))
            .into());
        }
        if envelope.version != MODEL_FORMAT_VERSION {
            return Err(PipelineError::SchemaMismatch(format!(
                "unsupported artifact version {}",
                envelope.version
            ))
            .into());
        }
        let model = envelope.model;
        if model.weights.len() != model.schema.len() {
            return Err(PipelineError::SchemaMismatch(format!(
                "artifact has {} weights for {} schema columns",
                model.weights.len(),
                model.schema.len()
            ))
            .into());
        }
        Ok(model)
    }
}

#[derive(Serialize, Deserialize)]
struct ModelEnvelope {
    format: String,
    version: u32,
    model: LogisticModel,
}

/// Fit a logistic regression on a training matrix.
///
/// Minimizes the L2-regularized negative log-likelihood
/// `L(w, b) = -sum(y ln p + (1 - y) ln(1 - p)) + lambda * |w|^2` with
/// `lambda = 1 / (2 * C * n)`; the bias is not penalized. The solver is
/// Newton/IRLS: each iteration solves the full Newton system for (w, b)
/// and stops once the step's L2 norm falls below
/// [`CONVERGENCE_TOLERANCE`] or the iteration cap is reached. Exhausting
/// the cap is not an error; the best iterate is returned with
/// `converged = false`. Weights and bias start at zero, so the result is
/// fully determined by the training data and hyperparameters.
pub fn fit(
    train: &FeatureMatrix,
    schema: &FeatureSchema,
    hyperparameters: &Hyperparameters,
) -> crate::Result<LogisticModel> {
    hyperparameters.validate()?;

    let n = train.n_rows();
    let d = train.features.ncols();
    if d != schema.len() {
        return Err(PipelineError::SchemaMismatch(format!(
            "training matrix has {} columns for {} schema columns",
            d,
            schema.len()
        ))
        .into());
    }
    if n == 0 {
        return Err(PipelineError::Data("cannot train on an empty matrix".to_string()).into());
    }

    let lambda = 1.0 / (2.0 * hyperparameters.regularization_strength * n as f64);

    let x = &train.features;
    let y = &train.labels;
    let mut weights = Array1::<f64>::zeros(d);
    let mut bias = 0.0;
    let mut converged = false;
    let mut iterations = 0;

    for _ in 0..hyperparameters.max_iterations {
        let probs = (x.dot(&weights) + bias).mapv(sigmoid);
        let residual = &probs - y;

        // Gradient of L over (w, b)
        let grad_w = x.t().dot(&residual) + &weights * (2.0 * lambda);
        let grad_b = residual.sum();
        let mut gradient = Array1::<f64>::zeros(d + 1);
        gradient.slice_mut(s![..d]).assign(&grad_w);
        gradient[d] = grad_b;

        // Hessian of L over (w, b); the sigmoid variance is floored so a
        // saturated fit on separable data keeps the system solvable
        let variance = probs.mapv(|p| (p * (1.0 - p)).max(1e-10));
        let weighted = x * &variance.view().insert_axis(Axis(1));
        let mut hessian = Array2::<f64>::zeros((d + 1, d + 1));
        hessian.slice_mut(s![..d, ..d]).assign(&x.t().dot(&weighted));
        let cross = x.t().dot(&variance);
        hessian.slice_mut(s![..d, d]).assign(&cross);
        hessian.slice_mut(s![d, ..d]).assign(&cross);
        hessian[[d, d]] = variance.sum();
        for j in 0..d {
            hessian[[j, j]] += 2.0 * lambda;
        }

        let step = match solve_linear(hessian, gradient) {
            Some(step) => step,
            // Singular system: keep the best iterate found so far
            None => break,
        };

        weights = &weights - &step.slice(s![..d]);
        bias -= step[d];
        iterations += 1;

        if step.dot(&step).sqrt() < CONVERGENCE_TOLERANCE {
            converged = true;
            break;
        }
    }

    Ok(LogisticModel {
        weights,
        bias,
        schema: schema.clone(),
        hyperparameters: hyperparameters.clone(),
        converged,
        iterations,
    })
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Solve `a * x = rhs` by Gaussian elimination with partial pivoting.
/// Returns `None` when the system is singular.
fn solve_linear(mut a: Array2<f64>, mut rhs: Array1<f64>) -> Option<Array1<f64>> {
    let m = rhs.len();

    for col in 0..m {
        let pivot = (col..m)
            .max_by(|&r, &s| a[[r, col]].abs().total_cmp(&a[[s, col]].abs()))
            .unwrap_or(col);
        if a[[pivot, col]].abs() < 1e-12 {
            return None;
        }
        if pivot != col {
            for c in 0..m {
                let tmp = a[[col, c]];
                a[[col, c]] = a[[pivot, c]];
                a[[pivot, c]] = tmp;
            }
            rhs.swap(col, pivot);
        }

        for row in (col + 1)..m {
            let factor = a[[row, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for c in col..m {
                a[[row, c]] -= factor * a[[col, c]];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    // Back substitution
    let mut x = Array1::<f64>::zeros(m);
    for row in (0..m).rev() {
        let mut sum = rhs[row];
        for c in (row + 1)..m {
            sum -= a[[row, c]] * x[c];
        }
        x[row] = sum / a[[row, row]];
    }
    Some(x)
}
