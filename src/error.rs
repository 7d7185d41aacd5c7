//! Typed error kinds for the pipeline

use thiserror::Error;

/// Errors the pipeline can raise on its own behalf.
///
/// Row-level data problems (uncoercible values, duplicate identifiers) are
/// never errors; they are silent removals surfaced through
/// [`crate::CleaningReport`]. Likewise a trainer that runs out of iterations
/// is a valid result flagged via `converged` on the model, not an error.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required attribute is absent or cleaning removed every row.
    #[error("data error: {0}")]
    Data(String),

    /// A model or matrix was built against an incompatible feature schema.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// A hyperparameter or option is outside its valid range.
    #[error("config error: {0}")]
    Config(String),
}
