use std::path::PathBuf;

use thiserror::Error;

/// Failures of the upload → predict → export flow.
///
/// Every variant carries a message that is shown inline in the UI; none of
/// them is meant to terminate the application.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The uploaded content is not valid delimited text.
    #[error("Could not read the uploaded file: {0}")]
    Parse(String),

    #[error("Model file not found: '{}'. Please add the trained model artifact.", .path.display())]
    ModelNotFound { path: PathBuf },

    #[error("Model file '{}' could not be loaded: {reason}", .path.display())]
    ModelCorrupt { path: PathBuf, reason: String },

    #[error("Prediction failed: {0}")]
    Prediction(String),

    #[error("Export failed: {0}")]
    Export(String),
}

impl PipelineError {
    /// Model problems block prediction until the artifact is fixed externally.
    pub fn is_model_error(&self) -> bool {
        matches!(
            self,
            PipelineError::ModelNotFound { .. } | PipelineError::ModelCorrupt { .. }
        )
    }
}
