use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use super::Predictor;
use super::forest::ForestModel;
use super::linear::LinearModel;
use crate::error::PipelineError;

/// Where the trained model is looked up when nothing else is configured.
pub const DEFAULT_MODEL_PATH: &str = "air_quality_model.json";

/// Artifact layout version this build understands.
pub const FORMAT_VERSION: u32 = 1;

/// On-disk model artifact written by the external training job.
///
/// ```json
/// {
///   "format_version": 1,
///   "name": "aqi-linear-2024",
///   "model": { "kind": "linear", "features": ["PM2.5", "PM10"],
///              "coefficients": [1.0, 1.0], "intercept": 0.0 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    #[serde(default)]
    pub name: Option<String>,
    pub model: ModelSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    Linear(LinearModel),
    Forest(ForestModel),
}

impl ModelArtifact {
    fn from_json(text: &str) -> Result<Self> {
        let artifact: ModelArtifact = serde_json::from_str(text).context("parsing model JSON")?;
        if artifact.format_version != FORMAT_VERSION {
            bail!(
                "unsupported format_version {} (expected {FORMAT_VERSION})",
                artifact.format_version
            );
        }
        match &artifact.model {
            ModelSpec::Linear(m) => m.validate()?,
            ModelSpec::Forest(m) => m.validate()?,
        }
        Ok(artifact)
    }

    fn into_predictor(self) -> Box<dyn Predictor> {
        match self.model {
            ModelSpec::Linear(m) => Box::new(m),
            ModelSpec::Forest(m) => Box::new(m),
        }
    }
}

/// Deserialize the predictor stored at `path`.
///
/// A missing file is reported separately from a file that exists but cannot
/// be turned into a usable model.
pub fn load_predictor(path: &Path) -> Result<Box<dyn Predictor>, PipelineError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::warn!("Model artifact {} not found", path.display());
            return Err(PipelineError::ModelNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(PipelineError::ModelCorrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }
    };

    let artifact = ModelArtifact::from_json(&text).map_err(|e| {
        log::warn!("Rejected model artifact {}: {e:#}", path.display());
        PipelineError::ModelCorrupt {
            path: path.to_path_buf(),
            reason: format!("{e:#}"),
        }
    })?;

    log::info!(
        "Loaded {} model '{}' from {}",
        match artifact.model {
            ModelSpec::Linear(_) => "linear",
            ModelSpec::Forest(_) => "forest",
        },
        artifact.name.as_deref().unwrap_or("unnamed"),
        path.display()
    );
    Ok(artifact.into_predictor())
}
