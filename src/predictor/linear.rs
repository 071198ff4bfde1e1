use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use super::{Predictor, check_unique_features, feature_matrix};
use crate::data::model::DataTable;

/// Ordinary least-squares style model: `y = intercept + Σ coef_i * x_i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    /// Feature names in training order.
    pub features: Vec<String>,
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl LinearModel {
    /// Structural checks run once after deserialization.
    pub fn validate(&self) -> Result<()> {
        if self.features.is_empty() {
            bail!("linear model has no features");
        }
        check_unique_features(&self.features)?;
        if self.features.len() != self.coefficients.len() {
            bail!(
                "linear model has {} features but {} coefficients",
                self.features.len(),
                self.coefficients.len()
            );
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            bail!("linear model parameters must be finite");
        }
        Ok(())
    }
}

impl Predictor for LinearModel {
    fn predict(&self, features: &DataTable) -> Result<Vec<f64>> {
        let rows = feature_matrix(features, &self.features)?;
        Ok(rows
            .iter()
            .map(|x| {
                self.intercept
                    + x.iter()
                        .zip(&self.coefficients)
                        .map(|(xi, ci)| xi * ci)
                        .sum::<f64>()
            })
            .collect())
    }
}
