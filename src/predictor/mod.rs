//! Trained-model adapters.
//!
//! The rest of the application only sees [`Predictor`]: one batch `predict`
//! call from a feature table to one number per row.  How a model is stored
//! and evaluated stays inside this module.

pub mod artifact;
pub mod forest;
pub mod linear;

use std::collections::HashSet;

use anyhow::{Result, bail};

use crate::data::model::{CellValue, DataTable};

pub use artifact::{DEFAULT_MODEL_PATH, load_predictor};

/// An externally trained regression model.
pub trait Predictor {
    /// One prediction per row of `features`, in row order.
    ///
    /// Implementations validate that `features` matches the columns they
    /// were trained on and report mismatches as errors.
    fn predict(&self, features: &DataTable) -> Result<Vec<f64>>;
}

impl<F> Predictor for F
where
    F: Fn(&DataTable) -> Result<Vec<f64>>,
{
    fn predict(&self, features: &DataTable) -> Result<Vec<f64>> {
        self(features)
    }
}

/// Fails when a trained feature name appears more than once.
pub(crate) fn check_unique_features(features: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(features.len());
    for name in features {
        if !seen.insert(name.as_str()) {
            bail!("feature '{name}' is listed more than once");
        }
    }
    Ok(())
}

/// Row-major numeric matrix of `expected` columns, in model order.
///
/// Errors mirror scikit-learn's input checks: wrong feature count, unknown
/// or missing feature names, missing values, and non-numeric cells.
pub(crate) fn feature_matrix(features: &DataTable, expected: &[String]) -> Result<Vec<Vec<f64>>> {
    if features.n_columns() != expected.len() {
        bail!(
            "X has {} features, but the model is expecting {} features as input",
            features.n_columns(),
            expected.len()
        );
    }

    let names = features.column_names();
    let missing: Vec<&str> = expected
        .iter()
        .map(String::as_str)
        .filter(|e| !names.contains(e))
        .collect();
    if !missing.is_empty() {
        let unseen: Vec<&str> = names
            .iter()
            .copied()
            .filter(|n| !expected.iter().any(|e| e.as_str() == *n))
            .collect();
        bail!(
            "the feature names should match those that were passed during fit; \
             unseen at fit time: {unseen:?}; seen at fit time, yet now missing: {missing:?}"
        );
    }

    let mut rows = vec![Vec::with_capacity(expected.len()); features.len()];
    for name in expected {
        // Presence checked above.
        let Some(series) = features.column(name) else {
            continue;
        };
        for (row, cell) in series.values.iter().enumerate() {
            let x = match cell {
                CellValue::Integer(i) => *i as f64,
                CellValue::Float(v) if v.is_finite() => *v,
                CellValue::Float(v) => bail!("input contains {v} in column '{name}' at row {row}"),
                CellValue::Bool(b) => f64::from(u8::from(*b)),
                CellValue::Null => bail!("input contains NaN in column '{name}' at row {row}"),
                CellValue::Text(s) => {
                    bail!("could not convert string to float: '{s}' (column '{name}', row {row})")
                }
            };
            rows[row].push(x);
        }
    }
    Ok(rows)
}
