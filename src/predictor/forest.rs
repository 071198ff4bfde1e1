use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use super::{Predictor, check_unique_features, feature_matrix};
use crate::data::model::DataTable;

/// One node of a regression tree stored as a flat array.
///
/// Children are referenced by index and must point forward, so every tree is
/// acyclic and evaluation always terminates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        leaf: f64,
    },
}

/// How per-tree outputs are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Random forest: average of the trees.
    #[default]
    Mean,
    /// Gradient boosting: sum of the trees.
    Sum,
}

/// An ensemble of regression trees (random forest or boosted trees).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    pub features: Vec<String>,
    pub trees: Vec<Vec<Node>>,
    #[serde(default)]
    pub aggregation: Aggregation,
    /// Added to the aggregated tree output.
    #[serde(default)]
    pub base_score: f64,
}

impl ForestModel {
    pub fn validate(&self) -> Result<()> {
        if self.features.is_empty() {
            bail!("forest model has no features");
        }
        check_unique_features(&self.features)?;
        if self.trees.is_empty() {
            bail!("forest model has no trees");
        }
        if !self.base_score.is_finite() {
            bail!("base_score must be finite");
        }
        for (t, tree) in self.trees.iter().enumerate() {
            if tree.is_empty() {
                bail!("tree {t} has no nodes");
            }
            for (i, node) in tree.iter().enumerate() {
                match node {
                    Node::Leaf { leaf } if !leaf.is_finite() => {
                        bail!("tree {t}, node {i}: leaf value must be finite")
                    }
                    Node::Leaf { .. } => {}
                    Node::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        if *feature >= self.features.len() {
                            bail!("tree {t}, node {i}: feature index {feature} out of range");
                        }
                        if threshold.is_nan() {
                            bail!("tree {t}, node {i}: threshold is NaN");
                        }
                        for child in [left, right] {
                            if *child <= i || *child >= tree.len() {
                                bail!("tree {t}, node {i}: child index {child} is invalid");
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn eval_tree(tree: &[Node], x: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &tree[idx] {
                Node::Leaf { leaf } => return *leaf,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

impl Predictor for ForestModel {
    fn predict(&self, features: &DataTable) -> Result<Vec<f64>> {
        let rows = feature_matrix(features, &self.features)?;
        let n_trees = self.trees.len() as f64;
        Ok(rows
            .iter()
            .map(|x| {
                let total: f64 = self.trees.iter().map(|t| Self::eval_tree(t, x)).sum();
                let combined = match self.aggregation {
                    Aggregation::Mean => total / n_trees,
                    Aggregation::Sum => total,
                };
                self.base_score + combined
            })
            .collect())
    }
}
