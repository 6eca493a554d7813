//! Pre-fitted estimators over a dense feature vector.
//!
//! Linear estimators are evaluated with `nalgebra`; tree ensembles walk
//! recursive split/leaf nodes where `x[feature] <= threshold` goes left.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Internal split of a regression/probability tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    pub feature: usize,
    pub threshold: f64,
    pub left: Box<TreeNode>,
    pub right: Box<TreeNode>,
}

/// A node in a decision tree (either a split or a leaf value).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Split(Split),
    Leaf { value: f64 },
}

impl TreeNode {
    pub fn leaf(value: f64) -> Self {
        TreeNode::Leaf { value }
    }

    pub fn split(feature: usize, threshold: f64, left: TreeNode, right: TreeNode) -> Self {
        TreeNode::Split(Split {
            feature,
            threshold,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Leaf value reached by `x`.
    pub fn evaluate(&self, x: &[f64]) -> Result<f64, ModelError> {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { value } => return Ok(*value),
                TreeNode::Split(split) => {
                    let v = x.get(split.feature).ok_or(ModelError::FeatureIndex {
                        index: split.feature,
                        width: x.len(),
                    })?;
                    node = if *v <= split.threshold { &*split.left } else { &*split.right };
                }
            }
        }
    }

    /// Largest feature index referenced anywhere in the tree.
    pub fn max_feature(&self) -> Option<usize> {
        match self {
            TreeNode::Leaf { .. } => None,
            TreeNode::Split(split) => {
                let below = split.left.max_feature().max(split.right.max_feature());
                Some(below.map_or(split.feature, |m| m.max(split.feature)))
            }
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split(split) => 1 + split.left.depth().max(split.right.depth()),
        }
    }
}

/// Estimator kinds understood by the artifact format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Estimator {
    /// `intercept + w·x`.
    Linear { coefficients: Vec<f64>, intercept: f64 },
    /// Binary logistic classifier; label is `p >= threshold`.
    Logistic {
        coefficients: Vec<f64>,
        intercept: f64,
        #[serde(default = "default_threshold")]
        threshold: f64,
    },
    /// Binary classifier from the sign of `intercept + w·x` (no probability output).
    Margin { coefficients: Vec<f64>, intercept: f64 },
    /// Random forest regressor: mean of tree outputs.
    Forest { trees: Vec<TreeNode> },
    /// Gradient-boosted regressor: `base_score + Σ tree outputs`.
    Boosted {
        #[serde(default)]
        base_score: f64,
        trees: Vec<TreeNode>,
    },
    /// Random forest classifier: leaves hold the positive-class fraction.
    ForestClassifier { trees: Vec<TreeNode> },
}

fn default_threshold() -> f64 {
    0.5
}

impl Estimator {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Estimator::Linear { .. } => "linear",
            Estimator::Logistic { .. } => "logistic",
            Estimator::Margin { .. } => "margin",
            Estimator::Forest { .. } => "forest",
            Estimator::Boosted { .. } => "boosted",
            Estimator::ForestClassifier { .. } => "forest_classifier",
        }
    }

    pub fn has_probability(&self) -> bool {
        matches!(self, Estimator::Logistic { .. } | Estimator::ForestClassifier { .. })
    }

    /// Check the estimator against the width of the encoded input.
    pub fn validate(&self, input_width: usize) -> Result<(), String> {
        match self {
            Estimator::Linear { coefficients, intercept }
            | Estimator::Logistic {
                coefficients,
                intercept,
                ..
            }
            | Estimator::Margin { coefficients, intercept } => {
                if coefficients.len() != input_width {
                    return Err(format!(
                        "{} estimator has {} coefficients but the feature encoding produces {input_width} columns",
                        self.kind_name(),
                        coefficients.len()
                    ));
                }
                if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                    return Err(format!("{} estimator has non-finite parameters", self.kind_name()));
                }
            }
            Estimator::Forest { trees }
            | Estimator::Boosted { trees, .. }
            | Estimator::ForestClassifier { trees } => {
                if trees.is_empty() {
                    return Err(format!("{} estimator has no trees", self.kind_name()));
                }
                if let Some(max) = trees.iter().filter_map(TreeNode::max_feature).max() {
                    if max >= input_width {
                        return Err(format!(
                            "tree split on feature {max} but the feature encoding produces {input_width} columns"
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Regression value or class label (0/1) for one encoded row.
    pub fn predict(&self, x: &[f64]) -> Result<f64, ModelError> {
        let y = match self {
            Estimator::Linear { coefficients, intercept } => linear_score(coefficients, *intercept, x)?,
            Estimator::Logistic { threshold, .. } => {
                let p = self.predict_probability(x)?;
                if p >= *threshold { 1.0 } else { 0.0 }
            }
            Estimator::Margin { coefficients, intercept } => {
                if linear_score(coefficients, *intercept, x)? > 0.0 { 1.0 } else { 0.0 }
            }
            Estimator::Forest { trees } => tree_mean(trees, x, "forest")?,
            Estimator::Boosted { base_score, trees } => {
                let mut sum = *base_score;
                for tree in trees {
                    sum += tree.evaluate(x)?;
                }
                sum
            }
            Estimator::ForestClassifier { .. } => {
                if self.predict_probability(x)? >= 0.5 { 1.0 } else { 0.0 }
            }
        };

        if y.is_finite() { Ok(y) } else { Err(ModelError::NonFinite) }
    }

    /// Positive-class probability for one encoded row.
    pub fn predict_probability(&self, x: &[f64]) -> Result<f64, ModelError> {
        let p = match self {
            Estimator::Logistic {
                coefficients, intercept, ..
            } => sigmoid(linear_score(coefficients, *intercept, x)?),
            Estimator::ForestClassifier { trees } => {
                tree_mean(trees, x, "forest_classifier")?.clamp(0.0, 1.0)
            }
            _ => return Err(ModelError::NoProbability(self.kind_name())),
        };

        if p.is_finite() { Ok(p) } else { Err(ModelError::NonFinite) }
    }
}

fn linear_score(coefficients: &[f64], intercept: f64, x: &[f64]) -> Result<f64, ModelError> {
    if coefficients.len() != x.len() {
        return Err(ModelError::Shape {
            expected: coefficients.len(),
            actual: x.len(),
        });
    }
    let w = DVector::from_column_slice(coefficients);
    let x = DVector::from_column_slice(x);
    Ok(intercept + w.dot(&x))
}

fn tree_mean(trees: &[TreeNode], x: &[f64], kind: &'static str) -> Result<f64, ModelError> {
    if trees.is_empty() {
        return Err(ModelError::EmptyEnsemble(kind));
    }
    let mut sum = 0.0;
    for tree in trees {
        sum += tree.evaluate(x)?;
    }
    Ok(sum / trees.len() as f64)
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
