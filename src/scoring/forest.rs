//! Random forest of binary decision trees in flattened array form
//!
//! Node `i` is a leaf when `children_left[i] == -1`. Internal nodes send a row
//! left when `x[feature[i]] <= threshold[i]`. Leaves carry per-class weights
//! `[negative, positive]`.

use serde::{Deserialize, Serialize};

use crate::error::{ChurnError, ErrorCode, Result};

use super::Classifier;

const LEAF: i64 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<[f64; 2]>,
}

impl DecisionTree {
    fn node_count(&self) -> usize {
        self.children_left.len()
    }

    fn validate(&self, n_features: usize) -> std::result::Result<(), String> {
        let n = self.node_count();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|len| *len != n)
        {
            return Err("node arrays have different lengths".to_string());
        }

        for node in 0..n {
            let left = self.children_left[node];
            let right = self.children_right[node];
            if left == LEAF {
                if right != LEAF {
                    return Err(format!("node {} has only one child", node));
                }
                let [neg, pos] = self.value[node];
                if !(neg.is_finite() && pos.is_finite()) || neg < 0.0 || pos < 0.0 {
                    return Err(format!("leaf {} has invalid class weights", node));
                }
                if neg + pos <= 0.0 {
                    return Err(format!("leaf {} has zero total weight", node));
                }
                continue;
            }

            // children always come after their parent, which rules out cycles
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(format!("node {} points at invalid child {}", node, child));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature >= n_features as i64 {
                return Err(format!(
                    "node {} splits on feature {} outside 0..{}",
                    node, feature, n_features
                ));
            }
            if !self.threshold[node].is_finite() {
                return Err(format!("node {} has a non-finite threshold", node));
            }
        }
        Ok(())
    }

    /// Positive-class fraction of the leaf `features` lands in.
    ///
    /// Every index is checked and the walk is bounded by the node count, so a
    /// forest that skipped [`RandomForest::validate`] fails instead of panicking
    /// or looping.
    fn leaf_probability(&self, features: &[f64]) -> Result<f64> {
        let mut node = 0usize;
        for _ in 0..=self.node_count() {
            let left = *self
                .children_left
                .get(node)
                .ok_or_else(|| malformed(format!("node {} does not exist", node)))?;

            if left == LEAF {
                let [neg, pos] = *self
                    .value
                    .get(node)
                    .ok_or_else(|| malformed(format!("leaf {} has no class weights", node)))?;
                let total = neg + pos;
                if !(total.is_finite() && total > 0.0) {
                    return Err(malformed(format!("leaf {} has invalid class weights", node)));
                }
                return Ok(pos / total);
            }

            let x = self
                .feature
                .get(node)
                .and_then(|split| usize::try_from(*split).ok())
                .and_then(|split| features.get(split))
                .ok_or_else(|| malformed(format!("node {} splits on a missing feature", node)))?;
            let threshold = self
                .threshold
                .get(node)
                .ok_or_else(|| malformed(format!("node {} has no threshold", node)))?;

            let next = if x <= threshold {
                left
            } else {
                *self
                    .children_right
                    .get(node)
                    .ok_or_else(|| malformed(format!("node {} has no right child", node)))?
            };
            node = usize::try_from(next)
                .map_err(|_| malformed(format!("node {} points at child {}", node, next)))?;
        }
        Err(malformed("tree walk did not reach a leaf".to_string()))
    }
}

fn malformed(message: String) -> ChurnError {
    ChurnError::scoring(ErrorCode::SCORING_MALFORMED_MODEL, message)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Structural checks applied when the artifact is loaded.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.n_features == 0 {
            return Err("forest declares zero input features".to_string());
        }
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features)
                .map_err(|reason| format!("tree {}: {}", i, reason))?;
        }
        Ok(())
    }

    fn check_width(&self, features: &[f64]) -> Result<()> {
        if features.len() != self.n_features {
            return Err(ChurnError::scoring(
                ErrorCode::SCORING_WIDTH_MISMATCH,
                format!(
                    "forest expects {} features, got {}",
                    self.n_features,
                    features.len()
                ),
            ));
        }
        Ok(())
    }

    fn mean_positive(&self, features: &[f64]) -> Result<f64> {
        if self.trees.is_empty() {
            return Err(malformed("forest has no trees".to_string()));
        }
        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.leaf_probability(features)?;
        }
        Ok(total / self.trees.len() as f64)
    }
}

impl Classifier for RandomForest {
    fn kind(&self) -> &'static str {
        "random_forest"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    /// Argmax of the averaged class distribution; ties go to the negative class.
    fn predict_label(&self, features: &[f64]) -> Result<u8> {
        let positive = self.predict_probability(features)?;
        Ok(u8::from(positive > 1.0 - positive))
    }

    fn predict_probability(&self, features: &[f64]) -> Result<f64> {
        self.check_width(features)?;
        self.mean_positive(features)
    }
}
