//! Regression tree.
//!
//! A CART-style tree grown with squared-error splits. Nodes live in a flat
//! arena and are stored in pre-order, so every child index is greater than
//! its parent's. Split search is deterministic: features are scanned in column
//! order and thresholds in ascending order, and only a strictly better split
//! replaces the current best.

use serde::{Deserialize, Serialize};

use super::{Predictor, Regressor};
use crate::error::{Error, Result};
use crate::table::{Dataset, FeatureTable};

/// Index of a node in [`FittedTree`]'s arena. The root is always 0.
pub type NodeId = usize;

/// Growth limits of a regression tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeRegressor {
    /// Maximum depth (root has depth 0). `None` grows until leaves are pure.
    pub max_depth: Option<usize>,
    /// Minimum number of samples a node needs to be considered for splitting.
    pub min_samples_split: usize,
    /// Minimum number of samples on each side of a split.
    pub min_samples_leaf: usize,
}

impl DecisionTreeRegressor {
    pub fn new() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
            ..Self::new()
        }
    }
}

impl Default for DecisionTreeRegressor {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Leaf {
        value: f64,
    },
    /// Rows with `x[feature] <= threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: NodeId,
        right: NodeId,
    },
}

/// A trained regression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedTree {
    feature_names: Vec<String>,
    nodes: Vec<Node>,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

struct Grower<'a> {
    params: &'a DecisionTreeRegressor,
    features: &'a FeatureTable,
    target: &'a [f64],
    nodes: Vec<Node>,
}

impl Grower<'_> {
    fn grow(&mut self, rows: Vec<usize>, depth: usize) -> NodeId {
        let id = self.nodes.len();
        let value = mean_of(self.target, &rows);
        self.nodes.push(Node::Leaf { value });

        let depth_reached = self.params.max_depth.is_some_and(|d| depth >= d);
        if depth_reached
            || rows.len() < self.params.min_samples_split
            || rows.len() < 2 * self.params.min_samples_leaf
        {
            return id;
        }

        let Some(split) = self.best_split(&rows) else {
            return id;
        };

        let left = self.grow(split.left, depth + 1);
        let right = self.grow(split.right, depth + 1);
        self.nodes[id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        id
    }

    fn best_split(&self, rows: &[usize]) -> Option<SplitCandidate> {
        let n = rows.len();
        let min_leaf = self.params.min_samples_leaf;
        let total_sum: f64 = rows.iter().map(|&r| self.target[r]).sum();
        // Maximizing sum_l^2/n_l + sum_r^2/n_r minimizes the children's squared error.
        let parent_score = total_sum * total_sum / n as f64;

        let mut best: Option<(usize, f64, f64)> = None; // (feature, threshold, score)
        let mut best_order: Vec<usize> = Vec::new();
        let mut best_cut = 0;

        for feature in 0..self.features.column_count() {
            let x = self.features.column_at(feature);
            let mut order = rows.to_vec();
            order.sort_by(|&a, &b| x[a].total_cmp(&x[b]));

            let mut left_sum = 0.0;
            for i in 0..n - 1 {
                left_sum += self.target[order[i]];
                let left_n = i + 1;
                let right_n = n - left_n;
                if left_n < min_leaf || right_n < min_leaf {
                    continue;
                }
                let (lo, hi) = (x[order[i]], x[order[i + 1]]);
                if lo == hi {
                    continue;
                }
                let right_sum = total_sum - left_sum;
                let score =
                    left_sum * left_sum / left_n as f64 + right_sum * right_sum / right_n as f64;
                let improves = score > parent_score + 1e-12 * parent_score.abs().max(1.0);
                let beats_best = best.is_none_or(|(_, _, s)| score > s);
                if improves && beats_best {
                    let mut threshold = lo + (hi - lo) / 2.0;
                    if threshold >= hi {
                        threshold = lo;
                    }
                    best = Some((feature, threshold, score));
                    best_cut = left_n;
                    best_order.clone_from(&order);
                }
            }
        }

        let (feature, threshold, _) = best?;
        let right = best_order.split_off(best_cut);
        Some(SplitCandidate {
            feature,
            threshold,
            left: best_order,
            right,
        })
    }
}

fn mean_of(values: &[f64], rows: &[usize]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    rows.iter().map(|&r| values[r]).sum::<f64>() / rows.len() as f64
}

impl Regressor for DecisionTreeRegressor {
    type Model = FittedTree;

    fn fit(&self, data: &Dataset) -> Result<FittedTree> {
        if self.min_samples_leaf == 0 || self.min_samples_split < 2 {
            return Err(Error::Model(format!(
                "invalid tree parameters: min_samples_split={}, min_samples_leaf={}",
                self.min_samples_split, self.min_samples_leaf
            )));
        }
        if data.row_count() == 0 {
            return Err(Error::EmptyTable);
        }
        if data.target.iter().any(|v| !v.is_finite()) {
            return Err(Error::Model(format!(
                "target `{}` contains non-finite values",
                data.target_name
            )));
        }
        for (idx, name) in data.features.names().iter().enumerate() {
            if data.features.column_at(idx).iter().any(|v| !v.is_finite()) {
                return Err(Error::Model(format!(
                    "feature `{name}` contains non-finite values"
                )));
            }
        }

        let mut grower = Grower {
            params: self,
            features: &data.features,
            target: &data.target,
            nodes: Vec::new(),
        };
        grower.grow((0..data.row_count()).collect(), 0);

        Ok(FittedTree {
            feature_names: data.features.names().to_vec(),
            nodes: grower.nodes,
        })
    }
}

impl FittedTree {
    /// Feature columns the tree was trained on, in training order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Depth of the deepest leaf (a single-leaf tree has depth 0).
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], id: NodeId) -> usize {
            match nodes[id] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, left).max(walk(nodes, right)),
            }
        }
        if self.nodes.is_empty() { 0 } else { walk(&self.nodes, 0) }
    }

    /// Checks arena consistency, e.g. after deserialization.
    pub fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(Error::Model("tree has no nodes".to_string()));
        }
        for (id, node) in self.nodes.iter().enumerate() {
            if let Node::Split {
                feature,
                left,
                right,
                threshold,
            } = *node
            {
                let children_ok = left > id
                    && right > id
                    && left < self.nodes.len()
                    && right < self.nodes.len();
                if !children_ok || feature >= self.feature_names.len() || threshold.is_nan() {
                    return Err(Error::Model(format!("malformed split node {id}")));
                }
            }
        }
        Ok(())
    }

    fn predict_row(&self, row: impl Fn(usize) -> f64) -> f64 {
        let mut id = 0;
        loop {
            match self.nodes[id] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if row(feature) <= threshold { left } else { right };
                }
            }
        }
    }
}

impl Predictor for FittedTree {
    fn predict(&self, features: &FeatureTable) -> Result<Vec<f64>> {
        if self.nodes.is_empty() {
            return Err(Error::Model("tree has no nodes".to_string()));
        }
        // Columns are matched by name, so column order in `features` does not matter.
        let columns = self
            .feature_names
            .iter()
            .map(|name| features.column(name))
            .collect::<Result<Vec<&[f64]>>>()?;

        Ok((0..features.row_count())
            .map(|row| self.predict_row(|f| columns[f][row]))
            .collect())
    }
}
