//! Random forest of Gini decision trees.
//!
//! Each tree is fitted on a bootstrap sample with its own RNG seeded from
//! `seed + tree_index`, so the forest is identical however rayon schedules
//! the trees.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::matrix::Matrix;
use crate::error::{Result, RoadriskError};

/// A node in a decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    /// Class distribution of the training samples that reached the leaf.
    Leaf { distribution: Vec<f64> },
    /// Samples with `x[feature] <= threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    /// Depth of the subtree; a leaf has depth 0.
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn leaf_for(&self, x: &[f64]) -> &[f64] {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { distribution } => return distribution,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if x[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }
}

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Candidate features examined per split (at least this many, more if
    /// none of them yields a valid partition).
    pub max_features: usize,
}

/// A fitted classification tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    root: TreeNode,
}

impl DecisionTree {
    /// Fit a tree on the rows listed in `samples` (duplicates allowed).
    pub fn fit(
        x: &Matrix,
        y: &[usize],
        n_classes: usize,
        samples: Vec<usize>,
        params: &TreeParams,
        rng: &mut fastrand::Rng,
    ) -> Self {
        let builder = TreeBuilder {
            x,
            y,
            n_classes,
            params,
        };
        Self {
            root: builder.build(samples, 0, rng),
        }
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn predict_proba(&self, x: &[f64]) -> &[f64] {
        self.root.leaf_for(x)
    }
}

struct TreeBuilder<'a> {
    x: &'a Matrix,
    y: &'a [usize],
    n_classes: usize,
    params: &'a TreeParams,
}

impl TreeBuilder<'_> {
    fn build(&self, samples: Vec<usize>, depth: usize, rng: &mut fastrand::Rng) -> TreeNode {
        let counts = self.class_counts(&samples);
        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let depth_reached = self.params.max_depth.is_some_and(|max| depth >= max);

        if pure || depth_reached || samples.len() < self.params.min_samples_split {
            return leaf(&counts);
        }

        let Some((feature, threshold)) = self.best_split(&samples, rng) else {
            return leaf(&counts);
        };

        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&i| self.x.get(i, feature) <= threshold);

        TreeNode::Split {
            feature,
            threshold,
            left: Box::new(self.build(left, depth + 1, rng)),
            right: Box::new(self.build(right, depth + 1, rng)),
        }
    }

    fn class_counts(&self, samples: &[usize]) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes];
        for &i in samples {
            counts[self.y[i]] += 1;
        }
        counts
    }

    /// Lowest weighted Gini split over a random feature subset.
    fn best_split(&self, samples: &[usize], rng: &mut fastrand::Rng) -> Option<(usize, f64)> {
        let mut features: Vec<usize> = (0..self.x.n_cols()).collect();
        rng.shuffle(&mut features);

        let mut best: Option<(usize, f64, f64)> = None;
        for (examined, &feature) in features.iter().enumerate() {
            if examined >= self.params.max_features && best.is_some() {
                break;
            }
            if let Some((threshold, impurity)) = self.best_threshold(samples, feature) {
                if best.is_none_or(|(_, _, b)| impurity < b) {
                    best = Some((feature, threshold, impurity));
                }
            }
        }

        best.map(|(feature, threshold, _)| (feature, threshold))
    }

    /// Best midpoint threshold for one feature, with its weighted Gini.
    fn best_threshold(&self, samples: &[usize], feature: usize) -> Option<(f64, f64)> {
        let mut pairs: Vec<(f64, usize)> = samples
            .iter()
            .map(|&i| (self.x.get(i, feature), self.y[i]))
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let first = pairs.first()?.0;
        let last = pairs.last()?.0;
        if first == last {
            return None;
        }

        let n = pairs.len();
        let mut right = vec![0usize; self.n_classes];
        for &(_, label) in &pairs {
            right[label] += 1;
        }
        let mut left = vec![0usize; self.n_classes];

        let mut best: Option<(f64, f64)> = None;
        for k in 0..n - 1 {
            let (value, label) = pairs[k];
            left[label] += 1;
            right[label] -= 1;

            let next = pairs[k + 1].0;
            if next == value {
                continue;
            }

            let n_left = (k + 1) as f64;
            let n_right = (n - k - 1) as f64;
            let impurity =
                (n_left * gini(&left, n_left) + n_right * gini(&right, n_right)) / n as f64;
            if best.is_none_or(|(_, b)| impurity < b) {
                best = Some(((value + next) / 2.0, impurity));
            }
        }

        best
    }
}

fn gini(counts: &[usize], total: f64) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

fn leaf(counts: &[usize]) -> TreeNode {
    let total: usize = counts.iter().sum();
    let distribution = counts
        .iter()
        .map(|&c| if total == 0 { 0.0 } else { c as f64 / total as f64 })
        .collect();
    TreeNode::Leaf { distribution }
}

/// Bagged ensemble of decision trees with probability-average voting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    n_estimators: usize,
    seed: u64,
    max_depth: Option<usize>,
    min_samples_split: usize,
    n_classes: usize,
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            n_estimators,
            seed: 0,
            max_depth: None,
            min_samples_split: 2,
            n_classes: 0,
            n_features: 0,
            trees: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split.max(2);
        self
    }

    /// Fit the forest. Labels must be class indices below `n_classes`.
    pub fn fit(&mut self, x: &Matrix, y: &[usize], n_classes: usize) -> Result<()> {
        let n_samples = x.n_rows();
        if n_samples == 0 || n_samples != y.len() {
            return Err(RoadriskError::EmptyData(format!(
                "Cannot fit forest on {} rows with {} labels",
                n_samples,
                y.len()
            )));
        }
        if let Some(&bad) = y.iter().find(|&&label| label >= n_classes) {
            return Err(RoadriskError::Config(format!(
                "Label {} out of range for {} classes",
                bad, n_classes
            )));
        }

        let n_features = x.n_cols();
        let params = TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            max_features: ((n_features as f64).sqrt().floor() as usize).max(1),
        };
        let seed = self.seed;

        self.trees = (0..self.n_estimators)
            .into_par_iter()
            .map(|i| {
                let mut rng = fastrand::Rng::with_seed(seed.wrapping_add(i as u64));
                let samples = (0..n_samples).map(|_| rng.usize(0..n_samples)).collect();
                DecisionTree::fit(x, y, n_classes, samples, &params, &mut rng)
            })
            .collect();
        self.n_classes = n_classes;
        self.n_features = n_features;

        Ok(())
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Mean of the trees' leaf distributions.
    pub fn predict_proba_row(&self, x: &[f64]) -> Vec<f64> {
        let mut proba = vec![0.0; self.n_classes];
        if self.trees.is_empty() {
            return proba;
        }
        for tree in &self.trees {
            for (p, q) in proba.iter_mut().zip(tree.predict_proba(x)) {
                *p += q;
            }
        }
        let n = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n);
        proba
    }

    /// Most probable class; ties go to the lower class index.
    pub fn predict_row(&self, x: &[f64]) -> usize {
        argmax(&self.predict_proba_row(x))
    }

    pub fn predict(&self, x: &Matrix) -> Vec<usize> {
        (0..x.n_rows()).map(|i| self.predict_row(x.row(i))).collect()
    }
}

fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}
