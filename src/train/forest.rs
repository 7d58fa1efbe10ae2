//! Random-forest classifier
//!
//! CART-style decision trees over a dense feature matrix: gini impurity,
//! bootstrap sampling, and √p feature subsampling per split. Sample weights
//! carry the class-balanced reweighting, so minority labels contribute as
//! much impurity mass as the majority. Everything is driven by one seeded
//! RNG and is fully deterministic for a given seed.

use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Tree node. Leaves keep the normalized weighted class distribution of
/// their training samples.
#[derive(Clone, Debug, Serialize, Deserialize)]
enum Node {
    Leaf {
        dist: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Node,
}

impl DecisionTree {
    fn predict_dist<'a>(&'a self, row: ArrayView1<'_, f64>) -> &'a [f64] {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { dist } => return dist,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }
}

/// Forest hyperparameters.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub seed: u64,
    pub max_depth: usize,
    pub min_leaf: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 200,
            seed: 42,
            max_depth: 32,
            min_leaf: 1,
        }
    }
}

/// A fitted ensemble of decision trees.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    importances: Vec<f64>,
    n_classes: usize,
    params: ForestParams,
}

/// Inverse-frequency class weights: `n / (k * count_c)` over the classes
/// that actually occur; absent classes get weight 0.
pub fn balanced_class_weights(y: &[usize], n_classes: usize) -> Vec<f64> {
    let mut counts = vec![0usize; n_classes];
    for &c in y {
        counts[c] += 1;
    }
    let present = counts.iter().filter(|&&c| c > 0).count().max(1) as f64;
    let n = y.len() as f64;
    counts
        .iter()
        .map(|&c| if c > 0 { n / (present * c as f64) } else { 0.0 })
        .collect()
}

impl RandomForest {
    /// Fit `params.n_trees` trees on `x`/`y` with per-class sample weights.
    ///
    /// `x` must be non-empty with one row per entry of `y`.
    pub fn fit(
        x: &Array2<f64>,
        y: &[usize],
        n_classes: usize,
        class_weights: &[f64],
        params: ForestParams,
    ) -> Self {
        debug_assert_eq!(x.nrows(), y.len());
        debug_assert!(!y.is_empty());

        let n = x.nrows();
        let p = x.ncols();
        let n_sub = ((p as f64).sqrt().round() as usize).clamp(1, p.max(1));

        let sample_weights: Vec<f64> = y.iter().map(|&c| class_weights[c]).collect();

        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut trees = Vec::with_capacity(params.n_trees);
        let mut importances = vec![0.0; p];

        for _ in 0..params.n_trees {
            let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            let mut tree_importances = vec![0.0; p];
            let total_weight: f64 = bootstrap.iter().map(|&i| sample_weights[i]).sum();

            let mut builder = TreeBuilder {
                x,
                y,
                weights: &sample_weights,
                n_classes,
                n_sub,
                max_depth: params.max_depth,
                min_leaf: params.min_leaf,
                total_weight,
                importances: &mut tree_importances,
            };
            let root = builder.build(bootstrap, 0, &mut rng);
            trees.push(DecisionTree { root });

            let sum: f64 = tree_importances.iter().sum();
            if sum > 0.0 {
                for (acc, imp) in importances.iter_mut().zip(&tree_importances) {
                    *acc += imp / sum;
                }
            }
        }

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }

        Self {
            trees,
            importances,
            n_classes,
            params,
        }
    }

    /// Averaged leaf distribution over all trees.
    pub fn predict_proba(&self, row: ArrayView1<'_, f64>) -> Vec<f64> {
        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.predict_dist(row)) {
                *acc += p;
            }
        }
        let n = self.trees.len().max(1) as f64;
        for p in &mut proba {
            *p /= n;
        }
        proba
    }

    /// Majority class; ties resolve to the lowest class index.
    pub fn predict(&self, row: ArrayView1<'_, f64>) -> usize {
        let proba = self.predict_proba(row);
        let mut best = 0;
        for (i, &p) in proba.iter().enumerate() {
            if p > proba[best] {
                best = i;
            }
        }
        best
    }

    /// Mean decrease in impurity per feature, normalized to sum 1.
    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }
}

struct TreeBuilder<'a> {
    x: &'a Array2<f64>,
    y: &'a [usize],
    weights: &'a [f64],
    n_classes: usize,
    n_sub: usize,
    max_depth: usize,
    min_leaf: usize,
    total_weight: f64,
    importances: &'a mut Vec<f64>,
}

impl TreeBuilder<'_> {
    fn build(&mut self, indices: Vec<usize>, depth: usize, rng: &mut StdRng) -> Node {
        let counts = self.weighted_counts(&indices);
        let node_weight: f64 = counts.iter().sum();
        let node_gini = gini(&counts, node_weight);

        let splittable = indices.len() >= 2 * self.min_leaf
            && depth < self.max_depth
            && node_gini > 0.0;

        if let Some(split) = splittable
            .then(|| self.best_split(&indices, &counts, node_weight, node_gini, rng))
            .flatten()
        {
            self.importances[split.feature] += (node_weight / self.total_weight) * split.decrease;

            let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
                .into_iter()
                .partition(|&i| self.x[[i, split.feature]] <= split.threshold);

            let left = self.build(left_idx, depth + 1, rng);
            let right = self.build(right_idx, depth + 1, rng);
            return Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        let dist = if node_weight > 0.0 {
            counts.iter().map(|c| c / node_weight).collect()
        } else {
            vec![1.0 / self.n_classes as f64; self.n_classes]
        };
        Node::Leaf { dist }
    }

    fn weighted_counts(&self, indices: &[usize]) -> Vec<f64> {
        let mut counts = vec![0.0; self.n_classes];
        for &i in indices {
            counts[self.y[i]] += self.weights[i];
        }
        counts
    }

    fn best_split(
        &self,
        indices: &[usize],
        parent_counts: &[f64],
        parent_weight: f64,
        parent_gini: f64,
        rng: &mut StdRng,
    ) -> Option<SplitCandidate> {
        let p = self.x.ncols();
        let mut features: Vec<usize> = (0..p).collect();
        for i in 0..self.n_sub {
            let j = rng.gen_range(i..p);
            features.swap(i, j);
        }
        features.truncate(self.n_sub);
        // Fixed visit order keeps the tie-break deterministic.
        features.sort_unstable();

        let mut best: Option<SplitCandidate> = None;

        for &feature in &features {
            let mut ordered: Vec<usize> = indices.to_vec();
            ordered.sort_by(|&a, &b| self.x[[a, feature]].total_cmp(&self.x[[b, feature]]));

            let mut left_counts = vec![0.0; self.n_classes];
            let mut left_weight = 0.0;

            for (pos, &i) in ordered.iter().enumerate().take(ordered.len() - 1) {
                left_counts[self.y[i]] += self.weights[i];
                left_weight += self.weights[i];

                let here = self.x[[i, feature]];
                let next = self.x[[ordered[pos + 1], feature]];
                if here >= next {
                    continue;
                }
                let n_left = pos + 1;
                if n_left < self.min_leaf || ordered.len() - n_left < self.min_leaf {
                    continue;
                }

                let right_weight = parent_weight - left_weight;
                if left_weight <= 0.0 || right_weight <= 0.0 {
                    continue;
                }
                let right_counts: Vec<f64> = parent_counts
                    .iter()
                    .zip(&left_counts)
                    .map(|(t, l)| t - l)
                    .collect();

                let weighted = (left_weight / parent_weight) * gini(&left_counts, left_weight)
                    + (right_weight / parent_weight) * gini(&right_counts, right_weight);
                let decrease = parent_gini - weighted;

                if decrease > 1e-12
                    && best.as_ref().map_or(true, |b| decrease > b.decrease)
                {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: (here + next) / 2.0,
                        decrease,
                    });
                }
            }
        }

        best
    }
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    decrease: f64,
}

fn gini(counts: &[f64], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - counts
        .iter()
        .map(|c| {
            let p = c / total;
            p * p
        })
        .sum::<f64>()
}
