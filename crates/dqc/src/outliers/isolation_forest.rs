//! Isolation forest anomaly scoring.
//!
//! Each tree recursively partitions a random subsample with uniformly drawn
//! splits. Anomalies are isolated in fewer splits, so their average path
//! length across the forest is short. Scores follow the usual convention:
//! `score_samples` is `-2^(-E[h(x)] / c(psi))`, and the decision function
//! subtracts an offset chosen so that a `contamination` share of the training
//! rows falls below zero.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::NumericMatrix;
use crate::utils::{quantile_sorted, sort_floats};

/// Upper bound on the number of rows drawn for each tree.
pub const MAX_SAMPLES: usize = 256;

const EULER_GAMMA: f64 = 0.577_215_664_9;

/// Average path length of an unsuccessful binary-search-tree lookup over `n`
/// points, used to normalise depths.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Point at fraction `t` of `[lo, hi)`. Mixing the bounds instead of adding
/// `t * (hi - lo)` stays finite when the spread overflows.
fn split_threshold(lo: f64, hi: f64, t: f64) -> f64 {
    let threshold = lo * (1.0 - t) + hi * t;
    if threshold >= hi { lo } else { threshold.max(lo) }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// One isolation tree, stored as a flat node arena with the root at index 0.
#[derive(Debug, Clone)]
struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    fn build(matrix: &NumericMatrix, rows: Vec<usize>, max_depth: usize, rng: &mut StdRng) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(matrix, rows, 0, max_depth, rng);
        tree
    }

    fn grow(
        &mut self,
        matrix: &NumericMatrix,
        rows: Vec<usize>,
        depth: usize,
        max_depth: usize,
        rng: &mut StdRng,
    ) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { size: rows.len() });

        if depth >= max_depth || rows.len() <= 1 {
            return id;
        }

        // Only features that still vary within this node can split it.
        let candidates: Vec<(usize, f64, f64)> = (0..matrix.n_features())
            .filter_map(|feature| {
                let (lo, hi) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &row| {
                    let v = matrix.get(row, feature);
                    (lo.min(v), hi.max(v))
                });
                (hi > lo).then_some((feature, lo, hi))
            })
            .collect();

        let Some(&(feature, lo, hi)) = candidates.choose(rng) else {
            return id;
        };
        let threshold = split_threshold(lo, hi, rng.r#gen::<f64>());

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&row| matrix.get(row, feature) < threshold);

        let left = self.grow(matrix, left_rows, depth + 1, max_depth, rng);
        let right = self.grow(matrix, right_rows, depth + 1, max_depth, rng);
        self.nodes[id] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };
        id
    }

    /// Depth of the leaf reached by `row`, plus the expected remaining depth
    /// for the points that leaf still holds.
    fn path_length(&self, matrix: &NumericMatrix, row: usize) -> f64 {
        let mut node = 0;
        let mut depth = 0usize;
        loop {
            match &self.nodes[node] {
                Node::Leaf { size } => return depth as f64 + average_path_length(*size),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if matrix.get(row, *feature) < *threshold {
                        *left
                    } else {
                        *right
                    };
                    depth += 1;
                }
            }
        }
    }
}

/// A fitted isolation forest.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    sample_size: usize,
    offset: f64,
}

impl IsolationForest {
    /// Fit `n_estimators` trees on subsamples of at most [`MAX_SAMPLES`] rows
    /// and calibrate the decision offset on the same matrix.
    ///
    /// Trees are grown from a single generator seeded with `seed`, so a fit is
    /// fully reproducible.
    pub fn fit(matrix: &NumericMatrix, n_estimators: usize, contamination: f64, seed: u64) -> Self {
        let sample_size = MAX_SAMPLES.min(matrix.rows);
        let max_depth = (sample_size.max(2) as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(seed);
        let all_rows: Vec<usize> = (0..matrix.rows).collect();

        let trees = (0..n_estimators)
            .map(|_| {
                let sample: Vec<usize> = all_rows
                    .choose_multiple(&mut rng, sample_size)
                    .copied()
                    .collect();
                IsolationTree::build(matrix, sample, max_depth, &mut rng)
            })
            .collect();

        let mut forest = Self {
            trees,
            sample_size,
            offset: 0.0,
        };

        let mut training = forest.score_samples(matrix);
        sort_floats(&mut training);
        forest.offset = quantile_sorted(&training, contamination).unwrap_or(0.0);
        forest
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Opposite of the anomaly score; lower means more abnormal. Values lie
    /// in `[-1, 0)`.
    pub fn score_samples(&self, matrix: &NumericMatrix) -> Vec<f64> {
        let normaliser = average_path_length(self.sample_size);
        let n_trees = self.trees.len().max(1) as f64;

        (0..matrix.rows)
            .map(|row| {
                let mean_depth = self
                    .trees
                    .iter()
                    .map(|tree| tree.path_length(matrix, row))
                    .sum::<f64>()
                    / n_trees;
                let ratio = if normaliser > 0.0 {
                    mean_depth / normaliser
                } else {
                    0.0
                };
                -(2f64.powf(-ratio))
            })
            .collect()
    }

    /// `score_samples` shifted by the fitted offset; negative values are
    /// outliers.
    pub fn decision_function(&self, matrix: &NumericMatrix) -> Vec<f64> {
        self.score_samples(matrix)
            .into_iter()
            .map(|s| s - self.offset)
            .collect()
    }
}

static_assertions::assert_impl_all!(IsolationForest: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn matrix(values: Vec<Vec<f64>>) -> NumericMatrix {
        let rows = values.first().map_or(0, Vec::len);
        NumericMatrix {
            columns: (0..values.len()).map(|i| format!("c{i}")).collect(),
            values,
            rows,
        }
    }

    #[test]
    fn test_average_path_length() {
        assert_eq!(average_path_length(0), 0.0);
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        // 2 * (ln 255 + gamma) - 2 * 255 / 256
        let expected = 2.0 * (255f64.ln() + EULER_GAMMA) - 2.0 * 255.0 / 256.0;
        assert!((average_path_length(256) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_scores_in_range() {
        let data = matrix(vec![(0..50).map(|i| i as f64).collect()]);
        let forest = IsolationForest::fit(&data, 50, 0.1, 7);
        for score in forest.score_samples(&data) {
            assert!((-1.0..0.0).contains(&score));
        }
    }

    #[test]
    fn test_extreme_point_scores_lowest() {
        let mut xs: Vec<f64> = (0..60).map(|i| (i % 6) as f64).collect();
        let mut ys: Vec<f64> = (0..60).map(|i| (i % 5) as f64).collect();
        xs.push(80.0);
        ys.push(-80.0);
        let data = matrix(vec![xs, ys]);

        let forest = IsolationForest::fit(&data, 100, 0.05, 42);
        let scores = forest.score_samples(&data);
        let lowest = scores
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(lowest, 60);
    }

    #[test]
    fn test_split_threshold_stays_in_range() {
        assert_eq!(split_threshold(0.0, 10.0, 0.0), 0.0);
        assert_eq!(split_threshold(0.0, 10.0, 0.25), 2.5);

        let t = split_threshold(-f64::MAX, f64::MAX, 0.5);
        assert!(t.is_finite());

        for t in [0.0, 1e-300, 0.5, 1.0 - f64::EPSILON] {
            let threshold = split_threshold(-f64::MAX, f64::MAX, t);
            assert!((-f64::MAX..f64::MAX).contains(&threshold));
        }
    }

    #[test]
    fn test_fit_on_extreme_finite_values() {
        let data = matrix(vec![vec![-f64::MAX, 0.0, 1.0, 2.0, f64::MAX]]);
        let forest = IsolationForest::fit(&data, 100, 0.1, 42);
        let scores = forest.score_samples(&data);

        assert_eq!(scores.len(), 5);
        assert!(scores.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_constant_data_flags_nothing() {
        let data = matrix(vec![vec![3.0; 20]]);
        let forest = IsolationForest::fit(&data, 20, 0.2, 42);
        let decision = forest.decision_function(&data);
        assert!(decision.iter().all(|d| *d >= 0.0));
    }

    #[test]
    fn test_single_row() {
        let data = matrix(vec![vec![1.0]]);
        let forest = IsolationForest::fit(&data, 10, 0.1, 42);
        assert_eq!(forest.decision_function(&data), vec![0.0]);
    }

    #[test]
    fn test_same_seed_same_scores() {
        let data = matrix(vec![(0..40).map(|i| ((i * 7) % 13) as f64).collect()]);
        let a = IsolationForest::fit(&data, 30, 0.1, 1).score_samples(&data);
        let b = IsolationForest::fit(&data, 30, 0.1, 1).score_samples(&data);
        assert_eq!(a, b);
    }
}
