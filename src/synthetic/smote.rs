//! SMOTE oversampling

use crate::error::{MaintenanceError, Result};
use crate::synthetic::{class_counts, class_indices, ResampleResult, Sampler};
use ndarray::{Array1, Array2, ArrayView1};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};
use tracing::debug;

/// Ordered float for BinaryHeap-based partial sort
#[derive(Debug, Clone, Copy)]
struct DistIdx(f64, usize);

impl PartialEq for DistIdx {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for DistIdx {}
impl PartialOrd for DistIdx {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for DistIdx {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
    }
}

/// SMOTE (Synthetic Minority Over-sampling Technique)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SMOTE {
    /// Number of nearest neighbors
    k_neighbors: usize,
    /// Target size of each class relative to the majority class
    sampling_strategy: f64,
    /// Random seed
    seed: Option<u64>,
    /// Target samples per class
    target_counts: Option<BTreeMap<i64, usize>>,
}

impl SMOTE {
    /// Create new SMOTE sampler
    pub fn new() -> Self {
        Self {
            k_neighbors: 5,
            sampling_strategy: 1.0, // Balance classes
            seed: None,
            target_counts: None,
        }
    }

    /// Set number of neighbors
    pub fn with_k_neighbors(mut self, k: usize) -> Self {
        self.k_neighbors = k.max(1);
        self
    }

    /// Set sampling strategy (ratio)
    pub fn with_sampling_strategy(mut self, ratio: f64) -> Self {
        self.sampling_strategy = ratio;
        self
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        a.iter().zip(b.iter()).map(|(ai, bi)| (ai - bi).powi(2)).sum()
    }

    /// k nearest rows of `class_rows[point]` within the same class.
    ///
    /// Candidates are excluded by position rather than by distance, so exact
    /// duplicates of the point still count as neighbors.
    fn find_neighbors(x: &Array2<f64>, class_rows: &[usize], point: usize, k: usize) -> Vec<usize> {
        let origin = x.row(class_rows[point]);
        let mut heap: BinaryHeap<DistIdx> = BinaryHeap::with_capacity(k + 1);

        for (i, &row) in class_rows.iter().enumerate() {
            if i == point {
                continue;
            }
            let dist = Self::squared_distance(origin, x.row(row));
            if heap.len() < k {
                heap.push(DistIdx(dist, i));
            } else if let Some(&DistIdx(max_dist, _)) = heap.peek() {
                if dist < max_dist {
                    heap.pop();
                    heap.push(DistIdx(dist, i));
                }
            }
        }

        let mut neighbors: Vec<usize> = heap.into_iter().map(|DistIdx(_, i)| i).collect();
        neighbors.sort_unstable();
        neighbors
    }

    /// Generate synthetic sample between two points
    fn generate_sample(point: ArrayView1<f64>, neighbor: ArrayView1<f64>, rng: &mut StdRng) -> Vec<f64> {
        let gap: f64 = rng.gen();
        point
            .iter()
            .zip(neighbor.iter())
            .map(|(&p, &n)| p + gap * (n - p))
            .collect()
    }
}

impl Default for SMOTE {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for SMOTE {
    fn fit(&mut self, _x: &Array2<f64>, y: &Array1<i64>) -> Result<()> {
        if !(self.sampling_strategy.is_finite() && self.sampling_strategy > 0.0) {
            return Err(MaintenanceError::InvalidParameter {
                name: "sampling_strategy".to_string(),
                value: self.sampling_strategy.to_string(),
                reason: "must be a positive number".to_string(),
            });
        }

        let counts = class_counts(y);
        if counts.len() < 2 {
            return Err(MaintenanceError::ValidationError(
                "Need at least 2 classes for SMOTE".to_string(),
            ));
        }

        let max_count = counts.values().copied().max().unwrap_or(0);
        let target = (max_count as f64 * self.sampling_strategy).floor() as usize;

        let targets = counts
            .iter()
            .map(|(&class, &count)| (class, target.max(count)))
            .collect();

        self.target_counts = Some(targets);
        Ok(())
    }

    fn resample(&self, x: &Array2<f64>, y: &Array1<i64>) -> Result<ResampleResult> {
        let targets = self
            .target_counts
            .as_ref()
            .ok_or_else(|| MaintenanceError::ValidationError("SMOTE not fitted".to_string()))?;

        if x.nrows() != y.len() {
            return Err(MaintenanceError::ShapeError {
                expected: format!("{} rows", y.len()),
                actual: format!("{} rows", x.nrows()),
            });
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let indices = class_indices(y);
        let n_features = x.ncols();

        // Collect only synthetic samples (original data reused from x directly)
        let mut synthetic_x: Vec<Vec<f64>> = Vec::new();
        let mut synthetic_y: Vec<i64> = Vec::new();
        let mut n_synthetic = Vec::new();

        for (&class, &target_count) in targets {
            let class_rows = match indices.get(&class) {
                Some(rows) => rows,
                None => {
                    n_synthetic.push(0);
                    continue;
                }
            };
            let n_to_generate = target_count.saturating_sub(class_rows.len());

            if n_to_generate == 0 {
                n_synthetic.push(0);
                continue;
            }

            if class_rows.len() == 1 {
                // Nothing to interpolate with
                let row: Vec<f64> = x.row(class_rows[0]).to_vec();
                synthetic_x.extend(std::iter::repeat(row).take(n_to_generate));
                synthetic_y.extend(std::iter::repeat(class).take(n_to_generate));
                n_synthetic.push(n_to_generate);
                continue;
            }

            let k = self.k_neighbors.min(class_rows.len() - 1);
            let neighbors: Vec<Vec<usize>> = (0..class_rows.len())
                .map(|i| Self::find_neighbors(x, class_rows, i, k))
                .collect();

            for _ in 0..n_to_generate {
                let idx = rng.gen_range(0..class_rows.len());
                let candidates = &neighbors[idx];
                let neighbor_idx = candidates[rng.gen_range(0..candidates.len())];

                synthetic_x.push(Self::generate_sample(
                    x.row(class_rows[idx]),
                    x.row(class_rows[neighbor_idx]),
                    &mut rng,
                ));
                synthetic_y.push(class);
            }

            debug!(class, k, generated = n_to_generate, "SMOTE class oversampled");
            n_synthetic.push(n_to_generate);
        }

        // Build result: original rows + synthetic rows using from_shape_fn
        let n_original = x.nrows();
        let n_total = n_original + synthetic_x.len();
        let result_x = Array2::from_shape_fn((n_total, n_features), |(i, j)| {
            if i < n_original {
                x[[i, j]]
            } else {
                synthetic_x[i - n_original][j]
            }
        });

        let mut all_y: Vec<i64> = y.iter().copied().collect();
        all_y.extend_from_slice(&synthetic_y);

        Ok(ResampleResult {
            x: result_x,
            y: Array1::from_vec(all_y),
            n_synthetic,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_imbalanced_data() -> (Array2<f64>, Array1<i64>) {
        // Create imbalanced dataset: 20 majority, 5 minority
        let mut data = Vec::new();
        let mut labels = Vec::new();

        // Majority class (0) around (0, 0)
        for i in 0..20 {
            data.push((i % 5) as f64);
            data.push((i / 5) as f64);
            labels.push(0i64);
        }

        // Minority class (1) around (10, 10)
        for i in 0..5 {
            data.push(10.0 + (i % 3) as f64);
            data.push(10.0 + (i / 3) as f64);
            labels.push(1i64);
        }

        let x = Array2::from_shape_vec((25, 2), data).unwrap();
        let y = Array1::from_vec(labels);

        (x, y)
    }

    #[test]
    fn test_smote_balances_classes() {
        let (x, y) = create_imbalanced_data();

        let mut smote = SMOTE::new().with_k_neighbors(3).with_seed(42);
        let result = smote.fit_resample(&x, &y).unwrap();

        let counts = class_counts(&result.y);
        assert_eq!(counts[&0], 20);
        assert_eq!(counts[&1], 20);
        assert_eq!(result.n_synthetic, vec![0, 15]);
    }

    #[test]
    fn test_smote_preserves_original() {
        let (x, y) = create_imbalanced_data();
        let original_rows = x.nrows();

        let mut smote = SMOTE::new().with_seed(42);
        let result = smote.fit_resample(&x, &y).unwrap();

        // First rows should be original data
        for i in 0..original_rows {
            for j in 0..x.ncols() {
                assert_eq!(result.x[[i, j]], x[[i, j]]);
            }
            assert_eq!(result.y[i], y[i]);
        }
    }

    #[test]
    fn test_synthetic_rows_stay_in_minority_hull() {
        let (x, y) = create_imbalanced_data();
        let mut smote = SMOTE::new().with_seed(7);
        let result = smote.fit_resample(&x, &y).unwrap();

        for i in x.nrows()..result.x.nrows() {
            assert_eq!(result.y[i], 1);
            assert!(result.x[[i, 0]] >= 10.0 && result.x[[i, 0]] <= 12.0);
            assert!(result.x[[i, 1]] >= 10.0 && result.x[[i, 1]] <= 11.0);
        }
    }

    #[test]
    fn test_smote_is_deterministic_with_seed() {
        let (x, y) = create_imbalanced_data();
        let a = SMOTE::new().with_seed(42).fit_resample(&x, &y).unwrap();
        let b = SMOTE::new().with_seed(42).fit_resample(&x, &y).unwrap();
        assert_eq!(a.x, b.x);
    }

    #[test]
    fn test_duplicate_minority_rows() {
        // Identical minority rows must not stall neighbor search
        let x = Array2::from_shape_vec((5, 1), vec![0.0, 1.0, 2.0, 5.0, 5.0]).unwrap();
        let y = Array1::from_vec(vec![0, 0, 0, 1, 1]);

        let result = SMOTE::new().with_seed(1).fit_resample(&x, &y).unwrap();
        assert_eq!(result.y.len(), 6);
        assert_eq!(result.x[[5, 0]], 5.0);
    }

    #[test]
    fn test_single_member_class_is_replicated() {
        let x = Array2::from_shape_vec((4, 1), vec![0.0, 1.0, 2.0, 9.0]).unwrap();
        let y = Array1::from_vec(vec![0, 0, 0, 1]);

        let result = SMOTE::new().with_seed(1).fit_resample(&x, &y).unwrap();
        assert_eq!(class_counts(&result.y)[&1], 3);
        assert_eq!(result.x[[4, 0]], 9.0);
        assert_eq!(result.x[[5, 0]], 9.0);
    }

    #[test]
    fn test_single_class_is_rejected() {
        let x = Array2::zeros((3, 2));
        let y = Array1::from_vec(vec![1, 1, 1]);
        let err = SMOTE::new().fit_resample(&x, &y).unwrap_err();
        assert!(matches!(err, MaintenanceError::ValidationError(_)));
    }
}
