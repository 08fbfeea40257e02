//! Support Vector Machine classifier
//!
//! Soft-margin binary SVC trained with SMO (Sequential Minimal Optimization).
//! The kernel matrix is precomputed in parallel when it fits under
//! [`MAX_KERNEL_MATRIX_SAMPLES`]; larger training sets evaluate kernel entries
//! on demand.

use crate::error::{MaintenanceError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Maximum number of samples for eager kernel matrix computation.
pub const MAX_KERNEL_MATRIX_SAMPLES: usize = 10_000;

/// Kernel function type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KernelType {
    /// Linear kernel: K(x, y) = x · y
    Linear,
    /// Radial Basis Function (Gaussian): K(x, y) = exp(-γ * ||x - y||²).
    /// `None` resolves γ at fit time to `1 / (n_features * Var(X))`.
    RBF { gamma: Option<f64> },
}

impl Default for KernelType {
    fn default() -> Self {
        KernelType::RBF { gamma: None }
    }
}

/// SVM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SVMConfig {
    /// Regularization parameter (C)
    pub c: f64,
    /// Kernel function
    pub kernel: KernelType,
    /// Tolerance for stopping criterion
    pub tol: f64,
    /// Maximum number of passes over the data
    pub max_iter: usize,
    /// Random seed
    pub random_state: Option<u64>,
}

impl Default for SVMConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            kernel: KernelType::default(),
            tol: 1e-3,
            max_iter: 1000,
            random_state: Some(42),
        }
    }
}

/// Kernel with every parameter resolved
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
enum FittedKernel {
    Linear,
    RBF { gamma: f64 },
}

impl FittedKernel {
    fn eval(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        match *self {
            FittedKernel::Linear => a.dot(&b),
            FittedKernel::RBF { gamma } => {
                let norm_sq: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum();
                (-gamma * norm_sq).exp()
            }
        }
    }
}

/// Kernel lookups during SMO
enum KernelSource<'a> {
    Cached(Array2<f64>),
    OnDemand {
        x: &'a Array2<f64>,
        kernel: FittedKernel,
    },
}

impl KernelSource<'_> {
    fn get(&self, i: usize, j: usize) -> f64 {
        match self {
            KernelSource::Cached(k) => k[[i, j]],
            KernelSource::OnDemand { x, kernel } => kernel.eval(x.row(i), x.row(j)),
        }
    }
}

/// Support Vector Classifier (two classes)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SVMClassifier {
    config: SVMConfig,
    kernel: Option<FittedKernel>,
    /// Support vectors
    support_vectors: Option<Array2<f64>>,
    /// Alpha coefficients (Lagrange multipliers) times labels
    dual_coef: Option<Array1<f64>>,
    /// Bias term
    bias: f64,
    /// Sorted class labels; `classes[1]` is the positive side
    classes: Vec<i64>,
    n_features: usize,
    is_fitted: bool,
}

impl Default for SVMClassifier {
    fn default() -> Self {
        Self::new(SVMConfig::default())
    }
}

impl SVMClassifier {
    /// Create a new SVM classifier
    pub fn new(config: SVMConfig) -> Self {
        Self {
            config,
            kernel: None,
            support_vectors: None,
            dual_coef: None,
            bias: 0.0,
            classes: Vec::new(),
            n_features: 0,
            is_fitted: false,
        }
    }

    /// `1 / (n_features * Var(X))` over every entry of `x`, 1.0 when constant
    fn scale_gamma(x: &Array2<f64>) -> f64 {
        let var = x.var(0.0);
        if var > 0.0 && var.is_finite() {
            1.0 / (x.ncols() as f64 * var)
        } else {
            1.0
        }
    }

    /// Fit the classifier
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<i64>) -> Result<&mut Self> {
        if x.nrows() != y.len() {
            return Err(MaintenanceError::ShapeError {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }

        let mut classes: Vec<i64> = y.to_vec();
        classes.sort_unstable();
        classes.dedup();

        if classes.len() != 2 {
            return Err(MaintenanceError::InvalidInput(format!(
                "SVM classifier requires exactly 2 distinct classes, got {}",
                classes.len()
            )));
        }

        let kernel = match self.config.kernel {
            KernelType::Linear => FittedKernel::Linear,
            KernelType::RBF { gamma } => FittedKernel::RBF {
                gamma: gamma.unwrap_or_else(|| Self::scale_gamma(x)),
            },
        };

        let y_signed: Array1<f64> = y.mapv(|v| if v == classes[1] { 1.0 } else { -1.0 });
        let (alphas, bias) = self.smo_train(x, &y_signed, kernel);

        let support_indices: Vec<usize> = alphas
            .iter()
            .enumerate()
            .filter(|(_, &a)| a > 1e-8)
            .map(|(i, _)| i)
            .collect();

        let mut support_vectors = Array2::zeros((support_indices.len(), x.ncols()));
        let mut dual_coef = Array1::zeros(support_indices.len());
        for (row, &idx) in support_indices.iter().enumerate() {
            support_vectors.row_mut(row).assign(&x.row(idx));
            dual_coef[row] = alphas[idx] * y_signed[idx];
        }

        debug!(
            n_support = support_indices.len(),
            n_samples = x.nrows(),
            ?kernel,
            "SVM fitted"
        );

        self.kernel = Some(kernel);
        self.support_vectors = Some(support_vectors);
        self.dual_coef = Some(dual_coef);
        self.bias = bias;
        self.classes = classes;
        self.n_features = x.ncols();
        self.is_fitted = true;
        Ok(self)
    }

    /// SMO training with an error cache. Returns `(alphas, bias)`.
    fn smo_train(&self, x: &Array2<f64>, y: &Array1<f64>, kernel: FittedKernel) -> (Array1<f64>, f64) {
        let n = x.nrows();
        let c = self.config.c;
        let tol = self.config.tol;

        let mut alphas = Array1::zeros(n);
        let mut bias = 0.0;
        // f(x_i) - y_i with all alphas at zero
        let mut errors: Array1<f64> = -y;

        if n <= 1 {
            return (alphas, bias);
        }

        let kernel_source = if n <= MAX_KERNEL_MATRIX_SAMPLES {
            KernelSource::Cached(Self::compute_kernel_matrix(x, kernel))
        } else {
            warn!(
                "{} samples exceed the kernel cache limit of {}; computing kernel on demand",
                n, MAX_KERNEL_MATRIX_SAMPLES
            );
            KernelSource::OnDemand { x, kernel }
        };

        let mut rng = match self.config.random_state {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        let mut passes = 0;
        let max_passes = 5;
        let mut total_iter = 0;

        while passes < max_passes && total_iter < self.config.max_iter {
            let mut num_changed = 0;

            for i in 0..n {
                let e_i = errors[i];

                // KKT violation check
                if !((y[i] * e_i < -tol && alphas[i] < c) || (y[i] * e_i > tol && alphas[i] > 0.0)) {
                    continue;
                }

                let j = loop {
                    let j = rng.gen_range(0..n);
                    if j != i {
                        break j;
                    }
                };
                let e_j = errors[j];

                let alpha_i_old = alphas[i];
                let alpha_j_old = alphas[j];

                let (l, h) = if y[i] != y[j] {
                    ((alpha_j_old - alpha_i_old).max(0.0), (c + alpha_j_old - alpha_i_old).min(c))
                } else {
                    ((alpha_i_old + alpha_j_old - c).max(0.0), (alpha_i_old + alpha_j_old).min(c))
                };

                if (l - h).abs() < 1e-10 {
                    continue;
                }

                let k_ii = kernel_source.get(i, i);
                let k_jj = kernel_source.get(j, j);
                let k_ij = kernel_source.get(i, j);
                let eta = 2.0 * k_ij - k_ii - k_jj;

                if eta >= 0.0 {
                    continue;
                }

                let alpha_j = (alpha_j_old - y[j] * (e_i - e_j) / eta).clamp(l, h);
                if (alpha_j - alpha_j_old).abs() < 1e-5 {
                    continue;
                }
                let alpha_i = alpha_i_old + y[i] * y[j] * (alpha_j_old - alpha_j);

                let d_i = y[i] * (alpha_i - alpha_i_old);
                let d_j = y[j] * (alpha_j - alpha_j_old);

                let b1 = bias - e_i - d_i * k_ii - d_j * k_ij;
                let b2 = bias - e_j - d_i * k_ij - d_j * k_jj;

                let new_bias = if alpha_i > 0.0 && alpha_i < c {
                    b1
                } else if alpha_j > 0.0 && alpha_j < c {
                    b2
                } else {
                    (b1 + b2) / 2.0
                };
                let d_b = new_bias - bias;

                alphas[i] = alpha_i;
                alphas[j] = alpha_j;
                bias = new_bias;

                for k in 0..n {
                    errors[k] += d_i * kernel_source.get(i, k) + d_j * kernel_source.get(j, k) + d_b;
                }

                num_changed += 1;
            }

            total_iter += 1;
            if num_changed == 0 {
                passes += 1;
            } else {
                passes = 0;
            }
        }

        debug!(passes = total_iter, "SMO finished");
        (alphas, bias)
    }

    /// Compute kernel matrix (parallelized for large datasets)
    fn compute_kernel_matrix(x: &Array2<f64>, kernel: FittedKernel) -> Array2<f64> {
        let n = x.nrows();

        // For small matrices, sequential is faster due to overhead
        if n < 100 {
            let mut k = Array2::zeros((n, n));
            for i in 0..n {
                for j in i..n {
                    let val = kernel.eval(x.row(i), x.row(j));
                    k[[i, j]] = val;
                    k[[j, i]] = val;
                }
            }
            return k;
        }

        // Parallel: compute upper triangle rows in parallel
        let rows: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|i| (i..n).map(|j| kernel.eval(x.row(i), x.row(j))).collect())
            .collect();

        let mut k = Array2::zeros((n, n));
        for (i, row_vals) in rows.into_iter().enumerate() {
            for (offset, val) in row_vals.into_iter().enumerate() {
                let j = i + offset;
                k[[i, j]] = val;
                k[[j, i]] = val;
            }
        }
        k
    }

    /// Signed distance to the margin; positive means `classes[1]`
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let (kernel, sv, coef) = match (&self.kernel, &self.support_vectors, &self.dual_coef) {
            (Some(k), Some(sv), Some(coef)) if self.is_fitted => (*k, sv, coef),
            _ => return Err(MaintenanceError::ModelNotFitted),
        };

        if x.ncols() != self.n_features {
            return Err(MaintenanceError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }

        let scores: Vec<f64> = (0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let sample = x.row(i);
                sv.rows()
                    .into_iter()
                    .zip(coef.iter())
                    .map(|(row, &a)| a * kernel.eval(sample, row))
                    .sum::<f64>()
                    + self.bias
            })
            .collect();

        Ok(Array1::from_vec(scores))
    }

    /// Predict class labels
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<i64>> {
        let scores = self.decision_function(x)?;
        Ok(scores.mapv(|s| if s >= 0.0 { self.classes[1] } else { self.classes[0] }))
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Get number of support vectors
    pub fn n_support_vectors(&self) -> usize {
        self.support_vectors.as_ref().map(|sv| sv.nrows()).unwrap_or(0)
    }

    /// Kernel coefficient used at fit time, for RBF
    pub fn fitted_gamma(&self) -> Option<f64> {
        match self.kernel {
            Some(FittedKernel::RBF { gamma }) => Some(gamma),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_linear_separable_data() -> (Array2<f64>, Array1<i64>) {
        let x = Array2::from_shape_vec(
            (10, 2),
            vec![
                1.0, 1.0, 1.5, 1.2, 2.0, 2.0, 1.2, 1.8, 0.8, 1.5, 5.0, 5.0, 5.5, 5.2, 6.0, 6.0, 5.2,
                5.8, 4.8, 5.5,
            ],
        )
        .unwrap();

        let y = Array1::from_vec(vec![0, 0, 0, 0, 0, 1, 1, 1, 1, 1]);

        (x, y)
    }

    fn accuracy(y: &Array1<i64>, predictions: &Array1<i64>) -> f64 {
        let correct = y.iter().zip(predictions.iter()).filter(|(a, b)| a == b).count();
        correct as f64 / y.len() as f64
    }

    #[test]
    fn test_svm_classifier_linear() {
        let (x, y) = create_linear_separable_data();

        let config = SVMConfig {
            kernel: KernelType::Linear,
            ..Default::default()
        };

        let mut svm = SVMClassifier::new(config);
        svm.fit(&x, &y).unwrap();

        let predictions = svm.predict(&x).unwrap();
        assert!(accuracy(&y, &predictions) > 0.8);
        assert!(svm.n_support_vectors() > 0);
    }

    #[test]
    fn test_svm_classifier_rbf_scale_gamma() {
        let (x, y) = create_linear_separable_data();

        let mut svm = SVMClassifier::default();
        svm.fit(&x, &y).unwrap();

        let expected = 1.0 / (2.0 * x.var(0.0));
        assert!((svm.fitted_gamma().unwrap() - expected).abs() < 1e-12);

        let predictions = svm.predict(&x).unwrap();
        assert!(accuracy(&y, &predictions) > 0.8);
    }

    #[test]
    fn test_svm_requires_two_classes() {
        let x = Array2::zeros((3, 2));
        let y = Array1::from_vec(vec![1, 1, 1]);
        let err = SVMClassifier::default().fit(&x, &y).unwrap_err();
        assert!(matches!(err, MaintenanceError::InvalidInput(_)));
    }

    #[test]
    fn test_svm_not_fitted() {
        let x = Array2::zeros((1, 2));
        let err = SVMClassifier::default().predict(&x).unwrap_err();
        assert!(matches!(err, MaintenanceError::ModelNotFitted));
    }
}
